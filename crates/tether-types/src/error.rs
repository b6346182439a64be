use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("state name must not be empty")]
    EmptyName,

    #[error("invalid state name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("failed to encode value: {0}")]
    Encode(String),

    #[error("failed to decode value as {expected}: {reason}")]
    Decode { expected: String, reason: String },
}

impl TypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::Encode(_) | Self::Decode { .. } => ErrorKind::TypeMismatch,
        }
    }
}

/// Classification shared by every error in the stack.
///
/// Library errors carry rich context; `ErrorKind` is what crosses the wire
/// and what callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No slot exists for the name and the registry does not create one.
    UnknownState,
    /// The submitted version is not the slot's current version.
    Stale,
    /// The payload does not decode to the slot's value type.
    TypeMismatch,
    /// The slot is checked out and the registry fails fast.
    Busy,
    /// The command or notification could not be delivered.
    TransportFailure,
    /// The state name is not a valid key.
    InvalidName,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownState => "unknown_state",
            Self::Stale => "stale",
            Self::TypeMismatch => "type_mismatch",
            Self::Busy => "busy",
            Self::TransportFailure => "transport_failure",
            Self::InvalidName => "invalid_name",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_kinds() {
        assert_eq!(TypeError::EmptyName.kind(), ErrorKind::InvalidName);
        assert_eq!(TypeError::Encode("x".into()).kind(), ErrorKind::TypeMismatch);
        let err = TypeError::Decode { expected: "u32".into(), reason: "bad".into() };
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn error_kind_wire_names_match_display() {
        let json = serde_json::to_string(&ErrorKind::UnknownState).unwrap();
        assert_eq!(json, "\"unknown_state\"");
        assert_eq!(ErrorKind::TransportFailure.to_string(), "transport_failure");
    }
}
