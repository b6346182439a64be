//! Error types for registry operations.

use tether_types::{ErrorKind, StateName, TypeError, Version};
use thiserror::Error;

/// Errors that can occur while checking out or updating a slot.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No slot exists for the name and none may be created for it.
    #[error("unknown state: {name}")]
    UnknownState { name: String },

    /// The submitted version does not match the slot's current version.
    #[error(
        "stale update for {name}: submitted {}, current {current}",
        display_version(.submitted)
    )]
    Stale {
        name: StateName,
        submitted: Option<Version>,
        current: Version,
    },

    /// The slot (or declaration) holds a different value type, or the
    /// payload does not decode to it.
    #[error("type mismatch for {name}: expected {expected}: {reason}")]
    TypeMismatch {
        name: String,
        expected: String,
        reason: String,
    },

    /// The slot is checked out and the registry is configured to fail fast.
    #[error("state is busy: {name}")]
    Busy { name: StateName },

    /// The name is not a valid state name.
    #[error(transparent)]
    InvalidName(#[from] TypeError),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownState { .. } => ErrorKind::UnknownState,
            Self::Stale { .. } => ErrorKind::Stale,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Busy { .. } => ErrorKind::Busy,
            Self::InvalidName(e) => e.kind(),
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownState { name: name.to_string() }
    }
}

fn display_version(version: &Option<Version>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "none".into(),
    }
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
