use tether_sync::SyncError;
use tether_types::{ErrorKind, StateName, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend refused the command.
    #[error("rejected ({kind}): {message}")]
    Rejected { kind: ErrorKind, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("proxy for {0} is closed")]
    Closed(StateName),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Rejected { kind, .. } => *kind,
            Self::Transport(_) | Self::Closed(_) => ErrorKind::TransportFailure,
            Self::Type(e) => e.kind(),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.kind() == ErrorKind::Stale
    }
}

impl From<SyncError> for ClientError {
    fn from(e: SyncError) -> Self {
        Self::Rejected {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
