use tether_registry::RegistryError;
use tether_types::{ErrorKind, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Type(e) => e.kind(),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
