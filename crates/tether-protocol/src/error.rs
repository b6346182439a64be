use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("notification {event:?} does not belong to state {name:?}")]
    EventMismatch { event: String, name: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
