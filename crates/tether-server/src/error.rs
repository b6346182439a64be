use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use tether_protocol::ErrorResponse;
use tether_registry::RegistryError;
use tether_sync::SyncError;
use tether_types::{ErrorKind, TypeError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// The body is not JSON, or was sent without a JSON content type.
    #[error("malformed request: {}", .0.body_text())]
    Json(#[from] JsonRejection),

    /// The body is JSON but does not have the command's shape.
    #[error("invalid request body: {0}")]
    Body(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RegistryError> for ServerError {
    fn from(e: RegistryError) -> Self {
        Self::Sync(e.into())
    }
}

impl From<TypeError> for ServerError {
    fn from(e: TypeError) -> Self {
        Self::Sync(e.into())
    }
}

impl ServerError {
    /// Classification for command failures; `None` for server-side faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Sync(e) => Some(e.kind()),
            Self::Json(_) | Self::Body(_) => Some(ErrorKind::TypeMismatch),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match (self, self.kind()) {
            (Self::Json(rejection), _) => rejection.status(),
            (_, Some(kind)) => status_for(kind),
            (_, None) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP status a rejected command is reported with.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnknownState => StatusCode::NOT_FOUND,
        ErrorKind::Stale => StatusCode::CONFLICT,
        ErrorKind::TypeMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Busy => StatusCode::LOCKED,
        ErrorKind::TransportFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InvalidName => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind().unwrap_or(ErrorKind::TransportFailure);
        (status, Json(ErrorResponse::new(kind, self.to_string()))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
