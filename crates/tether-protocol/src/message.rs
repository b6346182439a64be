use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tether_types::{ErrorKind, StateEvent, StateName, Version};

use crate::error::{ProtocolError, ProtocolResult};

pub const PROTOCOL_VERSION: u32 = 1;

/// Reply to an accepted `update_state`, carrying the version the value was
/// stored at. Rejections are sent as [`ErrorResponse`] instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateStateResponse {
    pub version: Version,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmitStateRequest {
    pub name: StateName,
}

/// `emitted` is false when the backend holds no slot for the name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmitStateResponse {
    pub emitted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInfo {
    pub name: StateName,
    pub version: Version,
    pub type_name: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListStatesResponse {
    pub states: Vec<StateInfo>,
}

/// Body of every failed command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Frame a notification as `(event name, JSON data)`.
pub fn encode_notification(event: &StateEvent) -> ProtocolResult<(String, String)> {
    let data =
        serde_json::to_string(event).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    Ok((event.event_name(), data))
}

/// Parse a notification frame, checking that the event name matches the
/// state the payload describes.
pub fn decode_notification(event: &str, data: &str) -> ProtocolResult<StateEvent> {
    let parsed: StateEvent =
        serde_json::from_str(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
    if parsed.event_name() != event {
        return Err(ProtocolError::EventMismatch {
            event: event.to_string(),
            name: parsed.name.into_string(),
        });
    }
    Ok(parsed)
}
