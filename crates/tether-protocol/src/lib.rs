//! Wire protocol for Tether.
//!
//! Defines the request and response bodies of the `update_state` and
//! `emit_state` commands, the framing of `<name>_update` notifications, and
//! the HTTP endpoint paths the server exposes them on.

pub mod endpoint;
pub mod error;
pub mod message;

pub use endpoint::{endpoints, HealthResponse};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    decode_notification, encode_notification, EmitStateRequest, EmitStateResponse, ErrorResponse,
    ListStatesResponse, StateInfo, UpdateStateResponse, PROTOCOL_VERSION,
};
