use async_trait::async_trait;
use futures::stream::BoxStream;

use tether_types::{StateEvent, StateName, StateUpdate, Version};

use crate::error::ClientResult;

/// Stream of `<name>_update` notifications for one state.
pub type Notifications = BoxStream<'static, StateEvent>;

/// Carries commands to the backend and notifications back.
///
/// Implementations surface delivery problems as
/// [`ClientError::Transport`](crate::ClientError::Transport) and backend
/// refusals as [`ClientError::Rejected`](crate::ClientError::Rejected).
#[async_trait]
pub trait StateTransport: Send + Sync {
    /// Submit an `update_state` command; returns the accepted version.
    async fn update_state(&self, update: StateUpdate) -> ClientResult<Version>;

    /// Submit an `emit_state` command; `false` if the backend has no slot.
    async fn emit_state(&self, name: &StateName) -> ClientResult<bool>;

    async fn subscribe(&self, name: &StateName) -> ClientResult<Notifications>;
}
