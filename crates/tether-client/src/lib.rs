//! Frontend side of Tether.
//!
//! A [`SyncedState`] keeps a detached working copy of one named state,
//! follows the backend's `<name>_update` notifications, and pushes local
//! edits back only when [`SyncedState::sync`] is called. The proxy reaches
//! the backend through a [`StateTransport`]; [`LocalTransport`] serves an
//! in-process [`SyncEngine`](tether_sync::SyncEngine).

pub mod error;
pub mod local;
pub mod proxy;
pub mod transport;

pub use error::{ClientError, ClientResult};
pub use local::LocalTransport;
pub use proxy::{ProxyStatus, SyncedState};
pub use transport::{Notifications, StateTransport};
