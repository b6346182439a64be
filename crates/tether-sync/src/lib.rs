//! Synchronization engine for Tether.
//!
//! Wires a [`StateRegistry`](tether_registry::StateRegistry) to a
//! [`Broadcaster`] so that every flush and every accepted update reaches
//! the subscribers of the affected name as a `<name>_update` notification.
//!
//! # Modules
//!
//! - [`broadcaster`]: Per-name notification channels
//! - [`config`]: [`SyncConfig`]
//! - [`engine`]: [`SyncEngine`], the `update_state` / `emit_state` handlers
//! - [`error`]: [`SyncError`]
//! - [`subscription`]: [`Subscription`] receivers

pub mod broadcaster;
pub mod config;
pub mod engine;
pub mod error;
pub mod subscription;

pub use broadcaster::Broadcaster;
pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use subscription::Subscription;
