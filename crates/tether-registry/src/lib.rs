//! Authoritative state registry for Tether.
//!
//! The registry owns one slot per state name. Backend code reaches a slot
//! through an [`Item`], a scoped checkout that holds the slot lock and
//! flushes (version bump plus notification) when it is dropped. Frontend
//! submissions go through [`StateRegistry::apply_update`], which enforces the
//! versioning rules.
//!
//! # Modules
//!
//! - [`config`]: Checkout and unknown-state policies
//! - [`emitter`]: The [`StateEmitter`] seam notifications leave through
//! - [`error`]: [`RegistryError`] and its [`ErrorKind`](tether_types::ErrorKind) mapping
//! - [`item`]: The [`Item`] scoped handle
//! - [`registry`]: [`StateRegistry`] itself
//! - `slot`: Typed slots behind a type-erased interface

pub mod config;
pub mod emitter;
pub mod error;
pub mod item;
pub mod registry;
mod slot;

pub use config::{CheckoutPolicy, RegistryConfig, UnknownStatePolicy};
pub use emitter::{NullEmitter, StateEmitter};
pub use error::{RegistryError, RegistryResult};
pub use item::Item;
pub use registry::StateRegistry;
pub use slot::SlotInfo;
