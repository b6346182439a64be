//! Foundation types for Tether.
//!
//! Tether keeps one authoritative, typed state object per name inside a
//! backend process and mirrors it into any number of frontend working copies.
//! This crate holds the vocabulary every other Tether crate shares.
//!
//! # Key Types
//!
//! - [`StateName`]: Validated, non-empty key of a state slot
//! - [`Version`]: Backend-assigned, strictly increasing slot version
//! - [`VersionedValue`] / [`StateUpdate`]: Frontend submission of a new value
//! - [`StateEvent`]: Authoritative `{name, version, value}` notification
//! - [`StateValue`]: Bound every synchronized value type satisfies
//! - [`ErrorKind`]: Error taxonomy shared across the stack

pub mod error;
pub mod name;
pub mod update;
pub mod value;
pub mod version;

pub use error::{ErrorKind, TypeError};
pub use name::StateName;
pub use update::{decode_value, StateEvent, StateUpdate, VersionedValue};
pub use value::StateValue;
pub use version::Version;
