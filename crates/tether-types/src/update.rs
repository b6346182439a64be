//! Payloads exchanged between frontends and the backend.
//!
//! Values cross the boundary as [`serde_json::Value`]; typed code on either
//! side converts with [`VersionedValue::encode`] and [`StateEvent::decode`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::name::StateName;
use crate::version::Version;

/// A value submitted for a named state, tagged with the version the
/// submitter last observed.
///
/// `version` is `None` when the submitter has never seen an authoritative
/// copy of the state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionedValue<T> {
    pub version: Option<Version>,
    pub name: StateName,
    pub value: T,
}

/// A [`VersionedValue`] in wire form, as carried by the `update_state` command.
pub type StateUpdate = VersionedValue<Value>;

impl<T: Serialize> VersionedValue<T> {
    pub fn new(name: StateName, version: Option<Version>, value: T) -> Self {
        Self { version, name, value }
    }

    /// Serialize the value into its wire form.
    pub fn encode(&self) -> Result<StateUpdate, TypeError> {
        let value =
            serde_json::to_value(&self.value).map_err(|e| TypeError::Encode(e.to_string()))?;
        Ok(StateUpdate {
            version: self.version,
            name: self.name.clone(),
            value,
        })
    }
}

/// Authoritative value of a state at a given version.
///
/// Broadcast on the `<name>_update` channel after every flush or accepted
/// update. Always the full value, never a diff.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    pub name: StateName,
    pub version: Version,
    pub value: Value,
}

impl StateEvent {
    pub fn event_name(&self) -> String {
        self.name.event_name()
    }

    /// Decode the carried value as `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TypeError> {
        decode_value(self.value.clone())
    }
}

/// Decode a wire value as `T`, reporting the expected type on failure.
pub fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, TypeError> {
    serde_json::from_value(value).map_err(|e| TypeError::Decode {
        expected: std::any::type_name::<T>().to_string(),
        reason: e.to_string(),
    })
}
