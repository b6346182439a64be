//! Typed slots and their type-erased face.
//!
//! Each name maps to one [`Slot<T>`] holding the authoritative value behind
//! an async mutex. The registry stores slots as `Arc<dyn ErasedSlot>` so one
//! map can hold every value type; typed access goes through a checked
//! downcast that fails with [`RegistryError::TypeMismatch`].

use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use tether_types::{decode_value, StateEvent, StateName, StateUpdate, StateValue, Version};

use crate::config::CheckoutPolicy;
use crate::error::{RegistryError, RegistryResult};

/// Authoritative contents of a slot, guarded by the slot lock.
pub(crate) struct SlotState<T> {
    pub(crate) version: Version,
    pub(crate) value: T,
    pub(crate) updated_at: DateTime<Utc>,
}

impl<T> SlotState<T> {
    /// Advance the version after a flush or an accepted update.
    pub(crate) fn bump(&mut self) -> Version {
        self.version = self.version.next();
        self.updated_at = Utc::now();
        self.version
    }
}

/// Summary of a slot for listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotInfo {
    pub name: StateName,
    pub version: Version,
    pub type_name: String,
    pub updated_at: DateTime<Utc>,
}

pub(crate) struct Slot<T> {
    name: StateName,
    cell: Arc<Mutex<SlotState<T>>>,
}

impl<T: StateValue> Slot<T> {
    pub(crate) fn new(name: StateName, value: T, version: Version) -> Self {
        Self {
            name,
            cell: Arc::new(Mutex::new(SlotState {
                version,
                value,
                updated_at: Utc::now(),
            })),
        }
    }

    pub(crate) fn name(&self) -> &StateName {
        &self.name
    }

    /// Take the slot lock according to `policy`.
    pub(crate) async fn acquire(
        &self,
        policy: CheckoutPolicy,
    ) -> RegistryResult<OwnedMutexGuard<SlotState<T>>> {
        match policy {
            CheckoutPolicy::Block => Ok(Arc::clone(&self.cell).lock_owned().await),
            CheckoutPolicy::FailFast => Arc::clone(&self.cell)
                .try_lock_owned()
                .map_err(|_| RegistryError::Busy { name: self.name.clone() }),
        }
    }
}

/// Capabilities every slot exposes regardless of its value type.
#[async_trait]
pub(crate) trait ErasedSlot: Send + Sync + 'static {
    fn name(&self) -> &StateName;

    fn type_name(&self) -> &'static str;

    fn value_type(&self) -> TypeId;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Decode `update.value`, check its version and replace the value.
    ///
    /// Returns the event describing the new authoritative value. The slot is
    /// untouched on any error.
    async fn apply(
        &self,
        policy: CheckoutPolicy,
        update: StateUpdate,
    ) -> RegistryResult<StateEvent>;

    /// Current value and version, without advancing the version.
    async fn snapshot(&self, policy: CheckoutPolicy) -> RegistryResult<StateEvent>;

    async fn version(&self, policy: CheckoutPolicy) -> RegistryResult<Version>;

    async fn info(&self) -> SlotInfo;
}

#[async_trait]
impl<T: StateValue> ErasedSlot for Slot<T> {
    fn name(&self) -> &StateName {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn value_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    async fn apply(
        &self,
        policy: CheckoutPolicy,
        update: StateUpdate,
    ) -> RegistryResult<StateEvent> {
        let value: T = decode(&self.name, update.value)?;
        let encoded = encode(&self.name, &value)?;

        let mut state = self.acquire(policy).await?;
        if let Some(submitted) = update.version {
            if submitted != state.version {
                return Err(RegistryError::Stale {
                    name: self.name.clone(),
                    submitted: Some(submitted),
                    current: state.version,
                });
            }
        }

        state.value = value;
        let version = state.bump();
        drop(state);

        debug!(name = %self.name, %version, "update applied");
        Ok(StateEvent {
            name: self.name.clone(),
            version,
            value: encoded,
        })
    }

    async fn snapshot(&self, policy: CheckoutPolicy) -> RegistryResult<StateEvent> {
        let state = self.acquire(policy).await?;
        let value = encode(&self.name, &state.value)?;
        Ok(StateEvent {
            name: self.name.clone(),
            version: state.version,
            value,
        })
    }

    async fn version(&self, policy: CheckoutPolicy) -> RegistryResult<Version> {
        Ok(self.acquire(policy).await?.version)
    }

    async fn info(&self) -> SlotInfo {
        let state = self.cell.lock().await;
        SlotInfo {
            name: self.name.clone(),
            version: state.version,
            type_name: std::any::type_name::<T>().to_string(),
            updated_at: state.updated_at,
        }
    }
}

/// Builds a slot for a declared name from the first submitted value.
pub(crate) type SlotFactory =
    fn(StateName, Value) -> RegistryResult<(Arc<dyn ErasedSlot>, StateEvent)>;

/// [`SlotFactory`] for value type `T`. The new slot starts at version 1: the
/// submission counts as the first accepted update.
pub(crate) fn create_from_value<T: StateValue>(
    name: StateName,
    value: Value,
) -> RegistryResult<(Arc<dyn ErasedSlot>, StateEvent)> {
    let typed: T = decode(&name, value)?;
    let encoded = encode(&name, &typed)?;
    let version = Version::INITIAL.next();
    let slot: Arc<dyn ErasedSlot> = Arc::new(Slot::new(name.clone(), typed, version));
    Ok((
        slot,
        StateEvent {
            name,
            version,
            value: encoded,
        },
    ))
}

/// Recover the typed slot behind an erased one.
pub(crate) fn downcast<T: StateValue>(slot: Arc<dyn ErasedSlot>) -> RegistryResult<Arc<Slot<T>>> {
    let name = slot.name().to_string();
    let found = slot.type_name();
    slot.into_any()
        .downcast::<Slot<T>>()
        .map_err(|_| RegistryError::TypeMismatch {
            name,
            expected: std::any::type_name::<T>().to_string(),
            reason: format!("slot holds {found}"),
        })
}

fn decode<T: StateValue>(name: &StateName, value: Value) -> RegistryResult<T> {
    decode_value(value).map_err(|e| RegistryError::TypeMismatch {
        name: name.to_string(),
        expected: std::any::type_name::<T>().to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn encode<T: StateValue>(name: &StateName, value: &T) -> RegistryResult<Value> {
    serde_json::to_value(value).map_err(|e| RegistryError::TypeMismatch {
        name: name.to_string(),
        expected: std::any::type_name::<T>().to_string(),
        reason: format!("value does not encode: {e}"),
    })
}
