use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error};

use tether_types::{StateEvent, StateName, StateValue, Version};

use crate::emitter::StateEmitter;
use crate::slot::SlotState;

/// Exclusive, scope-bound checkout of one slot's value.
///
/// An `Item` holds the slot lock for its whole lifetime and dereferences
/// straight to the stored value. Dropping it, whether the scope ends
/// normally, returns early, or unwinds from a panic, flushes the slot:
///
/// 1. the slot version is incremented,
/// 2. the lock is released,
/// 3. `{name, version, value}` is handed to the registry's emitter.
///
/// The flush happens once per checkout even if the value was never touched.
pub struct Item<T: StateValue> {
    name: StateName,
    guard: Option<OwnedMutexGuard<SlotState<T>>>,
    emitter: Arc<dyn StateEmitter>,
}

impl<T: StateValue> Item<T> {
    pub(crate) fn new(
        name: StateName,
        guard: OwnedMutexGuard<SlotState<T>>,
        emitter: Arc<dyn StateEmitter>,
    ) -> Self {
        debug!(name = %name, version = %guard.version, "slot checked out");
        Self {
            name,
            guard: Some(guard),
            emitter,
        }
    }

    pub fn name(&self) -> &StateName {
        &self.name
    }

    /// Version of the slot as of checkout. The flush on drop advances it.
    pub fn version(&self) -> Version {
        self.state().version
    }

    /// Replace the held value, returning the previous one.
    pub fn replace(&mut self, value: T) -> T {
        std::mem::replace(&mut self.state_mut().value, value)
    }

    fn state(&self) -> &SlotState<T> {
        self.guard.as_ref().expect("item guard is held until drop")
    }

    fn state_mut(&mut self) -> &mut SlotState<T> {
        self.guard.as_mut().expect("item guard is held until drop")
    }
}

impl<T: StateValue> Deref for Item<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.state().value
    }
}

impl<T: StateValue> DerefMut for Item<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.state_mut().value
    }
}

impl<T: StateValue> Drop for Item<T> {
    fn drop(&mut self) {
        let Some(mut state) = self.guard.take() else {
            return;
        };

        let version = state.bump();
        let encoded = serde_json::to_value(&state.value);
        drop(state);

        match encoded {
            Ok(value) => {
                debug!(name = %self.name, %version, "slot flushed");
                self.emitter.emit(StateEvent {
                    name: self.name.clone(),
                    version,
                    value,
                });
            }
            Err(e) => {
                error!(
                    name = %self.name,
                    %version,
                    error = %e,
                    "flushed value does not encode; notification skipped"
                );
            }
        }
    }
}

impl<T: StateValue + fmt::Debug> fmt::Debug for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("version", &self.version())
            .field("value", &**self)
            .finish()
    }
}
