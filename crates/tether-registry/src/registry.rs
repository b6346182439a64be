use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use tether_types::{StateEvent, StateName, StateUpdate, StateValue, Version};

use crate::config::{RegistryConfig, UnknownStatePolicy};
use crate::emitter::StateEmitter;
use crate::error::{RegistryError, RegistryResult};
use crate::item::Item;
use crate::slot::{create_from_value, downcast, ErasedSlot, Slot, SlotFactory, SlotInfo};

/// Value type registered for a name ahead of its first update.
struct Declaration {
    value_type: TypeId,
    type_name: &'static str,
    factory: SlotFactory,
}

/// Mapping from state name to its authoritative slot.
///
/// One registry is constructed per backend process and shared (usually in an
/// `Arc`) with every command handler. Slots are created on first access and
/// live until [`StateRegistry::teardown`]; there is no eviction.
///
/// Slots of different names never contend. Every access to one slot
/// (checkout, update, snapshot) serializes through that slot's lock, with
/// contention handled by the configured [`CheckoutPolicy`](crate::CheckoutPolicy).
pub struct StateRegistry {
    config: RegistryConfig,
    slots: RwLock<HashMap<StateName, Arc<dyn ErasedSlot>>>,
    declarations: RwLock<HashMap<StateName, Declaration>>,
    emitter: Arc<dyn StateEmitter>,
}

impl StateRegistry {
    /// Create an empty registry that flushes checkouts into `emitter`.
    pub fn new(config: RegistryConfig, emitter: Arc<dyn StateEmitter>) -> Self {
        Self {
            config,
            slots: RwLock::new(HashMap::new()),
            declarations: RwLock::new(HashMap::new()),
            emitter,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Check out the slot for `name`, creating it with `default` if absent.
    ///
    /// Creating the slot emits nothing; the checkout's release does.
    pub async fn get_or_init<T: StateValue>(
        &self,
        name: &str,
        default: T,
    ) -> RegistryResult<Item<T>> {
        let name = StateName::new(name)?;
        self.check_declared::<T>(&name)?;

        let slot = {
            let mut slots = self.slots.write().expect("registry lock poisoned");
            Arc::clone(slots.entry(name.clone()).or_insert_with(|| {
                debug!(name = %name, "slot created");
                let slot: Arc<dyn ErasedSlot> =
                    Arc::new(Slot::new(name.clone(), default, Version::INITIAL));
                slot
            }))
        };

        self.checkout(downcast::<T>(slot)?).await
    }

    /// Check out the existing slot for `name`.
    pub async fn get<T: StateValue>(&self, name: &str) -> RegistryResult<Item<T>> {
        let slot = self.lookup(name).ok_or_else(|| RegistryError::unknown(name))?;
        self.checkout(downcast::<T>(slot)?).await
    }

    /// Create the slot for `name` at version 0 without checking it out.
    ///
    /// Returns `false` and leaves the slot alone if it already exists.
    pub fn insert<T: StateValue>(&self, name: &str, value: T) -> RegistryResult<bool> {
        let name = StateName::new(name)?;
        self.check_declared::<T>(&name)?;

        let mut slots = self.slots.write().expect("registry lock poisoned");
        match slots.entry(name) {
            Entry::Occupied(entry) => {
                let slot = entry.get();
                if slot.value_type() != TypeId::of::<T>() {
                    return Err(RegistryError::TypeMismatch {
                        name: slot.name().to_string(),
                        expected: std::any::type_name::<T>().to_string(),
                        reason: format!("slot holds {}", slot.type_name()),
                    });
                }
                Ok(false)
            }
            Entry::Vacant(entry) => {
                debug!(name = %entry.key(), "slot inserted");
                let slot = Slot::new(entry.key().clone(), value, Version::INITIAL);
                entry.insert(Arc::new(slot));
                Ok(true)
            }
        }
    }

    /// Register `T` as the value type of `name`.
    ///
    /// Under [`UnknownStatePolicy::CreateDeclared`] an update for a declared
    /// name with no slot creates the slot. Later typed access with another
    /// type fails with [`RegistryError::TypeMismatch`].
    pub fn declare<T: StateValue>(&self, name: &str) -> RegistryResult<()> {
        let name = StateName::new(name)?;

        if let Some(slot) = self.lookup(name.as_str()) {
            if slot.value_type() != TypeId::of::<T>() {
                return Err(RegistryError::TypeMismatch {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>().to_string(),
                    reason: format!("slot holds {}", slot.type_name()),
                });
            }
        }

        let mut declarations = self.declarations.write().expect("declaration lock poisoned");
        if let Some(existing) = declarations.get(&name) {
            if existing.value_type != TypeId::of::<T>() {
                return Err(RegistryError::TypeMismatch {
                    name: name.to_string(),
                    expected: std::any::type_name::<T>().to_string(),
                    reason: format!("name is declared as {}", existing.type_name),
                });
            }
            return Ok(());
        }

        debug!(name = %name, type_name = std::any::type_name::<T>(), "state declared");
        declarations.insert(
            name,
            Declaration {
                value_type: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                factory: create_from_value::<T>,
            },
        );
        Ok(())
    }

    /// Apply a frontend-submitted value to its slot.
    ///
    /// - no version: accepted unconditionally,
    /// - version equal to the slot's: accepted,
    /// - any other version: rejected with [`RegistryError::Stale`].
    ///
    /// An accepted update advances the version by one. The returned event is
    /// the new authoritative value; broadcasting it is the caller's job. A
    /// rejected update changes nothing.
    pub async fn apply_update(&self, update: StateUpdate) -> RegistryResult<StateEvent> {
        match self.lookup(update.name.as_str()) {
            Some(slot) => slot.apply(self.config.checkout, update).await,
            None => self.create_from_update(update).await,
        }
    }

    async fn create_from_update(&self, update: StateUpdate) -> RegistryResult<StateEvent> {
        if self.config.unknown_state == UnknownStatePolicy::Reject {
            return Err(RegistryError::unknown(update.name.as_str()));
        }

        let factory = {
            let declarations = self.declarations.read().expect("declaration lock poisoned");
            declarations.get(&update.name).map(|d| d.factory)
        }
        .ok_or_else(|| RegistryError::unknown(update.name.as_str()))?;

        if update.version.is_some() {
            return Err(RegistryError::Stale {
                name: update.name,
                submitted: update.version,
                current: Version::INITIAL,
            });
        }

        let (slot, event) = factory(update.name.clone(), update.value.clone())?;
        let raced = {
            let mut slots = self.slots.write().expect("registry lock poisoned");
            match slots.entry(update.name.clone()) {
                Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
                Entry::Vacant(entry) => {
                    entry.insert(slot);
                    None
                }
            }
        };

        match raced {
            // Another writer created the slot first; apply on top of it.
            Some(existing) => existing.apply(self.config.checkout, update).await,
            None => {
                info!(name = %event.name, "slot created from update");
                Ok(event)
            }
        }
    }

    /// Current `{name, version, value}` of `name`, or `None` if no slot exists.
    ///
    /// Does not advance the version.
    pub async fn snapshot(&self, name: &str) -> RegistryResult<Option<StateEvent>> {
        match self.lookup(name) {
            Some(slot) => Ok(Some(slot.snapshot(self.config.checkout).await?)),
            None => Ok(None),
        }
    }

    /// Current version of `name`, or `None` if no slot exists.
    pub async fn current_version(&self, name: &str) -> RegistryResult<Option<Version>> {
        match self.lookup(name) {
            Some(slot) => Ok(Some(slot.version(self.config.checkout).await?)),
            None => Ok(None),
        }
    }

    /// Summaries of every slot, sorted by name.
    pub async fn list(&self) -> Vec<SlotInfo> {
        let slots: Vec<Arc<dyn ErasedSlot>> = {
            let slots = self.slots.read().expect("registry lock poisoned");
            slots.values().cloned().collect()
        };

        let mut infos = Vec::with_capacity(slots.len());
        for slot in slots {
            infos.push(slot.info().await);
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Destroy every slot and declaration.
    ///
    /// Outstanding checkouts keep their slot alive and still flush on
    /// release, but the slot is no longer reachable by name.
    pub fn teardown(&self) {
        let dropped = {
            let mut slots = self.slots.write().expect("registry lock poisoned");
            let count = slots.len();
            slots.clear();
            count
        };
        self.declarations.write().expect("declaration lock poisoned").clear();
        info!(slots = dropped, "registry torn down");
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn ErasedSlot>> {
        self.slots.read().expect("registry lock poisoned").get(name).cloned()
    }

    fn check_declared<T: StateValue>(&self, name: &StateName) -> RegistryResult<()> {
        let declarations = self.declarations.read().expect("declaration lock poisoned");
        match declarations.get(name) {
            Some(d) if d.value_type != TypeId::of::<T>() => Err(RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                reason: format!("name is declared as {}", d.type_name),
            }),
            _ => Ok(()),
        }
    }

    async fn checkout<T: StateValue>(&self, slot: Arc<Slot<T>>) -> RegistryResult<Item<T>> {
        let guard = slot.acquire(self.config.checkout).await?;
        Ok(Item::new(slot.name().clone(), guard, Arc::clone(&self.emitter)))
    }
}
