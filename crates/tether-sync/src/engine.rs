use std::sync::Arc;

use tracing::{debug, info, warn};

use tether_registry::StateRegistry;
use tether_types::{StateName, StateUpdate, Version};

use crate::broadcaster::Broadcaster;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::subscription::Subscription;

/// Backend context for state synchronization.
///
/// Owns the [`StateRegistry`] and the [`Broadcaster`] it flushes into.
/// Construct one per backend process and hand it (in an `Arc`) to every
/// command handler: backend commands check out slots through
/// [`SyncEngine::registry`], frontend commands arrive as
/// [`SyncEngine::update_state`] and [`SyncEngine::emit_state`].
pub struct SyncEngine {
    registry: StateRegistry,
    broadcaster: Arc<Broadcaster>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        let broadcaster = Arc::new(Broadcaster::new(config.channel_capacity));
        let registry = StateRegistry::new(config.registry.clone(), broadcaster.clone());
        info!(
            checkout = ?config.registry.checkout,
            unknown_state = ?config.registry.unknown_state,
            channel_capacity = config.channel_capacity,
            "sync engine started"
        );
        Self {
            registry,
            broadcaster,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Handle an `update_state` command.
    ///
    /// On acceptance the new value is broadcast to every subscriber of the
    /// name, the submitter included, and its version is returned. On
    /// rejection nothing changes and nothing is broadcast.
    pub async fn update_state(&self, update: StateUpdate) -> SyncResult<Version> {
        let name = update.name.clone();
        let submitted = update.version;

        match self.registry.apply_update(update).await {
            Ok(event) => {
                let version = event.version;
                let delivered = self.broadcaster.publish(event);
                debug!(name = %name, %version, delivered, "update accepted");
                Ok(version)
            }
            Err(e) => {
                warn!(name = %name, submitted = ?submitted, error = %e, "update rejected");
                Err(e.into())
            }
        }
    }

    /// Handle an `emit_state` command: re-broadcast the current value of
    /// `name` without changing its version.
    ///
    /// Returns `false` if no slot exists yet; that is not an error.
    pub async fn emit_state(&self, name: &str) -> SyncResult<bool> {
        let name = StateName::new(name)?;
        match self.registry.snapshot(name.as_str()).await? {
            Some(event) => {
                let version = event.version;
                let delivered = self.broadcaster.publish(event);
                debug!(name = %name, %version, delivered, "state emitted");
                Ok(true)
            }
            None => {
                debug!(name = %name, "emit requested for absent state");
                Ok(false)
            }
        }
    }

    /// Subscribe to change notifications for `name`.
    pub fn subscribe(&self, name: &str) -> SyncResult<Subscription> {
        let name = StateName::new(name)?;
        Ok(self.broadcaster.subscribe(&name))
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.broadcaster.subscriber_count(name)
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
