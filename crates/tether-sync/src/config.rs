use serde::{Deserialize, Serialize};

use tether_registry::RegistryConfig;

/// Configuration for the [`SyncEngine`](crate::SyncEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Capacity of each per-state notification channel. A subscriber that
    /// falls further behind skips the oldest notifications.
    pub channel_capacity: usize,
    /// Registry checkout and unknown-state policies.
    pub registry: RegistryConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            registry: RegistryConfig::default(),
        }
    }
}
