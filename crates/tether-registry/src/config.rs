use serde::{Deserialize, Serialize};

/// What a checkout or update does when the slot is already checked out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutPolicy {
    /// Wait for the current holder to release the slot. Waiters are served
    /// in arrival order.
    #[default]
    Block,
    /// Fail immediately with [`RegistryError::Busy`](crate::RegistryError::Busy).
    FailFast,
}

/// What `apply_update` does for a name that has no slot yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownStatePolicy {
    /// Fail with [`RegistryError::UnknownState`](crate::RegistryError::UnknownState).
    #[default]
    Reject,
    /// Create the slot from the submitted value if the name was declared
    /// with [`StateRegistry::declare`](crate::StateRegistry::declare) and
    /// the submission carries no version. Undeclared names are still
    /// rejected.
    CreateDeclared,
}

/// Configuration for a [`StateRegistry`](crate::StateRegistry).
///
/// Both policies are fixed for the lifetime of the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub checkout: CheckoutPolicy,
    pub unknown_state: UnknownStatePolicy,
}
