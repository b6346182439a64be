use serde::de::DeserializeOwned;
use serde::Serialize;

/// Bound satisfied by every value that can live in a state slot.
///
/// Values cross the process boundary as JSON, and slots are shared across
/// threads, so the bound is serde both ways plus `Send + Sync + 'static`.
pub trait StateValue: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> StateValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}
