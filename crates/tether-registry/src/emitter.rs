use tether_types::StateEvent;

/// Sink for change notifications.
///
/// The registry hands every flushed [`StateEvent`] to its emitter after the
/// slot lock has been released. Implementations must not block: they run on
/// the releasing task.
pub trait StateEmitter: Send + Sync {
    fn emit(&self, event: StateEvent);
}

/// Emitter that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEmitter;

impl StateEmitter for NullEmitter {
    fn emit(&self, _event: StateEvent) {}
}
