use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::trace;

use tether_registry::StateEmitter;
use tether_types::{StateEvent, StateName};

use crate::subscription::Subscription;

/// Fan-out router for change notifications.
///
/// Each state name gets its own broadcast channel, created on first
/// subscription and removed when its last [`Subscription`] is dropped.
/// Publishing to a name nobody listens to is a no-op.
pub struct Broadcaster {
    channels: Arc<Channels>,
    capacity: usize,
}

/// Per-name senders, shared with every [`Subscription`] so that dropping the
/// last one can remove its channel.
pub(crate) type Channels = RwLock<HashMap<StateName, broadcast::Sender<StateEvent>>>;

impl Broadcaster {
    /// Create a broadcaster whose per-state channels buffer `capacity`
    /// notifications.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Register a new subscriber for `name`.
    pub fn subscribe(&self, name: &StateName) -> Subscription {
        let mut channels = self.channels.write().expect("broadcaster lock poisoned");
        let receiver = match channels.get(name) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(self.capacity);
                channels.insert(name.clone(), sender);
                receiver
            }
        };
        Subscription::new(name.clone(), receiver, Arc::downgrade(&self.channels))
    }

    /// Deliver `event` to every subscriber of its name.
    ///
    /// Returns the number of subscribers the event was queued for.
    pub fn publish(&self, event: StateEvent) -> usize {
        let mut channels = self.channels.write().expect("broadcaster lock poisoned");
        let name = event.name.clone();
        let Some(sender) = channels.get(&name) else {
            trace!(name = %name, "no subscribers");
            return 0;
        };

        match sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                // Every receiver is gone.
                channels.remove(&name);
                trace!(name = %name, "pruned idle channel");
                0
            }
        }
    }

    /// Number of live subscribers for `name`.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.channels
            .read()
            .expect("broadcaster lock poisoned")
            .get(name)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Number of per-state channels currently allocated.
    pub fn channel_count(&self) -> usize {
        self.channels.read().expect("broadcaster lock poisoned").len()
    }
}

impl StateEmitter for Broadcaster {
    fn emit(&self, event: StateEvent) {
        self.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_types::Version;

    fn name(s: &str) -> StateName {
        StateName::new(s).unwrap()
    }

    fn event(s: &str, version: u64) -> StateEvent {
        StateEvent {
            name: name(s),
            version: Version::new(version),
            value: json!({ "v": version }),
        }
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let b = Broadcaster::new(8);
        assert_eq!(b.publish(event("x", 1)), 0);
        assert_eq!(b.channel_count(), 0);
    }

    #[test]
    fn every_subscriber_of_a_name_receives() {
        let b = Broadcaster::new(8);
        let mut s1 = b.subscribe(&name("x"));
        let mut s2 = b.subscribe(&name("x"));
        let mut other = b.subscribe(&name("y"));
        assert_eq!(b.subscriber_count("x"), 2);

        assert_eq!(b.publish(event("x", 1)), 2);

        assert_eq!(s1.try_next().unwrap().version, Version::new(1));
        assert_eq!(s2.try_next().unwrap().version, Version::new(1));
        assert!(other.try_next().is_none());
    }

    #[test]
    fn last_dropped_subscriber_removes_channel() {
        let b = Broadcaster::new(8);
        let first = b.subscribe(&name("x"));
        let mut second = b.subscribe(&name("x"));
        assert_eq!(b.channel_count(), 1);

        drop(first);
        assert_eq!(b.channel_count(), 1);
        assert_eq!(b.publish(event("x", 1)), 1);
        assert!(second.try_next().is_some());

        drop(second);
        assert_eq!(b.subscriber_count("x"), 0);
        assert_eq!(b.channel_count(), 0);
        assert_eq!(b.publish(event("x", 2)), 0);
    }

    #[test]
    fn unpublished_names_do_not_accumulate_channels() {
        let b = Broadcaster::new(8);
        for i in 0..1000 {
            drop(b.subscribe(&name(&format!("ghost{i}"))));
        }
        assert_eq!(b.channel_count(), 0);
    }

    #[test]
    fn resubscribe_after_prune_gets_fresh_channel() {
        let b = Broadcaster::new(8);
        drop(b.subscribe(&name("x")));
        let mut sub = b.subscribe(&name("x"));
        assert_eq!(b.publish(event("x", 1)), 1);
        assert_eq!(sub.try_next().unwrap().version, Version::new(1));
    }

    #[test]
    fn subscription_outliving_broadcaster_is_harmless() {
        let b = Broadcaster::new(8);
        let mut sub = b.subscribe(&name("x"));
        drop(b);
        assert!(sub.try_next().is_none());
        drop(sub);
    }

    #[test]
    fn lagging_subscriber_skips_to_retained_events() {
        let b = Broadcaster::new(2);
        let mut sub = b.subscribe(&name("x"));
        for v in 1..=5 {
            b.publish(event("x", v));
        }

        assert_eq!(sub.try_next().unwrap().version, Version::new(4));
        assert_eq!(sub.try_next().unwrap().version, Version::new(5));
        assert!(sub.try_next().is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let b = Broadcaster::new(0);
        let mut sub = b.subscribe(&name("x"));
        b.publish(event("x", 1));
        assert!(sub.try_next().is_some());
    }
}
