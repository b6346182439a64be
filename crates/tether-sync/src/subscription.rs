use std::fmt;
use std::sync::Weak;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};
use uuid::Uuid;

use tether_types::{StateEvent, StateName};

use crate::broadcaster::Channels;

/// Receiving end of one state's notification channel.
///
/// Dropping the subscription unsubscribes it; dropping the last one for a
/// name releases that name's channel.
pub struct Subscription {
    id: Uuid,
    name: StateName,
    receiver: broadcast::Receiver<StateEvent>,
    channels: Weak<Channels>,
}

impl Subscription {
    pub(crate) fn new(
        name: StateName,
        receiver: broadcast::Receiver<StateEvent>,
        channels: Weak<Channels>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name,
            receiver,
            channels,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &StateName {
        &self.name
    }

    /// Wait for the next notification.
    ///
    /// Notifications dropped because this subscriber fell behind are
    /// skipped. Returns `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<StateEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(name = %self.name, skipped, "subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next already-delivered notification, if any.
    pub fn try_next(&mut self) -> Option<StateEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(name = %self.name, skipped, "subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(channels) = self.channels.upgrade() else {
            return;
        };
        // Skip cleanup on a poisoned lock.
        let Ok(mut channels) = channels.write() else {
            return;
        };
        // Channels are only removed once no other receiver is alive, so the
        // sender under this name is the one this receiver belongs to.
        let last = channels
            .get(&self.name)
            .is_some_and(|sender| sender.receiver_count() <= 1);
        if last {
            channels.remove(&self.name);
            trace!(name = %self.name, "released idle channel");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
