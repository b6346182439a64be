use std::fmt;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tracing::{debug, warn};

use tether_types::{StateEvent, StateName, StateValue, Version, VersionedValue};

use crate::error::{ClientError, ClientResult};
use crate::transport::{Notifications, StateTransport};

/// Lifecycle of a [`SyncedState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyStatus {
    /// Listening, but no authoritative value has been seen yet.
    Subscribed,
    /// The working copy was last aligned with the backend.
    Synced,
    /// The last `sync()` was refused as stale; the caller must reconcile.
    StalePending,
    Closed,
}

/// Frontend working copy of one named state.
///
/// The copy is fully detached: edits through [`get_mut`](Self::get_mut) or
/// [`set`](Self::set) stay local until [`sync`](Self::sync). Notifications
/// replace the copy wholesale, and only when they carry a version newer
/// than the last one this proxy observed.
pub struct SyncedState<T: StateValue> {
    name: StateName,
    obj: T,
    version: Option<Version>,
    status: ProxyStatus,
    transport: Arc<dyn StateTransport>,
    notifications: Option<Notifications>,
}

impl<T: StateValue> SyncedState<T> {
    /// Subscribe to `name` and ask the backend for its current value.
    ///
    /// If the backend holds the state, its value replaces `default`;
    /// otherwise `default` stands until the first [`sync`](Self::sync).
    pub async fn new(
        transport: Arc<dyn StateTransport>,
        name: &str,
        default: T,
    ) -> ClientResult<Self> {
        let name = StateName::new(name)?;
        let notifications = transport.subscribe(&name).await?;
        let mut proxy = Self {
            name,
            obj: default,
            version: None,
            status: ProxyStatus::Subscribed,
            transport,
            notifications: Some(notifications),
        };

        if proxy.transport.emit_state(&proxy.name).await? {
            proxy.await_event(true).await?;
        }
        debug!(name = %proxy.name, version = ?proxy.version, "proxy subscribed");
        Ok(proxy)
    }

    pub fn name(&self) -> &StateName {
        &self.name
    }

    pub fn get(&self) -> &T {
        &self.obj
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.obj
    }

    pub fn set(&mut self, value: T) {
        self.obj = value;
    }

    /// Last authoritative version observed, `None` before the first one.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn status(&self) -> ProxyStatus {
        self.status
    }

    /// Apply every notification already delivered, without waiting.
    ///
    /// Returns how many of them replaced the working copy.
    pub fn refresh(&mut self) -> ClientResult<usize> {
        let mut applied = 0;
        loop {
            let next = self.notifications()?.next().now_or_never();
            match next {
                Some(Some(event)) => match self.apply(event, false) {
                    Ok(true) => applied += 1,
                    Ok(false) => {}
                    Err(e) => warn!(name = %self.name, error = %e, "notification does not decode"),
                },
                Some(None) => return Err(self.stream_ended()),
                None => return Ok(applied),
            }
        }
    }

    /// Wait until a notification newer than the working copy arrives and
    /// apply it.
    pub async fn changed(&mut self) -> ClientResult<Version> {
        self.await_event(false).await
    }

    /// Ask the backend to re-emit its value and adopt it, discarding any
    /// local edits. Returns `false` if the backend holds no slot.
    pub async fn reload(&mut self) -> ClientResult<bool> {
        if !self.transport.emit_state(&self.name).await? {
            return Ok(false);
        }
        self.await_event(true).await?;
        Ok(true)
    }

    /// Push the working copy to the backend, tagged with the last observed
    /// version.
    ///
    /// On acceptance the proxy adopts the new version. On `Stale` the status
    /// becomes [`ProxyStatus::StalePending`] and the working copy is left
    /// as is: the caller decides whether to [`reload`](Self::reload) or to
    /// [`refresh`](Self::refresh), reapply its edits and retry.
    pub async fn sync(&mut self) -> ClientResult<Version> {
        self.notifications()?;
        let update = VersionedValue::new(self.name.clone(), self.version, &self.obj).encode()?;

        match self.transport.update_state(update).await {
            Ok(version) => {
                self.version = Some(version);
                self.status = ProxyStatus::Synced;
                debug!(name = %self.name, %version, "sync accepted");
                Ok(version)
            }
            Err(e) => {
                if e.is_stale() {
                    self.status = ProxyStatus::StalePending;
                }
                warn!(name = %self.name, version = ?self.version, error = %e, "sync rejected");
                Err(e)
            }
        }
    }

    /// Drop the subscription. Safe to call repeatedly; the backend slot is
    /// not affected.
    pub fn close(&mut self) {
        if self.notifications.take().is_some() {
            debug!(name = %self.name, "proxy closed");
        }
        self.status = ProxyStatus::Closed;
    }

    fn notifications(&mut self) -> ClientResult<&mut Notifications> {
        self.notifications
            .as_mut()
            .ok_or_else(|| ClientError::Closed(self.name.clone()))
    }

    async fn await_event(&mut self, accept_current: bool) -> ClientResult<Version> {
        loop {
            let next = self.notifications()?.next().await;
            let Some(event) = next else {
                return Err(self.stream_ended());
            };
            let version = event.version;
            if self.apply(event, accept_current)? {
                return Ok(version);
            }
        }
    }

    /// Replace the working copy with `event` if it is newer than what this
    /// proxy has seen (or as new, with `accept_current`).
    fn apply(&mut self, event: StateEvent, accept_current: bool) -> ClientResult<bool> {
        if let Some(known) = self.version {
            let newer = event.version > known || (accept_current && event.version == known);
            if !newer {
                debug!(name = %self.name, version = %event.version, %known, "notification skipped");
                return Ok(false);
            }
        }

        self.obj = event.decode::<T>()?;
        self.version = Some(event.version);
        self.status = ProxyStatus::Synced;
        Ok(true)
    }

    fn stream_ended(&self) -> ClientError {
        ClientError::Transport(format!("notification stream for {} ended", self.name))
    }
}

impl<T: StateValue + fmt::Debug> fmt::Debug for SyncedState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncedState")
            .field("name", &self.name)
            .field("obj", &self.obj)
            .field("version", &self.version)
            .field("status", &self.status)
            .finish()
    }
}
