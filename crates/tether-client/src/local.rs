use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use tether_sync::SyncEngine;
use tether_types::{StateName, StateUpdate, Version};

use crate::error::ClientResult;
use crate::transport::{Notifications, StateTransport};

/// Transport for proxies living in the same process as the engine.
#[derive(Clone)]
pub struct LocalTransport {
    engine: Arc<SyncEngine>,
}

impl LocalTransport {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }
}

#[async_trait]
impl StateTransport for LocalTransport {
    async fn update_state(&self, update: StateUpdate) -> ClientResult<Version> {
        Ok(self.engine.update_state(update).await?)
    }

    async fn emit_state(&self, name: &StateName) -> ClientResult<bool> {
        Ok(self.engine.emit_state(name.as_str()).await?)
    }

    async fn subscribe(&self, name: &StateName) -> ClientResult<Notifications> {
        let subscription = self.engine.subscribe(name.as_str())?;
        let events = stream::unfold(subscription, |mut sub| async move {
            sub.next().await.map(|event| (event, sub))
        });
        Ok(events.boxed())
    }
}
