//! # In-Memory Queue
//!
//! Loopback [`QueueClient`] for tests and single-process deployments.
//!
//! Each topic holds one handler (the latest subscription wins) and
//! `publish` runs it inline, so a handler error comes straight back to the
//! publisher as [`QueueError::Delivery`]. Distributed deployments plug a real
//! broker client in behind the same trait.

use crate::client::{QueueClient, QueueError, QueueMessageHandler};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// In-memory implementation of the queue.
#[derive(Default)]
pub struct InMemoryQueue {
    /// Handler per topic.
    subscriptions: RwLock<HashMap<String, QueueMessageHandler>>,

    /// Total publish calls accepted.
    messages_published: AtomicU64,

    /// Publishes that found no subscriber.
    messages_dropped: AtomicU64,

    closed: AtomicBool,
}

impl InMemoryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent subscribe and publish with [`QueueError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.subscriptions.write().clear();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Topics that currently have a handler, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.subscriptions.read().keys().cloned().collect();
        topics.sort();
        topics
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    fn ensure_usable(&self, cancel: &CancellationToken) -> Result<(), QueueError> {
        if cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        if self.is_closed() {
            return Err(QueueError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl QueueClient for InMemoryQueue {
    async fn subscribe(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        handler: QueueMessageHandler,
    ) -> Result<(), QueueError> {
        self.ensure_usable(cancel)?;

        let replaced = self
            .subscriptions
            .write()
            .insert(topic.to_string(), handler)
            .is_some();

        debug!(topic = %topic, replaced, "Subscription registered");
        Ok(())
    }

    async fn publish(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        body: Vec<u8>,
    ) -> Result<(), QueueError> {
        self.ensure_usable(cancel)?;
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        // Clone the handler out so the lock is not held across the delivery.
        let handler = self.subscriptions.read().get(topic).cloned();
        let Some(handler) = handler else {
            self.messages_dropped.fetch_add(1, Ordering::Relaxed);
            warn!(topic = %topic, bytes = body.len(), "Message dropped (no subscriber)");
            return Ok(());
        };

        debug!(topic = %topic, bytes = body.len(), "Delivering message");
        handler(cancel.clone(), body).await?;
        Ok(())
    }
}
