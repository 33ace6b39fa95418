//! # Queue Client Port
//!
//! The minimal contract the SDK requires from a StoneMQ-style client.
//! Delivery guarantees, redelivery and acknowledgement belong to the
//! implementation, not to this crate.

use async_trait::async_trait;
use bridge_types::{BridgeError, BridgeResult};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by queue clients.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The client was closed.
    #[error("queue client closed")]
    Closed,

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Broker or network failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// An inline subscriber rejected the delivered message.
    #[error("delivery rejected: {0}")]
    Delivery(#[from] BridgeError),
}

/// Future returned by a [`QueueMessageHandler`].
pub type DeliveryFuture = BoxFuture<'static, BridgeResult<()>>;

/// Callback invoked with the raw body of each delivered message.
///
/// An `Err` tells the queue client the delivery failed; what happens next
/// (redelivery, dead-lettering, drop) is up to the client.
pub type QueueMessageHandler = Arc<dyn Fn(CancellationToken, Vec<u8>) -> DeliveryFuture + Send + Sync>;

/// Wraps an async closure as a [`QueueMessageHandler`].
pub fn message_handler<F, Fut>(handler: F) -> QueueMessageHandler
where
    F: Fn(CancellationToken, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = BridgeResult<()>> + Send + 'static,
{
    Arc::new(move |cancel: CancellationToken, body: Vec<u8>| -> DeliveryFuture {
        Box::pin(handler(cancel, body))
    })
}

/// Minimal publish/subscribe contract.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Routes every message published on `topic` to `handler`.
    async fn subscribe(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        handler: QueueMessageHandler,
    ) -> Result<(), QueueError>;

    /// Publishes raw bytes on `topic`.
    async fn publish(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        body: Vec<u8>,
    ) -> Result<(), QueueError>;
}
