//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The daemon depends on three capabilities supplied at construction:
//! the queue client, the telemetry reporter (both defined in their own
//! crates and re-exported here) and the credential bootstrapper.

use async_trait::async_trait;
use bridge_types::{BridgeResult, Map, Value};
use tokio_util::sync::CancellationToken;

pub use bridge_bus::{QueueClient, QueueError, QueueMessageHandler};
pub use bridge_telemetry::{DeliveryOutcome, TelemetryReporter};

/// Credential material for one service (tokens, session blobs, ...).
pub type Credentials = Map<String, Value>;

/// Prepares a daemon with credential material at startup.
#[async_trait]
pub trait CredentialBootstrapper: Send + Sync {
    /// Return credential material for `service`. An empty map means the
    /// service needs no credentials.
    async fn bootstrap(&self, cancel: &CancellationToken, service: &str) -> BridgeResult<Credentials>;
}
