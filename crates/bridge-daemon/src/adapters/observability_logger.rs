//! Queue-backed structured logger.
//!
//! Log entries travel as ordinary envelopes on a dedicated topic so a single
//! consumer can ship them to OpenObserve; daemons need no direct connection
//! to the log backend.
//!
//! Published envelope:
//!
//! ```json
//! {
//!   "service": "observability",
//!   "action": "log",
//!   "metadata": {"destination": "openobserve", "stream": "daemon", "service": "slack_bridge"},
//!   "payload": {
//!     "entry": {
//!       "level": "info",
//!       "message": "booted",
//!       "service": "slack_bridge",
//!       "timestamp": "2024-01-01T12:00:00Z",
//!       "metadata": {"module": "worker"}
//!     }
//!   }
//! }
//! ```

use bridge_types::envelope::{format_timestamp, now_millis};
use bridge_types::{
    BridgeError, BridgeResult, Envelope, Metadata, Value, OBSERVABILITY_LOG_TOPIC,
};
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::ports::outbound::QueueClient;

/// Marker stored in envelope metadata so the forwarder knows the sink.
pub const LOG_DESTINATION: &str = "openobserve";

const DEFAULT_SERVICE: &str = "bridge_daemon";
const DEFAULT_STREAM: &str = "daemon";
const DEFAULT_ENVELOPE_SERVICE: &str = "observability";
const DEFAULT_ENVELOPE_ACTION: &str = "log";

/// Time source for log timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Serialize)]
struct LogEntry<'a> {
    level: &'a str,
    message: &'a str,
    service: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

/// Publishes structured log entries to the queue.
pub struct QueueLogger {
    queue: Arc<dyn QueueClient>,
    service: String,
    stream: String,
    topic: String,
    envelope_service: String,
    envelope_action: String,
    clock: Clock,
}

impl QueueLogger {
    pub fn builder(queue: Arc<dyn QueueClient>) -> QueueLoggerBuilder {
        QueueLoggerBuilder {
            logger: QueueLogger {
                queue,
                service: DEFAULT_SERVICE.to_string(),
                stream: DEFAULT_STREAM.to_string(),
                topic: OBSERVABILITY_LOG_TOPIC.to_string(),
                envelope_service: DEFAULT_ENVELOPE_SERVICE.to_string(),
                envelope_action: DEFAULT_ENVELOPE_ACTION.to_string(),
                clock: Arc::new(now_millis),
            },
            error: None,
        }
    }

    /// Logger with every default.
    pub fn new(queue: Arc<dyn QueueClient>) -> Self {
        Self::builder(queue).logger
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Publish one entry. `metadata` is attached to the entry when non-empty.
    pub async fn log(
        &self,
        cancel: &CancellationToken,
        level: &str,
        message: &str,
        metadata: Option<Metadata>,
    ) -> BridgeResult<()> {
        if level.is_empty() {
            return Err(BridgeError::Validation("level must not be empty".to_string()));
        }

        let occurred_at = (self.clock)().trunc_subsecs(3);

        let entry = LogEntry {
            level,
            message,
            service: &self.service,
            timestamp: format_timestamp(&occurred_at),
            metadata: metadata.filter(|m| !m.is_empty()),
        };
        let entry = serde_json::to_value(&entry).map_err(|e| BridgeError::Encode(e.to_string()))?;

        let mut payload = Metadata::new();
        payload.insert("entry".to_string(), entry);

        let mut envelope_metadata = Metadata::new();
        envelope_metadata.insert("destination".to_string(), Value::from(LOG_DESTINATION));
        envelope_metadata.insert("stream".to_string(), Value::from(self.stream.as_str()));
        envelope_metadata.insert("service".to_string(), Value::from(self.service.as_str()));

        let envelope = Envelope::builder(
            self.envelope_service.as_str(),
            self.envelope_action.as_str(),
            payload,
        )
        .metadata(envelope_metadata)
        .occurred_at(occurred_at)
        .build()?;

        let body = envelope.encode()?;
        self.queue
            .publish(cancel, &self.topic, body)
            .await
            .map_err(|source| BridgeError::Publish {
                topic: self.topic.clone(),
                source: Box::new(source),
            })
    }

    pub async fn debug(
        &self,
        cancel: &CancellationToken,
        message: &str,
        metadata: Option<Metadata>,
    ) -> BridgeResult<()> {
        self.log(cancel, "debug", message, metadata).await
    }

    pub async fn info(
        &self,
        cancel: &CancellationToken,
        message: &str,
        metadata: Option<Metadata>,
    ) -> BridgeResult<()> {
        self.log(cancel, "info", message, metadata).await
    }

    pub async fn warn(
        &self,
        cancel: &CancellationToken,
        message: &str,
        metadata: Option<Metadata>,
    ) -> BridgeResult<()> {
        self.log(cancel, "warn", message, metadata).await
    }

    pub async fn error(
        &self,
        cancel: &CancellationToken,
        message: &str,
        metadata: Option<Metadata>,
    ) -> BridgeResult<()> {
        self.log(cancel, "error", message, metadata).await
    }
}

impl std::fmt::Debug for QueueLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueLogger")
            .field("service", &self.service)
            .field("stream", &self.stream)
            .field("topic", &self.topic)
            .field("envelope_service", &self.envelope_service)
            .field("envelope_action", &self.envelope_action)
            .finish_non_exhaustive()
    }
}

/// Builder for [`QueueLogger`]; the first invalid option aborts `build`.
#[must_use]
pub struct QueueLoggerBuilder {
    logger: QueueLogger,
    error: Option<BridgeError>,
}

impl QueueLoggerBuilder {
    fn set(mut self, value: String, field: &str, apply: impl FnOnce(&mut QueueLogger, String)) -> Self {
        if self.error.is_some() {
            return self;
        }
        if value.is_empty() {
            self.error = Some(BridgeError::Validation(format!("{field} must not be empty")));
        } else {
            apply(&mut self.logger, value);
        }
        self
    }

    /// Service name attached to log entries.
    pub fn service(self, service: impl Into<String>) -> Self {
        self.set(service.into(), "service", |l, v| l.service = v)
    }

    /// Observability stream recorded in envelope metadata.
    pub fn stream(self, stream: impl Into<String>) -> Self {
        self.set(stream.into(), "stream", |l, v| l.stream = v)
    }

    /// Queue topic used for log forwarding.
    pub fn topic(self, topic: impl Into<String>) -> Self {
        self.set(topic.into(), "topic", |l, v| l.topic = v)
    }

    /// Envelope routing fields.
    pub fn envelope(self, service: impl Into<String>, action: impl Into<String>) -> Self {
        let action = action.into();
        self.set(service.into(), "envelope service", |l, v| l.envelope_service = v)
            .set(action, "envelope action", |l, v| l.envelope_action = v)
    }

    /// Deterministic time source, mostly for tests.
    pub fn clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        if self.error.is_none() {
            self.logger.clock = Arc::new(clock);
        }
        self
    }

    pub fn build(self) -> BridgeResult<QueueLogger> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.logger),
        }
    }
}
