//! # Envelope
//!
//! The canonical queue payload shared across the bridge ecosystem.
//!
//! ## Wire Format
//!
//! ```json
//! {
//!   "schema": "msgr.bridge.v1",
//!   "service": "telegram",
//!   "action": "inbound_event",
//!   "trace_id": "5f0c...",
//!   "occurred_at": "2024-01-01T12:00:00.123Z",
//!   "metadata": {},
//!   "payload": {"body": "hi"}
//! }
//! ```
//!
//! `occurred_at` is always UTC, truncated to milliseconds, and encoded as an
//! RFC 3339 string rather than a number so it round-trips losslessly through
//! any transport and any language.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{BridgeError, BridgeResult};

/// Schema identifier shared with the Elixir and Python helpers.
pub const DEFAULT_SCHEMA: &str = "msgr.bridge.v1";

/// Envelope-level metadata.
pub type Metadata = Map<String, Value>;

/// Envelope body.
pub type Payload = Map<String, Value>;

/// Current time, UTC, truncated to millisecond precision.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Renders a timestamp in the wire layout (`Z` suffix, 0/3/6/9 fraction digits).
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(at))
}

/// The canonical queue message.
///
/// Immutable once built: use [`Envelope::builder`] or [`Envelope::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct Envelope {
    schema: String,
    service: String,
    action: String,
    trace_id: String,
    #[serde(serialize_with = "serialize_timestamp")]
    occurred_at: DateTime<Utc>,
    metadata: Metadata,
    payload: Payload,
}

impl Envelope {
    /// Builds an envelope with default schema, a fresh trace id and the
    /// current time.
    pub fn new(
        service: impl Into<String>,
        action: impl Into<String>,
        payload: impl Into<Value>,
    ) -> BridgeResult<Self> {
        Self::builder(service, action, payload).build()
    }

    /// Starts a builder for overriding trace id, metadata, timestamp or schema.
    pub fn builder(
        service: impl Into<String>,
        action: impl Into<String>,
        payload: impl Into<Value>,
    ) -> EnvelopeBuilder {
        EnvelopeBuilder {
            service: service.into(),
            action: action.into(),
            payload: payload.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            trace_id: None,
            occurred_at: None,
            metadata: Metadata::new(),
            error: None,
        }
    }

    /// Serializes the envelope to JSON bytes for queue publication.
    pub fn encode(&self) -> BridgeResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| BridgeError::Encode(e.to_string()))
    }

    /// Parses wire bytes, re-applying construction validation while keeping
    /// the decoded trace id, schema and timestamp.
    pub fn decode(bytes: &[u8]) -> BridgeResult<Self> {
        let wire: WireEnvelope = serde_json::from_slice(bytes)?;
        Self::try_from(wire)
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Consumes the envelope, keeping only its payload.
    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

/// Builder for [`Envelope`].
///
/// Options apply in call order. The first invalid option is latched and
/// returned by [`EnvelopeBuilder::build`]; later options are ignored.
#[must_use]
#[derive(Debug)]
pub struct EnvelopeBuilder {
    service: String,
    action: String,
    payload: Value,
    schema: String,
    trace_id: Option<String>,
    occurred_at: Option<DateTime<Utc>>,
    metadata: Metadata,
    error: Option<BridgeError>,
}

impl EnvelopeBuilder {
    fn latch(&mut self, reason: &str) {
        if self.error.is_none() {
            self.error = Some(BridgeError::validation(reason));
        }
    }

    /// Overrides the generated trace identifier.
    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let trace_id = trace_id.into();
        if trace_id.is_empty() {
            self.latch("trace_id must not be empty");
        } else {
            self.trace_id = Some(trace_id);
        }
        self
    }

    /// Replaces the envelope metadata.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        if self.error.is_none() {
            self.metadata = metadata;
        }
        self
    }

    /// Pins the timestamp; normalised to UTC and truncated to milliseconds.
    pub fn occurred_at<Tz: TimeZone>(mut self, at: DateTime<Tz>) -> Self {
        if self.error.is_none() {
            self.occurred_at = Some(at.with_timezone(&Utc).trunc_subsecs(3));
        }
        self
    }

    /// Opts into a non-default schema identifier.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let schema = schema.into();
        if schema.is_empty() {
            self.latch("schema must not be empty");
        } else {
            self.schema = schema;
        }
        self
    }

    pub fn build(self) -> BridgeResult<Envelope> {
        if self.service.is_empty() {
            return Err(BridgeError::validation("service must not be empty"));
        }
        if self.action.is_empty() {
            return Err(BridgeError::validation("action must not be empty"));
        }
        let payload = match self.payload {
            Value::Object(map) => map,
            Value::Null => return Err(BridgeError::validation("payload must not be null")),
            _ => return Err(BridgeError::validation("payload must be a JSON object")),
        };
        if let Some(err) = self.error {
            return Err(err);
        }

        Ok(Envelope {
            schema: self.schema,
            service: self.service,
            action: self.action,
            trace_id: self
                .trace_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            occurred_at: self.occurred_at.unwrap_or_else(now_millis),
            metadata: self.metadata,
            payload,
        })
    }
}

/// Lenient wire shape; every field is checked again by the builder.
#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    schema: String,
    #[serde(default)]
    service: String,
    #[serde(default)]
    action: String,
    #[serde(default)]
    trace_id: String,
    #[serde(default)]
    occurred_at: String,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    payload: Option<Payload>,
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = BridgeError;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        let occurred_at = DateTime::parse_from_rfc3339(&wire.occurred_at).map_err(|e| {
            BridgeError::Decode(format!(
                "occurred_at {:?} is not an RFC 3339 timestamp: {e}",
                wire.occurred_at
            ))
        })?;
        let schema = if wire.schema.is_empty() {
            DEFAULT_SCHEMA.to_string()
        } else {
            wire.schema
        };

        Envelope::builder(
            wire.service,
            wire.action,
            Value::Object(wire.payload.unwrap_or_default()),
        )
        .schema(schema)
        .trace_id(wire.trace_id)
        .metadata(wire.metadata.unwrap_or_default())
        .occurred_at(occurred_at)
        .build()
        .map_err(|err| match err {
            BridgeError::Validation(reason) => BridgeError::Decode(reason),
            other => other,
        })
    }
}
