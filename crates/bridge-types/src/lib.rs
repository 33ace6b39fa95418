//! # Bridge Types Crate
//!
//! Canonical message framing shared by every Msgr bridge daemon.
//!
//! ## Design Principles
//!
//! - **Single Envelope**: Every queue payload is an [`Envelope`] encoded as JSON.
//! - **Deterministic Timestamps**: `occurred_at` is UTC, millisecond precision,
//!   and travels as an RFC 3339 string so it survives any transport unchanged.
//! - **Routing by Convention**: Topics are derived from service, optional
//!   instance and action (see [`topic`]).

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope;
pub mod errors;
pub mod topic;

pub use envelope::{Envelope, EnvelopeBuilder, Metadata, Payload, DEFAULT_SCHEMA};
pub use errors::{BoxError, BridgeError, BridgeResult};
pub use topic::{topic, topic_for_instance, OBSERVABILITY_LOG_TOPIC, TOPIC_PREFIX};

/// Re-exported so downstream crates build payloads without a direct dependency.
pub use serde_json::{json, Map, Value};
