//! # Bridge Telemetry
//!
//! Delivery observability for Msgr bridge daemons.
//!
//! ## Components
//!
//! - **Reporter port**: [`TelemetryReporter`], called once per queue delivery
//!   with the service, action, duration and [`DeliveryOutcome`].
//! - **Reporters**: [`NoopTelemetry`] (default), [`TracingTelemetry`],
//!   [`PrometheusTelemetry`], [`RecordingTelemetry`], [`FanoutTelemetry`].
//! - **Logging**: [`init_tracing`] installs a `tracing-subscriber` registry
//!   configured by [`TelemetryConfig`].
//! - **Correlation**: [`delivery_span`] ties handler logs to envelope trace ids.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_tracing, PrometheusTelemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_bridge("telegram");
//! init_tracing(&config)?;
//! let metrics = std::sync::Arc::new(PrometheusTelemetry::global()?);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MSGR_SERVICE_NAME` | `msgr-bridge` | Service name in logs |
//! | `MSGR_INSTANCE` | unset | Bridge instance identifier |
//! | `MSGR_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `MSGR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `MSGR_JSON_LOGS` | `true` in containers | JSON log lines |

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod context;
mod metrics;
mod reporter;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use context::{delivery_span, record_trace_id};
pub use metrics::{PrometheusTelemetry, REGISTRY};
pub use reporter::{
    DeliveryOutcome, DeliveryRecord, FanoutTelemetry, NoopTelemetry, RecordingTelemetry,
    TelemetryReporter, TracingTelemetry,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
