//! Delivery telemetry port and its in-process implementations.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one queue delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryOutcome {
    /// Decoded and handled.
    Ok,
    /// The body was not a valid envelope.
    DecodeError,
    /// The registered handler returned an error.
    HandlerError,
}

impl DeliveryOutcome {
    /// Label value used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::DecodeError => "decode_error",
            Self::HandlerError => "handler_error",
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records queue handling metrics.
///
/// Called on the dispatch path: implementations must not block and must not
/// panic. Recording is fire-and-forget.
pub trait TelemetryReporter: Send + Sync {
    fn record_delivery(
        &self,
        service: &str,
        action: &str,
        duration: Duration,
        outcome: DeliveryOutcome,
    );
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetryReporter for NoopTelemetry {
    fn record_delivery(&self, _: &str, _: &str, _: Duration, _: DeliveryOutcome) {}
}

/// Emits one structured `tracing` event per delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetryReporter for TracingTelemetry {
    fn record_delivery(
        &self,
        service: &str,
        action: &str,
        duration: Duration,
        outcome: DeliveryOutcome,
    ) {
        let duration_ms = duration.as_secs_f64() * 1000.0;
        if outcome.is_ok() {
            tracing::debug!(
                service = %service,
                action = %action,
                duration_ms,
                outcome = %outcome,
                "Delivery handled"
            );
        } else {
            tracing::warn!(
                service = %service,
                action = %action,
                duration_ms,
                outcome = %outcome,
                "Delivery failed"
            );
        }
    }
}

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub service: String,
    pub action: String,
    pub duration: Duration,
    pub outcome: DeliveryOutcome,
}

/// Keeps every delivery in memory. Intended for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    records: Mutex<Vec<DeliveryRecord>>,
}

impl RecordingTelemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<DeliveryRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn outcomes(&self) -> Vec<DeliveryOutcome> {
        self.records.lock().iter().map(|r| r.outcome).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl TelemetryReporter for RecordingTelemetry {
    fn record_delivery(
        &self,
        service: &str,
        action: &str,
        duration: Duration,
        outcome: DeliveryOutcome,
    ) {
        self.records.lock().push(DeliveryRecord {
            service: service.to_string(),
            action: action.to_string(),
            duration,
            outcome,
        });
    }
}

/// Forwards every record to each inner reporter, in order.
#[derive(Default, Clone)]
pub struct FanoutTelemetry {
    reporters: Vec<Arc<dyn TelemetryReporter>>,
}

impl FanoutTelemetry {
    #[must_use]
    pub fn new(reporters: Vec<Arc<dyn TelemetryReporter>>) -> Self {
        Self { reporters }
    }

    #[must_use]
    pub fn with(mut self, reporter: Arc<dyn TelemetryReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl TelemetryReporter for FanoutTelemetry {
    fn record_delivery(
        &self,
        service: &str,
        action: &str,
        duration: Duration,
        outcome: DeliveryOutcome,
    ) {
        for reporter in &self.reporters {
            reporter.record_delivery(service, action, duration, outcome);
        }
    }
}
