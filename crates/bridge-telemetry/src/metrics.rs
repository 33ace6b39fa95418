//! Prometheus metrics for bridge deliveries.
//!
//! ## Metrics Exported
//!
//! - `bridge_deliveries_total{service,action,outcome}` - Counter of deliveries
//! - `bridge_delivery_duration_seconds{service,action,outcome}` - Decode + handler latency

use lazy_static::lazy_static;
use prometheus::{exponential_buckets, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::reporter::{DeliveryOutcome, TelemetryReporter};
use crate::TelemetryError;

const LABELS: &[&str] = &["service", "action", "outcome"];

lazy_static! {
    /// Process-wide registry used by [`PrometheusTelemetry::global`].
    pub static ref REGISTRY: Registry = Registry::new();
}

/// [`TelemetryReporter`] backed by Prometheus collectors.
#[derive(Clone)]
pub struct PrometheusTelemetry {
    registry: Registry,
    deliveries: CounterVec,
    duration: HistogramVec,
}

impl PrometheusTelemetry {
    /// Registers the delivery collectors on `registry`.
    pub fn new(registry: Registry) -> Result<Self, TelemetryError> {
        let deliveries = CounterVec::new(
            Opts::new("bridge_deliveries_total", "Total queue deliveries by outcome"),
            LABELS,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        let buckets = exponential_buckets(0.0005, 2.0, 14)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "bridge_delivery_duration_seconds",
                "Time spent decoding and handling a delivery",
            )
            .buckets(buckets),
            LABELS,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        registry
            .register(Box::new(deliveries.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        registry
            .register(Box::new(duration.clone()))
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

        Ok(Self {
            registry,
            deliveries,
            duration,
        })
    }

    /// Registers on the process-wide [`REGISTRY`]. Fails if called twice.
    pub fn global() -> Result<Self, TelemetryError> {
        Self::new(REGISTRY.clone())
    }

    /// Number of deliveries recorded for one label set.
    #[must_use]
    pub fn delivery_count(&self, service: &str, action: &str, outcome: DeliveryOutcome) -> u64 {
        self.deliveries
            .get_metric_with_label_values(&[service, action, outcome.as_str()])
            .map(|c| c.get() as u64)
            .unwrap_or(0)
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather_text(&self) -> Result<String, TelemetryError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
    }
}

impl TelemetryReporter for PrometheusTelemetry {
    fn record_delivery(
        &self,
        service: &str,
        action: &str,
        duration: Duration,
        outcome: DeliveryOutcome,
    ) {
        let labels = [service, action, outcome.as_str()];
        self.deliveries.with_label_values(&labels).inc();
        self.duration
            .with_label_values(&labels)
            .observe(duration.as_secs_f64());
    }
}
