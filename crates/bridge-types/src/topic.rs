//! # Topic Naming
//!
//! Queue routing keys are derived, never stored:
//!
//! ```text
//! bridge/{service}/{action}
//! bridge/{service}/{instance}/{action}
//! ```

/// Leading segment of every bridge topic.
pub const TOPIC_PREFIX: &str = "bridge";

/// Default topic for structured log forwarding.
pub const OBSERVABILITY_LOG_TOPIC: &str = "observability/logs";

/// Canonical topic for a service/action pair.
#[must_use]
pub fn topic(service: &str, action: &str) -> String {
    format!("{TOPIC_PREFIX}/{service}/{action}")
}

/// Topic scoped to one bridge instance; falls back to [`topic`] when
/// `instance` is empty.
#[must_use]
pub fn topic_for_instance(service: &str, instance: &str, action: &str) -> String {
    if instance.is_empty() {
        return topic(service, action);
    }
    format!("{TOPIC_PREFIX}/{service}/{instance}/{action}")
}
