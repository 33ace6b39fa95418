//! Telemetry configuration from environment variables.

use std::env;

const DEFAULT_SERVICE_NAME: &str = "msgr-bridge";

/// Configuration for logging and metrics of a bridge daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to logs
    pub service_name: String,

    /// Bridge instance identifier, if the daemon is instance-scoped
    pub instance: Option<String>,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            instance: None,
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MSGR_SERVICE_NAME`: Service name (default: msgr-bridge)
    /// - `MSGR_INSTANCE`: Bridge instance identifier (default: unset)
    /// - `MSGR_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MSGR_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `MSGR_JSON_LOGS`: Enable JSON logs (default: true in containers)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("MSGR_SERVICE_NAME")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            instance: lookup("MSGR_INSTANCE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            log_level: lookup("MSGR_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("MSGR_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("MSGR_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
        }
    }

    /// Create configuration for a specific bridge service.
    pub fn for_bridge(service: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("msgr-{service}-bridge");
        config
    }

    /// Service name including the instance, when scoped.
    pub fn full_service_name(&self) -> String {
        match &self.instance {
            Some(instance) => format!("{}-{}", self.service_name, instance),
            None => self.service_name.clone(),
        }
    }
}
