//! Adapters layer for the bridge daemon.
//!
//! Concrete credential sources and the queue-backed log sink.

pub mod env_credentials;
pub mod observability_logger;

pub use env_credentials::{credentials_env_key, EnvCredentialBootstrapper, EnvLoader};
pub use observability_logger::{Clock, QueueLogger, QueueLoggerBuilder, LOG_DESTINATION};
