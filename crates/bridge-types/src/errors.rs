//! # Error Types
//!
//! The error taxonomy shared by envelope construction, decoding, daemon
//! startup and queue interaction.

use thiserror::Error;

/// Boxed error used to carry causes from external collaborators
/// (queue clients, credential stores, application handlers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the bridge SDK.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed or missing construction input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Malformed wire bytes, credential JSON, or timestamp.
    #[error("decode failed: {0}")]
    Decode(String),

    /// An envelope could not be serialized for publication.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Daemon misconfiguration (no handlers, no queue client, started twice).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Credential bootstrap failed before any subscription was made.
    #[error("credential bootstrap failed: {0}")]
    Bootstrap(#[source] BoxError),

    /// The queue client rejected a publish.
    #[error("publish to {topic} failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: BoxError,
    },

    /// The queue client rejected a subscription.
    #[error("subscribe {action} on {topic} failed: {source}")]
    Subscribe {
        action: String,
        topic: String,
        #[source]
        source: BoxError,
    },

    /// A registered handler returned an error for a delivered envelope.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl BridgeError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap(_))
    }

    #[must_use]
    pub fn is_publish(&self) -> bool {
        matches!(self, Self::Publish { .. })
    }

    #[must_use]
    pub fn is_subscribe(&self) -> bool {
        matches!(self, Self::Subscribe { .. })
    }

    #[must_use]
    pub fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
