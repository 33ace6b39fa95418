//! Environment-variable credential bootstrapper.
//!
//! Credentials for service `telegram` are read from
//! `MSGR_TELEGRAM_CREDENTIALS` as a JSON object string.

use async_trait::async_trait;
use bridge_types::{BridgeError, BridgeResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::ports::outbound::{CredentialBootstrapper, Credentials};

/// Variable lookup; `None` means unset.
pub type EnvLoader = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable holding the credentials of `service`.
#[must_use]
pub fn credentials_env_key(service: &str) -> String {
    format!("MSGR_{}_CREDENTIALS", service.to_uppercase())
}

/// Loads credential JSON from environment variables.
#[derive(Clone)]
pub struct EnvCredentialBootstrapper {
    loader: EnvLoader,
}

impl EnvCredentialBootstrapper {
    /// Reads the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_loader(|key| std::env::var(key).ok())
    }

    /// Uses `loader` instead of the process environment.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
        }
    }
}

impl Default for EnvCredentialBootstrapper {
    fn default() -> Self {
        Self::from_env()
    }
}

#[async_trait]
impl CredentialBootstrapper for EnvCredentialBootstrapper {
    async fn bootstrap(&self, _cancel: &CancellationToken, service: &str) -> BridgeResult<Credentials> {
        let key = credentials_env_key(service);
        let Some(raw) = (self.loader)(&key).filter(|raw| !raw.is_empty()) else {
            debug!(service = %service, key = %key, "No credentials configured");
            return Ok(Credentials::new());
        };

        // Never echo the raw value: it holds secrets.
        let credentials: Credentials = serde_json::from_str(&raw)
            .map_err(|e| BridgeError::Decode(format!("{key} is not a JSON object: {e}")))?;

        debug!(
            service = %service,
            key = %key,
            fields = credentials.len(),
            "Credentials loaded from environment"
        );
        Ok(credentials)
    }
}
