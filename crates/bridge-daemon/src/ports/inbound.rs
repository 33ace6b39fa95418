//! Driving Port (API - what the daemon dispatches into)

use async_trait::async_trait;
use bridge_types::{BoxError, Envelope};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Application handler for one action.
///
/// Returning `Err` marks the delivery as failed; the queue client decides
/// whether it is redelivered.
#[async_trait]
pub trait EnvelopeHandler: Send + Sync {
    async fn handle(&self, cancel: CancellationToken, envelope: Envelope) -> Result<(), BoxError>;
}

/// Adapts an async closure into an [`EnvelopeHandler`].
pub struct FnHandler<F>(F);

/// Wraps `f` so it can be passed to [`crate::Daemon::register`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(CancellationToken, Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> EnvelopeHandler for FnHandler<F>
where
    F: Fn(CancellationToken, Envelope) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn handle(&self, cancel: CancellationToken, envelope: Envelope) -> Result<(), BoxError> {
        (self.0)(cancel, envelope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::json;

    #[tokio::test]
    async fn test_handler_fn_forwards_envelope() {
        let handler = handler_fn(|_cancel, envelope: Envelope| async move {
            let result: Result<(), BoxError> = if envelope.payload().contains_key("body") {
                Ok(())
            } else {
                Err("missing body".into())
            };
            result
        });

        let ok = Envelope::new("slack", "send", json!({"body": "hi"})).unwrap();
        let bad = Envelope::new("slack", "send", json!({})).unwrap();

        assert!(handler.handle(CancellationToken::new(), ok).await.is_ok());
        let err = handler.handle(CancellationToken::new(), bad).await.unwrap_err();
        assert_eq!(err.to_string(), "missing body");
    }
}
