//! # Bridge Daemon Service
//!
//! Wires envelope handlers to queue topics.
//!
//! ## Lifecycle
//!
//! 1. Build with [`Daemon::builder`], injecting the queue client and
//!    optionally a telemetry reporter, a credential bootstrapper and an
//!    instance scope.
//! 2. Register one handler per action.
//! 3. [`Daemon::start`] bootstraps credentials, then subscribes every
//!    registered action on `bridge/{service}[/{instance}]/{action}`.
//!
//! Each delivery is decoded, dispatched and reported to telemetry exactly
//! once with its outcome.

use bridge_bus::message_handler;
use bridge_telemetry::{delivery_span, record_trace_id, NoopTelemetry};
use bridge_types::{topic, topic_for_instance, BoxError, BridgeError, BridgeResult, Envelope};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::ports::inbound::{handler_fn, EnvelopeHandler};
use crate::ports::outbound::{
    CredentialBootstrapper, Credentials, DeliveryOutcome, QueueClient, QueueMessageHandler,
    TelemetryReporter,
};

/// Validates an instance scope. Empty means "unscoped".
fn validate_instance(raw: &str) -> BridgeResult<Option<String>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::Validation(
            "instance must not be blank".to_string(),
        ));
    }
    if trimmed.contains('/') {
        return Err(BridgeError::Validation(format!(
            "instance {trimmed:?} must not contain '/'"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// One subscribed action: decode, dispatch, report.
struct Route {
    service: String,
    action: String,
    handler: Arc<dyn EnvelopeHandler>,
    telemetry: Arc<dyn TelemetryReporter>,
}

impl Route {
    fn into_message_handler(self: Arc<Self>) -> QueueMessageHandler {
        message_handler(move |cancel, body| {
            let route = Arc::clone(&self);
            async move { route.deliver(cancel, body).await }
        })
    }

    async fn deliver(&self, cancel: CancellationToken, body: Vec<u8>) -> BridgeResult<()> {
        let span = delivery_span(&self.service, &self.action);
        self.dispatch(cancel, body, &span)
            .instrument(span.clone())
            .await
    }

    async fn dispatch(
        &self,
        cancel: CancellationToken,
        body: Vec<u8>,
        span: &tracing::Span,
    ) -> BridgeResult<()> {
        let started = Instant::now();

        let envelope = match Envelope::decode(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.report(started, DeliveryOutcome::DecodeError);
                warn!(error = %err, bytes = body.len(), "Dropping undecodable delivery");
                return Err(err);
            }
        };
        record_trace_id(span, envelope.trace_id());

        if let Err(source) = self.handler.handle(cancel, envelope).await {
            self.report(started, DeliveryOutcome::HandlerError);
            warn!(error = %source, "Handler failed");
            return Err(BridgeError::Handler(source));
        }

        self.report(started, DeliveryOutcome::Ok);
        Ok(())
    }

    fn report(&self, started: Instant, outcome: DeliveryOutcome) {
        self.telemetry
            .record_delivery(&self.service, &self.action, started.elapsed(), outcome);
    }
}

/// Bridge daemon: owns the handler table and subscribes it on start.
pub struct Daemon {
    service: String,
    instance: Option<String>,
    queue: Arc<dyn QueueClient>,
    telemetry: Arc<dyn TelemetryReporter>,
    bootstrapper: Option<Arc<dyn CredentialBootstrapper>>,
    handlers: RwLock<BTreeMap<String, Arc<dyn EnvelopeHandler>>>,
    credentials: RwLock<Credentials>,
    started: AtomicBool,
}

impl std::fmt::Debug for Daemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Daemon")
            .field("service", &self.service)
            .field("instance", &self.instance)
            .field("actions", &self.registered_actions())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

impl Daemon {
    pub fn builder(service: impl Into<String>) -> DaemonBuilder {
        DaemonBuilder {
            service: service.into(),
            instance: None,
            queue: None,
            telemetry: None,
            bootstrapper: None,
            error: None,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Instance scope, if any.
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Topic this daemon uses for `action`.
    pub fn topic_for(&self, action: &str) -> String {
        match &self.instance {
            Some(instance) => topic_for_instance(&self.service, instance, action),
            None => topic(&self.service, action),
        }
    }

    /// Registers `handler` for `action`, replacing any previous handler.
    pub fn register<H>(&self, action: impl Into<String>, handler: H)
    where
        H: EnvelopeHandler + 'static,
    {
        self.register_arc(action, Arc::new(handler));
    }

    /// Registers an already shared handler.
    pub fn register_arc(&self, action: impl Into<String>, handler: Arc<dyn EnvelopeHandler>) {
        let action = action.into();
        let replaced = self.handlers.write().insert(action.clone(), handler).is_some();
        debug!(service = %self.service, action = %action, replaced, "Handler registered");
    }

    /// Registers an async closure for `action`.
    pub fn register_fn<F, Fut>(&self, action: impl Into<String>, f: F)
    where
        F: Fn(CancellationToken, Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.register(action, handler_fn(f));
    }

    /// Registered actions in subscription order.
    pub fn registered_actions(&self) -> Vec<String> {
        self.handlers.read().keys().cloned().collect()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Credentials returned by the bootstrapper during [`Daemon::start`].
    pub fn credentials(&self) -> Credentials {
        self.credentials.read().clone()
    }

    /// Bootstraps credentials and subscribes every registered action.
    ///
    /// Fails without side effects when already started, when bootstrapping
    /// fails, or when no handler is registered; the last two leave the daemon
    /// restartable. A subscribe failure leaves earlier subscriptions in place.
    pub async fn start(&self, cancel: &CancellationToken) -> BridgeResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::Configuration(format!(
                "daemon {} already started",
                self.service
            )));
        }

        if let Some(bootstrapper) = &self.bootstrapper {
            match bootstrapper.bootstrap(cancel, &self.service).await {
                Ok(credentials) => *self.credentials.write() = credentials,
                Err(err) => {
                    self.started.store(false, Ordering::SeqCst);
                    warn!(service = %self.service, error = %err, "Credential bootstrap failed");
                    return Err(BridgeError::Bootstrap(Box::new(err)));
                }
            }
        }

        // Snapshot: the read guard must not live across the subscribe awaits.
        let routes: Vec<(String, Arc<dyn EnvelopeHandler>)> = self
            .handlers
            .read()
            .iter()
            .map(|(action, handler)| (action.clone(), Arc::clone(handler)))
            .collect();

        if routes.is_empty() {
            self.started.store(false, Ordering::SeqCst);
            return Err(BridgeError::Configuration(format!(
                "daemon {} has no handlers registered",
                self.service
            )));
        }

        for (action, handler) in routes {
            let topic = self.topic_for(&action);
            let route = Arc::new(Route {
                service: self.service.clone(),
                action: action.clone(),
                handler,
                telemetry: Arc::clone(&self.telemetry),
            });

            self.queue
                .subscribe(cancel, &topic, route.into_message_handler())
                .await
                .map_err(|source| BridgeError::Subscribe {
                    action: action.clone(),
                    topic: topic.clone(),
                    source: Box::new(source),
                })?;

            debug!(service = %self.service, action = %action, topic = %topic, "Subscribed");
        }

        info!(
            service = %self.service,
            instance = self.instance.as_deref().unwrap_or(""),
            "Bridge daemon started"
        );
        Ok(())
    }

    /// Publishes `envelope` on this daemon's topic for its action.
    pub async fn publish(&self, cancel: &CancellationToken, envelope: &Envelope) -> BridgeResult<()> {
        let topic = self.topic_for(envelope.action());
        let body = envelope.encode()?;

        self.queue
            .publish(cancel, &topic, body)
            .await
            .map_err(|source| BridgeError::Publish {
                topic: topic.clone(),
                source: Box::new(source),
            })?;

        debug!(
            service = %self.service,
            topic = %topic,
            trace_id = %envelope.trace_id(),
            "Envelope published"
        );
        Ok(())
    }
}

/// Builder for [`Daemon`]; the first invalid option aborts `build`.
#[must_use]
pub struct DaemonBuilder {
    service: String,
    instance: Option<String>,
    queue: Option<Arc<dyn QueueClient>>,
    telemetry: Option<Arc<dyn TelemetryReporter>>,
    bootstrapper: Option<Arc<dyn CredentialBootstrapper>>,
    error: Option<BridgeError>,
}

impl DaemonBuilder {
    /// Queue client used for subscriptions and publishing. Required.
    pub fn queue(mut self, queue: Arc<dyn QueueClient>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Delivery telemetry; defaults to [`NoopTelemetry`].
    pub fn telemetry(mut self, telemetry: Arc<dyn TelemetryReporter>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Credential bootstrapper run once by [`Daemon::start`].
    pub fn credentials(mut self, bootstrapper: Arc<dyn CredentialBootstrapper>) -> Self {
        self.bootstrapper = Some(bootstrapper);
        self
    }

    /// Scopes topics to `instance`. Trimmed; empty means unscoped.
    pub fn instance(mut self, instance: impl AsRef<str>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match validate_instance(instance.as_ref()) {
            Ok(instance) => self.instance = instance,
            Err(err) => self.error = Some(err),
        }
        self
    }

    pub fn build(self) -> BridgeResult<Daemon> {
        if self.service.is_empty() {
            return Err(BridgeError::Validation("service must not be empty".to_string()));
        }
        if let Some(err) = self.error {
            return Err(err);
        }
        let queue = self.queue.ok_or_else(|| {
            BridgeError::Configuration(format!("daemon {} requires a queue client", self.service))
        })?;

        Ok(Daemon {
            service: self.service,
            instance: self.instance,
            queue,
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(NoopTelemetry)),
            bootstrapper: self.bootstrapper,
            handlers: RwLock::new(BTreeMap::new()),
            credentials: RwLock::new(Credentials::new()),
            started: AtomicBool::new(false),
        })
    }
}
