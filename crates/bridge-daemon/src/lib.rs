//! # Bridge Daemon
//!
//! Runtime core shared by every Msgr bridge daemon (Telegram, Matrix, Slack,
//! ...). A daemon owns a table of envelope handlers keyed by action and
//! subscribes each one to its queue topic on start.
//!
//! ## Delivery Pipeline
//!
//! ```text
//! queue bytes ──decode──→ Envelope ──handler──→ Ok / Err
//!      │                     │                     │
//!      └── decode_error      └── handler_error     └── ok
//!                 (one TelemetryReporter call per delivery)
//! ```
//!
//! ## Topics
//!
//! | Scope | Topic |
//! |-------|-------|
//! | Unscoped | `bridge/{service}/{action}` |
//! | Instance | `bridge/{service}/{instance}/{action}` |
//! | Logs | `observability/logs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - EnvCredentialBootstrapper, QueueLogger             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements / uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - EnvelopeHandler                            │
//! │  ports/outbound.rs - QueueClient, TelemetryReporter,            │
//! │                      CredentialBootstrapper                     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service.rs - Daemon (handler table, start, dispatch, publish)  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let daemon = Daemon::builder("telegram")
//!     .queue(queue)
//!     .telemetry(Arc::new(TracingTelemetry))
//!     .credentials(Arc::new(EnvCredentialBootstrapper::from_env()))
//!     .build()?;
//!
//! daemon.register_fn("outbound_message", |_cancel, envelope| async move {
//!     send(envelope.payload()).await
//! });
//! daemon.start(&cancel).await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{credentials_env_key, EnvCredentialBootstrapper, QueueLogger, QueueLoggerBuilder};
pub use ports::inbound::{handler_fn, EnvelopeHandler, FnHandler};
pub use ports::outbound::{CredentialBootstrapper, Credentials};
pub use service::{Daemon, DaemonBuilder};
