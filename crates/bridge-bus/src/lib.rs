//! # Bridge Bus - Queue Plumbing for Bridge Daemons
//!
//! Defines the queue client port every bridge daemon consumes, plus an
//! in-memory loopback transport.
//!
//! ```text
//! ┌──────────────┐   publish(topic, bytes)   ┌──────────────┐
//! │  Producer    │ ────────────────────────► │ QueueClient  │
//! └──────────────┘                           │  (StoneMQ)   │
//!                                            └──────┬───────┘
//!                                                   │ handler(cancel, bytes)
//!                                                   ▼
//!                                            ┌──────────────┐
//!                                            │ Bridge Daemon│
//!                                            └──────────────┘
//! ```
//!
//! Delivery semantics (ordering, redelivery on error, acknowledgement) are
//! owned by the queue client implementation.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod memory;

// Re-export main types
pub use client::{message_handler, DeliveryFuture, QueueClient, QueueError, QueueMessageHandler};
pub use memory::InMemoryQueue;

/// Cancellation handle threaded through every queue call.
pub use tokio_util::sync::CancellationToken;
