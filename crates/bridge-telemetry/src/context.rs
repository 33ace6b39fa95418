//! Trace correlation for queue deliveries.
//!
//! Every envelope carries a `trace_id`. The daemon opens a span per delivery
//! before the body is decoded (so decode failures are still attributed to a
//! service and action) and records the trace id on it once it is known. Any
//! log emitted by a handler inside that span carries the same id, which is
//! what downstream log search correlates on.
//!
//! ```rust,ignore
//! let span = delivery_span("telegram", "inbound_event");
//! async move {
//!     let envelope = Envelope::decode(&body)?;
//!     record_trace_id(&tracing::Span::current(), envelope.trace_id());
//!     handler.handle(cancel, envelope).await
//! }
//! .instrument(span)
//! ```

use tracing::field::Empty;
use tracing::Span;

/// Span wrapping one delivery; `trace_id` starts empty.
pub fn delivery_span(service: &str, action: &str) -> Span {
    tracing::info_span!(
        "bridge_delivery",
        service = %service,
        action = %action,
        trace_id = Empty,
    )
}

/// Fill in the envelope trace id on a span created by [`delivery_span`].
pub fn record_trace_id(span: &Span, trace_id: &str) {
    span.record("trace_id", trace_id);
}
