//! # Delivery Flows
//!
//! Producer → queue → daemon → telemetry, with every reporter the SDK ships.
//!
//! ## Flows Tested:
//!
//! 1. **Producer → Daemon**: an encoded envelope reaches the registered handler
//!    with its trace id, payload and timestamp intact
//! 2. **Telemetry fan-out**: one delivery feeds recording and Prometheus
//!    reporters at once
//! 3. **Daemon → Logger**: handlers log through the observability topic

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bridge_bus::{message_handler, InMemoryQueue, QueueClient};
    use bridge_daemon::{Daemon, QueueLogger};
    use bridge_telemetry::{
        DeliveryOutcome, FanoutTelemetry, PrometheusTelemetry, RecordingTelemetry,
        TelemetryReporter, TracingTelemetry,
    };
    use bridge_types::{json, BoxError, BridgeError, Envelope, Metadata, OBSERVABILITY_LOG_TOPIC};
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use prometheus::Registry;
    use tokio_util::sync::CancellationToken;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn capture_logs(queue: &InMemoryQueue) -> Arc<Mutex<Vec<Envelope>>> {
        let captured: Arc<Mutex<Vec<Envelope>>> = Arc::default();
        let sink = Arc::clone(&captured);
        let handler = message_handler(move |_cancel, body: Vec<u8>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push(Envelope::decode(&body)?);
                Ok::<(), BridgeError>(())
            }
        });
        queue
            .subscribe(&CancellationToken::new(), OBSERVABILITY_LOG_TOPIC, handler)
            .await
            .unwrap();
        captured
    }

    // =============================================================================
    // PRODUCER → DAEMON
    // =============================================================================

    #[tokio::test]
    async fn test_envelope_fields_survive_the_queue() {
        let queue = Arc::new(InMemoryQueue::new());
        let daemon = Daemon::builder("telegram")
            .queue(queue.clone())
            .build()
            .unwrap();

        let received: Arc<Mutex<Option<Envelope>>> = Arc::default();
        let sink = Arc::clone(&received);
        daemon.register_fn("inbound_event", move |_cancel, envelope: Envelope| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock() = Some(envelope);
                Ok::<(), BoxError>(())
            }
        });
        let cancel = CancellationToken::new();
        daemon.start(&cancel).await.unwrap();

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let mut metadata = Metadata::new();
        metadata.insert("chat".to_string(), json!("family"));
        let sent = Envelope::builder("telegram", "inbound_event", json!({"text": "hej"}))
            .trace_id("trace")
            .occurred_at(at)
            .metadata(metadata)
            .build()
            .unwrap();

        daemon.publish(&cancel, &sent).await.unwrap();

        let received = received.lock().clone().unwrap();
        assert_eq!(received, sent);
        assert_eq!(received.trace_id(), "trace");
        assert_eq!(received.occurred_at(), at);
        assert_eq!(received.metadata()["chat"], "family");
    }

    // =============================================================================
    // TELEMETRY FAN-OUT
    // =============================================================================

    #[tokio::test]
    async fn test_fanout_feeds_recording_and_prometheus() {
        let recording = Arc::new(RecordingTelemetry::new());
        let metrics = Arc::new(PrometheusTelemetry::new(Registry::new()).unwrap());
        let fanout = FanoutTelemetry::default()
            .with(recording.clone())
            .with(metrics.clone())
            .with(Arc::new(TracingTelemetry));
        let telemetry: Arc<dyn TelemetryReporter> = Arc::new(fanout);

        let queue = Arc::new(InMemoryQueue::new());
        let daemon = Daemon::builder("matrix")
            .queue(queue.clone())
            .instance("matrix-1")
            .telemetry(telemetry)
            .build()
            .unwrap();
        daemon.register_fn("send", |_cancel, envelope: Envelope| async move {
            let result: Result<(), BoxError> = if envelope.payload().contains_key("room") {
                Ok(())
            } else {
                Err("room missing".into())
            };
            result
        });
        let cancel = CancellationToken::new();
        daemon.start(&cancel).await.unwrap();

        let good = Envelope::new("matrix", "send", json!({"room": "!abc"})).unwrap();
        let bad = Envelope::new("matrix", "send", json!({"body": "hi"})).unwrap();
        daemon.publish(&cancel, &good).await.unwrap();
        daemon.publish(&cancel, &good).await.unwrap();
        assert!(daemon.publish(&cancel, &bad).await.is_err());
        assert!(queue
            .publish(&cancel, "bridge/matrix/matrix-1/send", b"[]".to_vec())
            .await
            .is_err());

        assert_eq!(recording.len(), 4);
        assert_eq!(metrics.delivery_count("matrix", "send", DeliveryOutcome::Ok), 2);
        assert_eq!(
            metrics.delivery_count("matrix", "send", DeliveryOutcome::HandlerError),
            1
        );
        assert_eq!(
            metrics.delivery_count("matrix", "send", DeliveryOutcome::DecodeError),
            1
        );

        let text = metrics.gather_text().unwrap();
        assert!(text.contains("bridge_deliveries_total"));
        assert!(text.contains("outcome=\"handler_error\""));
    }

    // =============================================================================
    // DAEMON → LOGGER
    // =============================================================================

    #[tokio::test]
    async fn test_handler_logs_through_observability_topic() {
        let queue = Arc::new(InMemoryQueue::new());
        let logs = capture_logs(&queue).await;

        let logger = Arc::new(
            QueueLogger::builder(queue.clone())
                .service("slack_bridge")
                .stream("bridges")
                .build()
                .unwrap(),
        );

        let daemon = Daemon::builder("slack")
            .queue(queue.clone())
            .build()
            .unwrap();
        let handler_logger = Arc::clone(&logger);
        daemon.register_fn("send", move |cancel, envelope: Envelope| {
            let logger = Arc::clone(&handler_logger);
            async move {
                let mut metadata = Metadata::new();
                metadata.insert("trace_id".to_string(), json!(envelope.trace_id()));
                logger.info(&cancel, "message sent", Some(metadata)).await?;
                Ok::<(), BoxError>(())
            }
        });
        let cancel = CancellationToken::new();
        daemon.start(&cancel).await.unwrap();

        let envelope = Envelope::builder("slack", "send", json!({"text": "hi"}))
            .trace_id("abc-123")
            .build()
            .unwrap();
        daemon.publish(&cancel, &envelope).await.unwrap();

        let logs = logs.lock();
        assert_eq!(logs.len(), 1);
        let log = &logs[0];
        assert_eq!(log.service(), "observability");
        assert_eq!(log.action(), "log");
        assert_eq!(log.metadata()["stream"], "bridges");
        assert_eq!(log.payload()["entry"]["service"], "slack_bridge");
        assert_eq!(log.payload()["entry"]["metadata"]["trace_id"], "abc-123");
    }
}
