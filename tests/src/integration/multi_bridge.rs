//! # Multiple Bridges on One Queue
//!
//! Telegram, Matrix and Slack daemons share a single queue client. Topics keep
//! them apart; instance scopes keep two Matrix accounts apart.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use bridge_bus::{InMemoryQueue, QueueClient};
    use bridge_daemon::Daemon;
    use bridge_telemetry::RecordingTelemetry;
    use bridge_types::{json, topic, topic_for_instance, BoxError, Envelope};
    use tokio_util::sync::CancellationToken;

    fn counting_daemon(
        queue: &Arc<InMemoryQueue>,
        service: &str,
        instance: &str,
        action: &str,
    ) -> (Daemon, Arc<AtomicUsize>) {
        let daemon = Daemon::builder(service)
            .queue(queue.clone())
            .instance(instance)
            .build()
            .unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        daemon.register_fn(action, move |_cancel, _envelope| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), BoxError>(()) }
        });
        (daemon, count)
    }

    #[tokio::test]
    async fn test_services_do_not_see_each_other() {
        let queue = Arc::new(InMemoryQueue::new());
        let cancel = CancellationToken::new();

        let (telegram, telegram_hits) = counting_daemon(&queue, "telegram", "", "send");
        let (slack, slack_hits) = counting_daemon(&queue, "slack", "", "send");
        telegram.start(&cancel).await.unwrap();
        slack.start(&cancel).await.unwrap();

        let envelope = Envelope::new("telegram", "send", json!({"text": "hi"})).unwrap();
        telegram.publish(&cancel, &envelope).await.unwrap();
        telegram.publish(&cancel, &envelope).await.unwrap();

        assert_eq!(telegram_hits.load(Ordering::SeqCst), 2);
        assert_eq!(slack_hits.load(Ordering::SeqCst), 0);
        assert_eq!(
            queue.topics(),
            vec![topic("slack", "send"), topic("telegram", "send")]
        );
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let queue = Arc::new(InMemoryQueue::new());
        let cancel = CancellationToken::new();

        let (first, first_hits) = counting_daemon(&queue, "matrix", "matrix-1", "send");
        let (second, second_hits) = counting_daemon(&queue, "matrix", "matrix-2", "send");
        first.start(&cancel).await.unwrap();
        second.start(&cancel).await.unwrap();

        let body = Envelope::new("matrix", "send", json!({"room": "!a"}))
            .unwrap()
            .encode()
            .unwrap();
        queue
            .publish(&cancel, &topic_for_instance("matrix", "matrix-2", "send"), body)
            .await
            .unwrap();

        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribed_topic_is_dropped() {
        let queue = Arc::new(InMemoryQueue::new());
        let telemetry = Arc::new(RecordingTelemetry::new());
        let daemon = Daemon::builder("telegram")
            .queue(queue.clone())
            .telemetry(telemetry.clone())
            .build()
            .unwrap();
        daemon.register_fn("send", |_cancel, _envelope| async { Ok::<(), BoxError>(()) });
        let cancel = CancellationToken::new();
        daemon.start(&cancel).await.unwrap();

        // No handler for this action: the queue drops it, telemetry never sees it.
        let envelope = Envelope::new("telegram", "edit", json!({"id": 1})).unwrap();
        daemon.publish(&cancel, &envelope).await.unwrap();

        assert_eq!(queue.messages_dropped(), 1);
        assert!(telemetry.is_empty());
    }
}
