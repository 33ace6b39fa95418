//! # Envelope Codec Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | encode (small payload) | < 10µs |
//! | decode (small payload) | < 10µs |
//! | in-memory dispatch | < 50µs |

use bridge_bus::{InMemoryQueue, QueueClient};
use bridge_daemon::Daemon;
use bridge_types::{json, BoxError, Envelope, Map, Value};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn payload_with_fields(fields: usize) -> Value {
    let mut payload = Map::new();
    for i in 0..fields {
        payload.insert(format!("field_{i}"), json!({"text": "hello", "n": i}));
    }
    Value::Object(payload)
}

fn bench_encode_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope-codec");

    for fields in [1, 16, 256] {
        let envelope = Envelope::builder("telegram", "inbound_event", payload_with_fields(fields))
            .trace_id("trace")
            .build()
            .unwrap();
        let encoded = envelope.encode().unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", fields), &envelope, |b, envelope| {
            b.iter(|| black_box(envelope.encode().unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("decode", fields), &encoded, |b, encoded| {
            b.iter(|| black_box(Envelope::decode(encoded).unwrap()))
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let queue = Arc::new(InMemoryQueue::new());
    let daemon = Daemon::builder("telegram")
        .queue(queue.clone())
        .build()
        .unwrap();
    daemon.register_fn("inbound_event", |_cancel, _envelope| async {
        Ok::<(), BoxError>(())
    });
    let cancel = CancellationToken::new();
    runtime.block_on(daemon.start(&cancel)).unwrap();

    let body = Envelope::new("telegram", "inbound_event", payload_with_fields(4))
        .unwrap()
        .encode()
        .unwrap();

    c.bench_function("daemon-dispatch/in_memory", |b| {
        b.iter(|| {
            runtime
                .block_on(queue.publish(&cancel, "bridge/telegram/inbound_event", body.clone()))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_encode_decode, bench_dispatch);
criterion_main!(benches);
