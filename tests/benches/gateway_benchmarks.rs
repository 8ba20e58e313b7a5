//! # Shroud Gateway Benchmarks
//!
//! Hot-path costs of the normalization pipeline:
//!
//! | Path | Target |
//! |------|--------|
//! | pad + seal (64 B surface) | < 5 µs |
//! | key normalization | < 1 µs |
//! | full Handle invocation | < 100 µs |

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use shroud_gateway::prelude::*;
use shroud_tests::fixtures::{build_gateway, client_sealer, sealed_call, MESSAGE_SIZE};

fn bench_pad_and_seal(c: &mut Criterion) {
    let codec = PaddingCodec::new([3u8; 32]);
    let sealer = client_sealer();
    let payload = br#"{"class":"transfer","body":{"amount":123}}"#;

    let mut group = c.benchmark_group("pad-and-seal");
    group.throughput(Throughput::Bytes(MESSAGE_SIZE as u64));
    group.bench_function("pad_seal_64b", |b| {
        b.iter(|| {
            let padded = codec.pad(black_box(payload), MESSAGE_SIZE).unwrap();
            black_box(sealer.seal(&padded).unwrap())
        })
    });
    group.bench_function("open_unpad_64b", |b| {
        let sealed = sealer.seal(&codec.pad(payload, MESSAGE_SIZE).unwrap()).unwrap();
        b.iter(|| {
            let padded = sealer.open(black_box(&sealed)).unwrap();
            black_box(codec.unpad(&padded).unwrap())
        })
    });
    group.finish();
}

fn bench_key_normalization(c: &mut Criterion) {
    let normalizer = KeyNormalizer::new([7u8; 32]);
    let shape = StateKeyShape {
        key_len: 8,
        max_logical_len: 64,
        value_size: 48,
    };
    let key = LogicalKey::from("balances/holder-0001");

    c.bench_function("key_normalize", |b| {
        b.iter(|| black_box(normalizer.encode(black_box(&key), &shape).unwrap()))
    });
}

fn bench_full_handle_invocation(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let (gateway, _store) = build_gateway();

    runtime
        .block_on(gateway.init(SealedRequest::new(sealed_call(
            "init",
            serde_json::json!({"amount": 1_000_000_000u64}),
        ))))
        .unwrap();

    c.bench_function("handle_invocation", |b| {
        b.iter(|| {
            let request =
                SealedRequest::new(sealed_call("transfer", serde_json::json!({"amount": 1})));
            runtime
                .block_on(gateway.handle(black_box(request)))
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_pad_and_seal,
    bench_key_normalization,
    bench_full_handle_invocation
);
criterion_main!(benches);
