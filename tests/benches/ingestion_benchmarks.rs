//! # Guardian-Relay Ingestion Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | gr-01 Guardian Verification | verify 13-of-19 VAA | < 1ms |
//! | gr-02 Deduplication | apply on a fresh key | < 10µs |
//! | shared-types | decode a signed VAA | < 10µs |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use gr_01_guardian_verification::test_helpers::{guardian_keys, guardian_set, signed_vaa};
use gr_01_guardian_verification::{quorum, GuardianSetHistory, GuardianSetVerifier, VaaVerifier};
use gr_02_deduplication::Deduplicator;
use shared_types::{ChainId, Vaa};

// ============================================================================
// GR-01: Guardian Verification
// ============================================================================

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("gr-01-guardian-verification");
    group.measurement_time(Duration::from_secs(10));

    for guardians in [7usize, 13, 19] {
        let keys = guardian_keys(guardians);
        let verifier = GuardianSetVerifier::new(Arc::new(
            GuardianSetHistory::from_sets([guardian_set(0, &keys)]).unwrap(),
        ));
        let vaa = signed_vaa(0, &keys, quorum(guardians), ChainId::ETHEREUM, 1, &[0u8; 128]);

        group.throughput(Throughput::Elements(quorum(guardians) as u64));
        group.bench_with_input(BenchmarkId::new("verify_quorum", guardians), &vaa, |b, vaa| {
            b.iter(|| black_box(verifier.verify(vaa).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// GR-02: Deduplication
// ============================================================================

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("gr-02-deduplication");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    let dedup = Deduplicator::default();
    let mut seq = 0u64;
    group.bench_function("apply_fresh_key", |b| {
        b.iter(|| {
            seq += 1;
            let key = format!("2/{:064x}/{seq}", 0);
            runtime.block_on(dedup.apply(&key, || async { Ok::<(), ()>(()) }))
        })
    });

    let hot = Deduplicator::default();
    runtime
        .block_on(hot.apply("2/hot/1", || async { Ok::<(), ()>(()) }))
        .unwrap();
    group.bench_function("apply_done_key", |b| {
        b.iter(|| runtime.block_on(hot.apply("2/hot/1", || async { Ok::<(), ()>(()) })))
    });

    group.finish();
}

// ============================================================================
// Wire Format
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("vaa-codec");
    let keys = guardian_keys(19);

    for payload_len in [64usize, 1024, 16 * 1024] {
        let raw = signed_vaa(0, &keys, 13, ChainId::SOLANA, 1, &vec![7u8; payload_len])
            .encode()
            .unwrap();
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode", payload_len), &raw, |b, raw| {
            b.iter(|| black_box(Vaa::decode(raw).is_ok()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_verify, bench_dedup, bench_decode);
criterion_main!(benches);
