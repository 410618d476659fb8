//! Criterion micro-benchmarks for handle round trips through the store.

use std::hint::black_box;

use arb_bench::{command_profile, payload_profile};
use arb_core::{ArbCmd, ArbData, HandleBridge};
use arb_store::ArbStore;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

/// Benchmark: to_raw into a fresh handle, then delete it.
fn bench_to_raw(c: &mut Criterion) {
    let data = payload_profile(8, 64, 16).unwrap();
    let mut store = ArbStore::new();
    c.bench_function("raw_to_raw_8x64", |b| {
        b.iter(|| {
            let h = data.to_raw(&mut store, None).unwrap();
            store.delete(black_box(h)).unwrap();
        });
    });
}

/// Benchmark: to_raw into an existing handle (clear + rewrite).
fn bench_to_raw_existing(c: &mut Criterion) {
    let data = payload_profile(8, 64, 16).unwrap();
    let mut store = ArbStore::new();
    let h = data.to_raw(&mut store, None).unwrap();
    c.bench_function("raw_to_raw_existing_8x64", |b| {
        b.iter(|| black_box(data.to_raw(&mut store, Some(h)).unwrap()));
    });
}

/// Benchmark: from_raw with arguments below and above the probe capacity.
fn bench_from_raw_arg_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_from_raw_arg_len");
    for arg_len in [16usize, 256, 257, 4096] {
        let mut store = ArbStore::new();
        let h = payload_profile(8, arg_len, 4)
            .unwrap()
            .to_raw(&mut store, None)
            .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(arg_len), &h, |b, &h| {
            b.iter(|| black_box(ArbData::from_raw(&store, h).unwrap()));
        });
    }
    group.finish();
}

/// Benchmark: full command round trip.
fn bench_cmd_round_trip(c: &mut Criterion) {
    let cmd = command_profile(4, 128, 16).unwrap();
    let mut store = ArbStore::new();
    c.bench_function("raw_cmd_round_trip", |b| {
        b.iter(|| {
            let h = cmd.to_raw(&mut store, None).unwrap();
            let back = ArbCmd::from_raw(&store, h).unwrap();
            store.delete(h).unwrap();
            black_box(back)
        });
    });
}

criterion_group!(
    benches,
    bench_to_raw,
    bench_to_raw_existing,
    bench_from_raw_arg_sizes,
    bench_cmd_round_trip
);
criterion_main!(benches);
