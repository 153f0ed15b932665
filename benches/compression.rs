//! Benchmarks for sorted-sequence encodings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sortpack::{CompressionMethod, EliasFano, GolombRiceDelta, SortedCodec};

const UNIVERSE: u64 = 1_000_000;
const DENSITIES: [f64; 3] = [0.01, 0.05, 0.1];

/// Deterministic sorted sample of `n` distinct values below `universe`.
fn sorted_bitmap(universe: u64, n: usize) -> Vec<u64> {
    let mut state = 42u64;
    let mut chosen = std::collections::BTreeSet::new();
    while chosen.len() < n {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        chosen.insert(state % universe);
    }
    chosen.into_iter().collect()
}

fn inputs() -> impl Iterator<Item = (String, Vec<u64>)> {
    DENSITIES.into_iter().map(|density| {
        let n = (UNIVERSE as f64 * density) as usize;
        (format!("d{density}"), sorted_bitmap(UNIVERSE, n))
    })
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for (label, values) in inputs() {
        group.throughput(Throughput::Elements(values.len() as u64));
        for method in CompressionMethod::all() {
            group.bench_with_input(BenchmarkId::new(method.name(), &label), &values, |b, v| {
                b.iter(|| method.encode(black_box(v)).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (label, values) in inputs() {
        group.throughput(Throughput::Elements(values.len() as u64));
        for method in CompressionMethod::all() {
            let encoded = method.encode(&values).unwrap();
            group.bench_function(BenchmarkId::new(method.name(), &label), |b| {
                b.iter(|| black_box(&encoded).decode().unwrap())
            });
        }
    }

    group.finish();
}

fn bench_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("access_middle");

    for (label, values) in inputs() {
        let mid = values.len() / 2;
        let ef = EliasFano::encode(&values).unwrap();
        let gr = GolombRiceDelta::encode(&values).unwrap();

        group.bench_function(BenchmarkId::new("EliasFano", &label), |b| {
            b.iter(|| ef.access(black_box(mid)).unwrap())
        });
        group.bench_function(BenchmarkId::new("GolombRice", &label), |b| {
            b.iter(|| gr.access(black_box(mid)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_access);
criterion_main!(benches);
