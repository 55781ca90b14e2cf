//! Benchmarks for spherical k-means fitting and prediction.
//!
//! The assign/update loop is O(N·K·D) per iteration; these benchmarks track
//! how the single-pass and two-pass drivers scale with N, and the cost of the
//! single-point predict path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use corral::SphericalKMeans;

const DIM: usize = 64;
const K: usize = 8;

/// Row-major matrix of `n` unit-ish vectors clustered around `K` directions.
fn clustered_vectors(n: usize, dim: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(42);
    let anchors: Vec<Vec<f32>> = (0..K)
        .map(|_| (0..dim).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect())
        .collect();

    let mut data = Vec::with_capacity(n * dim);
    for i in 0..n {
        let anchor = &anchors[i % K];
        data.extend(
            anchor
                .iter()
                .map(|a| a + (rng.random::<f32>() - 0.5) * 0.2),
        );
    }
    data
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n in [500, 2_000, 8_000] {
        let data = clustered_vectors(n, DIM);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("single_pass", n), &data, |b, data| {
            b.iter(|| {
                let mut km = SphericalKMeans::new(DIM, K).unwrap().with_seed(7);
                km.fit(black_box(data), n).unwrap();
                black_box(km.labels().len())
            })
        });
        group.bench_with_input(BenchmarkId::new("two_pass", n), &data, |b, data| {
            b.iter(|| {
                let mut km = SphericalKMeans::new(DIM, K).unwrap().with_seed(7);
                km.fit_two_pass(black_box(data), n).unwrap();
                black_box(km.labels().len())
            })
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    let n = 2_000;
    let data = clustered_vectors(n, DIM);
    let mut km = SphericalKMeans::new(DIM, K).unwrap().with_seed(7);
    km.fit(&data, n).unwrap();

    let query: Vec<f32> = data[..DIM].to_vec();
    group.throughput(Throughput::Elements(1));
    group.bench_function("single_point", |b| {
        b.iter(|| km.predict(black_box(&query)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_fit, bench_predict);
criterion_main!(benches);
