//! Benchmarks for topology generation
//!
//! Measures performance of:
//! - Each generator at renderable and oversized node counts
//! - Compatibility matrix derivation
//! - Legacy adaptation round trip

use algoscope_graph::{
    compatible_algorithms, compatible_generators, from_legacy, generate, to_legacy, GeneratorSpec, GeneratorType,
    GraphAlgorithm,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark every generator at several sizes
fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for kind in GeneratorType::ALL {
        for &n in &[8usize, 30, 200] {
            group.throughput(Throughput::Elements(n as u64));
            group.bench_with_input(BenchmarkId::new(kind.as_str(), n), &n, |b, &n| {
                let spec = GeneratorSpec::new(kind, n).weighted(true);
                b.iter(|| generate(black_box(&spec)))
            });
        }
    }
    group.finish();
}

/// Benchmark the derived compatibility lists
fn bench_compatibility(c: &mut Criterion) {
    c.bench_function("compatible_generators_all", |b| {
        b.iter(|| {
            for algo in GraphAlgorithm::ALL {
                black_box(compatible_generators(algo.as_str()));
            }
        })
    });

    c.bench_function("compatible_algorithms_all", |b| {
        b.iter(|| {
            for kind in GeneratorType::ALL {
                black_box(compatible_algorithms(kind));
            }
        })
    });
}

/// Benchmark canonical -> legacy -> canonical
fn bench_adapter(c: &mut Criterion) {
    let mut group = c.benchmark_group("legacy_round_trip");

    for &n in &[10usize, 30, 100] {
        let graph = generate(&GeneratorSpec::new(GeneratorType::Complete, n).weighted(true));
        group.throughput(Throughput::Elements(graph.edge_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| from_legacy(&to_legacy(black_box(graph)), graph.directed, graph.weighted).ok())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generators, bench_compatibility, bench_adapter);
criterion_main!(benches);
