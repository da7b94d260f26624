//! Solver and interval algebra benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench solve
//! ```

use std::collections::BTreeMap;

use access_validator::graph::{EdgeSpec, Graph};
use access_validator::interval::{Border, Interval};
use access_validator::predicate::{intersect, Predicate};
use access_validator::solver::{Solver, SolverConfig};
use access_validator::types::VertexId;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// Helpers
// ============================================================================

fn random_interval(rng: &mut ChaCha8Rng) -> Interval {
    let a = rng.random_range(-100..=100) as f64;
    let b = rng.random_range(-100..=100) as f64;
    let border = match rng.random_range(0..4) {
        0 => Border::Open,
        1 => Border::LeftClosed,
        2 => Border::RightClosed,
        _ => Border::DoubleClosed,
    };
    Interval::new(a.min(b), a.max(b), border)
}

fn random_predicate(rng: &mut ChaCha8Rng, size: usize) -> Predicate {
    (0..size).map(|_| random_interval(rng)).collect()
}

/// Layered graph: every vertex of layer `i` depends on `fanout` random vertices of layer `i + 1`.
/// The target is vertex 0 in the first layer.
fn layered_graph(layers: u32, width: u32, fanout: usize, seed: u64) -> Graph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let predicates: Vec<Predicate> = (0..8).map(|_| random_predicate(&mut rng, 2)).collect();

    let mut edges = Vec::new();
    for layer in 0..layers - 1 {
        for k in 0..width {
            let from = layer * width + k;
            let mut targets: Vec<u32> = (0..width).map(|t| (layer + 1) * width + t).collect();
            targets.shuffle(&mut rng);
            for &to in targets.iter().take(fanout) {
                edges.push(EdgeSpec::new(from, to, rng.random_range(0..predicates.len())));
            }
        }
    }

    let values: BTreeMap<u32, f64> = (0..layers * width)
        .map(|id| (id, rng.random_range(-100..=100) as f64))
        .collect();
    Graph::build(&edges, values, predicates).unwrap()
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate/intersect");

    for size in [1, 4, 16, 64] {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let p1 = random_predicate(&mut rng, size);
        let p2 = random_predicate(&mut rng, size);

        group.throughput(Throughput::Elements((p1.intervals().len() + p2.intervals().len()) as u64));
        group.bench_with_input(BenchmarkId::new("intervals", size), &(p1, p2), |b, (p1, p2)| {
            b.iter(|| intersect(p1, p2));
        });
    }

    group.finish();
}

fn bench_value_classes(c: &mut Criterion) {
    let mut group = c.benchmark_group("classes/compute");
    group.sample_size(20);

    for incoming in [4, 8, 12, 16] {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let predicates: Vec<Predicate> = (0..incoming).map(|_| random_predicate(&mut rng, 3)).collect();
        // A star: every edge points at vertex 0, so building it is dominated by vertex 0's classes.
        let edges: Vec<EdgeSpec> = (0..incoming).map(|k| EdgeSpec::new(k as u32 + 1, 0, k)).collect();

        group.bench_with_input(BenchmarkId::new("incoming", incoming), &predicates, |b, predicates| {
            b.iter(|| Graph::build(&edges, [], predicates.clone()).unwrap());
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/build");
    group.sample_size(20);

    for layers in [4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("layers", layers), &layers, |b, &layers| {
            b.iter(|| layered_graph(layers, 4, 2, 1));
        });
    }

    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver/layered");
    group.sample_size(10);

    let config = SolverConfig {
        max_steps: Some(100_000),
        ..Default::default()
    };

    for layers in [3, 4, 5, 6] {
        group.bench_with_input(BenchmarkId::new("layers", layers), &layers, |b, &layers| {
            b.iter_batched(
                || layered_graph(layers, 3, 2, 2024),
                |mut graph| {
                    let mut solver = Solver::new(config.clone());
                    let trace = solver.solve(&mut graph, VertexId::new(0));
                    (trace, solver.stats().expanded)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_intersect, bench_value_classes, bench_build, bench_solve);

criterion_main!(benches);
