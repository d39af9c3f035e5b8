//! Benchmarks for discovery and inference.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use triadic::additive::{AdditiveLaw, AdditiveLawRegistry};
use triadic::graph::{DEFAULT_MIN_K, RelationGraph};
use triadic::infer::InferenceEngine;
use triadic::triad::Quadruple;
use triadic::triad::search::PermutationSearcher;

fn bench_search(c: &mut Criterion) {
    let q = Quadruple::from_u64([50, 1, 5, 10], ["2KE", "1", "m", "v2"]);

    c.bench_function("search_24_orders", |bench| {
        bench.iter(|| black_box(PermutationSearcher::search(black_box(&q))))
    });
    c.bench_function("search_24_orders_par", |bench| {
        bench.iter(|| black_box(PermutationSearcher::search_par(black_box(&q))))
    });
}

fn bench_riemann_solve(c: &mut Criterion) {
    const SLICES: u64 = 1000;
    let graph = RelationGraph::new();
    let mut known: HashMap<String, f64> = HashMap::new();
    let mut slices = Vec::new();
    for i in 1..=SLICES {
        let (d, v, dt) = (format!("d_{i}"), format!("v_{i}"), format!("dt_{i}"));
        graph.add_relation(
            &Quadruple::from_u64([800 * i * 400, 1, 800 * i, 400], [&d, "1", &v, &dt]),
            DEFAULT_MIN_K,
        );
        known.insert(v, 0.08 * i as f64);
        known.insert(dt, 0.04);
        slices.push(d);
    }
    let mut laws = AdditiveLawRegistry::new();
    laws.register(AdditiveLaw::riemann_sum("integral", "total", slices))
        .expect("valid law");
    let engine = InferenceEngine::new(graph.into(), laws.into());

    c.bench_function("solve_riemann_1000", |bench| {
        bench.iter(|| black_box(engine.solve(&known, "total", 5)))
    });
}

criterion_group!(benches, bench_search, bench_riemann_solve);
criterion_main!(benches);
