use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use neuron_topology::config::Config;
use neuron_topology::ir::EntitySet;
use neuron_topology::pipeline::{TopologyEngine, compute_topology};
use std::hint::black_box;

/// Layered network: every neuron in layer `l` listens to every signal of layer `l - 1`,
/// with one response per binding.
fn layered_network(layers: usize, width: usize, islands: usize) -> EntitySet {
    let mut set = EntitySet::new();
    for layer in 0..layers {
        for i in 0..width {
            let id = format!("L{layer}N{i}");
            set.ensure_neuron(&id, Some(&format!("layer {layer} neuron {i}")));
            set.own(&format!("app:collateral:s{layer}_{i}"), &id);
            if layer > 0 {
                for j in 0..width {
                    let signal = format!("s{}_{j}", layer - 1);
                    set.bind(&id, &signal);
                    set.respond(
                        &format!("r{layer}_{i}_{j}"),
                        &format!("L{}N{j}", layer - 1),
                        None,
                        Some(&signal),
                    );
                }
            }
        }
    }
    for island in 0..islands {
        set.ensure_neuron(&format!("island{island}"), None);
    }
    set
}

fn bench_compute(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("compute_topology");
    for (name, layers, width, islands) in [
        ("tiny", 3, 2, 0),
        ("medium", 5, 6, 4),
        ("wide", 3, 20, 0),
        ("islands", 2, 4, 40),
    ] {
        let input = layered_network(layers, width, islands);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let snapshot = compute_topology(black_box(data), &config);
                black_box(snapshot.routes.len());
            });
        });
    }
    group.finish();
}

fn bench_cached(c: &mut Criterion) {
    let input = layered_network(5, 6, 4);
    let mut engine = TopologyEngine::new(Config::default());
    engine.compute(&input);
    c.bench_function("engine_cache_hit", |b| {
        b.iter(|| {
            let snapshot = engine.compute(black_box(&input));
            black_box(snapshot.graph.edges.len());
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_compute, bench_cached
);
criterion_main!(benches);
