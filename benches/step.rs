use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use popsim::{
    generate, impute, oracle_set, popularity_counts, run_category, CategoryConfig,
    EstimateSource, PopulationSpec, Scope, SelectionPolicy, SimConfig,
};
use std::hint::black_box;

fn population(consumers: usize, services: usize) -> PopulationSpec {
    PopulationSpec {
        consumers,
        services,
        groups: 2,
        interest_std: services as f64 / 10.0,
        unknown_ratio: 0.1,
        seed: 7,
    }
}

fn bench_impute(c: &mut Criterion) {
    let mut group = c.benchmark_group("impute");
    for &(consumers, services) in &[(100usize, 20usize), (200, 40), (400, 40)] {
        let (_, initial) = generate(&population(consumers, services)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{consumers}x{services}")),
            &initial,
            |b, m| {
                b.iter(|| {
                    let filled = impute(black_box(m));
                    black_box(popularity_counts(&filled));
                })
            },
        );
    }
    group.finish();
}

fn bench_category_run(c: &mut Criterion) {
    let spec = population(100, 20);
    let (truth, initial) = generate(&spec).unwrap();
    let config = SimConfig {
        consumers: spec.consumers,
        services: spec.services,
        groups: spec.groups,
        network_capacity: 2,
        duration: 100,
        unknown_interests_ratio: spec.unknown_ratio,
        seed: 7,
    };

    let categories = [
        ("raw_topk", EstimateSource::Raw, SelectionPolicy::TopK),
        (
            "imputed_topk",
            EstimateSource::Imputed,
            SelectionPolicy::TopK,
        ),
        (
            "imputed_decaying",
            EstimateSource::Imputed,
            SelectionPolicy::DecayingEpsilonGreedy,
        ),
    ];

    let mut group = c.benchmark_group("category_run");
    for (name, source, policy) in categories {
        let cat = CategoryConfig {
            name: name.to_string(),
            policy,
            source,
            scope: Scope::Population,
            adaptive: true,
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let result =
                    run_category(black_box(&config), &cat, &truth, &initial, &mut |_| {})
                        .unwrap();
                black_box(result);
            })
        });
    }
    group.finish();
}

fn bench_oracle(c: &mut Criterion) {
    let (truth, _) = generate(&population(400, 40)).unwrap();
    c.bench_function("oracle_set_400x40", |b| {
        b.iter(|| black_box(oracle_set(black_box(&truth), 4)))
    });
}

criterion_group!(benches, bench_impute, bench_category_run, bench_oracle);
criterion_main!(benches);
