//! Spine stepping benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use spine_kinetics::{SimConfig, Spine, SpinePopulation};

fn bench_spine_step(c: &mut Criterion) {
    let mut spine = Spine::new(SimConfig::default()).unwrap();

    c.bench_function("spine_step_1ms", |b| {
        b.iter(|| {
            spine.step();
            black_box(spine.readout())
        })
    });
}

fn bench_spine_step_dapk1(c: &mut Criterion) {
    let config = SimConfig {
        use_dapk1: true,
        ..Default::default()
    };
    let mut spine = Spine::new(config).unwrap();

    c.bench_function("spine_step_1ms_dapk1", |b| {
        b.iter(|| {
            spine.step();
            black_box(spine.readout())
        })
    });
}

fn bench_population_step(c: &mut Criterion) {
    let mut population = SpinePopulation::new(&SimConfig::default(), 64).unwrap();

    c.bench_function("population_64_step_1ms", |b| {
        b.iter(|| {
            population.step();
            black_box(population.len())
        })
    });
}

criterion_group!(
    benches,
    bench_spine_step,
    bench_spine_step_dapk1,
    bench_population_step,
);
criterion_main!(benches);
