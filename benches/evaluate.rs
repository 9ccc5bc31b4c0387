use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

use helioseries::planets::{Accuracy, PlanetHecc, PlanetTables};
use helioseries::series::{ErrorMode, TruncationEngine, TruncationVector};
use helioseries::time::ObservationTime;

/// Raw series sums of Earth's longitude, full and low truncations
fn bench_series_evaluation(c: &mut Criterion) {
    let tables = PlanetTables::earth().expect("bundled tables");
    let engine = TruncationEngine::default();
    let full = TruncationVector::full(tables.l());
    let low = TruncationVector::new(vec![27, 15, 8, 4, 3, 1]);

    c.bench_function("evaluate/earth_l_full", |b| {
        b.iter(|| engine.evaluate(tables.l(), &full, black_box(-0.0072)))
    });
    c.bench_function("evaluate/earth_l_low", |b| {
        b.iter(|| engine.evaluate(tables.l(), &low, black_box(-0.0072)))
    });
}

/// Uncached facade access: the clock moves before every read
fn bench_facade(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let clock = Rc::new(ObservationTime::from_jde(2451545.0).expect("valid jde"));
    let mut earth = PlanetHecc::earth(Rc::clone(&clock)).expect("bundled earth");
    earth.set_accuracy(Accuracy::Low).expect("low preset");

    c.bench_function("facade/earth_sc_moving_clock", |b| {
        b.iter_batched(
            || 2451545.0 + rng.gen_range(-36525.0..36525.0),
            |jde| {
                clock.set_jde(jde).expect("finite jde");
                earth.sc().expect("evaluation")
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("facade/earth_sc_cached", |b| b.iter(|| earth.sc()));
}

/// Greedy truncation search over the full R series
fn bench_truncation_search(c: &mut Criterion) {
    let tables = PlanetTables::earth().expect("bundled tables");
    let engine = TruncationEngine::default();

    for mode in [ErrorMode::Worst, ErrorMode::Mean, ErrorMode::Safe] {
        c.bench_function(&format!("make_truncation_nums/earth_r_{}", mode), |b| {
            b.iter(|| engine.make_truncation_nums(tables.r(), black_box(1e-7), mode))
        });
    }
}

criterion_group!(
    benches,
    bench_series_evaluation,
    bench_facade,
    bench_truncation_search
);
criterion_main!(benches);
