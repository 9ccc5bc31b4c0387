//! Randomized properties of the truncation engine over the bundled Earth tables

use helioseries::planets::PlanetTables;
use helioseries::series::{ErrorMode, SeriesModel, TruncationConfig, TruncationEngine, TruncationVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::sync::Arc;

const MODES: [ErrorMode; 3] = [ErrorMode::Worst, ErrorMode::Mean, ErrorMode::Safe];

fn models() -> Vec<Arc<SeriesModel>> {
    let tables = PlanetTables::earth().unwrap();
    vec![
        Arc::clone(tables.l()),
        Arc::clone(tables.b()),
        Arc::clone(tables.r()),
    ]
}

fn random_truncation(rng: &mut StdRng, model: &SeriesModel) -> TruncationVector {
    TruncationVector::new(
        model
            .term_counts()
            .into_iter()
            .map(|n| rng.gen_range(0..=n))
            .collect(),
    )
}

#[test]
fn test_more_terms_never_raise_the_estimate() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0001);
    let engine = TruncationEngine::default();

    for model in models() {
        let counts = model.term_counts();
        for _ in 0..200 {
            let coarse = random_truncation(&mut rng, &model);
            let fine = TruncationVector::new(
                coarse
                    .as_slice()
                    .iter()
                    .zip(&counts)
                    .map(|(&k, &n)| rng.gen_range(k..=n))
                    .collect(),
            );

            for mode in MODES {
                let coarse_error = engine.estimate_max_error(&model, &coarse, mode).unwrap();
                let fine_error = engine.estimate_max_error(&model, &fine, mode).unwrap();
                assert!(
                    fine_error <= coarse_error + 1e-15,
                    "{} -> {} raised the {} estimate from {} to {}",
                    coarse,
                    fine,
                    mode,
                    coarse_error,
                    fine_error
                );
            }
        }
    }
}

#[test]
fn test_mean_never_exceeds_worst_and_safe_never_undercuts_it() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0002);
    let engine = TruncationEngine::default();

    for model in models() {
        for _ in 0..100 {
            let truncation = random_truncation(&mut rng, &model);
            let worst = engine.estimate_max_error(&model, &truncation, ErrorMode::Worst).unwrap();
            let mean = engine.estimate_max_error(&model, &truncation, ErrorMode::Mean).unwrap();
            let safe = engine.estimate_max_error(&model, &truncation, ErrorMode::Safe).unwrap();
            assert!(mean <= worst + 1e-15);
            assert!(worst <= safe);
        }
    }
}

#[rstest]
#[case(ErrorMode::Worst, 1.005e-5)]
#[case(ErrorMode::Worst, 2.95e-7)]
#[case(ErrorMode::Worst, 4.5e-8)]
#[case(ErrorMode::Safe, 2.005e-5)]
#[case(ErrorMode::Safe, 5.05e-7)]
fn test_greedy_truncation_is_minimal(#[case] mode: ErrorMode, #[case] max_error: f64) {
    let engine = TruncationEngine::default();

    for model in models() {
        let truncation = engine.make_truncation_nums(&model, max_error, mode).unwrap();
        let error = engine.estimate_max_error(&model, &truncation, mode).unwrap();
        assert!(error <= max_error);

        // Dropping the last kept term of any degree breaks the budget
        for d in 0..truncation.len() {
            if truncation.get(d) == 0 {
                continue;
            }
            let mut counts = truncation.as_slice().to_vec();
            counts[d] -= 1;
            let smaller = TruncationVector::new(counts);
            let smaller_error = engine.estimate_max_error(&model, &smaller, mode).unwrap();
            assert!(
                smaller_error > max_error,
                "{} still meets {:e} with {:e}",
                smaller,
                max_error,
                smaller_error
            );
        }
    }
}

#[test]
fn test_zero_budget_keeps_everything() {
    let engine = TruncationEngine::default();
    for model in models() {
        for mode in MODES {
            let truncation = engine.make_truncation_nums(&model, 0.0, mode).unwrap();
            assert_eq!(truncation, TruncationVector::full(&model));
        }
    }
}

#[test]
fn test_truncated_value_within_worst_bound_of_full_value() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0003);
    let engine = TruncationEngine::default();

    for model in models() {
        let full = TruncationVector::full(&model);
        for _ in 0..200 {
            let truncation = random_truncation(&mut rng, &model);
            let tau: f64 = rng.gen_range(-1.0..=1.0);

            let exact = engine.evaluate(&model, &full, tau).unwrap();
            let approx = engine.evaluate(&model, &truncation, tau).unwrap();
            let bound = engine
                .estimate_max_error(&model, &truncation, ErrorMode::Worst)
                .unwrap();
            assert!(
                (exact - approx).abs() <= bound + 1e-9,
                "{} at tau = {}: |{} - {}| > {}",
                truncation,
                tau,
                exact,
                approx,
                bound
            );
        }
    }
}

#[test]
fn test_wider_domain_needs_more_terms() {
    let narrow = TruncationEngine::default();
    let wide = TruncationEngine::new(TruncationConfig::new(4.0, 2.0).unwrap());

    for model in models() {
        let a = narrow.make_truncation_nums(&model, 1e-6, ErrorMode::Worst).unwrap();
        let b = wide.make_truncation_nums(&model, 1e-6, ErrorMode::Worst).unwrap();
        assert!(a.total_terms() <= b.total_terms());
    }
}
