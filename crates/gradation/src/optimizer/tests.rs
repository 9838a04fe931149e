use std::time::Duration;

use approx::assert_relative_eq;

use crate::{
    blend::{InvalidProportionsError, ProportionVector},
    curve::{CurveError, GradationCurve},
    reference::{Band, ReferenceCurves},
    shilstone::{coarse_fraction, fine_fraction},
    sieve::Sieve,
};

use super::{OptimizationStatus, OptimizeError, OptimizerConfig, optimize};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Passes everything down to #8, nothing below.
fn coarse_sand() -> GradationCurve {
    let mut passing = [0.0; Sieve::COUNT];
    passing[..=Sieve::No8.index()].fill(100.0);
    GradationCurve::new(passing).unwrap()
}

/// Passes everything above #4, nothing from #4 down.
fn pea_gravel() -> GradationCurve {
    let mut passing = [0.0; Sieve::COUNT];
    passing[..Sieve::No4.index()].fill(100.0);
    GradationCurve::new(passing).unwrap()
}

fn gravel() -> GradationCurve {
    GradationCurve::new([
        100.0, 100.0, 95.0, 70.0, 35.0, 15.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    ])
    .unwrap()
}

fn sand() -> GradationCurve {
    GradationCurve::new([
        100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 96.0, 80.0, 62.0, 40.0, 17.0, 5.0, 1.5,
    ])
    .unwrap()
}

fn refs() -> ReferenceCurves {
    ReferenceCurves::new(25.0).unwrap()
}

fn assert_sums_to_one(proportions: &ProportionVector) {
    let sum: f64 = proportions.as_slice().iter().sum();
    assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    assert!(proportions.as_slice().iter().all(|p| (0.0..=1.0).contains(p)));
}

fn assert_non_increasing(history: &[f64]) {
    for pair in history.windows(2) {
        assert!(pair[1] <= pair[0], "error increased: {} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn gapped_curve_with_increasing_passing_is_rejected() {
    // Nothing passes above #4 but everything passes from #4 down.
    let mut passing = [100.0; Sieve::COUNT];
    passing[..Sieve::No4.index()].fill(0.0);

    assert!(matches!(
        GradationCurve::new(passing),
        Err(CurveError::NotMonotone {
            sieve: Sieve::No4,
            ..
        })
    ));
}

#[test]
fn two_aggregate_blend_converges_to_valid_proportions() {
    init_tracing();
    let config = OptimizerConfig::new(0.5, 200, 1e-6).unwrap();

    let result = optimize(&[coarse_sand(), pea_gravel()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::Converged);
    assert_sums_to_one(&result.proportions);
    assert!(result.score.power45.is_finite());
    assert!(result.score.tarantula.is_finite());
    assert_eq!(result.history.len(), result.iterations + 1);
    assert!(
        result
            .history
            .iter()
            .all(|s| s.power45.is_finite() && s.tarantula.is_finite())
    );
    let combined: Vec<f64> = result.history.iter().map(|s| s.combined).collect();
    assert_non_increasing(&combined);
}

#[test]
fn only_the_combined_error_is_monotone_along_the_history() {
    let config = OptimizerConfig::new(0.5, 200, 1e-6).unwrap();

    let result = optimize(&[coarse_sand(), pea_gravel()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::Converged);
    for score in &result.history {
        assert_relative_eq!(
            score.combined,
            score.power45 + 0.5 * score.tarantula,
            epsilon = 1e-9
        );
    }
    let combined: Vec<f64> = result.history.iter().map(|s| s.combined).collect();
    assert_non_increasing(&combined);

    // The search trades Tarantula error for a larger Power-45 gain.
    let first = result.history[0];
    let last = result.history[result.history.len() - 1];
    assert!(last.power45 < first.power45);
    assert!(
        result
            .history
            .windows(2)
            .any(|pair| pair[1].tarantula > pair[0].tarantula)
    );
}

#[test]
fn result_is_never_worse_than_the_start() {
    let result = optimize(&[gravel(), sand()], &refs(), &OptimizerConfig::default()).unwrap();

    let start = result.history[0].combined;
    assert!(result.score.combined <= start + 1e-9);
    assert!(result.iterations > 0);
    assert_relative_eq!(
        result.score.combined,
        result.score.power45 + 0.5 * result.score.tarantula,
        epsilon = 1e-9
    );
}

#[test]
fn optimization_is_deterministic() {
    let curves = [gravel(), sand(), coarse_sand()];
    let config = OptimizerConfig::default();

    let first = optimize(&curves, &refs(), &config).unwrap();
    let second = optimize(&curves, &refs(), &config).unwrap();

    assert_eq!(first, second);
}

#[test]
fn single_aggregate_takes_everything() {
    let result = optimize(&[sand()], &refs(), &OptimizerConfig::default()).unwrap();

    assert_eq!(result.status, OptimizationStatus::Converged);
    assert_eq!(result.proportions.as_slice(), &[1.0]);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.composite, sand());
}

#[test]
fn no_curves_is_an_error() {
    assert!(matches!(
        optimize(&[], &refs(), &OptimizerConfig::default()),
        Err(OptimizeError::InvalidProportions(
            InvalidProportionsError::Empty
        ))
    ));
}

#[test]
fn initial_guess_must_match_curves() {
    let config = OptimizerConfig::default()
        .with_initial_guess(ProportionVector::new(vec![0.2, 0.3, 0.5]).unwrap());

    assert!(matches!(
        optimize(&[gravel(), sand()], &refs(), &config),
        Err(OptimizeError::InvalidProportions(
            InvalidProportionsError::LengthMismatch {
                expected: 2,
                actual: 3
            }
        ))
    ));
}

#[test]
fn unreachable_total_is_infeasible() {
    let guess = ProportionVector::new(vec![0.4, 0.6]).unwrap();
    let config = OptimizerConfig::default()
        .with_bounds(vec![Band::new(0.6, 1.0), Band::new(0.6, 1.0)])
        .unwrap()
        .with_initial_guess(guess.clone());

    let result = optimize(&[gravel(), sand()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::Infeasible);
    assert_eq!(result.proportions, guess);
    assert_eq!(result.iterations, 0);
    assert_eq!(result.history, vec![result.score]);
}

#[test]
fn blend_without_fines_cannot_meet_shilstone_fractions() {
    let config = OptimizerConfig::default().with_shilstone_constraints(true);

    let result = optimize(&[gravel(), pea_gravel()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::Infeasible);
}

#[test]
fn shilstone_fractions_hold_at_the_result() {
    let config = OptimizerConfig::default().with_shilstone_constraints(true);

    let result = optimize(&[gravel(), sand()], &refs(), &config).unwrap();

    assert_ne!(result.status, OptimizationStatus::Infeasible);
    let fine = fine_fraction(&result.composite);
    assert!((24.0 - 1e-4..=34.0 + 1e-4).contains(&fine), "fine fraction {fine}");
    assert!(coarse_fraction(&result.composite) >= 15.0 - 1e-4);
}

#[test]
fn custom_bounds_limit_each_proportion() {
    let config = OptimizerConfig::default()
        .with_bounds(vec![Band::new(0.0, 0.3), Band::new(0.0, 1.0)])
        .unwrap();

    let result = optimize(&[gravel(), sand()], &refs(), &config).unwrap();

    assert!(result.proportions.as_slice()[0] <= 0.3 + 1e-6);
    assert_sums_to_one(&result.proportions);
}

#[test]
fn iteration_limit_keeps_best_so_far() {
    let config = OptimizerConfig::new(0.5, 1, 1e-12).unwrap();

    let result = optimize(&[gravel(), sand()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::IterationLimitReached);
    assert_eq!(result.iterations, 1);
    assert!(result.history[1].combined < result.history[0].combined);
}

#[test]
fn exhausted_time_budget_stops_before_the_first_step() {
    let config = OptimizerConfig::default().with_time_budget(Duration::ZERO);

    let result = optimize(&[gravel(), sand()], &refs(), &config).unwrap();

    assert_eq!(result.status, OptimizationStatus::IterationLimitReached);
    assert_eq!(result.iterations, 0);
    assert_relative_eq!(result.proportions.as_slice()[0], 0.5);
}
