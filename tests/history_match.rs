//! Integration tests for history matching against synthetic well tests.

mod common;

use approx::assert_relative_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use welltest_rs::data::ObservedDataSet;
use welltest_rs::lm::{
    CancellationToken, FitEvent, IterationUpdate, LevenbergMarquardt, ResidualEvaluator,
    TerminationReason,
};
use welltest_rs::model::Precision;
use welltest_rs::parameters::{ParamKey, ParameterSet};

use common::{single_fracture_truth, synthetic_observations, vary, MODEL};

const FITTED: [ParamKey; 3] = [
    ParamKey::InnerPermeability,
    ParamKey::Skin,
    ParamKey::WellboreStorage,
];

/// The truth moved away by the given factors on kf, S and cD.
fn perturbed_start(truth: &ParameterSet, factors: [f64; 3]) -> ParameterSet {
    let mut start = truth.clone();
    for (key, factor) in FITTED.iter().zip(factors) {
        let value = truth.value(*key).unwrap();
        start.set_value(*key, value * factor).unwrap();
    }
    vary(&mut start, &FITTED);
    start
}

fn updates(events: &[FitEvent]) -> Vec<&IterationUpdate> {
    events
        .iter()
        .filter_map(|event| match event {
            FitEvent::Iteration(update) => Some(update),
            _ => None,
        })
        .collect()
}

#[test]
fn test_residual_length_is_independent_of_parameters() {
    let truth = single_fracture_truth();
    let observed = synthetic_observations(&truth, Precision::Fast);
    let model = MODEL.forward_model().unwrap();
    let evaluator = ResidualEvaluator::new(model.as_ref(), &observed, 0.5).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..8 {
        let mut map = truth.to_map();
        map.set(ParamKey::InnerPermeability, 10f64.powf(rng.gen_range(-5.0..1.0)));
        map.set(ParamKey::Skin, rng.gen_range(0.0..20.0));
        map.set(ParamKey::WellboreStorage, 10f64.powf(rng.gen_range(-6.0..0.0)));
        let residuals = evaluator.residuals(&map, Precision::Fast).unwrap();
        assert_eq!(residuals.len(), 2 * observed.len());
    }
}

#[test]
fn test_exact_data_is_matched_at_the_start() {
    let truth = single_fracture_truth();
    let curve = MODEL
        .compute_curve(&truth.to_map(), &common::match_times(), Precision::Fast)
        .unwrap();
    let observed = ObservedDataSet::new(curve.time, curve.pressure, curve.derivative).unwrap();

    let mut start = truth.clone();
    vary(&mut start, &FITTED);
    let mut events = Vec::new();
    let report = LevenbergMarquardt::new()
        .fit(MODEL, &start, &observed, 0.5, &CancellationToken::new(), |e| events.push(e))
        .unwrap();

    assert_eq!(report.reason, TerminationReason::Converged);
    assert_eq!(report.iterations, 0);
    assert_eq!(report.parameters, truth.to_map());
    let first = updates(&events)[0];
    assert_eq!(first.error, 0.0);
}

#[test]
fn test_recovers_three_parameters() {
    let truth = single_fracture_truth();
    let observed = synthetic_observations(&truth, Precision::High);
    let start = perturbed_start(&truth, [1.5, 0.5, 1.5]);

    let report = LevenbergMarquardt::new()
        .fit(MODEL, &start, &observed, 0.5, &CancellationToken::new(), |_| {})
        .unwrap();

    assert!(report.reason.is_converged(), "{}", report);
    for key in FITTED {
        assert_relative_eq!(
            report.parameters.get(key).unwrap(),
            truth.value(key).unwrap(),
            max_relative = 0.05
        );
    }
    assert_eq!(report.curve.precision, Precision::High);
    assert_eq!(report.curve.len(), observed.len());
}

#[test]
fn test_iterates_stay_inside_bounds() {
    let truth = single_fracture_truth();
    let clean = synthetic_observations(&truth, Precision::High);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let noisy: Vec<f64> = clean
        .pressure()
        .iter()
        .map(|p| p * (1.0 + rng.gen_range(-0.05..0.05)))
        .collect();
    let observed = ObservedDataSet::with_bourdet_derivative(clean.time().to_vec(), noisy).unwrap();

    let kf = truth.value(ParamKey::InnerPermeability).unwrap();
    let mut start = perturbed_start(&truth, [1.2, 1.4, 0.8]);
    start.set_bounds(ParamKey::InnerPermeability, 0.9 * kf, 1.3 * kf).unwrap();
    start.set_bounds(ParamKey::Skin, 1.0, 3.0).unwrap();
    start.set_bounds(ParamKey::WellboreStorage, 5e-5, 2e-4).unwrap();

    let mut events = Vec::new();
    let report = LevenbergMarquardt::new()
        .fit(MODEL, &start, &observed, 0.5, &CancellationToken::new(), |e| events.push(e))
        .unwrap();

    let iterates = updates(&events);
    assert!(iterates.len() >= 2);
    for update in iterates {
        for key in FITTED {
            let value = update.parameters.get(key).unwrap();
            assert!(
                start.get(key).unwrap().bounds().is_within_bounds(value),
                "{} = {} left its box at iteration {}",
                key,
                value,
                update.iteration
            );
        }
        assert!(update.error.is_finite());
    }
    assert!(matches!(events.last(), Some(FitEvent::Finished(r)) if *r == report));
}

#[test]
fn test_cancellation_keeps_last_committed_iterate() {
    let truth = single_fracture_truth();
    let observed = synthetic_observations(&truth, Precision::High);
    let start = perturbed_start(&truth, [1.5, 0.5, 1.5]);

    let token = CancellationToken::new();
    let mut events = Vec::new();
    let report = LevenbergMarquardt::new()
        .fit(MODEL, &start, &observed, 0.5, &token, |event| {
            if let FitEvent::Iteration(update) = &event {
                if update.iteration >= 1 && !update.is_final {
                    token.cancel();
                }
            }
            events.push(event);
        })
        .unwrap();

    assert_eq!(report.reason, TerminationReason::Cancelled);
    let iterates = updates(&events);
    let committed: Vec<_> = iterates.iter().filter(|u| !u.is_final).collect();
    let last = committed.last().unwrap();
    assert!(last.iteration >= 1);
    assert_eq!(report.parameters, last.parameters);
    assert_eq!(report.iterations, last.iteration);

    let final_update = iterates.last().unwrap();
    assert!(final_update.is_final);
    assert_eq!(final_update.curve.precision, Precision::High);
    // nothing but the final update and the report follows the cancelled step
    let tail = events
        .iter()
        .rev()
        .take_while(|e| !matches!(e, FitEvent::Iteration(u) if !u.is_final))
        .count();
    assert_eq!(tail, 2);
}
