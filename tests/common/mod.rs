//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use welltest_rs::data::ObservedDataSet;
use welltest_rs::derivative::{bourdet_derivative, OBSERVED_DERIVATIVE_WINDOW};
use welltest_rs::model::{log_time_steps, ModelType, Precision};
use welltest_rs::parameters::{ParamKey, ParameterSet};

pub const MODEL: ModelType = ModelType::CompositeFracturedHorizontal;

/// Default composite parameters with the given overrides; nothing varies.
pub fn parameters(overrides: &[(ParamKey, f64)]) -> ParameterSet {
    let mut set = MODEL.default_parameters();
    for &(key, value) in overrides {
        set.set_value(key, value).unwrap();
    }
    set
}

/// Single-fracture truth used by the history-match tests.
pub fn single_fracture_truth() -> ParameterSet {
    parameters(&[
        (ParamKey::FractureCount, 1.0),
        (ParamKey::WellboreStorage, 1e-4),
        (ParamKey::Skin, 2.0),
    ])
}

/// 30 log-spaced times over five decades starting at 1e-3 h.
pub fn match_times() -> Vec<f64> {
    log_time_steps(30, -3.0, 2.0)
}

/// Synthetic observations: the model pressure at `precision` with a Bourdet
/// derivative taken over the observed-data window.
pub fn synthetic_observations(set: &ParameterSet, precision: Precision) -> ObservedDataSet {
    let times = match_times();
    let curve = MODEL.compute_curve(&set.to_map(), &times, precision).unwrap();
    let derivative = bourdet_derivative(&curve.time, &curve.pressure, OBSERVED_DERIVATIVE_WINDOW);
    ObservedDataSet::new(curve.time, curve.pressure, derivative).unwrap()
}

/// Mark `keys` for fitting.
pub fn vary(set: &mut ParameterSet, keys: &[ParamKey]) {
    for &key in keys {
        set.set_vary(key, true).unwrap();
    }
}
