//! Log-space residuals between observed data and a model curve.
//!
//! The residual vector stacks a pressure channel and a derivative channel:
//!
//! ```text
//! r = [ w·(ln p_obs − ln p_model) ... , (1 − w)·(ln d_obs − ln d_model) ... ]
//! ```
//!
//! A sample with either value at or below `1e-10` contributes zero instead of
//! being dropped, so the vector length depends only on the observed dataset.

use ndarray::Array1;

use crate::data::ObservedDataSet;
use crate::error::{Result, WellTestError};
use crate::model::{ForwardModel, ModelCurve, Precision};
use crate::parameters::ParameterMap;

/// Values at or below this are excluded from the logarithmic misfit.
const MIN_LOG_VALUE: f64 = 1e-10;

fn log_misfit(observed: f64, model: f64, weight: f64) -> f64 {
    if observed > MIN_LOG_VALUE && model > MIN_LOG_VALUE {
        weight * (observed.ln() - model.ln())
    } else {
        0.0
    }
}

/// Stack the weighted pressure and derivative residuals of `curve` against
/// `observed`.
pub fn log_residuals(observed: &ObservedDataSet, curve: &ModelCurve, weight: f64) -> Array1<f64> {
    let count = observed.len().min(curve.pressure.len());
    let derivative_count = observed
        .derivative()
        .len()
        .min(curve.derivative.len())
        .min(count);

    let pressure = observed.pressure()[..count]
        .iter()
        .zip(&curve.pressure[..count])
        .map(|(&obs, &model)| log_misfit(obs, model, weight));
    let derivative = observed.derivative()[..derivative_count]
        .iter()
        .zip(&curve.derivative[..derivative_count])
        .map(|(&obs, &model)| log_misfit(obs, model, 1.0 - weight));

    pressure.chain(derivative).collect()
}

/// Sum of squared residuals.
pub fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.dot(residuals)
}

/// Evaluates residuals of a forward model against one observed dataset.
pub struct ResidualEvaluator<'a> {
    model: &'a dyn ForwardModel,
    observed: &'a ObservedDataSet,
    weight: f64,
}

impl<'a> ResidualEvaluator<'a> {
    /// Create an evaluator.
    ///
    /// # Arguments
    ///
    /// * `model` - Forward model to evaluate
    /// * `observed` - Observed data; its times are the evaluation grid
    /// * `weight` - Share of the pressure channel, in `[0, 1]`
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty dataset or a weight outside `[0, 1]`.
    pub fn new(
        model: &'a dyn ForwardModel,
        observed: &'a ObservedDataSet,
        weight: f64,
    ) -> Result<Self> {
        if observed.is_empty() {
            return Err(WellTestError::InvalidInput(
                "observed dataset is empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(WellTestError::InvalidInput(format!(
                "pressure weight must lie in [0, 1], got {}",
                weight
            )));
        }
        Ok(Self {
            model,
            observed,
            weight,
        })
    }

    pub fn observed(&self) -> &ObservedDataSet {
        self.observed
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Forward curve on the observed time grid.
    pub fn curve(&self, params: &ParameterMap, precision: Precision) -> Result<ModelCurve> {
        self.model
            .compute_curve(params, self.observed.time(), precision)
    }

    /// Residual vector at `params`.
    pub fn residuals(&self, params: &ParameterMap, precision: Precision) -> Result<Array1<f64>> {
        let curve = self.curve(params, precision)?;
        Ok(log_residuals(self.observed, &curve, self.weight))
    }

    /// Residual vector and the curve it came from.
    pub fn residuals_with_curve(
        &self,
        params: &ParameterMap,
        precision: Precision,
    ) -> Result<(Array1<f64>, ModelCurve)> {
        let curve = self.curve(params, precision)?;
        let residuals = log_residuals(self.observed, &curve, self.weight);
        Ok((residuals, curve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Degeneracy;
    use approx::assert_relative_eq;

    fn curve(pressure: Vec<f64>, derivative: Vec<f64>) -> ModelCurve {
        ModelCurve {
            time: (1..=pressure.len()).map(|i| i as f64).collect(),
            pressure,
            derivative,
            precision: Precision::Fast,
            diagnostics: Degeneracy::default(),
        }
    }

    #[test]
    fn test_channels_are_weighted() {
        let observed = ObservedDataSet::new(
            vec![1.0, 2.0],
            vec![std::f64::consts::E, 1.0],
            vec![1.0, 1.0],
        )
        .unwrap();
        let model = curve(vec![1.0, 1.0], vec![1.0, std::f64::consts::E]);
        let r = log_residuals(&observed, &model, 0.25);
        assert_eq!(r.len(), 4);
        assert_relative_eq!(r[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(r[1], 0.0);
        assert_relative_eq!(r[2], 0.0);
        assert_relative_eq!(r[3], -0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_non_positive_values_contribute_zero_without_shortening() {
        let observed =
            ObservedDataSet::new(vec![1.0, 2.0, 3.0], vec![0.0, 2.0, 3.0], vec![0.0, 1.0, 0.0])
                .unwrap();
        let model = curve(vec![1.0, -1.0, 3.0], vec![0.0, 1.0, 0.0]);
        let r = log_residuals(&observed, &model, 0.5);
        assert_eq!(r.len(), 6);
        assert_eq!(r[0], 0.0);
        assert_eq!(r[1], 0.0);
        assert_eq!(r[2], 0.0);
        assert_eq!(r[3], 0.0);
    }

    #[test]
    fn test_length_follows_shorter_series() {
        let observed =
            ObservedDataSet::new(vec![1.0, 2.0, 3.0], vec![1.0; 3], vec![1.0; 3]).unwrap();
        let model = curve(vec![1.0, 1.0], vec![1.0]);
        assert_eq!(log_residuals(&observed, &model, 0.5).len(), 3);
        assert_relative_eq!(sum_of_squares(&Array1::from(vec![3.0, 4.0])), 25.0);
    }
}
