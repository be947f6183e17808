//! Finite-difference Jacobian of the log-space residuals.
//!
//! Each active parameter gets one column of central differences. Positive
//! parameters that are not linear keys are perturbed in log10 space, so their
//! column is the sensitivity per decade; the others are perturbed additively.
//! Perturbed maps always go through [`ParameterMap::with_value`], which keeps
//! derived parameters in step.

use log::warn;
use ndarray::{Array1, Array2};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::lm::config::DifferenceSteps;
use crate::lm::residuals::ResidualEvaluator;
use crate::model::Precision;
use crate::parameters::{ParamKey, ParameterMap};

/// Values above this are eligible for log-domain steps.
pub const LOG_DOMAIN_THRESHOLD: f64 = 1e-12;

/// Whether `key` at `value` is stepped and updated in log10 space.
pub fn uses_log_domain(key: ParamKey, value: f64) -> bool {
    value > LOG_DOMAIN_THRESHOLD && !key.is_linear()
}

/// Builds central-difference Jacobians for one evaluator.
pub struct JacobianBuilder<'a> {
    evaluator: &'a ResidualEvaluator<'a>,
    steps: DifferenceSteps,
    precision: Precision,
}

impl<'a> JacobianBuilder<'a> {
    pub fn new(
        evaluator: &'a ResidualEvaluator<'a>,
        steps: DifferenceSteps,
        precision: Precision,
    ) -> Self {
        Self {
            evaluator,
            steps,
            precision,
        }
    }

    /// The plus and minus perturbations of `key` and the divisor `2h`.
    fn perturb(&self, params: &ParameterMap, key: ParamKey) -> (ParameterMap, ParameterMap, f64) {
        let value = params.value_or_default(key);
        if uses_log_domain(key, value) {
            let h = self.steps.log_step;
            let log_value = value.log10();
            (
                params.with_value(key, 10f64.powf(log_value + h)),
                params.with_value(key, 10f64.powf(log_value - h)),
                2.0 * h,
            )
        } else {
            let h = self.steps.linear_step;
            (
                params.with_value(key, value + h),
                params.with_value(key, value - h),
                2.0 * h,
            )
        }
    }

    /// One Jacobian column. Left at zero when a perturbed residual vector
    /// does not match the expected length.
    fn column(&self, params: &ParameterMap, key: ParamKey, rows: usize) -> Result<Array1<f64>> {
        let (plus, minus, divisor) = self.perturb(params, key);
        let r_plus = self.evaluator.residuals(&plus, self.precision)?;
        let r_minus = self.evaluator.residuals(&minus, self.precision)?;

        if r_plus.len() != rows || r_minus.len() != rows {
            warn!(
                "residual length changed while perturbing '{}' ({} / {} instead of {}); column left at zero",
                key,
                r_plus.len(),
                r_minus.len(),
                rows
            );
            return Ok(Array1::zeros(rows));
        }
        Ok((r_plus - r_minus) / divisor)
    }

    /// Jacobian of the residuals with respect to `active` keys, one column
    /// per key in order.
    ///
    /// # Arguments
    ///
    /// * `params` - Point of linearization
    /// * `rows` - Length of the unperturbed residual vector
    /// * `active` - Keys being fitted
    pub fn build(&self, params: &ParameterMap, rows: usize, active: &[ParamKey]) -> Result<Array2<f64>> {
        #[cfg(feature = "parallel")]
        let columns: Result<Vec<Array1<f64>>> = active
            .par_iter()
            .map(|&key| self.column(params, key, rows))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let columns: Result<Vec<Array1<f64>>> = active
            .iter()
            .map(|&key| self.column(params, key, rows))
            .collect();

        let mut jacobian = Array2::zeros((rows, active.len()));
        for (j, column) in columns?.into_iter().enumerate() {
            jacobian.column_mut(j).assign(&column);
        }
        Ok(jacobian)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ObservedDataSet;
    use crate::error::WellTestError;
    use crate::model::{Degeneracy, ForwardModel, ModelCurve, ModelType};
    use approx::assert_relative_eq;

    /// P = kf·t + S, D = kf·t
    struct LinearToy;

    impl ForwardModel for LinearToy {
        fn model_type(&self) -> ModelType {
            ModelType::CompositeFracturedHorizontal
        }

        fn compute_curve(
            &self,
            params: &ParameterMap,
            times: &[f64],
            precision: Precision,
        ) -> Result<ModelCurve> {
            let kf = params.value_or_default(ParamKey::InnerPermeability);
            let skin = params.value_or_default(ParamKey::Skin);
            if kf < 0.0 {
                return Err(WellTestError::InvalidInput("negative kf".to_string()));
            }
            Ok(ModelCurve {
                time: times.to_vec(),
                pressure: times.iter().map(|t| kf * t + skin).collect(),
                derivative: times.iter().map(|t| kf * t).collect(),
                precision,
                diagnostics: Degeneracy::default(),
            })
        }
    }

    #[test]
    fn test_log_and_linear_columns() {
        let observed =
            ObservedDataSet::new(vec![1.0, 2.0, 4.0], vec![3.0, 5.0, 9.0], vec![2.0, 4.0, 8.0])
                .unwrap();
        let model = LinearToy;
        let evaluator = ResidualEvaluator::new(&model, &observed, 1.0).unwrap();
        let builder = JacobianBuilder::new(&evaluator, DifferenceSteps::default(), Precision::Fast);

        let params: ParameterMap = [(ParamKey::InnerPermeability, 2.0), (ParamKey::Skin, 1.0)]
            .into_iter()
            .collect();
        let rows = evaluator.residuals(&params, Precision::Fast).unwrap().len();
        let jac = builder
            .build(
                &params,
                rows,
                &[ParamKey::InnerPermeability, ParamKey::Skin],
            )
            .unwrap();

        assert_eq!(jac.dim(), (6, 2));
        // r = ln(obs) − ln(kf·t + S); per decade of kf: −ln10·kf·t/(kf·t + S)
        for (i, t) in [1.0, 2.0, 4.0].iter().enumerate() {
            let p = 2.0 * t + 1.0;
            assert_relative_eq!(
                jac[[i, 0]],
                -std::f64::consts::LN_10 * 2.0 * t / p,
                max_relative = 1e-3
            );
            assert_relative_eq!(jac[[i, 1]], -1.0 / p, max_relative = 1e-6);
        }
        // derivative channel has zero weight
        for i in 3..6 {
            assert_eq!(jac[[i, 0]], 0.0);
        }
    }

    /// P = 2·LfD·t, D = LfD·t; reads only the derived half-length.
    struct HalfLengthToy;

    impl ForwardModel for HalfLengthToy {
        fn model_type(&self) -> ModelType {
            ModelType::CompositeFracturedHorizontal
        }

        fn compute_curve(
            &self,
            params: &ParameterMap,
            times: &[f64],
            precision: Precision,
        ) -> Result<ModelCurve> {
            let lfd = params.value_or_default(ParamKey::FractureHalfLengthD);
            Ok(ModelCurve {
                time: times.to_vec(),
                pressure: times.iter().map(|t| 2.0 * lfd * t).collect(),
                derivative: times.iter().map(|t| lfd * t).collect(),
                precision,
                diagnostics: Degeneracy::default(),
            })
        }
    }

    #[test]
    fn test_columns_follow_derived_half_length() {
        let observed =
            ObservedDataSet::new(vec![1.0, 2.0, 4.0], vec![0.3, 0.6, 1.2], vec![0.15, 0.3, 0.6])
                .unwrap();
        let model = HalfLengthToy;
        let weight = 0.7;
        let evaluator = ResidualEvaluator::new(&model, &observed, weight).unwrap();
        let builder = JacobianBuilder::new(&evaluator, DifferenceSteps::default(), Precision::Fast);

        let params: ParameterMap = [
            (ParamKey::FractureHalfLength, 100.0),
            (ParamKey::WellLength, 800.0),
        ]
        .into_iter()
        .collect();
        let rows = evaluator.residuals(&params, Precision::Fast).unwrap().len();
        let jac = builder
            .build(
                &params,
                rows,
                &[ParamKey::FractureHalfLength, ParamKey::WellLength],
            )
            .unwrap();

        // r = w·(ln obs − ln LfD − ln t) with LfD = Lf/L: per decade of Lf the
        // column is −w·ln10, per decade of L it is +w·ln10
        let ln10 = std::f64::consts::LN_10;
        for i in 0..3 {
            assert_relative_eq!(jac[[i, 0]], -weight * ln10, max_relative = 1e-9);
            assert_relative_eq!(jac[[i, 1]], weight * ln10, max_relative = 1e-9);
            assert_relative_eq!(jac[[i + 3, 0]], -(1.0 - weight) * ln10, max_relative = 1e-9);
            assert_relative_eq!(jac[[i + 3, 1]], (1.0 - weight) * ln10, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_length_mismatch_leaves_zero_column() {
        let observed =
            ObservedDataSet::new(vec![1.0, 2.0], vec![3.0, 5.0], vec![2.0, 4.0]).unwrap();
        let model = LinearToy;
        let evaluator = ResidualEvaluator::new(&model, &observed, 0.5).unwrap();
        let builder = JacobianBuilder::new(&evaluator, DifferenceSteps::default(), Precision::Fast);
        let params: ParameterMap = [(ParamKey::InnerPermeability, 2.0)].into_iter().collect();

        let jac = builder
            .build(&params, 7, &[ParamKey::InnerPermeability])
            .unwrap();
        assert_eq!(jac.dim(), (7, 1));
        assert!(jac.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_step_domain() {
        assert!(uses_log_domain(ParamKey::InnerPermeability, 1e-3));
        assert!(!uses_log_domain(ParamKey::InnerPermeability, 0.0));
        assert!(!uses_log_domain(ParamKey::Skin, 2.0));
        assert!(!uses_log_domain(ParamKey::FractureCount, 4.0));
    }
}
