//! Damped Gauss-Newton steps and bounded parameter updates.

use log::warn;
use ndarray::{Array1, Array2};

use crate::parameters::{ParamKey, ParameterMap, ParameterSet};
use crate::utils::finite_difference::uses_log_domain;
use crate::utils::linear_solver::{solve_symmetric, LinearSolution};

/// Gradient and Gauss-Newton Hessian of `½‖r‖²`.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    /// `Jᵀ·r`
    pub gradient: Array1<f64>,
    /// `Jᵀ·J`, symmetric
    pub hessian: Array2<f64>,
}

impl NormalEquations {
    /// Assemble from a Jacobian and residuals. Only the lower triangle of
    /// `JᵀJ` is accumulated; the upper one is mirrored from it.
    pub fn new(jacobian: &Array2<f64>, residuals: &Array1<f64>) -> Self {
        let n = jacobian.ncols();
        let gradient = jacobian.t().dot(residuals);
        let mut hessian = Array2::zeros((n, n));
        for i in 0..n {
            let ci = jacobian.column(i);
            for j in 0..=i {
                let value = ci.dot(&jacobian.column(j));
                hessian[[i, j]] = value;
                hessian[[j, i]] = value;
            }
        }
        Self { gradient, hessian }
    }

    /// Solve `(H + λ·diag(1 + |H_ii|))·Δ = −g`.
    pub fn damped_step(&self, lambda: f64) -> LinearSolution {
        let mut damped = self.hessian.clone();
        for i in 0..damped.nrows() {
            damped[[i, i]] += lambda * (1.0 + self.hessian[[i, i]].abs());
        }
        let rhs = -&self.gradient;
        let solution = solve_symmetric(&damped, &rhs);
        if solution.method.is_fallback() {
            warn!(
                "damped normal equations were singular at lambda = {:e}; using {:?}",
                lambda, solution.method
            );
        }
        solution
    }
}

/// Apply `step` to the active keys of `current`.
///
/// Log-domain keys move by `step` decades, the others additively. Every new
/// value is clamped into its box from `set`, and dependents are recomputed.
pub fn apply_step(
    current: &ParameterMap,
    set: &ParameterSet,
    active: &[ParamKey],
    step: &Array1<f64>,
) -> ParameterMap {
    let mut next = current.clone();
    for (&key, &delta) in active.iter().zip(step.iter()) {
        let old = current.value_or_default(key);
        let proposed = if uses_log_domain(key, old) {
            10f64.powf(old.log10() + delta)
        } else {
            old + delta
        };
        let bounded = match set.get(key) {
            Some(parameter) => parameter.bounds().clamp(proposed),
            None => proposed,
        };
        next.set(key, bounded);
    }
    next.recompute_dependents();
    next
}
