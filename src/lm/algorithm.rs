//! Levenberg-Marquardt history matching.
//!
//! The optimizer works on log-space residuals (see [`crate::lm::residuals`])
//! and moves positive parameters in decades. One outer iteration builds the
//! Jacobian once and then tries up to `max_trials` damped steps:
//!
//! - a trial that lowers the SSE is committed and the damping drops by
//!   `lambda_down_factor`;
//! - a trial that does not raises the damping by `lambda_up_factor`.
//!
//! The fit stops when an accepted step no longer improves the SSE by `ftol`
//! relative, when the damping passes `max_lambda` without progress, when
//! the iteration budget runs out, or when the caller cancels. Whatever the
//! reason, the committed parameters are re-evaluated at the final precision
//! and reported.

use log::{debug, info};
use ndarray::Array1;

use crate::data::ObservedDataSet;
use crate::error::Result;
use crate::lm::cancel::CancellationToken;
use crate::lm::config::FitConfig;
use crate::lm::convergence::{improvement_stalled, TerminationReason};
use crate::lm::events::{FitEvent, FitReport, IterationUpdate};
use crate::lm::residuals::{sum_of_squares, ResidualEvaluator};
use crate::lm::step::{apply_step, NormalEquations};
use crate::model::{ForwardModel, ModelCurve, ModelType};
use crate::parameters::{ParamKey, ParameterMap, ParameterSet};
use crate::utils::finite_difference::JacobianBuilder;

/// Committed point of the optimization.
struct FitState {
    parameters: ParameterMap,
    residuals: Array1<f64>,
    sse: f64,
    lambda: f64,
    iterations: usize,
}

impl FitState {
    fn error(&self) -> f64 {
        mean_square(self.sse, self.residuals.len())
    }

    fn commit(&mut self, parameters: ParameterMap, residuals: Array1<f64>, sse: f64) {
        self.parameters = parameters;
        self.residuals = residuals;
        self.sse = sse;
    }

    fn update(&self, curve: ModelCurve, is_final: bool) -> IterationUpdate {
        IterationUpdate {
            iteration: self.iterations,
            error: self.error(),
            parameters: self.parameters.clone(),
            curve,
            is_final,
        }
    }
}

fn mean_square(sse: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sse / count as f64
    }
}

/// Levenberg-Marquardt optimizer for pressure-transient models.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: FitConfig,
}

impl LevenbergMarquardt {
    /// Create an optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an optimizer with the given settings.
    pub fn with_config(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Set the maximum number of outer iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Fit `parameters` of the model `model_type` to `observed`.
    ///
    /// # Arguments
    ///
    /// * `model_type` - Model to fit; must be available
    /// * `parameters` - Starting values, bounds and fit selection
    /// * `observed` - Data to match
    /// * `weight` - Share of the pressure channel in `[0, 1]`
    /// * `cancel` - Polled at the start of each outer iteration
    /// * `on_event` - Receives progress, accepted iterations and the report
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` for a model without a forward solution, and
    /// `InvalidInput` for an unusable configuration, weight or dataset.
    pub fn fit<F>(
        &self,
        model_type: ModelType,
        parameters: &ParameterSet,
        observed: &ObservedDataSet,
        weight: f64,
        cancel: &CancellationToken,
        on_event: F,
    ) -> Result<FitReport>
    where
        F: FnMut(FitEvent),
    {
        let model = model_type.forward_model()?;
        self.fit_model(model.as_ref(), parameters, observed, weight, cancel, on_event)
    }

    /// Same as [`fit`](Self::fit) for an arbitrary forward model.
    pub fn fit_model<F>(
        &self,
        model: &dyn ForwardModel,
        parameters: &ParameterSet,
        observed: &ObservedDataSet,
        weight: f64,
        cancel: &CancellationToken,
        mut on_event: F,
    ) -> Result<FitReport>
    where
        F: FnMut(FitEvent),
    {
        self.config.validate()?;
        let evaluator = ResidualEvaluator::new(model, observed, weight)?;
        let active = parameters.active_keys();

        let start = parameters.to_map();
        let (residuals, curve) = evaluator.residuals_with_curve(&start, self.config.fit_precision)?;
        let sse = sum_of_squares(&residuals);
        let mut state = FitState {
            parameters: start,
            residuals,
            sse,
            lambda: self.config.initial_lambda,
            iterations: 0,
        };
        info!(
            "history match of {} on {} samples, fitting {:?}; initial error {:.6e}",
            model.model_type(),
            observed.len(),
            active,
            state.error()
        );
        on_event(FitEvent::Iteration(state.update(curve, false)));

        let reason = if active.is_empty() {
            TerminationReason::NoFitParameters
        } else if state.sse == 0.0 {
            TerminationReason::Converged
        } else {
            self.iterate(&evaluator, parameters, &active, &mut state, cancel, &mut on_event)?
        };

        self.finalize(&evaluator, state, reason, &mut on_event)
    }

    /// Outer iterations until a termination condition holds.
    fn iterate<F>(
        &self,
        evaluator: &ResidualEvaluator<'_>,
        set: &ParameterSet,
        active: &[ParamKey],
        state: &mut FitState,
        cancel: &CancellationToken,
        on_event: &mut F,
    ) -> Result<TerminationReason>
    where
        F: FnMut(FitEvent),
    {
        let config = &self.config;
        let jacobian = JacobianBuilder::new(evaluator, config.steps, config.fit_precision);

        for iteration in 0..config.max_iterations {
            if cancel.is_cancelled() {
                info!("history match cancelled before iteration {}", iteration + 1);
                return Ok(TerminationReason::Cancelled);
            }
            on_event(FitEvent::Progress {
                iteration,
                max_iterations: config.max_iterations,
                fraction: iteration as f64 / config.max_iterations as f64,
            });
            state.iterations = iteration + 1;

            let jac = jacobian.build(&state.parameters, state.residuals.len(), active)?;
            let normal = NormalEquations::new(&jac, &state.residuals);

            let mut accepted = false;
            for trial in 0..config.max_trials {
                let step = normal.damped_step(state.lambda);
                let candidate = apply_step(&state.parameters, set, active, &step.x);
                let (residuals, curve) =
                    evaluator.residuals_with_curve(&candidate, config.fit_precision)?;
                let sse = sum_of_squares(&residuals);

                if sse.is_finite() && sse < state.sse {
                    let previous = state.sse;
                    state.commit(candidate, residuals, sse);
                    state.lambda *= config.lambda_down_factor;
                    debug!(
                        "iteration {} trial {}: accepted, sse {:.6e} -> {:.6e}, lambda {:.3e}",
                        state.iterations, trial, previous, sse, state.lambda
                    );
                    on_event(FitEvent::Iteration(state.update(curve, false)));
                    if improvement_stalled(previous, sse, config.ftol) {
                        return Ok(TerminationReason::Converged);
                    }
                    accepted = true;
                    break;
                }

                state.lambda *= config.lambda_up_factor;
                debug!(
                    "iteration {} trial {}: rejected sse {:.6e}, lambda {:.3e}",
                    state.iterations, trial, sse, state.lambda
                );
            }

            if !accepted && state.lambda > config.max_lambda {
                return Ok(TerminationReason::Diverged);
            }
        }

        Ok(TerminationReason::MaxIterationsReached)
    }

    /// Re-evaluate the committed parameters at the final precision and emit
    /// the closing events. The reported error stays the committed one, taken
    /// at the fit precision the iterations compared against.
    fn finalize<F>(
        &self,
        evaluator: &ResidualEvaluator<'_>,
        mut state: FitState,
        reason: TerminationReason,
        on_event: &mut F,
    ) -> Result<FitReport>
    where
        F: FnMut(FitEvent),
    {
        state.parameters.recompute_dependents();
        let curve = evaluator.curve(&state.parameters, self.config.final_precision)?;

        on_event(FitEvent::Iteration(state.update(curve.clone(), true)));

        let report = FitReport {
            parameters: state.parameters.clone(),
            curve,
            sse: state.sse,
            error: state.error(),
            iterations: state.iterations,
            lambda: state.lambda,
            reason,
        };
        info!(
            "history match finished after {} iterations: {} (error {:.6e})",
            report.iterations,
            reason.description(),
            report.error
        );
        on_event(FitEvent::Finished(report.clone()));
        Ok(report)
    }
}
