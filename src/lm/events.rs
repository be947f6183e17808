//! Messages emitted by a running fit.
//!
//! Events arrive in order: one initial [`FitEvent::Iteration`], then per
//! outer iteration a [`FitEvent::Progress`] and, when a trial was accepted,
//! an [`FitEvent::Iteration`]; finally one more `Iteration` with
//! `is_final` set, carrying the high-precision curve, and a single
//! [`FitEvent::Finished`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lm::convergence::TerminationReason;
use crate::model::ModelCurve;
use crate::parameters::ParameterMap;

/// Snapshot of the committed state after an accepted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationUpdate {
    /// Outer iteration that produced this state; 0 for the starting point.
    pub iteration: usize,
    /// Mean squared residual, `SSE / residual count`, at the fit precision.
    /// The final update repeats the last committed value rather than the
    /// misfit of its high-precision curve.
    pub error: f64,
    pub parameters: ParameterMap,
    /// Model curve on the observed time grid.
    pub curve: ModelCurve,
    /// Set on the update emitted while finalizing.
    pub is_final: bool,
}

/// Outcome of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub parameters: ParameterMap,
    /// High-precision curve at the final parameters.
    pub curve: ModelCurve,
    /// Sum of squared residuals of the last committed iterate, at the fit
    /// precision.
    pub sse: f64,
    /// Mean squared residual matching `sse`.
    pub error: f64,
    /// Outer iterations performed.
    pub iterations: usize,
    /// Damping at termination.
    pub lambda: f64,
    pub reason: TerminationReason,
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "History match: {}", self.reason.description())?;
        writeln!(f, "  iterations: {}", self.iterations)?;
        writeln!(f, "  mean squared log residual: {:.6e}", self.error)?;
        writeln!(f, "  parameters:")?;
        for (key, value) in self.parameters.iter() {
            writeln!(f, "    {:<8} = {:.6e}", key.as_str(), value)?;
        }
        Ok(())
    }
}

/// A message from a running fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FitEvent {
    /// Start of outer iteration `iteration` (0-based) of `max_iterations`.
    Progress {
        iteration: usize,
        max_iterations: usize,
        fraction: f64,
    },
    Iteration(IterationUpdate),
    Finished(FitReport),
}
