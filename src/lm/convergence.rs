//! Termination states of a history match.

use serde::{Deserialize, Serialize};

/// Why a fit stopped. Every reason still leads to a final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The residuals vanished or an accepted step no longer improved them.
    Converged,

    /// No damped trial improved the fit and the damping hit its ceiling.
    Diverged,

    /// The caller requested cancellation.
    Cancelled,

    /// The outer iteration budget ran out.
    MaxIterationsReached,

    /// No parameter was marked for fitting.
    NoFitParameters,
}

impl TerminationReason {
    /// Returns true if the fit ended at a point it could not improve.
    pub fn is_converged(&self) -> bool {
        matches!(self, TerminationReason::Converged)
    }

    /// Returns a description of the termination reason.
    pub fn description(&self) -> &'static str {
        match self {
            TerminationReason::Converged => "Converged: no further improvement of the match",
            TerminationReason::Diverged => "Stopped: damping exceeded its ceiling without progress",
            TerminationReason::Cancelled => "Stopped: cancelled by the caller",
            TerminationReason::MaxIterationsReached => "Stopped: maximum iterations reached",
            TerminationReason::NoFitParameters => "Skipped: no parameters selected for fitting",
        }
    }
}

/// Relative improvement test for accepted steps.
///
/// # Arguments
///
/// * `previous` - SSE before the step
/// * `current` - SSE after the step
/// * `ftol` - Relative tolerance
pub fn improvement_stalled(previous: f64, current: f64, ftol: f64) -> bool {
    if current == 0.0 {
        return true;
    }
    previous > 0.0 && (previous - current) / previous < ftol
}
