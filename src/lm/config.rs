//! Configuration options for the Levenberg-Marquardt history match.
//!
//! The defaults reproduce the classic interpretation workflow: a fast
//! inversion order while iterating, a high one for the reported curve, a
//! damping factor that shrinks tenfold on success and grows tenfold on
//! failure, and a hard ceiling on damping that signals divergence.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WellTestError};
use crate::model::Precision;

/// Finite-difference steps used to build the Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferenceSteps {
    /// Central-difference half step in decades for log-domain parameters.
    pub log_step: f64,
    /// Additive half step for linear or non-positive parameters.
    pub linear_step: f64,
}

impl Default for DifferenceSteps {
    fn default() -> Self {
        Self {
            log_step: 0.01,
            linear_step: 1e-4,
        }
    }
}

/// Configuration options for the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of outer iterations. Default: 50
    pub max_iterations: usize,

    /// Damped trials per outer iteration. Default: 5
    pub max_trials: usize,

    /// Initial value for the damping parameter. Default: 0.01
    pub initial_lambda: f64,

    /// Factor by which to increase lambda after a rejected trial. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda after an accepted trial. Default: 0.1
    pub lambda_down_factor: f64,

    /// Damping above which an iteration without progress ends the fit. Default: 1e10
    pub max_lambda: f64,

    /// Relative SSE improvement below which an accepted step counts as converged. Default: 1e-10
    pub ftol: f64,

    /// Finite-difference steps for the Jacobian.
    pub steps: DifferenceSteps,

    /// Inversion accuracy while iterating. Default: Fast
    pub fit_precision: Precision,

    /// Inversion accuracy of the final reported curve. Default: High
    pub final_precision: Precision,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            max_trials: 5,
            initial_lambda: 0.01,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            max_lambda: 1e10,
            ftol: 1e-10,
            steps: DifferenceSteps::default(),
            fit_precision: Precision::Fast,
            final_precision: Precision::High,
        }
    }
}

impl FitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }

    pub fn with_initial_lambda(mut self, lambda: f64) -> Self {
        self.initial_lambda = lambda;
        self
    }

    pub fn with_max_lambda(mut self, lambda: f64) -> Self {
        self.max_lambda = lambda;
        self
    }

    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    pub fn with_steps(mut self, steps: DifferenceSteps) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_fit_precision(mut self, precision: Precision) -> Self {
        self.fit_precision = precision;
        self
    }

    pub fn with_final_precision(mut self, precision: Precision) -> Self {
        self.final_precision = precision;
        self
    }

    /// Check that the settings describe a usable damping schedule.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(WellTestError::InvalidInput(format!(
                    "{} must be positive and finite, got {}",
                    name, v
                )))
            }
        };
        positive("initial_lambda", self.initial_lambda)?;
        positive("max_lambda", self.max_lambda)?;
        positive("steps.log_step", self.steps.log_step)?;
        positive("steps.linear_step", self.steps.linear_step)?;
        if self.lambda_up_factor <= 1.0 {
            return Err(WellTestError::InvalidInput(format!(
                "lambda_up_factor must exceed 1, got {}",
                self.lambda_up_factor
            )));
        }
        if !(self.lambda_down_factor > 0.0 && self.lambda_down_factor < 1.0) {
            return Err(WellTestError::InvalidInput(format!(
                "lambda_down_factor must lie in (0, 1), got {}",
                self.lambda_down_factor
            )));
        }
        if self.max_trials == 0 {
            return Err(WellTestError::InvalidInput(
                "max_trials must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON string; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: FitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
