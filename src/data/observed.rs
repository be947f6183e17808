//! Observed pressure-transient data.

use log::info;
use serde::{Deserialize, Serialize};

use crate::derivative::{bourdet_derivative, OBSERVED_DERIVATIVE_WINDOW};
use crate::error::{Result, WellTestError};

/// Measured pressure change and derivative against elapsed time.
///
/// Invariants: the three series have equal length, every time is positive
/// and finite, and times strictly increase. Samples violating the first two
/// are dropped on construction; a non-increasing series is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedDataSet {
    time: Vec<f64>,
    pressure: Vec<f64>,
    derivative: Vec<f64>,
}

impl ObservedDataSet {
    /// Build a dataset, dropping samples with a non-positive or non-finite
    /// time or a non-finite pressure or derivative.
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` when the series lengths differ
    /// * `InvalidInput` when the kept times do not strictly increase
    pub fn new(time: Vec<f64>, pressure: Vec<f64>, derivative: Vec<f64>) -> Result<Self> {
        if time.len() != pressure.len() || time.len() != derivative.len() {
            return Err(WellTestError::DimensionMismatch(format!(
                "time, pressure and derivative lengths differ: {}, {}, {}",
                time.len(),
                pressure.len(),
                derivative.len()
            )));
        }

        let total = time.len();
        let mut data = Self::default();
        for ((t, p), d) in time.into_iter().zip(pressure).zip(derivative) {
            if t > 0.0 && t.is_finite() && p.is_finite() && d.is_finite() {
                data.time.push(t);
                data.pressure.push(p);
                data.derivative.push(d);
            }
        }

        if let Some(i) = data.time.windows(2).position(|w| w[1] <= w[0]) {
            return Err(WellTestError::InvalidInput(format!(
                "observed times must strictly increase (sample {} is {} after {})",
                i + 1,
                data.time[i + 1],
                data.time[i]
            )));
        }

        if data.len() < total {
            info!(
                "dropped {} of {} observed samples with unusable values",
                total - data.len(),
                total
            );
        }
        Ok(data)
    }

    /// Build a dataset whose derivative is the Bourdet derivative of the
    /// pressure, with the window used for field data.
    pub fn with_bourdet_derivative(time: Vec<f64>, pressure: Vec<f64>) -> Result<Self> {
        if time.len() != pressure.len() {
            return Err(WellTestError::DimensionMismatch(format!(
                "time and pressure lengths differ: {}, {}",
                time.len(),
                pressure.len()
            )));
        }
        let usable = |t: &f64| *t > 0.0 && t.is_finite();
        let (time, pressure): (Vec<f64>, Vec<f64>) = time
            .into_iter()
            .zip(pressure)
            .filter(|(t, p)| usable(t) && p.is_finite())
            .unzip();
        let derivative = bourdet_derivative(&time, &pressure, OBSERVED_DERIVATIVE_WINDOW);
        Self::new(time, pressure, derivative)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn pressure(&self) -> &[f64] {
        &self.pressure
    }

    pub fn derivative(&self) -> &[f64] {
        &self.derivative
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
