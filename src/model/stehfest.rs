//! Gaver-Stehfest numerical inversion of Laplace transforms.
//!
//! `f(t) ≈ (ln 2 / t) · Σ_{m=1}^{N} V_m · F(m·ln 2 / t)` for even `N`. The
//! weights alternate in sign and grow quickly with `N`, so only small orders
//! (4 to 16) are useful in double precision.

use std::f64::consts::LN_2;

use crate::error::{Result, WellTestError};

/// Result of one inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplaceInversion {
    /// Time-domain value.
    pub value: f64,
    /// Laplace samples that were non-finite and replaced by zero.
    pub zeroed_samples: usize,
}

/// `n!` as a float, computed iteratively.
fn factorial(n: usize) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// The Stehfest weight `V_i` for order `n` (1-based `i`).
///
/// # Arguments
///
/// * `i` - Weight index, `1..=n`
/// * `n` - Even inversion order
pub fn coefficient(i: usize, n: usize) -> f64 {
    let half = n / 2;
    let lower = (i + 1) / 2;
    let upper = i.min(half);

    let mut sum = 0.0;
    for k in lower..=upper {
        let numerator = (k as f64).powi(half as i32) * factorial(2 * k);
        let denominator = factorial(half - k)
            * factorial(k)
            * factorial(k.saturating_sub(1))
            * factorial(i - k)
            * factorial(2 * k - i);
        if denominator != 0.0 {
            sum += numerator / denominator;
        }
    }

    if (i + half) % 2 == 0 {
        sum
    } else {
        -sum
    }
}

/// Stehfest inverter of a fixed even order with its weights precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct StehfestInverter {
    weights: Vec<f64>,
}

impl StehfestInverter {
    /// Create an inverter of order `n`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `n` is zero or odd.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 || n % 2 != 0 {
            return Err(WellTestError::InvalidInput(format!(
                "Stehfest order must be even and positive, got {}",
                n
            )));
        }
        let weights = (1..=n).map(|i| coefficient(i, n)).collect();
        Ok(Self { weights })
    }

    pub fn order(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Invert `laplace` at time `t > 0`.
    ///
    /// Non-finite transform samples contribute zero and are counted.
    pub fn invert<F: FnMut(f64) -> f64>(&self, mut laplace: F, t: f64) -> LaplaceInversion {
        let scale = LN_2 / t;
        let mut zeroed_samples = 0;
        let mut sum = 0.0;
        for (m, weight) in self.weights.iter().enumerate() {
            let sample = laplace((m + 1) as f64 * scale);
            if sample.is_finite() {
                sum += weight * sample;
            } else {
                zeroed_samples += 1;
            }
        }
        LaplaceInversion {
            value: sum * scale,
            zeroed_samples,
        }
    }
}

/// One-shot inversion of order `n` at time `t`.
pub fn invert<F: FnMut(f64) -> f64>(laplace: F, t: f64, n: usize) -> Result<LaplaceInversion> {
    Ok(StehfestInverter::new(n)?.invert(laplace, t))
}
