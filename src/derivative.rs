//! Bourdet pressure derivative.
//!
//! The derivative `dP/d ln t` is estimated at each interior sample from the
//! nearest neighbours at least `window` natural-log units away on either side,
//! falling back to the series ends, and combined as a distance-weighted
//! average of the two one-sided slopes. End samples are zero, as is any
//! sample whose own spacing to a neighbour is not a finite log-time distance.

/// Window used on model curves.
pub const MODEL_DERIVATIVE_WINDOW: f64 = 0.1;

/// Window used when an observed file has no derivative column.
pub const OBSERVED_DERIVATIVE_WINDOW: f64 = 0.15;

/// Log-time spacing below which two samples are treated as coincident.
const MIN_LOG_SPACING: f64 = 1e-12;

/// Bourdet derivative of `pressure` with respect to `ln(time)`.
///
/// # Arguments
///
/// * `time` - Sample times; non-positive times yield 0 around them
/// * `pressure` - Pressure samples, same length as `time`
/// * `window` - Minimum log-time distance to each neighbour
///
/// # Returns
///
/// A vector of the same length as the shorter input. All zeros when fewer
/// than three samples are given.
pub fn bourdet_derivative(time: &[f64], pressure: &[f64], window: f64) -> Vec<f64> {
    let n = time.len().min(pressure.len());
    let mut derivative = vec![0.0; n];
    if n < 3 {
        return derivative;
    }

    let log_time: Vec<f64> = time[..n].iter().map(|t| t.ln()).collect();

    for i in 1..n - 1 {
        if !log_time[i].is_finite() {
            continue;
        }
        let mut j = i - 1;
        while j > 0 && log_time[i] - log_time[j] < window {
            j -= 1;
        }
        let mut k = i + 1;
        while k < n - 1 && log_time[k] - log_time[i] < window {
            k += 1;
        }

        let d1 = log_time[i] - log_time[j];
        let d2 = log_time[k] - log_time[i];
        let usable = |d: f64| d.is_finite() && d >= MIN_LOG_SPACING;
        if !(usable(d1) && usable(d2)) {
            continue;
        }

        let left_slope = (pressure[i] - pressure[j]) / d1;
        let right_slope = (pressure[k] - pressure[i]) / d2;
        derivative[i] = (left_slope * d2 + right_slope * d1) / (d1 + d2);
    }

    derivative
}
