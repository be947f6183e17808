//! Conversions between field units and dimensionless well-test variables.
//!
//! Field units: permeability in mD, time in hours, viscosity in mPa·s, total
//! compressibility in 1/MPa, lengths in metres, rate in m³/d, pressure in MPa.

/// Unit constant of the dimensionless time group.
pub const TIME_CONSTANT: f64 = 14.4;

/// Unit constant of the dimensionless pressure group.
pub const PRESSURE_CONSTANT: f64 = 1.842e-3;

/// `tD = 14.4·k·t / (φ·μ·Ct·L²)`.
///
/// Returns a non-finite value when the denominator vanishes. Callers treat
/// such samples as degenerate.
pub fn dimensionless_time(
    time: f64,
    permeability: f64,
    porosity: f64,
    viscosity: f64,
    compressibility: f64,
    length: f64,
) -> f64 {
    TIME_CONSTANT * permeability * time / (porosity * viscosity * compressibility * length * length)
}

/// Factor converting dimensionless pressure to MPa: `1.842e-3·q·μ·B / (k·h)`.
pub fn pressure_scale(
    rate: f64,
    viscosity: f64,
    volume_factor: f64,
    permeability: f64,
    thickness: f64,
) -> f64 {
    PRESSURE_CONSTANT * rate * viscosity * volume_factor / (permeability * thickness)
}

/// `count` times spaced evenly in log10 between `10^start_exp` and `10^end_exp`.
pub fn log_time_steps(count: usize, start_exp: f64, end_exp: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![10f64.powf(start_exp)],
        _ => {
            let step = (end_exp - start_exp) / (count - 1) as f64;
            (0..count)
                .map(|i| 10f64.powf(start_exp + step * i as f64))
                .collect()
        }
    }
}
