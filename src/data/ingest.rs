//! Reading observed data from delimited text.
//!
//! Rows are split on commas (ASCII or full-width), spaces and tabs; runs of
//! separators count as one. Columns are picked by index through a
//! [`ColumnMapping`]. Rows whose time cell is missing, non-numeric or not
//! positive are skipped.

use std::fs;
use std::path::Path;

use log::info;
use nom::{
    bytes::complete::{take_till1, take_while, take_while1},
    combinator::all_consuming,
    multi::separated_list0,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::data::ObservedDataSet;
use crate::derivative::{bourdet_derivative, OBSERVED_DERIVATIVE_WINDOW};
use crate::error::{Result, WellTestError};

/// How the pressure column is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PressureMode {
    /// Absolute gauge pressure; the change is taken relative to the first
    /// data row carrying a pressure value.
    #[default]
    RawPressure,
    /// The column already holds the pressure change.
    PressureDifference,
}

/// Zero-based column indices and row handling for one data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub time: usize,
    pub pressure: Option<usize>,
    /// When absent, the derivative is computed with the Bourdet method.
    pub derivative: Option<usize>,
    /// Header rows to skip before data starts.
    pub skip_rows: usize,
    pub pressure_mode: PressureMode,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            time: 0,
            pressure: Some(1),
            derivative: None,
            skip_rows: 1,
            pressure_mode: PressureMode::RawPressure,
        }
    }
}

impl ColumnMapping {
    pub fn with_pressure_mode(mut self, mode: PressureMode) -> Self {
        self.pressure_mode = mode;
        self
    }

    pub fn with_skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn with_derivative_column(mut self, column: usize) -> Self {
        self.derivative = Some(column);
        self
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == '，' || c.is_whitespace()
}

fn cell(input: &str) -> IResult<&str, &str> {
    take_till1(is_separator).parse(input)
}

fn separators(input: &str) -> IResult<&str, &str> {
    take_while1(is_separator).parse(input)
}

/// Split one row into its non-empty cells.
fn row(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(take_while(is_separator), separated_list0(separators, cell)).parse(input)
}

/// Split a line into cells. Never fails: a line of separators has no cells.
pub fn split_row(line: &str) -> Vec<&str> {
    row(line).map(|(_, cells)| cells).unwrap_or_default()
}

/// Parse a whole cell as a finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    all_consuming(double::<&str, nom::error::Error<&str>>)
        .parse(text.trim())
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

/// Parse a list such as `"1e-3, 0.002，5"` into numbers.
///
/// # Errors
///
/// `Parse` naming the first cell that is not a number.
pub fn parse_value_list(text: &str) -> Result<Vec<f64>> {
    split_row(text)
        .into_iter()
        .map(|cell| {
            parse_number(cell)
                .ok_or_else(|| WellTestError::Parse(format!("'{}' is not a number", cell)))
        })
        .collect()
}

fn numeric_cell(cells: &[&str], column: usize) -> Option<f64> {
    cells.get(column).and_then(|cell| parse_number(cell))
}

/// Build an observed dataset from delimited text.
///
/// # Errors
///
/// `InvalidInput` when no row yields a usable sample.
pub fn ingest(text: &str, mapping: &ColumnMapping) -> Result<ObservedDataSet> {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(mapping.skip_rows)
        .map(split_row)
        .collect();

    let initial_pressure = mapping
        .pressure
        .and_then(|column| rows.iter().find_map(|cells| numeric_cell(cells, column)))
        .unwrap_or(0.0);

    let mut time = Vec::new();
    let mut pressure = Vec::new();
    let mut derivative = Vec::new();
    for cells in &rows {
        let t = match numeric_cell(cells, mapping.time) {
            Some(t) if t > 0.0 => t,
            _ => continue,
        };
        let p = mapping
            .pressure
            .and_then(|column| numeric_cell(cells, column))
            .unwrap_or(0.0);
        let p = match mapping.pressure_mode {
            PressureMode::RawPressure => (p - initial_pressure).abs(),
            PressureMode::PressureDifference => p,
        };
        time.push(t);
        pressure.push(p);
        if let Some(column) = mapping.derivative {
            derivative.push(numeric_cell(cells, column).unwrap_or(0.0));
        }
    }

    if time.is_empty() {
        return Err(WellTestError::InvalidInput(
            "no rows with a positive time value".to_string(),
        ));
    }
    if mapping.derivative.is_none() {
        derivative = bourdet_derivative(&time, &pressure, OBSERVED_DERIVATIVE_WINDOW);
    }

    let data = ObservedDataSet::new(time, pressure, derivative)?;
    info!(
        "ingested {} observed samples from {} data rows",
        data.len(),
        rows.len()
    );
    Ok(data)
}

/// Read and ingest a delimited text file.
pub fn ingest_file<P: AsRef<Path>>(path: P, mapping: &ColumnMapping) -> Result<ObservedDataSet> {
    let text = fs::read_to_string(path)?;
    ingest(&text, mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_split_row_handles_mixed_separators() {
        assert_eq!(split_row("1.5, 2\t3  4"), vec!["1.5", "2", "3", "4"]);
        assert_eq!(split_row("  ,a,,b, "), vec!["a", "b"]);
        assert_eq!(split_row("7，8"), vec!["7", "8"]);
        assert!(split_row(" \t ").is_empty());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1e-3"), Some(1e-3));
        assert_eq!(parse_number(" -2.5 "), Some(-2.5));
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("time"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_value_list() {
        let values = parse_value_list("1e-3, 0.002，5").unwrap();
        assert_eq!(values, vec![1e-3, 0.002, 5.0]);
        assert!(matches!(
            parse_value_list("1, two"),
            Err(WellTestError::Parse(_))
        ));
    }

    #[test]
    fn test_raw_pressure_is_converted_to_change() {
        let text = "t,p\n0.1,30.0\n0.2,29.5\n0.4,29.0\n0.8,28.2\n";
        let data = ingest(text, &ColumnMapping::default()).unwrap();
        assert_eq!(data.len(), 4);
        assert_relative_eq!(data.pressure()[0], 0.0);
        assert_relative_eq!(data.pressure()[3], 1.8, epsilon = 1e-12);
        assert_eq!(data.derivative().len(), 4);
    }

    #[test]
    fn test_derivative_column_and_bad_rows() {
        let text = "hours dp dpd\nunits MPa MPa\n\
                    0 1.0 1.0\n\
                    0.5 1.2 0.3\n\
                    x 1.3 0.3\n\
                    1.0 1.5 0.35\n";
        let mapping = ColumnMapping::default()
            .with_skip_rows(2)
            .with_pressure_mode(PressureMode::PressureDifference)
            .with_derivative_column(2);
        let data = ingest(text, &mapping).unwrap();
        assert_eq!(data.time(), &[0.5, 1.0]);
        assert_eq!(data.pressure(), &[1.2, 1.5]);
        assert_eq!(data.derivative(), &[0.3, 0.35]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = ingest("time,pressure\n", &ColumnMapping::default());
        assert!(matches!(err, Err(WellTestError::InvalidInput(_))));
    }
}
