//! Parameter-table export.

use std::fs;
use std::io;
use std::path::Path;

use csv::Writer;

use crate::error::{Result, WellTestError};
use crate::parameters::{ParamKey, ParameterMap, ParameterSet};

const SIGNIFICANT_DIGITS: usize = 10;

/// One exported parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    pub name: &'static str,
    pub symbol: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

/// Format `value` with `digits` significant digits, switching to scientific
/// notation for very small or very large magnitudes. Trailing zeros are
/// dropped.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{}", value);
    }
    let digits = digits.max(1);
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -5 || exponent >= digits as i32 {
        let text = format!("{:.*e}", digits - 1, value);
        match text.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
            None => text,
        }
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Rows for every parameter of `set`, in display order, with values taken
/// from `values` when present there.
pub fn parameter_rows(set: &ParameterSet, values: &ParameterMap) -> Vec<ParameterRow> {
    set.iter()
        .map(|parameter| row(parameter.key(), values.get(parameter.key()).unwrap_or(parameter.value())))
        .collect()
}

fn row(key: ParamKey, value: f64) -> ParameterRow {
    let info = key.display_info();
    ParameterRow {
        name: info.name,
        symbol: info.symbol,
        value,
        unit: info.unit,
    }
}

const CSV_HEADER: [&str; 4] = ["name", "symbol", "value", "unit"];

fn write_records<W: io::Write>(writer: &mut Writer<W>, rows: &[ParameterRow]) -> Result<()> {
    writer.write_record(CSV_HEADER)?;
    for r in rows {
        let value = format_significant(r.value, SIGNIFICANT_DIGITS);
        writer.write_record([r.name, r.symbol, value.as_str(), r.unit])?;
    }
    writer.flush()?;
    Ok(())
}

/// Comma-separated table with a `name,symbol,value,unit` header. Fields
/// containing separators or quotes are quoted.
pub fn to_csv(rows: &[ParameterRow]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    write_records(&mut writer, rows)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| WellTestError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| WellTestError::InvalidInput(e.to_string()))
}

/// Plain-text table, one `name (symbol): value unit` line per parameter.
pub fn to_text(rows: &[ParameterRow]) -> String {
    rows.iter()
        .map(|r| {
            format!(
                "{} ({}): {} {}\n",
                r.name,
                r.symbol,
                format_significant(r.value, SIGNIFICANT_DIGITS),
                r.unit
            )
        })
        .collect()
}

/// Write the table to `path`; a `.csv` extension selects CSV, anything else text.
pub fn write_table<P: AsRef<Path>>(path: P, rows: &[ParameterRow]) -> Result<()> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        let mut writer = Writer::from_path(path)?;
        write_records(&mut writer, rows)
    } else {
        fs::write(path, to_text(rows))?;
        Ok(())
    }
}
