//! Observed data and parameter tables at the crate boundary.

pub mod export;
pub mod ingest;
pub mod observed;

pub use export::{format_significant, parameter_rows, to_csv, to_text, write_table, ParameterRow};
pub use ingest::{ingest, ingest_file, parse_value_list, ColumnMapping, PressureMode};
pub use observed::ObservedDataSet;
