//! Integration tests for file ingestion and export.

mod common;

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use welltest_rs::data::{self, ColumnMapping, PressureMode};
use welltest_rs::lm::FitConfig;
use welltest_rs::model::Precision;
use welltest_rs::parameters::{ParamKey, ParameterSet};
use welltest_rs::WellTestError;

use common::MODEL;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("welltest-rs-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn test_ingest_gauge_file() {
    let path = scratch_path("gauge.txt");
    let mut text = String::from("Elapsed(h)\tPressure(MPa)\n");
    for (t, p) in [(0.01, 35.0), (0.02, 34.8), (0.05, 34.5), (0.1, 34.3), (0.2, 34.2)] {
        text.push_str(&format!("{}\t{}\n", t, p));
    }
    fs::write(&path, text).unwrap();

    let observed = data::ingest_file(&path, &ColumnMapping::default()).unwrap();
    assert_eq!(observed.len(), 5);
    assert_eq!(observed.pressure()[0], 0.0);
    assert_relative_eq!(observed.pressure()[4], 0.8, epsilon = 1e-12);
    assert!(observed.derivative()[1..4].iter().all(|d| *d > 0.0));

    let missing = data::ingest_file(scratch_path("missing.txt"), &ColumnMapping::default());
    assert!(matches!(missing, Err(WellTestError::Io(_))));
}

#[test]
fn test_ingested_model_curve_has_no_misfit() {
    let set = MODEL.default_parameters();
    let times = [0.01, 0.03, 0.1, 0.3, 1.0];
    let curve = MODEL.compute_curve(&set.to_map(), &times, Precision::Fast).unwrap();

    let mut text = String::from("t,dp,dpd\n");
    for i in 0..times.len() {
        text.push_str(&format!(
            "{:e},{:e},{:e}\n",
            curve.time[i], curve.pressure[i], curve.derivative[i]
        ));
    }
    let mapping = ColumnMapping::default()
        .with_pressure_mode(PressureMode::PressureDifference)
        .with_derivative_column(2);
    let observed = data::ingest(&text, &mapping).unwrap();
    assert_eq!(observed.time(), &times);
    for i in 0..times.len() {
        assert_relative_eq!(observed.pressure()[i], curve.pressure[i], max_relative = 1e-12);
    }
}

#[test]
fn test_parameter_and_config_files() {
    let mut set = MODEL.default_parameters();
    set.set_value(ParamKey::Skin, 3.5).unwrap();
    set.set_vary(ParamKey::Skin, true).unwrap();
    let params_path = scratch_path("parameters.json");
    set.save_json(&params_path).unwrap();
    let loaded = ParameterSet::load_json(&params_path).unwrap();
    assert_eq!(loaded, set);
    assert_eq!(loaded.active_keys(), vec![ParamKey::Skin]);

    let config_path = scratch_path("fit.json");
    fs::write(&config_path, r#"{ "max_iterations": 12, "fit_precision": "High" }"#).unwrap();
    let config = FitConfig::load_json(&config_path).unwrap();
    assert_eq!(config.max_iterations, 12);
    assert_eq!(config.fit_precision, Precision::High);
    assert_eq!(config.max_trials, FitConfig::default().max_trials);
}

#[test]
fn test_export_tables() {
    let set = MODEL.default_parameters();
    let mut fitted = set.to_map();
    fitted.set(ParamKey::InnerPermeability, 2.5e-3);
    let rows = data::parameter_rows(&set, &fitted);
    assert_eq!(rows.len(), set.len());

    let csv_path = scratch_path("result.csv");
    data::write_table(&csv_path, &rows).unwrap();
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("name,symbol,value,unit\n"));
    assert!(csv.contains("Inner-zone permeability,kf,0.0025,mD"));
    assert_eq!(csv.lines().count(), set.len() + 1);

    let text_path = scratch_path("result.txt");
    data::write_table(&text_path, &rows).unwrap();
    let text = fs::read_to_string(&text_path).unwrap();
    assert!(text.contains("Inner-zone permeability (kf): 0.0025 mD"));
}
