//! One-parameter sensitivity sweeps.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WellTestError};
use crate::model::{ModelCurve, ModelType, Precision};
use crate::parameters::{ParamKey, ParameterMap};

/// A curve computed with one parameter overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub key: ParamKey,
    pub value: f64,
    pub curve: ModelCurve,
}

/// Compute one curve per value of `key`, everything else taken from `base`.
///
/// Each override goes through [`ParameterMap::with_value`], so derived
/// parameters follow the swept value.
///
/// # Errors
///
/// `InvalidInput` for an empty value list or a derived key, and
/// `ModelUnavailable` for variants without a forward solution.
pub fn sweep(
    model: ModelType,
    base: &ParameterMap,
    key: ParamKey,
    values: &[f64],
    times: &[f64],
    precision: Precision,
) -> Result<Vec<SensitivityCurve>> {
    if values.is_empty() {
        return Err(WellTestError::InvalidInput(format!(
            "no values given for sensitivity of '{}'",
            key
        )));
    }
    if key.is_derived() {
        return Err(WellTestError::InvalidInput(format!(
            "'{}' is derived and cannot be swept directly",
            key
        )));
    }

    let forward = model.forward_model()?;
    values
        .iter()
        .map(|&value| {
            let params = base.with_value(key, value);
            Ok(SensitivityCurve {
                key,
                value,
                curve: forward.compute_curve(&params, times, precision)?,
            })
        })
        .collect()
}
