//! Typed snapshot of parameter values handed to the forward model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parameters::ParamKey;

/// Below this well length the dimensionless fracture half-length is zero.
const MIN_WELL_LENGTH: f64 = 1e-9;

/// A key to value snapshot of reservoir and well parameters.
///
/// Derived entries are kept consistent with their inputs: every mutation
/// through [`ParameterMap::set`] or [`ParameterMap::with_value`] ends with
/// [`ParameterMap::recompute_dependents`], as does deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<ParamKey, f64>", into = "BTreeMap<ParamKey, f64>")]
pub struct ParameterMap {
    values: BTreeMap<ParamKey, f64>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ParamKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// The stored value, or the key's documented fallback when absent.
    pub fn value_or_default(&self, key: ParamKey) -> f64 {
        self.get(key).unwrap_or_else(|| key.fallback_value())
    }

    pub fn contains(&self, key: ParamKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Store a value and refresh the derived entries.
    pub fn set(&mut self, key: ParamKey, value: f64) {
        self.values.insert(key, value);
        self.recompute_dependents();
    }

    /// A copy of this map with one value replaced, dependents refreshed.
    pub fn with_value(&self, key: ParamKey, value: f64) -> Self {
        let mut next = self.clone();
        next.set(key, value);
        next
    }

    /// Recompute derived parameters from their inputs.
    ///
    /// `LfD = Lf / L`, or zero when the well length is vanishingly small.
    pub fn recompute_dependents(&mut self) {
        let length = self.value_or_default(ParamKey::WellLength);
        let half_length = self.value_or_default(ParamKey::FractureHalfLength);
        let lfd = if length > MIN_WELL_LENGTH {
            half_length / length
        } else {
            0.0
        };
        self.values.insert(ParamKey::FractureHalfLengthD, lfd);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<BTreeMap<ParamKey, f64>> for ParameterMap {
    fn from(values: BTreeMap<ParamKey, f64>) -> Self {
        let mut map = Self { values };
        map.recompute_dependents();
        map
    }
}

impl From<ParameterMap> for BTreeMap<ParamKey, f64> {
    fn from(map: ParameterMap) -> Self {
        map.values
    }
}

impl FromIterator<(ParamKey, f64)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (ParamKey, f64)>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<BTreeMap<_, _>>())
    }
}
