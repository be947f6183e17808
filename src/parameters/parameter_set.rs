//! Ordered collection of fit parameters.
//!
//! The set is what a user edits: which parameters exist, their values, their
//! boxes and which of them the optimizer may vary. Order is for display only.
//! Snapshots passed to the forward model are produced with
//! [`ParameterSet::to_map`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WellTestError};
use crate::parameters::{FitParameter, ParamKey, ParameterMap};

/// An ordered collection of [`FitParameter`]s with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    parameters: Vec<FitParameter>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set holding the documented fallback value and default box of
    /// each key, in the given order. Nothing is marked for fitting.
    pub fn with_defaults(keys: &[ParamKey]) -> Self {
        let mut set = Self::new();
        for &key in keys {
            if set.get(key).is_none() {
                set.parameters.push(FitParameter::new(key, key.fallback_value()));
            }
        }
        set
    }

    /// Add a parameter to the set
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a parameter with the same key already exists
    pub fn add(&mut self, parameter: FitParameter) -> Result<()> {
        if self.get(parameter.key()).is_some() {
            return Err(WellTestError::InvalidInput(format!(
                "parameter '{}' already exists",
                parameter.key()
            )));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    pub fn get(&self, key: ParamKey) -> Option<&FitParameter> {
        self.parameters.iter().find(|p| p.key() == key)
    }

    pub fn get_mut(&mut self, key: ParamKey) -> Option<&mut FitParameter> {
        self.parameters.iter_mut().find(|p| p.key() == key)
    }

    fn require_mut(&mut self, key: ParamKey) -> Result<&mut FitParameter> {
        self.get_mut(key)
            .ok_or_else(|| WellTestError::ParameterNotFound(key.to_string()))
    }

    pub fn value(&self, key: ParamKey) -> Option<f64> {
        self.get(key).map(FitParameter::value)
    }

    /// Set a value, clamped into the parameter's box. Returns the stored value.
    pub fn set_value(&mut self, key: ParamKey, value: f64) -> Result<f64> {
        Ok(self.require_mut(key)?.set_value(value))
    }

    pub fn set_vary(&mut self, key: ParamKey, vary: bool) -> Result<()> {
        self.require_mut(key)?.set_vary(vary);
        Ok(())
    }

    pub fn set_bounds(&mut self, key: ParamKey, min: f64, max: f64) -> Result<()> {
        self.require_mut(key)?.set_bounds(min, max)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FitParameter> {
        self.parameters.iter()
    }

    pub fn keys(&self) -> Vec<ParamKey> {
        self.parameters.iter().map(FitParameter::key).collect()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Keys the optimizer may vary, in display order.
    pub fn active_keys(&self) -> Vec<ParamKey> {
        self.parameters
            .iter()
            .filter(|p| p.vary())
            .map(FitParameter::key)
            .collect()
    }

    /// Snapshot of all values with derived entries recomputed.
    pub fn to_map(&self) -> ParameterMap {
        self.parameters
            .iter()
            .filter(|p| !p.key().is_derived())
            .map(|p| (p.key(), p.value()))
            .collect()
    }

    /// Copy values for keys present in both the set and `map`, clamping each
    /// into its box. Keys absent from the set are ignored.
    pub fn update_from_map(&mut self, map: &ParameterMap) {
        for parameter in &mut self.parameters {
            if let Some(value) = map.get(parameter.key()) {
                parameter.set_value(value);
            }
        }
    }

    /// Save the set to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Serialize the set to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a set from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load a set from a JSON string. Values are re-clamped and duplicate keys
    /// are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: ParameterSet = serde_json::from_str(json)?;
        let mut set = ParameterSet::new();
        for mut parameter in raw.parameters {
            parameter.normalize();
            set.add(parameter)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> ParameterSet {
        ParameterSet::with_defaults(&[
            ParamKey::InnerPermeability,
            ParamKey::WellLength,
            ParamKey::FractureHalfLength,
            ParamKey::Skin,
        ])
    }

    #[test]
    fn test_defaults_and_order() {
        let set = sample();
        assert_eq!(
            set.keys(),
            vec![
                ParamKey::InnerPermeability,
                ParamKey::WellLength,
                ParamKey::FractureHalfLength,
                ParamKey::Skin
            ]
        );
        assert_eq!(set.value(ParamKey::Skin), Some(1.0));
        assert!(set.active_keys().is_empty());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut set = sample();
        let err = set.add(FitParameter::new(ParamKey::Skin, 2.0));
        assert!(matches!(err, Err(WellTestError::InvalidInput(_))));
    }

    #[test]
    fn test_mutations_keep_values_in_bounds() {
        let mut set = sample();
        assert_eq!(set.set_value(ParamKey::Skin, 80.0).unwrap(), 50.0);
        set.set_bounds(ParamKey::InnerPermeability, 1e-2, 1.0).unwrap();
        assert_eq!(set.value(ParamKey::InnerPermeability), Some(1e-2));
        assert!(matches!(
            set.set_value(ParamKey::Porosity, 0.1),
            Err(WellTestError::ParameterNotFound(_))
        ));
    }

    #[test]
    fn test_active_keys_follow_vary_flags() {
        let mut set = sample();
        set.set_vary(ParamKey::Skin, true).unwrap();
        set.set_vary(ParamKey::InnerPermeability, true).unwrap();
        assert_eq!(
            set.active_keys(),
            vec![ParamKey::InnerPermeability, ParamKey::Skin]
        );
    }

    #[test]
    fn test_to_map_includes_derived_ratio() {
        let mut set = sample();
        set.set_value(ParamKey::FractureHalfLength, 250.0).unwrap();
        let map = set.to_map();
        assert_relative_eq!(map.get(ParamKey::FractureHalfLengthD).unwrap(), 0.25);
    }

    #[test]
    fn test_update_from_map_clamps() {
        let mut set = sample();
        let mut map = set.to_map();
        map.set(ParamKey::Skin, 75.0);
        map.set(ParamKey::InnerPermeability, 0.02);
        set.update_from_map(&map);
        assert_eq!(set.value(ParamKey::Skin), Some(50.0));
        assert_eq!(set.value(ParamKey::InnerPermeability), Some(0.02));
    }

    #[test]
    fn test_json_round_trip() {
        let mut set = sample();
        set.set_vary(ParamKey::InnerPermeability, true).unwrap();
        let json = set.to_json().unwrap();
        let back = ParameterSet::from_json(&json).unwrap();
        assert_eq!(back, set);
    }
}
