//! A single fit parameter: key, value, box, and whether the optimizer may vary it.

use serde::{Deserialize, Serialize};

use crate::parameters::{Bounds, BoundsError, ParamKey};

/// A parameter of the reservoir model as seen by the fitting engine.
///
/// The value is private so that it can only change through methods that keep
/// it inside its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParameter {
    key: ParamKey,
    value: f64,
    bounds: Bounds,
    /// Whether the optimizer may vary this parameter.
    #[serde(default)]
    vary: bool,
}

impl FitParameter {
    /// Create a fixed parameter using the key's default box.
    ///
    /// # Examples
    ///
    /// ```
    /// use welltest_rs::parameters::{FitParameter, ParamKey};
    ///
    /// let kf = FitParameter::new(ParamKey::InnerPermeability, 1e-3);
    /// assert_eq!(kf.value(), 1e-3);
    /// assert!(!kf.vary());
    /// ```
    pub fn new(key: ParamKey, value: f64) -> Self {
        let bounds = key.default_bounds(value);
        Self {
            key,
            value: bounds.clamp(value),
            bounds,
            vary: false,
        }
    }

    /// Create a parameter with explicit bounds. The value is clamped into them.
    ///
    /// # Arguments
    ///
    /// * `key` - Parameter identifier
    /// * `value` - Initial value
    /// * `min` - Lower bound (inclusive)
    /// * `max` - Upper bound (inclusive)
    ///
    /// # Returns
    ///
    /// The parameter, or an error if `min > max`
    pub fn with_bounds(key: ParamKey, value: f64, min: f64, max: f64) -> Result<Self, BoundsError> {
        let bounds = Bounds::new(min, max)?;
        Ok(Self {
            key,
            value: bounds.clamp(value),
            bounds,
            vary: false,
        })
    }

    /// Builder-style toggle of the fit flag.
    pub fn varying(mut self, vary: bool) -> Self {
        self.set_vary(vary);
        self
    }

    pub fn key(&self) -> ParamKey {
        self.key
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Derived parameters never vary, whatever the flag says.
    pub fn vary(&self) -> bool {
        self.vary && !self.key.is_derived()
    }

    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    /// Set the value, clamped into the bounds. Returns the stored value.
    pub fn set_value(&mut self, value: f64) -> f64 {
        self.value = self.bounds.clamp(value);
        self.value
    }

    /// Replace the bounds and re-clamp the current value.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), BoundsError> {
        self.bounds = Bounds::new(min, max)?;
        self.value = self.bounds.clamp(self.value);
        Ok(())
    }

    /// Re-establish the invariant after deserialization.
    pub(crate) fn normalize(&mut self) {
        self.value = self.bounds.clamp(self.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_box_and_clamps() {
        let s = FitParameter::new(ParamKey::Skin, -4.0);
        assert_eq!(s.value(), 0.0);
        assert_eq!(s.bounds(), Bounds::new(0.0, 50.0).unwrap());
    }

    #[test]
    fn test_set_value_clamps() {
        let mut kf = FitParameter::with_bounds(ParamKey::InnerPermeability, 1e-3, 1e-6, 100.0)
            .unwrap()
            .varying(true);
        assert_eq!(kf.set_value(500.0), 100.0);
        assert_eq!(kf.set_value(0.0), 1e-6);
        assert!(kf.vary());
    }

    #[test]
    fn test_set_bounds_reclamps_value() {
        let mut cd = FitParameter::new(ParamKey::WellboreStorage, 10.0);
        cd.set_bounds(0.0, 1.0).unwrap();
        assert_eq!(cd.value(), 1.0);
        assert!(cd.set_bounds(1.0, 0.0).is_err());
        assert_eq!(cd.bounds(), Bounds::new(0.0, 1.0).unwrap());
    }

    #[test]
    fn test_derived_parameter_never_varies() {
        let lfd = FitParameter::new(ParamKey::FractureHalfLengthD, 0.1).varying(true);
        assert!(!lfd.vary());
    }
}
