//! Box constraints for fit parameters.
//!
//! Every fit parameter carries an inclusive `[min, max]` interval. Values are
//! clamped into the interval on construction and after every optimizer trial,
//! so a committed parameter map never leaves its box.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Bounds must not be NaN")]
    NanBound,
}

/// Inclusive bounds on a parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

/// Wire shape of [`Bounds`]; infinite ends are written as `null` since JSON
/// has no infinity literal.
#[derive(Serialize, Deserialize)]
struct BoundsRepr {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BoundsRepr {
            min: self.min.is_finite().then_some(self.min),
            max: self.max.is_finite().then_some(self.max),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = BoundsRepr::deserialize(deserializer)?;
        let min = repr.min.unwrap_or(f64::NEG_INFINITY);
        let max = repr.max.unwrap_or(f64::INFINITY);
        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl Bounds {
    /// Create a new bounds constraint with min and max values
    ///
    /// # Arguments
    ///
    /// * `min` - Minimum allowed value for the parameter
    /// * `max` - Maximum allowed value for the parameter
    ///
    /// # Returns
    ///
    /// A new `Bounds` object if min <= max, or an error otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use welltest_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(1e-6, 100.0).unwrap();
    /// assert_eq!(bounds.clamp(250.0), 100.0);
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() {
            return Err(BoundsError::NanBound);
        }
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Create an unbounded constraint (negative infinity to positive infinity)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Bounds used for a key with no documented box: three decades either
    /// side of a positive value, `[0, 100]` at zero and `[-100, 100]` below
    /// it. Non-finite values are unbounded.
    pub fn around(value: f64) -> Self {
        if !value.is_finite() {
            Self::unbounded()
        } else if value > 0.0 {
            Self {
                min: value * 1e-3,
                max: value * 1e3,
            }
        } else if value == 0.0 {
            Self { min: 0.0, max: 100.0 }
        } else {
            Self {
                min: -100.0,
                max: 100.0,
            }
        }
    }

    /// Check if a value is within the bounds
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check if the bounds are finite (both min and max are finite)
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Clamp a value to be within the bounds
    ///
    /// NaN is mapped to the lower bound (or the upper one when the lower bound
    /// is infinite) so that a clamped value is always a usable number.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return if self.min.is_finite() {
                self.min
            } else if self.max.is_finite() {
                self.max
            } else {
                0.0
            };
        }
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::new(0.0, 50.0).unwrap();
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 50.0);

        assert!(Bounds::new(5.0, 5.0).is_ok());
        assert_eq!(
            Bounds::new(2.0, 1.0),
            Err(BoundsError::InvalidBounds { min: 2.0, max: 1.0 })
        );
        assert_eq!(Bounds::new(f64::NAN, 1.0), Err(BoundsError::NanBound));
    }

    #[test]
    fn test_clamp() {
        let bounds = Bounds::new(1e-9, 1.0).unwrap();
        assert_eq!(bounds.clamp(0.5), 0.5);
        assert_eq!(bounds.clamp(-3.0), 1e-9);
        assert_eq!(bounds.clamp(7.0), 1.0);
        assert_eq!(bounds.clamp(f64::NAN), 1e-9);
        assert!(bounds.is_within_bounds(bounds.clamp(1e300)));
    }

    #[test]
    fn test_around() {
        let bounds = Bounds::around(2.0);
        assert_eq!(bounds.min, 2e-3);
        assert_eq!(bounds.max, 2e3);
        assert_eq!(Bounds::around(0.0), Bounds::new(0.0, 100.0).unwrap());
        assert_eq!(Bounds::around(-1.0), Bounds::new(-100.0, 100.0).unwrap());
        assert!(!Bounds::around(f64::NAN).is_finite());
        assert!(!Bounds::around(f64::INFINITY).is_finite());
    }

    #[test]
    fn test_serialization_of_infinite_ends() {
        let json = serde_json::to_string(&Bounds::unbounded()).unwrap();
        assert_eq!(json, r#"{"min":null,"max":null}"#);
        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Bounds::unbounded());

        let finite: Bounds = serde_json::from_str(r#"{"min":0.0,"max":100.0}"#).unwrap();
        assert_eq!(finite, Bounds::new(0.0, 100.0).unwrap());
        assert!(serde_json::from_str::<Bounds>(r#"{"min":3.0,"max":1.0}"#).is_err());
    }
}
