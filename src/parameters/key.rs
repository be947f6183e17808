//! The closed vocabulary of reservoir and well parameters.
//!
//! Each key carries its serialized name, display metadata for exported
//! parameter tables, the documented fallback value used when a parameter map
//! lacks the key, its default fit box, and how the optimizer treats it
//! (log-domain or additive steps, derived or independent).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WellTestError;
use crate::parameters::Bounds;

/// Identifier of a reservoir or well parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParamKey {
    #[serde(rename = "phi")]
    Porosity,
    #[serde(rename = "h")]
    Thickness,
    #[serde(rename = "mu")]
    Viscosity,
    #[serde(rename = "B")]
    VolumeFactor,
    #[serde(rename = "Ct")]
    Compressibility,
    #[serde(rename = "q")]
    Rate,
    #[serde(rename = "nf")]
    FractureCount,
    #[serde(rename = "kf")]
    InnerPermeability,
    #[serde(rename = "km")]
    OuterPermeability,
    #[serde(rename = "L")]
    WellLength,
    #[serde(rename = "Lf")]
    FractureHalfLength,
    #[serde(rename = "LfD")]
    FractureHalfLengthD,
    #[serde(rename = "rmD")]
    CompositeRadiusD,
    #[serde(rename = "omega1")]
    InnerStorativity,
    #[serde(rename = "omega2")]
    OuterStorativity,
    #[serde(rename = "lambda1")]
    InnerInterporosity,
    #[serde(rename = "omega")]
    Storativity,
    #[serde(rename = "lambda")]
    Interporosity,
    #[serde(rename = "cD")]
    WellboreStorage,
    #[serde(rename = "S")]
    Skin,
}

/// Human-facing description of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub name: &'static str,
    pub symbol: &'static str,
    pub unit: &'static str,
}

impl ParamKey {
    /// Every key, in the canonical display order.
    pub const ALL: [ParamKey; 20] = [
        ParamKey::Porosity,
        ParamKey::Thickness,
        ParamKey::Viscosity,
        ParamKey::VolumeFactor,
        ParamKey::Compressibility,
        ParamKey::Rate,
        ParamKey::FractureCount,
        ParamKey::InnerPermeability,
        ParamKey::OuterPermeability,
        ParamKey::WellLength,
        ParamKey::FractureHalfLength,
        ParamKey::FractureHalfLengthD,
        ParamKey::CompositeRadiusD,
        ParamKey::InnerStorativity,
        ParamKey::OuterStorativity,
        ParamKey::InnerInterporosity,
        ParamKey::Storativity,
        ParamKey::Interporosity,
        ParamKey::WellboreStorage,
        ParamKey::Skin,
    ];

    /// The short key used in serialized maps and data files.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamKey::Porosity => "phi",
            ParamKey::Thickness => "h",
            ParamKey::Viscosity => "mu",
            ParamKey::VolumeFactor => "B",
            ParamKey::Compressibility => "Ct",
            ParamKey::Rate => "q",
            ParamKey::FractureCount => "nf",
            ParamKey::InnerPermeability => "kf",
            ParamKey::OuterPermeability => "km",
            ParamKey::WellLength => "L",
            ParamKey::FractureHalfLength => "Lf",
            ParamKey::FractureHalfLengthD => "LfD",
            ParamKey::CompositeRadiusD => "rmD",
            ParamKey::InnerStorativity => "omega1",
            ParamKey::OuterStorativity => "omega2",
            ParamKey::InnerInterporosity => "lambda1",
            ParamKey::Storativity => "omega",
            ParamKey::Interporosity => "lambda",
            ParamKey::WellboreStorage => "cD",
            ParamKey::Skin => "S",
        }
    }

    pub fn display_info(self) -> DisplayInfo {
        let (name, symbol, unit) = match self {
            ParamKey::Porosity => ("Porosity", "φ", "fraction"),
            ParamKey::Thickness => ("Net thickness", "h", "m"),
            ParamKey::Viscosity => ("Fluid viscosity", "μ", "mPa·s"),
            ParamKey::VolumeFactor => ("Formation volume factor", "B", "m³/m³"),
            ParamKey::Compressibility => ("Total compressibility", "Ct", "1/MPa"),
            ParamKey::Rate => ("Production rate", "q", "m³/d"),
            ParamKey::FractureCount => ("Fracture count", "nf", "-"),
            ParamKey::InnerPermeability => ("Inner-zone permeability", "kf", "mD"),
            ParamKey::OuterPermeability => ("Outer-zone permeability", "km", "mD"),
            ParamKey::WellLength => ("Horizontal well length", "L", "m"),
            ParamKey::FractureHalfLength => ("Fracture half-length", "Lf", "m"),
            ParamKey::FractureHalfLengthD => ("Dimensionless fracture half-length", "LfD", "-"),
            ParamKey::CompositeRadiusD => ("Dimensionless composite radius", "rmD", "-"),
            ParamKey::InnerStorativity => ("Inner-zone storativity ratio", "ω₁", "-"),
            ParamKey::OuterStorativity => ("Outer-zone storativity ratio", "ω₂", "-"),
            ParamKey::InnerInterporosity => ("Inner-zone interporosity coefficient", "λ₁", "-"),
            ParamKey::Storativity => ("Storativity ratio", "ω", "-"),
            ParamKey::Interporosity => ("Interporosity coefficient", "λ", "-"),
            ParamKey::WellboreStorage => ("Dimensionless wellbore storage", "CD", "-"),
            ParamKey::Skin => ("Skin factor", "S", "-"),
        };
        DisplayInfo { name, symbol, unit }
    }

    /// Value assumed when a parameter map has no entry for this key.
    pub fn fallback_value(self) -> f64 {
        match self {
            ParamKey::Porosity => 0.05,
            ParamKey::Thickness => 20.0,
            ParamKey::Viscosity => 0.5,
            ParamKey::VolumeFactor => 1.05,
            ParamKey::Compressibility => 5e-4,
            ParamKey::Rate => 5.0,
            ParamKey::FractureCount => 4.0,
            ParamKey::InnerPermeability => 1e-3,
            ParamKey::OuterPermeability => 1e-4,
            ParamKey::WellLength => 1000.0,
            ParamKey::FractureHalfLength => 100.0,
            ParamKey::FractureHalfLengthD => 0.1,
            ParamKey::CompositeRadiusD => 4.0,
            ParamKey::InnerStorativity => 0.4,
            ParamKey::OuterStorativity => 0.08,
            ParamKey::InnerInterporosity => 1e-3,
            ParamKey::Storativity => 0.1,
            ParamKey::Interporosity => 1e-5,
            ParamKey::WellboreStorage => 0.01,
            ParamKey::Skin => 1.0,
        }
    }

    /// Default fit box for a parameter currently at `value`.
    pub fn default_bounds(self, value: f64) -> Bounds {
        let (min, max) = match self {
            ParamKey::Porosity => (0.001, 1.0),
            ParamKey::Thickness => (1.0, 500.0),
            ParamKey::Viscosity => (0.01, 1000.0),
            ParamKey::VolumeFactor => (0.5, 2.0),
            ParamKey::Compressibility => (1e-6, 1e-2),
            ParamKey::Rate => (0.1, 1e4),
            ParamKey::FractureCount => (1.0, 100.0),
            ParamKey::InnerPermeability | ParamKey::OuterPermeability => (1e-6, 100.0),
            ParamKey::WellLength => (10.0, 5000.0),
            ParamKey::FractureHalfLength => (1.0, 1000.0),
            ParamKey::CompositeRadiusD => (1.0, 50.0),
            ParamKey::InnerStorativity | ParamKey::OuterStorativity => (0.001, 1.0),
            ParamKey::InnerInterporosity => (1e-9, 1.0),
            ParamKey::WellboreStorage => (0.0, 100.0),
            ParamKey::Skin => (0.0, 50.0),
            ParamKey::FractureHalfLengthD | ParamKey::Storativity | ParamKey::Interporosity => {
                return Bounds::around(value)
            }
        };
        Bounds { min, max }
    }

    /// Linear keys are always perturbed and updated additively, even when
    /// positive. Skin may legitimately be zero and the fracture count is an
    /// integer, so neither has a meaningful logarithm.
    pub fn is_linear(self) -> bool {
        matches!(self, ParamKey::Skin | ParamKey::FractureCount)
    }

    /// Derived keys are recomputed from other keys and never fitted directly.
    pub fn is_derived(self) -> bool {
        matches!(self, ParamKey::FractureHalfLengthD)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = WellTestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| WellTestError::ParameterNotFound(s.to_string()))
    }
}
