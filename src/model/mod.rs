//! Forward models of the pressure response of a fractured horizontal well.
//!
//! A forward model maps a [`ParameterMap`] and a set of physical times to a
//! [`ModelCurve`]: pressure change and Bourdet derivative. The model variants
//! form a closed set ([`ModelType`]); every variant advertises its default
//! parameters and display order, but only variants with a forward solution
//! can compute curves. The others answer with
//! [`WellTestError::ModelUnavailable`].
//!
//! Precision is an explicit argument of every evaluation. The fitting loop
//! asks for [`Precision::Fast`] and the final reported curve for
//! [`Precision::High`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WellTestError};
use crate::parameters::{ParamKey, ParameterMap, ParameterSet};

pub mod bessel;
pub mod composite;
pub mod quadrature;
pub mod sensitivity;
pub mod stehfest;
pub mod units;

pub use composite::CompositeFracturedHorizontal;
pub use stehfest::{LaplaceInversion, StehfestInverter};
pub use units::log_time_steps;

/// Number of samples in the grid used when no times are requested.
pub const DEFAULT_GRID_POINTS: usize = 100;

/// Decade span of the default time grid, in hours.
pub const DEFAULT_GRID_DECADES: (f64, f64) = (-3.0, 3.0);

/// Accuracy of the Laplace inversion, as the Stehfest order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Order 4, for optimizer iterations.
    Fast,
    /// Order 8, for reported curves.
    High,
}

impl Precision {
    pub fn stehfest_order(self) -> usize {
        match self {
            Precision::Fast => 4,
            Precision::High => 8,
        }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::High
    }
}

/// Counts of numerical degeneracies absorbed during one curve evaluation.
///
/// None of these abort an evaluation; they are reported so that callers can
/// tell a clean curve from one that was patched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degeneracy {
    /// Laplace-domain samples that were NaN or infinite and replaced by zero.
    pub non_finite_samples: usize,
    /// Influence systems that needed the least-squares fallback.
    pub singular_systems: usize,
    /// Time samples whose dimensionless time was not usable, set to zero.
    pub zeroed_times: usize,
}

impl Degeneracy {
    pub fn is_clean(&self) -> bool {
        self.non_finite_samples == 0 && self.singular_systems == 0 && self.zeroed_times == 0
    }

    pub fn total(&self) -> usize {
        self.non_finite_samples + self.singular_systems + self.zeroed_times
    }

    pub fn merge(&mut self, other: Degeneracy) {
        self.non_finite_samples += other.non_finite_samples;
        self.singular_systems += other.singular_systems;
        self.zeroed_times += other.zeroed_times;
    }
}

/// Pressure change and its Bourdet derivative on a time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCurve {
    /// Physical times, hours.
    pub time: Vec<f64>,
    /// Pressure change, MPa.
    pub pressure: Vec<f64>,
    /// Bourdet derivative of the pressure change, MPa.
    pub derivative: Vec<f64>,
    /// Inversion accuracy used to produce the curve.
    pub precision: Precision,
    /// Degeneracies absorbed while computing the curve.
    pub diagnostics: Degeneracy,
}

impl ModelCurve {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Shared interface of all forward models.
pub trait ForwardModel: Send + Sync {
    /// The variant this model implements.
    fn model_type(&self) -> ModelType;

    /// Evaluate pressure and derivative at `times`.
    ///
    /// An empty `times` slice selects the default grid of
    /// [`DEFAULT_GRID_POINTS`] log-spaced samples.
    ///
    /// # Arguments
    ///
    /// * `params` - Parameter snapshot; missing keys use documented fallbacks
    /// * `times` - Physical times in hours
    /// * `precision` - Inversion accuracy
    fn compute_curve(
        &self,
        params: &ParameterMap,
        times: &[f64],
        precision: Precision,
    ) -> Result<ModelCurve>;

    /// Default editable parameters, in display order.
    fn default_parameters(&self) -> ParameterSet {
        self.model_type().default_parameters()
    }

    /// Display order of the parameters.
    fn parameter_order(&self) -> &'static [ParamKey] {
        self.model_type().parameter_order()
    }
}

const COMPOSITE_ORDER: [ParamKey; 17] = [
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
    ParamKey::CompositeRadiusD,
    ParamKey::InnerStorativity,
    ParamKey::OuterStorativity,
    ParamKey::InnerInterporosity,
    ParamKey::WellboreStorage,
    ParamKey::Skin,
];

const DUAL_POROSITY_ORDER: [ParamKey; 11] = [
    ParamKey::Porosity,
    ParamKey::Thickness,
    ParamKey::Viscosity,
    ParamKey::VolumeFactor,
    ParamKey::Compressibility,
    ParamKey::Rate,
    ParamKey::FractureCount,
    ParamKey::Storativity,
    ParamKey::Interporosity,
    ParamKey::WellboreStorage,
    ParamKey::Skin,
];

/// The closed set of reservoir model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Multi-fractured horizontal well in a radial composite dual-porosity
    /// reservoir with wellbore storage and skin.
    CompositeFracturedHorizontal,
    /// Finite-conductivity fractures. No forward solution yet.
    FiniteConductive,
    /// Segmented multi-cluster completion. No forward solution yet.
    SegmentedMultiCluster,
}

impl ModelType {
    pub const ALL: [ModelType; 3] = [
        ModelType::CompositeFracturedHorizontal,
        ModelType::FiniteConductive,
        ModelType::SegmentedMultiCluster,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelType::CompositeFracturedHorizontal => "composite multi-fractured horizontal well",
            ModelType::FiniteConductive => "finite-conductivity fractured horizontal well",
            ModelType::SegmentedMultiCluster => "segmented multi-cluster horizontal well",
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, ModelType::CompositeFracturedHorizontal)
    }

    /// The forward model of this variant.
    ///
    /// # Errors
    ///
    /// `ModelUnavailable` for variants without a forward solution.
    pub fn forward_model(self) -> Result<Box<dyn ForwardModel>> {
        match self {
            ModelType::CompositeFracturedHorizontal => Ok(Box::new(CompositeFracturedHorizontal)),
            ModelType::FiniteConductive | ModelType::SegmentedMultiCluster => {
                Err(WellTestError::ModelUnavailable(self))
            }
        }
    }

    /// Evaluate this variant's forward model.
    pub fn compute_curve(
        self,
        params: &ParameterMap,
        times: &[f64],
        precision: Precision,
    ) -> Result<ModelCurve> {
        self.forward_model()?.compute_curve(params, times, precision)
    }

    pub fn parameter_order(self) -> &'static [ParamKey] {
        match self {
            ModelType::CompositeFracturedHorizontal => &COMPOSITE_ORDER,
            ModelType::FiniteConductive | ModelType::SegmentedMultiCluster => &DUAL_POROSITY_ORDER,
        }
    }

    /// Default parameter set of this variant, in display order, nothing
    /// marked for fitting.
    pub fn default_parameters(self) -> ParameterSet {
        let mut set = ParameterSet::with_defaults(self.parameter_order());
        if !self.is_available() {
            for (key, value) in [(ParamKey::WellboreStorage, 0.001), (ParamKey::Skin, 0.01)] {
                if let Some(parameter) = set.get_mut(key) {
                    parameter.set_value(value);
                }
            }
        }
        set
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
