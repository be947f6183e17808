//! # Parameter System
//!
//! Reservoir and well parameters are identified by the closed [`ParamKey`]
//! vocabulary. A [`ParameterSet`] is the editable, ordered collection a fit
//! starts from; each [`FitParameter`] carries its value, its inclusive
//! [`Bounds`] and whether the optimizer may vary it. A [`ParameterMap`] is the
//! immutable-by-convention snapshot handed to the forward model, with derived
//! entries (the dimensionless fracture half-length) kept consistent.
//!
//! ## Example Usage
//!
//! ```rust
//! use welltest_rs::parameters::{ParamKey, ParameterSet};
//!
//! let mut params = ParameterSet::with_defaults(&[
//!     ParamKey::InnerPermeability,
//!     ParamKey::WellLength,
//!     ParamKey::FractureHalfLength,
//! ]);
//! params.set_vary(ParamKey::InnerPermeability, true).unwrap();
//! params.set_value(ParamKey::FractureHalfLength, 150.0).unwrap();
//!
//! let map = params.to_map();
//! assert_eq!(map.get(ParamKey::FractureHalfLengthD), Some(0.15));
//! ```

pub mod bounds;
pub mod key;
pub mod map;
pub mod parameter;
pub mod parameter_set;

// Re-export key types
pub use bounds::{Bounds, BoundsError};
pub use key::{DisplayInfo, ParamKey};
pub use map::ParameterMap;
pub use parameter::FitParameter;
pub use parameter_set::ParameterSet;
