//! # welltest-rs
//!
//! `welltest-rs` interprets pressure-transient well tests of multi-fractured
//! horizontal wells in composite reservoirs.
//!
//! The library provides:
//! - A Laplace-domain forward model with Stehfest inversion and Bourdet
//!   derivatives ([`model`], [`derivative`])
//! - A typed parameter system with bounds and derived values ([`parameters`])
//! - Levenberg-Marquardt history matching on log-space residuals ([`lm`])
//! - Background fit sessions with progress events and cancellation ([`session`])
//! - Loading of observed data and export of results ([`data`])
//!
//! ## Basic Usage
//!
//! ```
//! use welltest_rs::model::{ModelType, Precision};
//!
//! let model = ModelType::CompositeFracturedHorizontal;
//! let params = model.default_parameters().to_map();
//! let curve = model
//!     .compute_curve(&params, &[0.01, 0.1, 1.0, 10.0], Precision::Fast)
//!     .unwrap();
//! assert_eq!(curve.len(), 4);
//! assert!(curve.pressure.iter().all(|p| *p > 0.0));
//! ```

pub mod error;

pub mod parameters;

pub mod data;
pub mod derivative;
pub mod lm;
pub mod model;
pub mod session;
pub mod utils;

// Re-exports for convenience
pub use error::{Result, WellTestError};
pub use lm::{CancellationToken, FitConfig, FitEvent, FitReport, LevenbergMarquardt};
pub use model::{ForwardModel, ModelCurve, ModelType, Precision};
pub use parameters::{FitParameter, ParamKey, ParameterMap, ParameterSet};
pub use session::{FitHandle, FitRequest, FitRunner};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
