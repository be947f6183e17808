//! Levenberg-Marquardt history matching of pressure-transient models.
//!
//! The optimizer ([`LevenbergMarquardt`]) fits the log-space misfit between
//! an [`ObservedDataSet`](crate::data::ObservedDataSet) and a forward model,
//! reporting progress through [`FitEvent`]s and honouring a
//! [`CancellationToken`] between outer iterations.

pub mod algorithm;
pub mod cancel;
pub mod config;
pub mod convergence;
pub mod events;
pub mod residuals;
pub mod step;

pub use algorithm::LevenbergMarquardt;
pub use cancel::CancellationToken;
pub use config::{DifferenceSteps, FitConfig};
pub use convergence::TerminationReason;
pub use events::{FitEvent, FitReport, IterationUpdate};
pub use residuals::{log_residuals, sum_of_squares, ResidualEvaluator};
pub use step::{apply_step, NormalEquations};
