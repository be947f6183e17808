use thiserror::Error;

use crate::model::ModelType;
use crate::parameters::BoundsError;

/// Error types for the welltest-rs library.
///
/// Errors are raised only at boundaries: invalid inputs to a fit launch,
/// unavailable model variants, malformed data files and I/O. Numerical
/// degeneracies inside the forward model and the optimizer are absorbed and
/// counted instead (see [`crate::model::Degeneracy`]).
#[derive(Error, Debug)]
pub enum WellTestError {
    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    /// The requested model variant has no forward solution.
    #[error("Model unavailable: {0} has no forward solution")]
    ModelUnavailable(ModelType),

    /// A fit was launched while another one is still running.
    #[error("A fit is already running")]
    FitAlreadyRunning,

    /// The fit worker thread terminated abnormally.
    #[error("Fit worker failed: {0}")]
    WorkerFailed(String),

    /// Error while parsing text input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for welltest-rs operations.
pub type Result<T> = std::result::Result<T, WellTestError>;
