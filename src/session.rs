//! Background history-match sessions.
//!
//! A [`FitRunner`] runs at most one fit at a time on a worker thread. The
//! caller keeps a [`FitHandle`] to read [`FitEvent`]s from a channel, to
//! request cancellation, and to collect the [`FitReport`].
//!
//! ```no_run
//! use welltest_rs::data::ObservedDataSet;
//! use welltest_rs::model::ModelType;
//! use welltest_rs::session::{FitRequest, FitRunner};
//!
//! # fn run(observed: ObservedDataSet) -> welltest_rs::Result<()> {
//! let runner = FitRunner::new();
//! let model = ModelType::CompositeFracturedHorizontal;
//! let request = FitRequest::new(model, model.default_parameters(), observed);
//! let handle = runner.launch(request)?;
//! for event in handle.events() {
//!     println!("{:?}", event);
//! }
//! let report = handle.join()?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::data::ObservedDataSet;
use crate::error::{Result, WellTestError};
use crate::lm::{CancellationToken, FitConfig, FitEvent, FitReport, LevenbergMarquardt};
use crate::model::ModelType;
use crate::parameters::ParameterSet;

/// Default share of the pressure channel in the residuals.
pub const DEFAULT_PRESSURE_WEIGHT: f64 = 0.5;

/// Everything a worker needs to run one fit.
#[derive(Debug, Clone)]
pub struct FitRequest {
    pub model_type: ModelType,
    pub parameters: ParameterSet,
    pub observed: ObservedDataSet,
    pub weight: f64,
    pub config: FitConfig,
}

impl FitRequest {
    /// Request with the default weight and configuration.
    pub fn new(model_type: ModelType, parameters: ParameterSet, observed: ObservedDataSet) -> Self {
        Self {
            model_type,
            parameters,
            observed,
            weight: DEFAULT_PRESSURE_WEIGHT,
            config: FitConfig::default(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }
}

/// Clears the runner's busy flag when the worker ends, including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Launches fits on a worker thread, one at a time.
#[derive(Debug, Clone, Default)]
pub struct FitRunner {
    running: Arc<AtomicBool>,
}

impl FitRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a launched fit has not finished yet.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start `request` on a new worker thread.
    ///
    /// # Errors
    ///
    /// `FitAlreadyRunning` while a previous fit from this runner is active,
    /// `ModelUnavailable` for a model without a forward solution, and
    /// `WorkerFailed` if the thread cannot be spawned.
    pub fn launch(&self, request: FitRequest) -> Result<FitHandle> {
        request.model_type.forward_model()?;
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(WellTestError::FitAlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        let (sender, receiver) = mpsc::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        info!(
            "launching history match of {} ({} parameters, {} samples)",
            request.model_type,
            request.parameters.active_keys().len(),
            request.observed.len()
        );
        let join = thread::Builder::new()
            .name("welltest-fit".to_string())
            .spawn(move || {
                let _guard = guard;
                let optimizer = LevenbergMarquardt::with_config(request.config);
                optimizer.fit(
                    request.model_type,
                    &request.parameters,
                    &request.observed,
                    request.weight,
                    &token,
                    |event| {
                        // the receiver may be gone; the fit still runs to completion
                        let _ = sender.send(event);
                    },
                )
            })
            .map_err(|e| WellTestError::WorkerFailed(e.to_string()))?;

        Ok(FitHandle {
            events: receiver,
            cancel,
            join,
        })
    }
}

/// Handle to a running fit.
#[derive(Debug)]
pub struct FitHandle {
    events: Receiver<FitEvent>,
    cancel: CancellationToken,
    join: JoinHandle<Result<FitReport>>,
}

impl FitHandle {
    /// Event stream; ends when the worker finishes.
    pub fn events(&self) -> &Receiver<FitEvent> {
        &self.events
    }

    /// Request cancellation; takes effect at the next outer iteration.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the token, for cancelling from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker and return its report.
    pub fn join(self) -> Result<FitReport> {
        match self.join.join() {
            Ok(result) => result,
            Err(_) => {
                warn!("history match worker panicked");
                Err(WellTestError::WorkerFailed(
                    "history match worker panicked".to_string(),
                ))
            }
        }
    }
}
