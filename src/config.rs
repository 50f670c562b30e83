//! Solver settings loaded from TOML.
//!
//! ```toml
//! backend = "microlp"
//! time_limit_seconds = 30.0
//! tolerance = 1e-6
//! ```
//!
//! Every key is optional. Without a file the defaults apply: the microlp
//! backend when the `microlp` feature is enabled (the enumerative backend
//! otherwise), no time limit, and a tolerance of 1e-6 minutes.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scheduler::{JobShopScheduler, DEFAULT_TOLERANCE};
use crate::solver::{EnumerativeSolver, MilpSolver};

/// Settings error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Which MILP backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Exact branch-and-bound (always available).
    Enumerative,
    /// `good_lp` with microlp (`microlp` feature).
    Microlp,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "microlp") {
            Self::Microlp
        } else {
            Self::Enumerative
        }
    }
}

/// A boxed backend usable from several threads.
pub type DynSolver = Box<dyn MilpSolver + Send + Sync>;

/// Scheduling run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SolverSettings {
    /// Backend selection.
    #[serde(default)]
    pub backend: Backend,

    /// Solver time limit; `None` waits indefinitely.
    #[serde(default)]
    pub time_limit_seconds: Option<f64>,

    /// Numerical tolerance for verifying the solver's output (minutes).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            time_limit_seconds: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolverSettings {
    /// Creates default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// holds out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Sets the backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the time limit in seconds.
    pub fn with_time_limit_seconds(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(secs) = self.time_limit_seconds {
            if !(secs.is_finite() && secs >= 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "time_limit_seconds must be a non-negative number, got {secs}"
                )));
            }
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SettingsError::Invalid(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Time limit as a [`Duration`].
    ///
    /// The limit bounds how long the caller waits, not how long the backend
    /// computes. The microlp backend keeps running on a detached thread after
    /// a timeout and releases it only when its search finishes.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    /// Instantiates the configured backend.
    ///
    /// # Errors
    /// `Invalid` if the backend was compiled out.
    pub fn build_solver(&self) -> Result<DynSolver, SettingsError> {
        match self.backend {
            Backend::Enumerative => Ok(Box::new(EnumerativeSolver::new())),
            #[cfg(feature = "microlp")]
            Backend::Microlp => Ok(Box::new(crate::solver::LpSolver::new())),
            #[cfg(not(feature = "microlp"))]
            Backend::Microlp => Err(SettingsError::Invalid(
                "backend 'microlp' requires the `microlp` feature".into(),
            )),
        }
    }

    /// Builds a scheduler with these settings.
    pub fn build_scheduler(&self) -> Result<JobShopScheduler<DynSolver>, SettingsError> {
        let mut scheduler =
            JobShopScheduler::new(self.build_solver()?).with_tolerance(self.tolerance);
        if let Some(limit) = self.time_limit() {
            scheduler = scheduler.with_time_limit(limit);
        }
        Ok(scheduler)
    }
}
