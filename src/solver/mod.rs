//! Solver adapters.
//!
//! The scheduling core only needs one capability from an optimization
//! engine: take a [`ConstraintSystem`] and an [`Objective`], and come back
//! with an [`Outcome`]. [`MilpSolver`] is that seam.
//!
//! # Backends
//!
//! | Backend | Feature | Use |
//! |---------|---------|-----|
//! | [`EnumerativeSolver`] | always | exact branch-and-bound over binaries, small instances and tests |
//! | `LpSolver` | `microlp` | `good_lp` with the pure-Rust microlp engine |
//!
//! Adapters own no scheduling logic. They never substitute a default
//! assignment on failure, and a time limit that expires always yields
//! [`SolverFailure::Timeout`].

mod enumerative;
#[cfg(feature = "microlp")]
mod lp;

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::ScheduleError;
use crate::milp::{ConstraintSystem, Objective, VarId};

pub use enumerative::EnumerativeSolver;
#[cfg(feature = "microlp")]
pub use lp::LpSolver;

/// Why a backend produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverFailure {
    /// The caller's time limit expired.
    #[error("time limit of {limit:?} exceeded")]
    Timeout { limit: Duration },

    /// The engine reported an error (numerical failure, unavailable backend).
    #[error("backend error: {0}")]
    Backend(String),

    /// The engine cannot handle this constraint system.
    #[error("unsupported constraint system: {0}")]
    Unsupported(String),
}

/// Values for every variable of a constraint system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableAssignment {
    values: Vec<f64>,
    objective_value: f64,
}

impl VariableAssignment {
    /// Creates an assignment; `values` is indexed by [`VarId::index`].
    pub fn new(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            values,
            objective_value,
        }
    }

    /// Value of a variable.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    /// All values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Objective value reported with the assignment.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }
}

/// Result of a solve call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Optimal (within solver tolerance) assignment.
    Optimal(VariableAssignment),
    /// No assignment satisfies all constraints.
    Infeasible,
    /// The engine failed to produce a result.
    SolverError(SolverFailure),
}

impl Outcome {
    /// Converts into the crate's error taxonomy.
    pub fn into_result(self) -> Result<VariableAssignment, ScheduleError> {
        match self {
            Self::Optimal(assignment) => Ok(assignment),
            Self::Infeasible => Err(ScheduleError::Infeasible),
            Self::SolverError(failure) => Err(ScheduleError::SolverFailure(failure)),
        }
    }

    /// Whether an assignment was found.
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal(_))
    }
}

/// A mixed-integer linear optimization engine.
pub trait MilpSolver {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// Minimizes `objective` subject to `system`.
    ///
    /// A `time_limit` that expires must yield
    /// `Outcome::SolverError(SolverFailure::Timeout { .. })`.
    fn solve(
        &self,
        system: &ConstraintSystem,
        objective: &Objective,
        time_limit: Option<Duration>,
    ) -> Outcome;
}

impl<S: MilpSolver + ?Sized> MilpSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(
        &self,
        system: &ConstraintSystem,
        objective: &Objective,
        time_limit: Option<Duration>,
    ) -> Outcome {
        (**self).solve(system, objective, time_limit)
    }
}

impl<S: MilpSolver + ?Sized> MilpSolver for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(
        &self,
        system: &ConstraintSystem,
        objective: &Objective,
        time_limit: Option<Duration>,
    ) -> Outcome {
        (**self).solve(system, objective, time_limit)
    }
}

/// Runs a blocking solve on a worker thread and waits at most `time_limit`.
///
/// On timeout the worker is detached, not cancelled: it keeps running until
/// `job` returns, and its result is discarded.
#[cfg_attr(not(feature = "microlp"), allow(dead_code))]
pub(crate) fn run_with_time_limit<F>(time_limit: Option<Duration>, job: F) -> Outcome
where
    F: FnOnce() -> Outcome + Send + 'static,
{
    let Some(limit) = time_limit else {
        return job();
    };

    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("milp-solve".into())
        .spawn(move || {
            let _ = tx.send(job());
        });
    if let Err(e) = spawned {
        return Outcome::SolverError(SolverFailure::Backend(format!(
            "failed to spawn solver thread: {e}"
        )));
    }

    match rx.recv_timeout(limit) {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            warn!(?limit, "solver time limit exceeded");
            Outcome::SolverError(SolverFailure::Timeout { limit })
        }
        Err(RecvTimeoutError::Disconnected) => {
            Outcome::SolverError(SolverFailure::Backend("solver thread panicked".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_into_result() {
        let a = VariableAssignment::new(vec![1.0, 2.0], 2.0);
        assert_eq!(Outcome::Optimal(a.clone()).into_result(), Ok(a));
        assert_eq!(
            Outcome::Infeasible.into_result(),
            Err(ScheduleError::Infeasible)
        );
        let failure = SolverFailure::Backend("numerical trouble".into());
        assert_eq!(
            Outcome::SolverError(failure.clone()).into_result(),
            Err(ScheduleError::SolverFailure(failure))
        );
    }

    #[test]
    fn test_time_limit_passthrough() {
        let outcome = run_with_time_limit(None, || Outcome::Infeasible);
        assert_eq!(outcome, Outcome::Infeasible);

        let outcome = run_with_time_limit(Some(Duration::from_secs(5)), || Outcome::Infeasible);
        assert_eq!(outcome, Outcome::Infeasible);
    }

    #[test]
    fn test_time_limit_expires() {
        let limit = Duration::from_millis(20);
        let outcome = run_with_time_limit(Some(limit), || {
            thread::sleep(Duration::from_millis(500));
            Outcome::Infeasible
        });
        assert_eq!(outcome, Outcome::SolverError(SolverFailure::Timeout { limit }));
    }

    #[test]
    fn test_timed_out_worker_runs_to_completion() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let limit = Duration::from_millis(10);
        let outcome = run_with_time_limit(Some(limit), move || {
            thread::sleep(Duration::from_millis(300));
            flag.store(true, Ordering::SeqCst);
            Outcome::Infeasible
        });
        assert_eq!(outcome, Outcome::SolverError(SolverFailure::Timeout { limit }));
        assert!(!finished.load(Ordering::SeqCst));

        thread::sleep(Duration::from_millis(1000));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_panicking_backend_is_an_error() {
        let outcome = run_with_time_limit(Some(Duration::from_secs(5)), || {
            panic!("engine crashed");
        });
        assert!(matches!(
            outcome,
            Outcome::SolverError(SolverFailure::Backend(_))
        ));
    }
}
