//! Error taxonomy of a scheduling run.
//!
//! Every variant is structured: callers branch on [`ScheduleError::kind`]
//! and read the offending entity IDs from the payload.

use std::fmt::Display;

use thiserror::Error;

use crate::models::Violation;
use crate::solver::SolverFailure;
use crate::validation::ConfigurationError;

/// Errors produced while building, solving or interpreting a schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Input data is inconsistent. Reported before any solve attempt.
    #[error("invalid configuration: {}", join(.0))]
    Configuration(Vec<ConfigurationError>),

    /// No assignment satisfies the constraint system.
    #[error("no feasible schedule exists")]
    Infeasible,

    /// The optimization backend did not produce a result.
    #[error("solver failure: {0}")]
    SolverFailure(#[from] SolverFailure),

    /// The solver's assignment breaks a schedule invariant.
    #[error("solver output violates schedule invariants: {}", join(.0))]
    InvariantViolation(Vec<Violation>),
}

/// Categories of schedule errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleErrorKind {
    Configuration,
    Infeasible,
    SolverFailure,
    InvariantViolation,
}

impl ScheduleError {
    /// Error category.
    pub fn kind(&self) -> ScheduleErrorKind {
        match self {
            Self::Configuration(_) => ScheduleErrorKind::Configuration,
            Self::Infeasible => ScheduleErrorKind::Infeasible,
            Self::SolverFailure(_) => ScheduleErrorKind::SolverFailure,
            Self::InvariantViolation(_) => ScheduleErrorKind::InvariantViolation,
        }
    }

    /// Violations carried by an `InvariantViolation` error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::InvariantViolation(v) => v,
            _ => &[],
        }
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
