//! End-to-end scheduling pipeline and KPI evaluation.
//!
//! [`JobShopScheduler`] runs the whole chain for one [`ShopModel`]:
//!
//! 1. build the disjunctive formulation ([`ConstraintBuilder`])
//! 2. hand it to a [`MilpSolver`]
//! 3. read the assignment back and re-verify it ([`ScheduleExtractor`])
//! 4. compute machine utilization and KPIs
//!
//! Solver failures and infeasibility are surfaced unchanged; the pipeline
//! never retries and never falls back to a heuristic schedule.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7
//! - Manne (1960), "On the Job-Shop Scheduling Problem"

mod extract;
mod kpi;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ScheduleError;
use crate::milp::ConstraintBuilder;
use crate::models::{Schedule, ShopModel};
use crate::solver::MilpSolver;

pub use extract::{ScheduleExtractor, DEFAULT_TOLERANCE};
pub use kpi::{MachineUtilization, ScheduleKpi, UtilizationReport};

/// Size of the formulation and how the solve went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Backend name.
    pub solver: String,
    /// Number of variables.
    pub variables: usize,
    /// Number of binary (ordering) variables.
    pub binaries: usize,
    /// Number of constraint rows.
    pub constraints: usize,
    /// Big-M constant (minutes).
    pub big_m: f64,
    /// Objective value reported by the solver.
    pub objective_value: f64,
    /// Wall-clock time of the solver call.
    pub elapsed: Duration,
}

/// A verified schedule with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedSchedule {
    pub schedule: Schedule,
    pub utilization: UtilizationReport,
    pub kpi: ScheduleKpi,
    pub stats: SolveStats,
}

impl SolvedSchedule {
    /// Makespan of the schedule (minutes).
    pub fn makespan(&self) -> f64 {
        self.schedule.makespan()
    }
}

/// Minimum-makespan job-shop scheduler backed by a MILP solver.
///
/// # Example
/// ```
/// use u_jobshop::models::{Machine, ShopModel, Task};
/// use u_jobshop::scheduler::JobShopScheduler;
/// use u_jobshop::solver::EnumerativeSolver;
///
/// let model = ShopModel::new(
///     vec![Machine::new("M1")],
///     vec![Task::new("J1", "A", "M1", 60.0), Task::new("J2", "A", "M1", 60.0)],
/// )
/// .unwrap();
/// let solved = JobShopScheduler::new(EnumerativeSolver::new()).solve(&model).unwrap();
/// assert!((solved.makespan() - 120.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct JobShopScheduler<S> {
    solver: S,
    time_limit: Option<Duration>,
    tolerance: f64,
    makespan_limit: Option<f64>,
}

impl<S: MilpSolver> JobShopScheduler<S> {
    /// Creates a scheduler without a time limit.
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            time_limit: None,
            tolerance: DEFAULT_TOLERANCE,
            makespan_limit: None,
        }
    }

    /// Sets the solver time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the tolerance used when verifying the solver's output.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Requires the makespan to stay within `limit` minutes.
    pub fn with_makespan_limit(mut self, limit: f64) -> Self {
        self.makespan_limit = Some(limit);
        self
    }

    /// The underlying solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Solves `model` for minimum makespan.
    ///
    /// # Errors
    /// - `Infeasible` if no schedule meets the constraints
    /// - `SolverFailure` if the backend fails or times out
    /// - `InvariantViolation` if the backend's answer is not a valid schedule
    pub fn solve(&self, model: &ShopModel) -> Result<SolvedSchedule, ScheduleError> {
        let mut builder = ConstraintBuilder::new(model);
        if let Some(limit) = self.makespan_limit {
            builder = builder.with_makespan_limit(limit);
        }
        let formulation = builder.build();
        let system = &formulation.system;

        info!(
            solver = self.solver.name(),
            tasks = model.task_count(),
            binaries = system.binary_count(),
            constraints = system.constraint_count(),
            "solving job-shop model"
        );

        let started = Instant::now();
        let outcome = self
            .solver
            .solve(system, &formulation.objective, self.time_limit);
        let elapsed = started.elapsed();

        let assignment = outcome.into_result().inspect_err(|e| {
            warn!(solver = self.solver.name(), error = %e, "solve failed");
        })?;

        let schedule = ScheduleExtractor::new(model, &formulation)
            .with_tolerance(self.tolerance)
            .extract(&assignment)?;

        let utilization = UtilizationReport::calculate(model, &schedule);
        let kpi = ScheduleKpi::calculate(model, &schedule, &utilization);

        info!(
            solver = self.solver.name(),
            makespan = schedule.makespan(),
            elapsed_ms = elapsed.as_millis() as u64,
            "schedule found"
        );

        Ok(SolvedSchedule {
            stats: SolveStats {
                solver: self.solver.name().to_string(),
                variables: system.variable_count(),
                binaries: system.binary_count(),
                constraints: system.constraint_count(),
                big_m: system.big_m(),
                objective_value: assignment.objective_value(),
                elapsed,
            },
            schedule,
            utilization,
            kpi,
        })
    }
}
