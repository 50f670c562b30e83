//! Parallel evaluation of independent scenarios.
//!
//! Each model is formulated and solved on its own; nothing is shared
//! between scenarios except the (read-only) scheduler. Results come back
//! in input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ScheduleError, ScheduleErrorKind};
use crate::models::ShopModel;
use crate::scheduler::{JobShopScheduler, SolvedSchedule};
use crate::solver::MilpSolver;

/// Solves every model in parallel.
pub fn solve_batch<S>(
    scheduler: &JobShopScheduler<S>,
    models: &[ShopModel],
) -> Vec<Result<SolvedSchedule, ScheduleError>>
where
    S: MilpSolver + Sync,
{
    let results: Vec<_> = models.par_iter().map(|m| scheduler.solve(m)).collect();
    let summary = BatchSummary::from_results(&results);
    info!(
        scenarios = summary.scenarios,
        solved = summary.solved,
        infeasible = summary.infeasible,
        failed = summary.failed,
        "batch finished"
    );
    results
}

/// Aggregate view of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub scenarios: usize,
    pub solved: usize,
    pub infeasible: usize,
    /// Solver failures, invariant violations and bad input.
    pub failed: usize,
    /// Smallest makespan among solved scenarios.
    pub best_makespan: Option<f64>,
    /// Mean makespan among solved scenarios.
    pub mean_makespan: Option<f64>,
}

impl BatchSummary {
    /// Summarizes batch results.
    pub fn from_results(results: &[Result<SolvedSchedule, ScheduleError>]) -> Self {
        let mut summary = Self {
            scenarios: results.len(),
            ..Self::default()
        };
        let mut total = 0.0;
        for result in results {
            match result {
                Ok(solved) => {
                    let makespan = solved.makespan();
                    summary.solved += 1;
                    total += makespan;
                    summary.best_makespan =
                        Some(summary.best_makespan.map_or(makespan, |b| b.min(makespan)));
                }
                Err(e) if e.kind() == ScheduleErrorKind::Infeasible => summary.infeasible += 1,
                Err(_) => summary.failed += 1,
            }
        }
        if summary.solved > 0 {
            summary.mean_makespan = Some(total / summary.solved as f64);
        }
        summary
    }
}
