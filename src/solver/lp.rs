//! `good_lp` backend using the pure-Rust microlp engine.
//!
//! Every variable and row of the [`ConstraintSystem`] is mirrored one to one
//! into a `good_lp` problem; binaries become `good_lp` binary variables.
//! microlp has no time limit of its own, so the solve runs on a worker
//! thread and the caller's limit is enforced by waiting on it.

use std::time::Duration;

use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::debug;

use super::{run_with_time_limit, MilpSolver, Outcome, SolverFailure, VariableAssignment};
use crate::milp::{Comparison, ConstraintSystem, LinearExpr, Objective, VarDomain};

/// MILP backend built on `good_lp` + microlp.
///
/// With a time limit, each solve runs on its own worker thread. microlp
/// cannot be interrupted, so a timed-out solve keeps its thread busy (and
/// its CPU core) until the search ends on its own; the result is dropped.
/// Callers issuing many short-limited solves should expect that many
/// threads to linger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpSolver;

impl LpSolver {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for LpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(
        &self,
        system: &ConstraintSystem,
        objective: &Objective,
        time_limit: Option<Duration>,
    ) -> Outcome {
        let system = system.clone();
        let objective = objective.clone();
        run_with_time_limit(time_limit, move || solve_blocking(&system, &objective))
    }
}

fn solve_blocking(system: &ConstraintSystem, objective: &Objective) -> Outcome {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = system
        .variables()
        .iter()
        .map(|v| {
            let definition = match v.domain {
                VarDomain::Binary => variable().binary(),
                VarDomain::Continuous {
                    lower,
                    upper: Some(upper),
                } => variable().min(lower).max(upper),
                VarDomain::Continuous { lower, upper: None } => variable().min(lower),
            };
            vars.add(definition)
        })
        .collect();

    let mut problem = vars
        .minimise(to_expression(objective.expr(), &handles))
        .using(good_lp::microlp);

    for row in system.constraints().values() {
        let lhs = to_expression(row.lhs(), &handles);
        let rhs = Expression::from(row.rhs());
        problem = problem.with(match row.comparison() {
            Comparison::LessEq => constraint::leq(lhs, rhs),
            Comparison::GreaterEq => constraint::geq(lhs, rhs),
            Comparison::Equal => constraint::eq(lhs, rhs),
        });
    }

    match problem.solve() {
        Ok(solution) => {
            let values: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
            let objective_value = objective.evaluate(&values);
            debug!(objective_value, "microlp solved");
            Outcome::Optimal(VariableAssignment::new(values, objective_value))
        }
        Err(ResolutionError::Infeasible) => Outcome::Infeasible,
        Err(e) => Outcome::SolverError(SolverFailure::Backend(e.to_string())),
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.offset());
    for (var, coef) in expr.terms() {
        out.add_mul(coef, handles[var.index()]);
    }
    out
}
