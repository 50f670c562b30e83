//! Disjunctive MILP formulation of the job-shop makespan problem.
//!
//! # Formulation
//!
//! For every task `i` with duration `dᵢ`:
//! - `End[i] = Start[i] + dᵢ`
//! - `Makespan ≥ End[i]`
//!
//! For every predecessor link `p → i`: `Start[i] ≥ End[p]`.
//!
//! For every unordered pair `(i, j)`, `i < j`, sharing a machine, one
//! binary `order[i,j]` (0 = i first, 1 = j first) and
//! - `End[i] ≤ Start[j] + order·M`
//! - `Start[i] ≥ End[j] − (1 − order)·M`
//!
//! Objective: minimize `Makespan`.
//!
//! `M` is the sum of all durations, which is also the upper bound of every
//! time variable: a serial schedule finishes by then, so the optimum does
//! too, and with times in `[0, M]` the relaxed half of each disjunction can
//! never cut off a feasible point. Pairs on different machines get neither
//! a binary nor a row.
//!
//! # Reference
//! Manne (1960), "On the Job-Shop Scheduling Problem", Operations Research 8(2)

use tracing::debug;

use super::expr::{LinearConstraint, LinearExpr};
use super::system::{ConstraintId, ConstraintSystem, Objective, TaskPair, VarDomain, VarRole};
use crate::models::ShopModel;

/// A constraint system together with its objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub system: ConstraintSystem,
    pub objective: Objective,
}

/// Builds the disjunctive formulation of a [`ShopModel`].
///
/// # Example
/// ```
/// use u_jobshop::milp::ConstraintBuilder;
/// use u_jobshop::models::{Machine, ShopModel, Task};
///
/// let model = ShopModel::new(
///     vec![Machine::new("M1")],
///     vec![Task::new("J1", "A", "M1", 60.0), Task::new("J2", "A", "M1", 60.0)],
/// )
/// .unwrap();
/// let formulation = ConstraintBuilder::new(&model).build();
/// assert_eq!(formulation.system.binary_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintBuilder<'a> {
    model: &'a ShopModel,
    makespan_limit: Option<f64>,
}

impl<'a> ConstraintBuilder<'a> {
    /// Creates a builder for `model`.
    pub fn new(model: &'a ShopModel) -> Self {
        Self {
            model,
            makespan_limit: None,
        }
    }

    /// Adds `Makespan ≤ limit` (e.g. "must finish within the shift").
    pub fn with_makespan_limit(mut self, limit: f64) -> Self {
        self.makespan_limit = Some(limit);
        self
    }

    /// Builds the formulation. Deterministic for a given model.
    pub fn build(&self) -> Formulation {
        let model = self.model;
        let horizon = model.total_duration_min();
        let mut system = ConstraintSystem::new(horizon);
        let time = VarDomain::non_negative(Some(horizon));

        let mut start = Vec::with_capacity(model.task_count());
        let mut end = Vec::with_capacity(model.task_count());
        for i in model.task_indices() {
            start.push(system.add_variable(VarRole::Start(i), time));
            end.push(system.add_variable(VarRole::End(i), time));
        }
        let makespan = system.add_variable(VarRole::Makespan, time);

        for i in model.task_indices() {
            let (s, e) = (start[i.get()], end[i.get()]);
            let duration = model.task(i).duration_min;

            system.add_constraint(
                ConstraintId::Duration(i),
                LinearConstraint::eq(e, s + duration),
            );

            if let Some(p) = model.predecessor_of(i) {
                system.add_constraint(
                    ConstraintId::Precedence {
                        predecessor: p,
                        successor: i,
                    },
                    LinearConstraint::geq(s, end[p.get()]),
                );
            }

            system.add_constraint(
                ConstraintId::MakespanLink(i),
                LinearConstraint::geq(makespan, e),
            );
        }

        let big_m = system.big_m();
        for machine in 0..model.machines().len() {
            let tasks = model.tasks_on_machine(machine);
            for (a, &i) in tasks.iter().enumerate() {
                for &j in &tasks[a + 1..] {
                    let pair = TaskPair::new(i, j);
                    let order = system.add_variable(VarRole::Order(pair), VarDomain::Binary);
                    let (si, ei) = (start[i.get()], end[i.get()]);
                    let (sj, ej) = (start[j.get()], end[j.get()]);

                    system.add_constraint(
                        ConstraintId::ExclusionBefore(pair),
                        LinearConstraint::leq(ei, sj + order * big_m),
                    );
                    system.add_constraint(
                        ConstraintId::ExclusionAfter(pair),
                        LinearConstraint::geq(si, LinearExpr::from(ej) + order * big_m - big_m),
                    );
                }
            }
        }

        if let Some(limit) = self.makespan_limit {
            system.add_constraint(
                ConstraintId::MakespanLimit,
                LinearConstraint::leq(makespan, limit),
            );
        }

        debug!(
            tasks = model.task_count(),
            variables = system.variable_count(),
            binaries = system.binary_count(),
            constraints = system.constraint_count(),
            big_m,
            "built disjunctive formulation"
        );

        Formulation {
            system,
            objective: Objective::minimize(makespan),
        }
    }
}
