//! Exact branch-and-bound over binary variables.
//!
//! # Algorithm
//!
//! Once every binary is fixed, each row of a disjunctive scheduling model
//! is a *difference constraint* (`a·(x − y) ≤ b`) or a bound (`a·x ≤ b`).
//! Such a system has a least solution, found by longest-path relaxation
//! from the lower bounds (Bellman-Ford); a positive cycle, or a value pushed
//! above its upper bound, means the system is infeasible. The least solution
//! minimizes every variable at once, so it is optimal for any objective with
//! non-negative continuous coefficients.
//!
//! Binaries are fixed depth-first (0 before 1). At every node, rows with
//! unfixed binaries are relaxed by taking each binary term at its most
//! permissive value; the least solution of that relaxation bounds the
//! subtree from below and prunes it against the incumbent.
//!
//! Rows that are not difference constraints are rejected with
//! [`SolverFailure::Unsupported`].
//!
//! # Complexity
//! O(2^b · V · E) in the worst case for b binaries; intended for small
//! instances and as a reference backend in tests.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 24.4
//! (Difference constraints and shortest paths)

use std::time::{Duration, Instant};

use tracing::debug;

use super::{MilpSolver, Outcome, SolverFailure, VariableAssignment};
use crate::milp::{Comparison, ConstraintSystem, LinearExpr, Objective};

/// Exact solver for difference-constraint systems with binary switches.
#[derive(Debug, Clone)]
pub struct EnumerativeSolver {
    tolerance: f64,
}

impl Default for EnumerativeSolver {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl EnumerativeSolver {
    /// Creates a solver with the default feasibility tolerance (1e-9).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the feasibility tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl MilpSolver for EnumerativeSolver {
    fn name(&self) -> &'static str {
        "enumerative"
    }

    fn solve(
        &self,
        system: &ConstraintSystem,
        objective: &Objective,
        time_limit: Option<Duration>,
    ) -> Outcome {
        let prepared = match Prepared::new(system, objective) {
            Ok(p) => p,
            Err(failure) => return Outcome::SolverError(failure),
        };

        let mut search = Search {
            prepared: &prepared,
            tolerance: self.tolerance,
            started: Instant::now(),
            time_limit,
            fixed: vec![None; prepared.binaries.len()],
            best: None,
            nodes: 0,
        };

        if let Err(failure) = search.branch(0) {
            return Outcome::SolverError(failure);
        }

        debug!(
            nodes = search.nodes,
            binaries = prepared.binaries.len(),
            elapsed_ms = search.started.elapsed().as_millis() as u64,
            "branch-and-bound finished"
        );

        match search.best {
            Some((objective_value, values)) => {
                Outcome::Optimal(VariableAssignment::new(values, objective_value))
            }
            None => Outcome::Infeasible,
        }
    }
}

/// Continuous part of a `≤` row.
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// No continuous variable.
    Constant,
    /// `coef · x[var] ≤ rhs`.
    Single { var: usize, coef: f64 },
    /// `scale · (x[pos] − x[neg]) ≤ rhs`, `scale > 0`.
    Difference { pos: usize, neg: usize, scale: f64 },
}

/// A row in `Σ ≤ rhs` form, binaries kept apart.
#[derive(Debug, Clone)]
struct Row {
    shape: Shape,
    binary_terms: Vec<(usize, f64)>,
    rhs: f64,
}

/// System translated into the solver's internal form.
#[derive(Debug)]
struct Prepared {
    /// Variable index of each binary, in branching order.
    binaries: Vec<usize>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    rows: Vec<Row>,
    /// Objective coefficients of continuous variables (all ≥ 0).
    cost: Vec<(usize, f64)>,
    /// Objective coefficient of each binary, by branching position.
    binary_cost: Vec<f64>,
    cost_offset: f64,
}

impl Prepared {
    fn new(system: &ConstraintSystem, objective: &Objective) -> Result<Self, SolverFailure> {
        let n = system.variable_count();
        let mut binary_pos = vec![None; n];
        let mut binaries = Vec::new();
        let mut lower = Vec::with_capacity(n);
        let mut upper = Vec::with_capacity(n);

        for (i, v) in system.variables().iter().enumerate() {
            if v.domain.is_binary() {
                binary_pos[i] = Some(binaries.len());
                binaries.push(i);
            }
            lower.push(v.domain.lower());
            upper.push(v.domain.upper().unwrap_or(f64::INFINITY));
        }

        let mut rows = Vec::new();
        for (id, constraint) in system.constraints() {
            let signs: &[f64] = match constraint.comparison() {
                Comparison::LessEq => &[1.0],
                Comparison::GreaterEq => &[-1.0],
                Comparison::Equal => &[1.0, -1.0],
            };
            for &sign in signs {
                let row = Self::row(constraint.lhs(), sign, sign * constraint.rhs(), &binary_pos)
                    .ok_or_else(|| {
                        SolverFailure::Unsupported(format!(
                            "row {id:?} is not a difference constraint"
                        ))
                    })?;
                rows.push(row);
            }
        }

        let mut cost = Vec::new();
        let mut binary_cost = vec![0.0; binaries.len()];
        for (var, coef) in objective.expr().terms() {
            match binary_pos[var.index()] {
                Some(pos) => binary_cost[pos] = coef,
                None if coef < 0.0 => {
                    return Err(SolverFailure::Unsupported(format!(
                        "negative objective coefficient on continuous variable {}",
                        var.index()
                    )));
                }
                None => cost.push((var.index(), coef)),
            }
        }

        Ok(Self {
            binaries,
            lower,
            upper,
            rows,
            cost,
            binary_cost,
            cost_offset: objective.expr().offset(),
        })
    }

    fn row(
        lhs: &LinearExpr,
        sign: f64,
        rhs: f64,
        binary_pos: &[Option<usize>],
    ) -> Option<Row> {
        let mut continuous = Vec::new();
        let mut binary_terms = Vec::new();
        for (var, coef) in lhs.terms() {
            let coef = sign * coef;
            match binary_pos[var.index()] {
                Some(pos) => binary_terms.push((pos, coef)),
                None => continuous.push((var.index(), coef)),
            }
        }

        let shape = match continuous.as_slice() {
            [] => Shape::Constant,
            &[(var, coef)] => Shape::Single { var, coef },
            &[(u, a), (v, b)] if (a + b).abs() <= 1e-12 * a.abs().max(b.abs()) => {
                if a > 0.0 {
                    Shape::Difference {
                        pos: u,
                        neg: v,
                        scale: a,
                    }
                } else {
                    Shape::Difference {
                        pos: v,
                        neg: u,
                        scale: b,
                    }
                }
            }
            _ => return None,
        };

        Some(Row {
            shape,
            binary_terms,
            rhs,
        })
    }

    /// Least solution of the rows with binaries fixed as in `fixed`
    /// (unfixed binaries relaxed), or `None` if that system is infeasible.
    fn least_solution(&self, fixed: &[Option<bool>], tolerance: f64) -> Option<Vec<f64>> {
        let mut x = self.lower.clone();
        let mut upper = self.upper.clone();
        let mut edges: Vec<(usize, usize, f64)> = Vec::new();

        for row in &self.rows {
            let mut rhs = row.rhs;
            for &(pos, coef) in &row.binary_terms {
                rhs -= match fixed[pos] {
                    Some(true) => coef,
                    Some(false) => 0.0,
                    None => coef.min(0.0),
                };
            }
            match row.shape {
                Shape::Constant => {
                    if rhs < -tolerance {
                        return None;
                    }
                }
                Shape::Single { var, coef } if coef > 0.0 => {
                    upper[var] = upper[var].min(rhs / coef);
                }
                Shape::Single { var, coef } => {
                    x[var] = x[var].max(rhs / coef);
                }
                // x[neg] ≥ x[pos] − rhs / scale
                Shape::Difference { pos, neg, scale } => edges.push((pos, neg, -rhs / scale)),
            }
        }

        for (pos, &var) in self.binaries.iter().enumerate() {
            x[var] = match fixed[pos] {
                Some(true) => 1.0,
                _ => 0.0,
            };
        }

        if x.iter().zip(&upper).any(|(v, u)| *v > u + tolerance) {
            return None;
        }

        // Bellman-Ford: converges within |V| passes unless there is a
        // positive cycle.
        for _ in 0..=x.len() {
            let mut changed = false;
            for &(u, v, w) in &edges {
                let candidate = x[u] + w;
                if candidate > x[v] + tolerance {
                    if candidate > upper[v] + tolerance {
                        return None;
                    }
                    x[v] = candidate;
                    changed = true;
                }
            }
            if !changed {
                return Some(x);
            }
        }

        None
    }

    /// Lower bound on the objective for a node with solution `x`.
    fn bound(&self, x: &[f64], fixed: &[Option<bool>]) -> f64 {
        let continuous: f64 = self.cost.iter().map(|&(v, c)| c * x[v]).sum();
        let binary: f64 = self
            .binary_cost
            .iter()
            .zip(fixed)
            .map(|(&c, f)| match f {
                Some(true) => c,
                Some(false) => 0.0,
                None => c.min(0.0),
            })
            .sum();
        continuous + binary + self.cost_offset
    }
}

struct Search<'a> {
    prepared: &'a Prepared,
    tolerance: f64,
    started: Instant,
    time_limit: Option<Duration>,
    fixed: Vec<Option<bool>>,
    best: Option<(f64, Vec<f64>)>,
    nodes: u64,
}

impl Search<'_> {
    fn branch(&mut self, depth: usize) -> Result<(), SolverFailure> {
        if let Some(limit) = self.time_limit {
            if self.started.elapsed() >= limit {
                return Err(SolverFailure::Timeout { limit });
            }
        }
        self.nodes += 1;

        let Some(x) = self.prepared.least_solution(&self.fixed, self.tolerance) else {
            return Ok(());
        };
        let bound = self.prepared.bound(&x, &self.fixed);
        if let Some((incumbent, _)) = &self.best {
            if bound >= *incumbent - self.tolerance {
                return Ok(());
            }
        }

        if depth == self.fixed.len() {
            self.best = Some((bound, x));
            return Ok(());
        }

        for value in [false, true] {
            self.fixed[depth] = Some(value);
            self.branch(depth + 1)?;
        }
        self.fixed[depth] = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::{
        ConstraintBuilder, ConstraintId, LinearConstraint, VarDomain, VarRole,
    };
    use crate::models::{Machine, ShopModel, Task};

    fn solve(model: &ShopModel) -> Outcome {
        let f = ConstraintBuilder::new(model).build();
        EnumerativeSolver::new().solve(&f.system, &f.objective, None)
    }

    fn makespan(outcome: &Outcome) -> f64 {
        match outcome {
            Outcome::Optimal(a) => a.objective_value(),
            other => panic!("expected optimal outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_one_machine_serializes() {
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![
                Task::new("J1", "A", "M1", 60.0),
                Task::new("J2", "A", "M1", 60.0),
                Task::new("J3", "A", "M1", 60.0),
            ],
        )
        .unwrap();
        assert!((makespan(&solve(&model)) - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_machines() {
        let model = ShopModel::new(
            vec![Machine::new("M1"), Machine::new("M2")],
            vec![
                Task::new("J1", "A", "M1", 100.0),
                Task::new("J2", "A", "M2", 100.0),
            ],
        )
        .unwrap();
        assert!((makespan(&solve(&model)) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_job_flow_shop() {
        // J1: M1(3) → M2(2), J2: M1(2) → M2(4).
        // J2 first: J2 M1 [0,2), J1 M1 [2,5), J2 M2 [2,6), J1 M2 [6,8) → 8.
        // J1 first: J1 M1 [0,3), J2 M1 [3,5), J1 M2 [3,5), J2 M2 [5,9) → 9.
        let model = ShopModel::new(
            vec![Machine::new("M1"), Machine::new("M2")],
            vec![
                Task::new("J1", "a", "M1", 3.0),
                Task::new("J1", "b", "M2", 2.0).with_predecessor("a"),
                Task::new("J2", "a", "M1", 2.0),
                Task::new("J2", "b", "M2", 4.0).with_predecessor("a"),
            ],
        )
        .unwrap();
        assert!((makespan(&solve(&model)) - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_problem() {
        let model = ShopModel::new(vec![Machine::new("M1")], vec![]).unwrap();
        assert_eq!(makespan(&solve(&model)), 0.0);
    }

    #[test]
    fn test_makespan_limit_infeasible() {
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![Task::new("J1", "A", "M1", 60.0), Task::new("J2", "A", "M1", 60.0)],
        )
        .unwrap();
        let f = ConstraintBuilder::new(&model).with_makespan_limit(100.0).build();
        let outcome = EnumerativeSolver::new().solve(&f.system, &f.objective, None);
        assert_eq!(outcome, Outcome::Infeasible);

        let f = ConstraintBuilder::new(&model).with_makespan_limit(120.0).build();
        let outcome = EnumerativeSolver::new().solve(&f.system, &f.objective, None);
        assert!((makespan(&outcome) - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_order_values_are_binary() {
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![Task::new("J1", "A", "M1", 10.0), Task::new("J2", "A", "M1", 30.0)],
        )
        .unwrap();
        let f = ConstraintBuilder::new(&model).build();
        let Outcome::Optimal(a) = EnumerativeSolver::new().solve(&f.system, &f.objective, None)
        else {
            panic!("expected optimal outcome");
        };
        for (_, var) in f.system.order_vars() {
            let v = a.value(var);
            assert!(v == 0.0 || v == 1.0);
        }
        for (id, row) in f.system.constraints() {
            assert!(row.is_satisfied(a.values(), 1e-6), "row {id:?} violated");
        }
    }

    #[test]
    fn test_non_difference_row_unsupported() {
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![Task::new("J1", "A", "M1", 10.0), Task::new("J2", "A", "M1", 10.0)],
        )
        .unwrap();
        let mut f = ConstraintBuilder::new(&model).build();
        let mut it = model.task_indices();
        let s0 = f.system.var(VarRole::Start(it.next().unwrap())).unwrap();
        let s1 = f.system.var(VarRole::Start(it.next().unwrap())).unwrap();
        f.system
            .add_constraint(ConstraintId::MakespanLimit, LinearConstraint::geq(s0 + s1, 5.0));

        let outcome = EnumerativeSolver::new().solve(&f.system, &f.objective, None);
        assert!(matches!(
            outcome,
            Outcome::SolverError(SolverFailure::Unsupported(_))
        ));
    }

    #[test]
    fn test_positive_cycle_infeasible() {
        // x ≥ y + 1 and y ≥ x + 1 with no upper bounds.
        let mut system = ConstraintSystem::new(0.0);
        let x = system.add_variable(VarRole::Makespan, VarDomain::non_negative(None));
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![Task::new("J1", "A", "M1", 1.0)],
        )
        .unwrap();
        let t = model.task_indices().next().unwrap();
        let y = system.add_variable(VarRole::Start(t), VarDomain::non_negative(None));
        system.add_constraint(ConstraintId::Duration(t), LinearConstraint::geq(x, y + 1.0));
        system.add_constraint(ConstraintId::MakespanLink(t), LinearConstraint::geq(y, x + 1.0));

        let outcome = EnumerativeSolver::new().solve(&system, &Objective::minimize(x), None);
        assert_eq!(outcome, Outcome::Infeasible);
    }

    #[test]
    fn test_expired_time_limit_times_out() {
        let model = ShopModel::new(
            vec![Machine::new("M1")],
            vec![Task::new("J1", "A", "M1", 10.0), Task::new("J2", "A", "M1", 10.0)],
        )
        .unwrap();
        let f = ConstraintBuilder::new(&model).build();
        let outcome = EnumerativeSolver::new().solve(&f.system, &f.objective, Some(Duration::ZERO));
        assert_eq!(
            outcome,
            Outcome::SolverError(SolverFailure::Timeout {
                limit: Duration::ZERO
            })
        );
    }
}
