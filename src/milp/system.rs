//! Constraint system: variables with domains plus keyed linear constraints.
//!
//! The system is what crosses the solver boundary. Variables carry a
//! [`VarRole`] so the extractor can find Start/End/Makespan/Order values
//! again; solvers only look at domains and constraint rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::expr::{LinearConstraint, LinearExpr, VarId};
use crate::models::TaskIndex;

/// Unordered pair of tasks sharing a machine, stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskPair {
    first: TaskIndex,
    second: TaskIndex,
}

impl TaskPair {
    /// Canonical pair; argument order does not matter.
    pub fn new(a: TaskIndex, b: TaskIndex) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Lower task index.
    pub fn first(&self) -> TaskIndex {
        self.first
    }

    /// Higher task index.
    pub fn second(&self) -> TaskIndex {
        self.second
    }
}

impl fmt::Display for TaskPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Meaning of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VarRole {
    /// Start time of a task.
    Start(TaskIndex),
    /// End time of a task.
    End(TaskIndex),
    /// Completion time of all work.
    Makespan,
    /// Sequencing choice for a same-machine pair:
    /// 0 = first before second, 1 = second before first.
    Order(TaskPair),
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VarDomain {
    /// Real value in `[lower, upper]` (`upper = None` is unbounded).
    Continuous { lower: f64, upper: Option<f64> },
    /// 0 or 1.
    Binary,
}

impl VarDomain {
    /// Non-negative real, optionally bounded above.
    pub fn non_negative(upper: Option<f64>) -> Self {
        Self::Continuous { lower: 0.0, upper }
    }

    /// Whether the domain is binary.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary)
    }

    /// Lower bound.
    pub fn lower(&self) -> f64 {
        match self {
            Self::Continuous { lower, .. } => *lower,
            Self::Binary => 0.0,
        }
    }

    /// Upper bound, if any.
    pub fn upper(&self) -> Option<f64> {
        match self {
            Self::Continuous { upper, .. } => *upper,
            Self::Binary => Some(1.0),
        }
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub role: VarRole,
    pub domain: VarDomain,
}

/// Identifier of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintId {
    /// `End = Start + Duration`.
    Duration(TaskIndex),
    /// `Start[successor] ≥ End[predecessor]`.
    Precedence {
        predecessor: TaskIndex,
        successor: TaskIndex,
    },
    /// Disjunction half active when the pair's order variable is 0.
    ExclusionBefore(TaskPair),
    /// Disjunction half active when the pair's order variable is 1.
    ExclusionAfter(TaskPair),
    /// `Makespan ≥ End`.
    MakespanLink(TaskIndex),
    /// `Makespan ≤ limit`.
    MakespanLimit,
}

/// Minimization objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    expr: LinearExpr,
}

impl Objective {
    /// Minimize `expr`.
    pub fn minimize(expr: impl Into<LinearExpr>) -> Self {
        Self { expr: expr.into() }
    }

    /// Expression being minimized.
    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    /// Objective value of an assignment.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.expr.evaluate(values)
    }
}

/// Variables, domains and keyed linear constraints of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSystem {
    variables: Vec<Variable>,
    by_role: BTreeMap<VarRole, VarId>,
    constraints: BTreeMap<ConstraintId, LinearConstraint>,
    big_m: f64,
}

impl ConstraintSystem {
    /// Creates an empty system using `big_m` for disjunctions.
    pub fn new(big_m: f64) -> Self {
        Self {
            variables: Vec::new(),
            by_role: BTreeMap::new(),
            constraints: BTreeMap::new(),
            big_m,
        }
    }

    /// Declares a variable. Declaring the same role twice returns the
    /// existing variable.
    pub fn add_variable(&mut self, role: VarRole, domain: VarDomain) -> VarId {
        if let Some(&id) = self.by_role.get(&role) {
            return id;
        }
        let id = VarId::new(self.variables.len());
        self.variables.push(Variable { role, domain });
        self.by_role.insert(role, id);
        id
    }

    /// Adds (or replaces) a constraint row.
    pub fn add_constraint(&mut self, id: ConstraintId, constraint: LinearConstraint) {
        self.constraints.insert(id, constraint);
    }

    /// All variables, indexed by [`VarId::index`].
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Variable by handle.
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    /// Variable playing `role`, if declared.
    pub fn var(&self, role: VarRole) -> Option<VarId> {
        self.by_role.get(&role).copied()
    }

    /// Constraint rows, ordered by ID.
    pub fn constraints(&self) -> &BTreeMap<ConstraintId, LinearConstraint> {
        &self.constraints
    }

    /// Constraint row by ID.
    pub fn constraint(&self, id: &ConstraintId) -> Option<&LinearConstraint> {
        self.constraints.get(id)
    }

    /// Order variables keyed by canonical task pair.
    pub fn order_vars(&self) -> impl Iterator<Item = (TaskPair, VarId)> + '_ {
        self.by_role.iter().filter_map(|(role, &id)| match role {
            VarRole::Order(pair) => Some((*pair, id)),
            _ => None,
        })
    }

    /// Big-M constant used by the disjunctive rows.
    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of binary variables.
    pub fn binary_count(&self) -> usize {
        self.variables.iter().filter(|v| v.domain.is_binary()).count()
    }

    /// Number of constraint rows.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
