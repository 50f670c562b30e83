//! Linear expressions and constraints.
//!
//! Expressions are sparse: a coefficient per variable plus a constant.
//! Terms live in an ordered map, so two expressions built from the same
//! parts in a different order compare equal.
//!
//! Operators are overloaded to keep formulations readable:
//!
//! ```
//! use u_jobshop::milp::{ConstraintSystem, LinearConstraint, VarDomain, VarRole};
//!
//! let mut system = ConstraintSystem::new(100.0);
//! let x = system.add_variable(VarRole::Makespan, VarDomain::non_negative(None));
//! let c = LinearConstraint::leq(x * 2.0 + 1.0, 9.0);
//! assert_eq!(c.rhs(), 8.0);
//! ```

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Variable handle inside a [`ConstraintSystem`](super::ConstraintSystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the variable in the system's variable list.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sparse affine expression `Σ aᵢ·xᵢ + c`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    /// The zero expression.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Non-zero terms, ordered by variable.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    /// Number of non-zero terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Coefficient of `var` (0 when absent).
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Constant part.
    pub fn offset(&self) -> f64 {
        self.constant
    }

    /// Evaluates the expression; `values` is indexed by [`VarId::index`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values[v.index()])
            .sum::<f64>()
            + self.constant
    }

    fn add_term(&mut self, var: VarId, coef: f64) {
        let entry = self.terms.entry(var).or_insert(0.0);
        *entry += coef;
        if *entry == 0.0 {
            self.terms.remove(&var);
        }
    }

    fn without_constant(mut self) -> (Self, f64) {
        let c = self.constant;
        self.constant = 0.0;
        (self, c)
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        let mut e = Self::zero();
        e.add_term(var, 1.0);
        e
    }
}

impl From<f64> for LinearExpr {
    fn from(constant: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant,
        }
    }
}

impl<R: Into<LinearExpr>> Add<R> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: R) -> LinearExpr {
        let rhs = rhs.into();
        for (v, c) in rhs.terms {
            self.add_term(v, c);
        }
        self.constant += rhs.constant;
        self
    }
}

impl<R: Into<LinearExpr>> Sub<R> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        self + (-rhs.into())
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, k: f64) -> LinearExpr {
        if k == 0.0 {
            return LinearExpr::zero();
        }
        for c in self.terms.values_mut() {
            *c *= k;
        }
        self.constant *= k;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl<R: Into<LinearExpr>> Add<R> for VarId {
    type Output = LinearExpr;

    fn add(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<R: Into<LinearExpr>> Sub<R> for VarId {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

impl Mul<f64> for VarId {
    type Output = LinearExpr;

    fn mul(self, k: f64) -> LinearExpr {
        LinearExpr::from(self) * k
    }
}

/// Relation between the two sides of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    LessEq,
    GreaterEq,
    Equal,
}

/// A linear constraint in normal form `Σ aᵢ·xᵢ  (≤ | ≥ | =)  b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    lhs: LinearExpr,
    comparison: Comparison,
    rhs: f64,
}

impl LinearConstraint {
    fn normalized(
        lhs: impl Into<LinearExpr>,
        comparison: Comparison,
        rhs: impl Into<LinearExpr>,
    ) -> Self {
        let (lhs, c) = (lhs.into() - rhs.into()).without_constant();
        Self {
            lhs,
            comparison,
            rhs: -c,
        }
    }

    /// `lhs ≤ rhs`.
    pub fn leq(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::normalized(lhs, Comparison::LessEq, rhs)
    }

    /// `lhs ≥ rhs`.
    pub fn geq(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::normalized(lhs, Comparison::GreaterEq, rhs)
    }

    /// `lhs = rhs`.
    pub fn eq(lhs: impl Into<LinearExpr>, rhs: impl Into<LinearExpr>) -> Self {
        Self::normalized(lhs, Comparison::Equal, rhs)
    }

    /// Variable part (constant is always zero).
    pub fn lhs(&self) -> &LinearExpr {
        &self.lhs
    }

    /// Relation.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Right-hand side constant.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Signed distance to the constraint boundary: non-negative when
    /// satisfied, negative by the violation amount otherwise.
    pub fn slack(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs.evaluate(values);
        match self.comparison {
            Comparison::LessEq => self.rhs - lhs,
            Comparison::GreaterEq => lhs - self.rhs,
            Comparison::Equal => -(lhs - self.rhs).abs(),
        }
    }

    /// Whether the constraint holds within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.slack(values) >= -tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_arithmetic() {
        let x = VarId::new(0);
        let y = VarId::new(1);
        let e = x * 2.0 + y - 3.0 - x;
        assert_eq!(e.coefficient(x), 1.0);
        assert_eq!(e.coefficient(y), 1.0);
        assert_eq!(e.offset(), -3.0);
        assert!((e.evaluate(&[4.0, 5.0]) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_cancelled_terms_removed() {
        let x = VarId::new(0);
        let e = x + 1.0 - x;
        assert_eq!(e.term_count(), 0);
        assert_eq!(e, LinearExpr::from(1.0));
    }

    #[test]
    fn test_term_order_irrelevant() {
        let x = VarId::new(0);
        let y = VarId::new(1);
        assert_eq!(x + y, y + x);
    }

    #[test]
    fn test_constraint_normal_form() {
        let x = VarId::new(0);
        let y = VarId::new(1);
        // x + 5 ≤ y + 2  →  x - y ≤ -3
        let c = LinearConstraint::leq(x + 5.0, y + 2.0);
        assert_eq!(c.comparison(), Comparison::LessEq);
        assert_eq!(c.lhs().coefficient(x), 1.0);
        assert_eq!(c.lhs().coefficient(y), -1.0);
        assert_eq!(c.lhs().offset(), 0.0);
        assert_eq!(c.rhs(), -3.0);
    }

    #[test]
    fn test_slack() {
        let x = VarId::new(0);
        let le = LinearConstraint::leq(x, 10.0);
        assert!((le.slack(&[7.0]) - 3.0).abs() < 1e-12);
        assert!(!le.is_satisfied(&[10.5], 1e-6));

        let eq = LinearConstraint::eq(x, 10.0);
        assert!(eq.is_satisfied(&[10.0 + 1e-9], 1e-6));
        assert!((eq.slack(&[12.0]) + 2.0).abs() < 1e-12);

        let ge = LinearConstraint::geq(x, 10.0);
        assert!(ge.is_satisfied(&[10.0], 0.0));
        assert!(!ge.is_satisfied(&[9.0], 1e-6));
    }
}
