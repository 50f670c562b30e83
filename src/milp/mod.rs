//! Mixed-integer linear formulation of job-shop scheduling.
//!
//! - [`LinearExpr`] / [`LinearConstraint`]: sparse affine algebra
//! - [`ConstraintSystem`]: variables with domains and keyed constraint rows
//! - [`ConstraintBuilder`]: derives the disjunctive (big-M) formulation
//!   from a [`ShopModel`](crate::models::ShopModel)
//!
//! # Reference
//! - Manne (1960), "On the Job-Shop Scheduling Problem"
//! - Ku & Beck (2016), "Mixed Integer Programming models for job shop
//!   scheduling: A computational analysis"

mod builder;
mod expr;
mod system;

pub use builder::{ConstraintBuilder, Formulation};
pub use expr::{Comparison, LinearConstraint, LinearExpr, VarId};
pub use system::{
    ConstraintId, ConstraintSystem, Objective, TaskPair, VarDomain, VarRole, Variable,
};
