//! Minimum-makespan job-shop scheduling via a disjunctive MILP.
//!
//! Machines process one task at a time; jobs are chains of tasks linked by
//! predecessor relations. The crate formulates the problem as a big-M
//! mixed-integer program, hands it to a solver backend, re-verifies the
//! answer, and reports the schedule with machine utilization.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Machine`, `Calendar`, `Task`, `Job`,
//!   `ShopModel`, `Schedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown machines,
//!   dangling predecessors, precedence cycles, durations)
//! - **`milp`**: Linear algebra, constraint system, formulation builder
//! - **`solver`**: `MilpSolver` trait with exact and `good_lp` backends
//! - **`scheduler`**: Pipeline, schedule extraction, utilization and KPIs
//! - **`report`**: Text report and Gantt bars
//! - **`input`** / **`config`**: JSON problem data and TOML solver settings
//! - **`generate`** / **`batch`**: Random instances and parallel evaluation
//!
//! # Example
//!
//! ```
//! use u_jobshop::models::{Machine, ShopModel, Task};
//! use u_jobshop::scheduler::JobShopScheduler;
//! use u_jobshop::solver::EnumerativeSolver;
//!
//! let model = ShopModel::new(
//!     vec![Machine::new("Lathe"), Machine::new("Mill")],
//!     vec![
//!         Task::new("J1", "Turn", "Lathe", 30.0),
//!         Task::new("J1", "Face", "Mill", 20.0).with_predecessor("Turn"),
//!         Task::new("J2", "Face", "Mill", 40.0),
//!     ],
//! )
//! .unwrap();
//!
//! let solved = JobShopScheduler::new(EnumerativeSolver::new()).solve(&model).unwrap();
//! assert!((solved.makespan() - 60.0).abs() < 1e-6);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Manne (1960), "On the Job-Shop Scheduling Problem"
//! - Ku & Beck (2016), "Mixed Integer Programming models for job shop scheduling"

pub mod batch;
pub mod config;
pub mod error;
pub mod generate;
pub mod input;
pub mod milp;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use error::{ScheduleError, ScheduleErrorKind};
