//! Turns a raw solver assignment into a validated [`Schedule`].
//!
//! The extractor does not trust the solver. Every schedule invariant is
//! re-checked against the raw numbers:
//! - `End = Start + Duration` for every task
//! - `Start ≥ 0`
//! - `Start[successor] ≥ End[predecessor]` for every precedence link
//! - no two tasks on one machine overlap (touching is fine)
//! - the makespan variable is not below any task's end
//!
//! Non-finite values (NaN, ±∞) are rejected before any of these checks, since
//! every comparison against NaN is false.
//!
//! Anything off by more than the tolerance is collected and returned as
//! [`ScheduleError::InvariantViolation`]; nothing is rounded or repaired.

use tracing::warn;

use crate::error::ScheduleError;
use crate::milp::{ConstraintSystem, Formulation, VarId, VarRole};
use crate::models::{Schedule, ScheduledTask, ShopModel, TaskIndex, Violation, ViolationType};
use crate::solver::{SolverFailure, VariableAssignment};

/// Default numerical tolerance (minutes).
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Reads a [`VariableAssignment`] back into a [`Schedule`].
#[derive(Debug, Clone)]
pub struct ScheduleExtractor<'a> {
    model: &'a ShopModel,
    system: &'a ConstraintSystem,
    tolerance: f64,
}

impl<'a> ScheduleExtractor<'a> {
    /// Creates an extractor for a formulation of `model`.
    pub fn new(model: &'a ShopModel, formulation: &'a Formulation) -> Self {
        Self {
            model,
            system: &formulation.system,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Sets the numerical tolerance (minutes).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builds the schedule, verifying every invariant first.
    ///
    /// # Errors
    /// - `InvariantViolation` with every broken invariant
    /// - `SolverFailure::Backend` if the assignment does not match the system
    pub fn extract(&self, assignment: &VariableAssignment) -> Result<Schedule, ScheduleError> {
        if assignment.values().len() != self.system.variable_count() {
            return Err(mismatch(format!(
                "assignment has {} values, system has {} variables",
                assignment.values().len(),
                self.system.variable_count()
            )));
        }

        let mut times: Vec<(f64, f64)> = Vec::with_capacity(self.model.task_count());
        for i in self.model.task_indices() {
            let start = assignment.value(self.var(VarRole::Start(i))?);
            let end = assignment.value(self.var(VarRole::End(i))?);
            times.push((start, end));
        }
        let makespan = assignment.value(self.var(VarRole::Makespan)?);

        let mut violations = self.non_finite(&times, makespan);
        if violations.is_empty() {
            violations = self.check(&times, makespan);
        }
        if !violations.is_empty() {
            warn!(
                count = violations.len(),
                first = %violations[0],
                "solver assignment violates schedule invariants"
            );
            return Err(ScheduleError::InvariantViolation(violations));
        }

        let mut schedule = Schedule::new();
        for i in self.model.task_indices() {
            let task = self.model.task(i);
            let (start, end) = times[i.get()];
            schedule.add_entry(ScheduledTask::new(
                &task.job_id,
                &task.id,
                &task.machine_id,
                start,
                end,
            ));
        }
        Ok(schedule)
    }

    fn var(&self, role: VarRole) -> Result<VarId, ScheduleError> {
        self.system
            .var(role)
            .ok_or_else(|| mismatch(format!("system has no variable for {role:?}")))
    }

    fn non_finite(&self, times: &[(f64, f64)], makespan: f64) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .model
            .task_indices()
            .flat_map(|i| {
                let (start, end) = times[i.get()];
                [start, end]
                    .into_iter()
                    .filter(|v| !v.is_finite())
                    .map(move |v| (i, v))
            })
            .map(|(i, v)| Violation::new(ViolationType::NonFinite, vec![self.label(i)], v))
            .collect();
        if !makespan.is_finite() {
            violations.push(Violation::new(
                ViolationType::NonFinite,
                vec!["makespan".to_string()],
                makespan,
            ));
        }
        violations
    }

    fn check(&self, times: &[(f64, f64)], makespan: f64) -> Vec<Violation> {
        let tol = self.tolerance;
        let model = self.model;
        let mut violations = Vec::new();

        for i in model.task_indices() {
            let (start, end) = times[i.get()];
            let duration = model.task(i).duration_min;

            let drift = (end - start - duration).abs();
            if drift > tol {
                violations.push(Violation::new(
                    ViolationType::Duration,
                    vec![self.label(i)],
                    drift,
                ));
            }

            if start < -tol {
                violations.push(Violation::new(
                    ViolationType::NegativeStart,
                    vec![self.label(i)],
                    -start,
                ));
            }

            if let Some(p) = model.predecessor_of(i) {
                let gap = times[p.get()].1 - start;
                if gap > tol {
                    violations.push(Violation::new(
                        ViolationType::Precedence,
                        vec![self.label(p), self.label(i)],
                        gap,
                    ));
                }
            }

            if end - makespan > tol {
                violations.push(Violation::new(
                    ViolationType::MakespanLinkage,
                    vec![self.label(i)],
                    end - makespan,
                ));
            }
        }

        for (m, machine) in model.machines().iter().enumerate() {
            let tasks = model.tasks_on_machine(m);
            for (a, &i) in tasks.iter().enumerate() {
                for &j in &tasks[a + 1..] {
                    let (si, ei) = times[i.get()];
                    let (sj, ej) = times[j.get()];
                    let overlap = ei.min(ej) - si.max(sj);
                    if overlap > tol {
                        violations.push(Violation::new(
                            ViolationType::Overlap,
                            vec![machine.id.clone(), self.label(i), self.label(j)],
                            overlap,
                        ));
                    }
                }
            }
        }

        violations
    }

    fn label(&self, i: TaskIndex) -> String {
        let task = self.model.task(i);
        format!("{}/{}", task.job_id, task.id)
    }
}

fn mismatch(message: String) -> ScheduleError {
    ScheduleError::SolverFailure(SolverFailure::Backend(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::ConstraintBuilder;
    use crate::models::{Machine, Task};

    /// Two jobs: J1 A(M1,10) → B(M2,20); J2 C(M1,30).
    fn model() -> ShopModel {
        ShopModel::new(
            vec![Machine::new("M1"), Machine::new("M2")],
            vec![
                Task::new("J1", "A", "M1", 10.0),
                Task::new("J1", "B", "M2", 20.0).with_predecessor("A"),
                Task::new("J2", "C", "M1", 30.0),
            ],
        )
        .unwrap()
    }

    /// Builds an assignment from per-task (start, end) and makespan.
    fn assignment(
        f: &Formulation,
        model: &ShopModel,
        times: &[(f64, f64)],
        makespan: f64,
    ) -> VariableAssignment {
        let mut values = vec![0.0; f.system.variable_count()];
        for i in model.task_indices() {
            values[f.system.var(VarRole::Start(i)).unwrap().index()] = times[i.get()].0;
            values[f.system.var(VarRole::End(i)).unwrap().index()] = times[i.get()].1;
        }
        values[f.system.var(VarRole::Makespan).unwrap().index()] = makespan;
        VariableAssignment::new(values, makespan)
    }

    fn violation_types(err: &ScheduleError) -> Vec<ViolationType> {
        err.violations().iter().map(|v| v.violation_type).collect()
    }

    #[test]
    fn test_valid_assignment() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(&f, &m, &[(0.0, 10.0), (10.0, 30.0), (10.0, 40.0)], 40.0);
        let schedule = ScheduleExtractor::new(&m, &f).extract(&a).unwrap();

        assert_eq!(schedule.entry_count(), 3);
        let c = schedule.entry("J2", "C").unwrap();
        assert_eq!(c.machine_id, "M1");
        assert_eq!((c.start, c.end), (10.0, 40.0));
        assert_eq!(schedule.makespan(), 40.0);
    }

    #[test]
    fn test_touching_intervals_allowed() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        // C ends exactly when A starts
        let a = assignment(&f, &m, &[(30.0, 40.0), (40.0, 60.0), (0.0, 30.0)], 60.0);
        assert!(ScheduleExtractor::new(&m, &f).extract(&a).is_ok());
    }

    #[test]
    fn test_within_tolerance_accepted() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(
            &f,
            &m,
            &[(0.0, 10.0 + 1e-8), (10.0, 30.0), (10.0 - 1e-8, 40.0 - 1e-8)],
            40.0,
        );
        assert!(ScheduleExtractor::new(&m, &f).extract(&a).is_ok());
    }

    #[test]
    fn test_duration_violation() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(&f, &m, &[(0.0, 12.0), (12.0, 32.0), (12.0, 42.0)], 42.0);
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();
        assert_eq!(violation_types(&err), vec![ViolationType::Duration]);
        assert_eq!(err.violations()[0].entity_ids, vec!["J1/A".to_string()]);
        assert!((err.violations()[0].magnitude - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_precedence_violation() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(&f, &m, &[(0.0, 10.0), (5.0, 25.0), (10.0, 40.0)], 40.0);
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();
        assert_eq!(violation_types(&err), vec![ViolationType::Precedence]);
        assert_eq!(
            err.violations()[0].entity_ids,
            vec!["J1/A".to_string(), "J1/B".to_string()]
        );
    }

    #[test]
    fn test_overlap_violation() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(&f, &m, &[(0.0, 10.0), (10.0, 30.0), (5.0, 35.0)], 35.0);
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();
        assert_eq!(violation_types(&err), vec![ViolationType::Overlap]);
        assert_eq!(err.violations()[0].entity_ids[0], "M1");
        assert!((err.violations()[0].magnitude - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_makespan_linkage_and_negative_start() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(&f, &m, &[(-5.0, 5.0), (10.0, 30.0), (10.0, 40.0)], 35.0);
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();
        let types = violation_types(&err);
        assert!(types.contains(&ViolationType::NegativeStart));
        assert!(types.contains(&ViolationType::MakespanLinkage));
    }

    #[test]
    fn test_nan_assignment_rejected() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = VariableAssignment::new(vec![f64::NAN; f.system.variable_count()], f64::NAN);
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();

        let types = violation_types(&err);
        assert_eq!(types.len(), 7); // 3 tasks × (start, end) + makespan
        assert!(types.iter().all(|t| *t == ViolationType::NonFinite));
        assert_eq!(err.violations()[0].entity_ids, vec!["J1/A".to_string()]);
    }

    #[test]
    fn test_infinite_end_rejected() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let a = assignment(
            &f,
            &m,
            &[(0.0, 10.0), (10.0, f64::INFINITY), (10.0, 40.0)],
            40.0,
        );
        let err = ScheduleExtractor::new(&m, &f).extract(&a).unwrap_err();
        assert_eq!(violation_types(&err), vec![ViolationType::NonFinite]);
        assert_eq!(err.violations()[0].entity_ids, vec!["J1/B".to_string()]);
    }

    #[test]
    fn test_wrong_length_is_backend_error() {
        let m = model();
        let f = ConstraintBuilder::new(&m).build();
        let err = ScheduleExtractor::new(&m, &f)
            .extract(&VariableAssignment::new(vec![0.0; 2], 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::SolverFailure(SolverFailure::Backend(_))
        ));
    }
}
