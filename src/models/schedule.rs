//! Schedule (solution) model.
//!
//! A schedule resolves every task to a start and end time on its machine.
//! Schedules are produced by the extractor only after the solver's numbers
//! passed the invariant checks; violations found on the way are reported as
//! [`Violation`]s instead of producing a schedule.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use std::fmt;

use serde::{Deserialize, Serialize};

/// A validated schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// One entry per task, in task input order.
    pub entries: Vec<ScheduledTask>,
}

/// A task placed in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Parent job ID.
    pub job_id: String,
    /// Task ID (unique within the job).
    pub task_id: String,
    /// Machine the task runs on.
    pub machine_id: String,
    /// Start time (minutes).
    pub start: f64,
    /// End time (minutes).
    pub end: f64,
}

/// A broken schedule invariant, detected while reading solver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which invariant failed.
    pub violation_type: ViolationType,
    /// Offending entities (`job/task` labels or machine IDs).
    pub entity_ids: Vec<String>,
    /// How far outside tolerance the numbers are (minutes).
    pub magnitude: f64,
}

/// Classification of invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// `end != start + duration`.
    Duration,
    /// Start time below zero.
    NegativeStart,
    /// Successor started before its predecessor ended.
    Precedence,
    /// Two tasks on one machine overlap.
    Overlap,
    /// Makespan variable below some task's end.
    MakespanLinkage,
    /// Start, end or makespan is NaN or infinite.
    NonFinite,
}

impl ScheduledTask {
    /// Creates a scheduled task.
    pub fn new(
        job_id: impl Into<String>,
        task_id: impl Into<String>,
        machine_id: impl Into<String>,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            task_id: task_id.into(),
            machine_id: machine_id.into(),
            start,
            end,
        }
    }

    /// Occupied time (end - start) in minutes.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `Job-Task` label.
    pub fn label(&self) -> String {
        format!("{}-{}", self.job_id, self.task_id)
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(violation_type: ViolationType, entity_ids: Vec<String>, magnitude: f64) -> Self {
        Self {
            violation_type,
            entity_ids,
            magnitude,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} violated by {:.6} min ({})",
            self.violation_type,
            self.magnitude,
            self.entity_ids.join(", ")
        )
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: ScheduledTask) {
        self.entries.push(entry);
    }

    /// Makespan: latest end time across all entries (0 when empty).
    pub fn makespan(&self) -> f64 {
        self.entries.iter().map(|e| e.end).fold(0.0, f64::max)
    }

    /// Finds the entry for a task of a job.
    pub fn entry(&self, job_id: &str, task_id: &str) -> Option<&ScheduledTask> {
        self.entries
            .iter()
            .find(|e| e.job_id == job_id && e.task_id == task_id)
    }

    /// All entries of a job.
    pub fn entries_for_job(&self, job_id: &str) -> Vec<&ScheduledTask> {
        self.entries.iter().filter(|e| e.job_id == job_id).collect()
    }

    /// All entries on a machine, sorted by start time.
    pub fn entries_for_machine(&self, machine_id: &str) -> Vec<&ScheduledTask> {
        let mut entries: Vec<&ScheduledTask> = self
            .entries
            .iter()
            .filter(|e| e.machine_id == machine_id)
            .collect();
        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        entries
    }

    /// Completion time for a job (latest end of its entries).
    pub fn job_completion_time(&self, job_id: &str) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.job_id == job_id)
            .map(|e| e.end)
            .reduce(f64::max)
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(ScheduledTask::new("J1", "Cutting", "LaserCutter", 0.0, 180.0));
        s.add_entry(ScheduledTask::new("J1", "Milling", "CNC_Mill", 180.0, 300.0));
        s.add_entry(ScheduledTask::new("J2", "Cutting", "LaserCutter", 180.0, 300.0));
        s
    }

    #[test]
    fn test_schedule_makespan() {
        assert!((sample_schedule().makespan() - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_entry_lookup() {
        let s = sample_schedule();
        let e = s.entry("J2", "Cutting").unwrap();
        assert_eq!(e.machine_id, "LaserCutter");
        assert!((e.duration() - 120.0).abs() < 1e-10);
        assert_eq!(e.label(), "J2-Cutting");
        assert!(s.entry("J2", "Milling").is_none());
    }

    #[test]
    fn test_entries_for_machine_sorted() {
        let mut s = Schedule::new();
        s.add_entry(ScheduledTask::new("J2", "A", "M1", 50.0, 60.0));
        s.add_entry(ScheduledTask::new("J1", "A", "M1", 0.0, 50.0));
        let m1 = s.entries_for_machine("M1");
        assert_eq!(m1[0].job_id, "J1");
        assert_eq!(m1[1].job_id, "J2");
    }

    #[test]
    fn test_job_completion_time() {
        let s = sample_schedule();
        assert_eq!(s.job_completion_time("J1"), Some(300.0));
        assert_eq!(s.entries_for_job("J1").len(), 2);
        assert_eq!(s.job_completion_time("J9"), None);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert_eq!(s.makespan(), 0.0);
        assert_eq!(s.entry_count(), 0);
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::new(
            ViolationType::Overlap,
            vec!["J1/Cutting".into(), "J2/Cutting".into()],
            30.0,
        );
        assert_eq!(
            v.to_string(),
            "Overlap violated by 30.000000 min (J1/Cutting, J2/Cutting)"
        );
    }
}
