//! Task (operation) model.
//!
//! A task is the smallest schedulable unit of work: it belongs to one job,
//! runs on exactly one machine for a fixed duration, and may wait for one
//! predecessor task of the same job.
//!
//! # Time Representation
//! Durations are minutes. They may be fractional; the solver works on
//! real-valued start and end times.

use serde::{Deserialize, Serialize};

/// A task to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Parent job identifier.
    #[serde(alias = "job")]
    pub job_id: String,
    /// Task identifier, unique within its job.
    #[serde(alias = "task")]
    pub id: String,
    /// Machine the task must run on.
    #[serde(alias = "machine")]
    pub machine_id: String,
    /// Processing time (minutes). Must be strictly positive.
    #[serde(alias = "duration")]
    pub duration_min: f64,
    /// Task of the same job that must finish before this one starts.
    #[serde(default)]
    pub predecessor: Option<String>,
}

impl Task {
    /// Creates a task without a predecessor.
    pub fn new(
        job_id: impl Into<String>,
        id: impl Into<String>,
        machine_id: impl Into<String>,
        duration_min: f64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            id: id.into(),
            machine_id: machine_id.into(),
            duration_min,
            predecessor: None,
        }
    }

    /// Sets the predecessor task (same job).
    pub fn with_predecessor(mut self, predecessor_id: impl Into<String>) -> Self {
        self.predecessor = Some(predecessor_id.into());
        self
    }

    /// `Job-Task` label used by reports and chart bars.
    pub fn label(&self) -> String {
        format!("{}-{}", self.job_id, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder() {
        let t = Task::new("Job1", "Milling", "CNC_Mill", 120.0).with_predecessor("Cutting");
        assert_eq!(t.job_id, "Job1");
        assert_eq!(t.id, "Milling");
        assert_eq!(t.machine_id, "CNC_Mill");
        assert!((t.duration_min - 120.0).abs() < 1e-10);
        assert_eq!(t.predecessor.as_deref(), Some("Cutting"));
        assert_eq!(t.label(), "Job1-Milling");
    }

    #[test]
    fn test_task_deserialize_short_names() {
        let t: Task = serde_json::from_str(
            r#"{"job": "Job2", "task": "Cutting", "machine": "LaserCutter", "duration": 120}"#,
        )
        .unwrap();
        assert_eq!(t, Task::new("Job2", "Cutting", "LaserCutter", 120.0));
    }
}
