//! Job model.
//!
//! A job groups the tasks that share a precedence structure. Tasks need
//! not form a total order; only predecessor links constrain them.

use serde::{Deserialize, Serialize};

use super::Task;

/// A job (ordered or partially ordered set of tasks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Tasks of this job, in input order.
    pub tasks: Vec<Task>,
}

impl Job {
    /// Creates an empty job.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tasks: Vec::new(),
        }
    }

    /// Finds a task by its identifier.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Sum of task durations (minutes).
    pub fn total_duration_min(&self) -> f64 {
        self.tasks.iter().map(|t| t.duration_min).sum()
    }

    /// Number of tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
