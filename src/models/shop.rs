//! Validated job-shop problem.
//!
//! `ShopModel` is built once from machines and task records and never
//! mutated afterwards. Construction runs [`validate_input`] and fails fast,
//! so every `ShopModel` in existence is free of unknown machines, dangling
//! predecessors, predecessor cycles and non-positive durations.
//!
//! Each task also gets a global [`TaskIndex`] (input order). The index is
//! how the constraint system refers to tasks; reports use job/task IDs.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Job, Machine, Task};
use crate::error::ScheduleError;
use crate::validation::validate_input;

/// Global task index, stable for the lifetime of a `ShopModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskIndex(usize);

impl TaskIndex {
    /// Raw index value.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct TaskSlot {
    job: usize,
    position: usize,
    machine: usize,
    predecessor: Option<TaskIndex>,
}

/// An immutable, validated job-shop problem.
#[derive(Debug, Clone)]
pub struct ShopModel {
    machines: Vec<Machine>,
    jobs: Vec<Job>,
    slots: Vec<TaskSlot>,
}

impl ShopModel {
    /// Validates machines and tasks and assembles the model.
    ///
    /// Jobs appear in first-mention order of the task list; task indices
    /// follow the task list order.
    ///
    /// # Errors
    /// `ScheduleError::Configuration` with every problem found.
    pub fn new(machines: Vec<Machine>, tasks: Vec<Task>) -> Result<Self, ScheduleError> {
        validate_input(&machines, &tasks).map_err(ScheduleError::Configuration)?;

        let machine_pos: HashMap<&str, usize> = machines
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.as_str(), i))
            .collect();

        let mut jobs: Vec<Job> = Vec::new();
        let mut job_pos: HashMap<String, usize> = HashMap::new();
        let mut slots = Vec::with_capacity(tasks.len());
        // (job, task id) → global index
        let mut lookup: HashMap<(usize, String), TaskIndex> = HashMap::new();

        for (i, task) in tasks.iter().enumerate() {
            let job = *job_pos.entry(task.job_id.clone()).or_insert_with(|| {
                jobs.push(Job::new(task.job_id.clone()));
                jobs.len() - 1
            });
            lookup.insert((job, task.id.clone()), TaskIndex(i));
            slots.push(TaskSlot {
                job,
                position: jobs[job].tasks.len(),
                machine: machine_pos[task.machine_id.as_str()],
                predecessor: None,
            });
            jobs[job].tasks.push(task.clone());
        }

        for (slot, task) in slots.iter_mut().zip(&tasks) {
            slot.predecessor = task
                .predecessor
                .as_ref()
                .and_then(|p| lookup.get(&(slot.job, p.clone())).copied());
        }

        Ok(Self {
            machines,
            jobs,
            slots,
        })
    }

    /// Declared machines, in declaration order.
    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Jobs, in first-mention order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Number of tasks across all jobs.
    pub fn task_count(&self) -> usize {
        self.slots.len()
    }

    /// All task indices, ascending.
    pub fn task_indices(&self) -> impl Iterator<Item = TaskIndex> + '_ {
        (0..self.slots.len()).map(TaskIndex)
    }

    /// The task behind an index.
    pub fn task(&self, index: TaskIndex) -> &Task {
        let slot = &self.slots[index.0];
        &self.jobs[slot.job].tasks[slot.position]
    }

    /// The machine a task runs on.
    pub fn machine_of(&self, index: TaskIndex) -> &Machine {
        &self.machines[self.slots[index.0].machine]
    }

    /// The predecessor of a task, if any.
    pub fn predecessor_of(&self, index: TaskIndex) -> Option<TaskIndex> {
        self.slots[index.0].predecessor
    }

    /// Task indices running on the machine at `machine` (declaration
    /// position), ascending.
    pub fn tasks_on_machine(&self, machine: usize) -> Vec<TaskIndex> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.machine == machine)
            .map(|(i, _)| TaskIndex(i))
            .collect()
    }

    /// Finds the index of a task by job and task ID.
    pub fn find_task(&self, job_id: &str, task_id: &str) -> Option<TaskIndex> {
        self.task_indices().find(|&i| {
            let t = self.task(i);
            t.job_id == job_id && t.id == task_id
        })
    }

    /// Sum of all task durations (minutes).
    pub fn total_duration_min(&self) -> f64 {
        self.task_indices().map(|i| self.task(i).duration_min).sum()
    }
}
