//! Input validation for job-shop problems.
//!
//! Checks structural integrity of machines and tasks before any
//! constraint is built. Detects:
//! - Duplicate machine IDs and duplicate task IDs within a job
//! - Unknown machine references
//! - Predecessors that are not tasks of the same job
//! - Circular precedence dependencies (per-job DAG validation)
//! - Non-positive or non-finite durations
//!
//! Every problem found is reported, not just the first.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::models::{Machine, Task};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ConfigurationError>>;

/// A configuration error, carrying the offending entity IDs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Two machines share the same ID.
    #[error("duplicate machine id '{machine_id}'")]
    DuplicateMachine { machine_id: String },

    /// A job lists the same task ID twice.
    #[error("job '{job_id}' declares task '{task_id}' more than once")]
    DuplicateTask { job_id: String, task_id: String },

    /// A task runs on a machine that is not declared.
    #[error("task '{job_id}/{task_id}' references unknown machine '{machine_id}'")]
    UnknownMachine {
        job_id: String,
        task_id: String,
        machine_id: String,
    },

    /// A predecessor does not name a task of the same job.
    #[error("task '{job_id}/{task_id}' references unknown predecessor '{predecessor_id}'")]
    DanglingPredecessor {
        job_id: String,
        task_id: String,
        predecessor_id: String,
    },

    /// Predecessor links within a job form a cycle.
    #[error("job '{job_id}' has a predecessor cycle: {}", .task_ids.join(" -> "))]
    PredecessorCycle { job_id: String, task_ids: Vec<String> },

    /// Duration is zero, negative, or not a finite number.
    #[error("task '{job_id}/{task_id}' has non-positive duration {duration_min}")]
    NonPositiveDuration {
        job_id: String,
        task_id: String,
        duration_min: f64,
    },
}

/// Categories of configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    DuplicateId,
    UnknownMachine,
    DanglingPredecessor,
    PredecessorCycle,
    NonPositiveDuration,
}

impl ConfigurationError {
    /// Error category, for callers that branch on kind.
    pub fn kind(&self) -> ConfigurationErrorKind {
        match self {
            Self::DuplicateMachine { .. } | Self::DuplicateTask { .. } => {
                ConfigurationErrorKind::DuplicateId
            }
            Self::UnknownMachine { .. } => ConfigurationErrorKind::UnknownMachine,
            Self::DanglingPredecessor { .. } => ConfigurationErrorKind::DanglingPredecessor,
            Self::PredecessorCycle { .. } => ConfigurationErrorKind::PredecessorCycle,
            Self::NonPositiveDuration { .. } => ConfigurationErrorKind::NonPositiveDuration,
        }
    }
}

/// Validates the input data for a job-shop problem.
///
/// Checks:
/// 1. No duplicate machine IDs
/// 2. No duplicate task IDs within a job
/// 3. Every duration is finite and strictly positive
/// 4. Every task references a declared machine
/// 5. Every predecessor names a task of the same job
/// 6. No predecessor cycle within any job
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(machines: &[Machine], tasks: &[Task]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut machine_ids = HashSet::new();
    for m in machines {
        if !machine_ids.insert(m.id.as_str()) {
            errors.push(ConfigurationError::DuplicateMachine {
                machine_id: m.id.clone(),
            });
        }
    }

    // job → task ids, in input order
    let mut job_order: Vec<&str> = Vec::new();
    let mut job_tasks: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        let entry = job_tasks.entry(task.job_id.as_str()).or_insert_with(|| {
            job_order.push(task.job_id.as_str());
            Vec::new()
        });
        if entry.iter().any(|t| t.id == task.id) {
            errors.push(ConfigurationError::DuplicateTask {
                job_id: task.job_id.clone(),
                task_id: task.id.clone(),
            });
        }
        entry.push(task);
    }

    for task in tasks {
        if !(task.duration_min.is_finite() && task.duration_min > 0.0) {
            errors.push(ConfigurationError::NonPositiveDuration {
                job_id: task.job_id.clone(),
                task_id: task.id.clone(),
                duration_min: task.duration_min,
            });
        }

        if !machine_ids.contains(task.machine_id.as_str()) {
            errors.push(ConfigurationError::UnknownMachine {
                job_id: task.job_id.clone(),
                task_id: task.id.clone(),
                machine_id: task.machine_id.clone(),
            });
        }

        if let Some(pred) = &task.predecessor {
            let siblings = job_tasks.get(task.job_id.as_str());
            if !siblings.is_some_and(|s| s.iter().any(|t| &t.id == pred)) {
                errors.push(ConfigurationError::DanglingPredecessor {
                    job_id: task.job_id.clone(),
                    task_id: task.id.clone(),
                    predecessor_id: pred.clone(),
                });
            }
        }
    }

    for job_id in job_order {
        if let Some(cycle_err) = detect_cycle(job_id, &job_tasks[job_id]) {
            errors.push(cycle_err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects a cycle in one job's precedence graph using DFS.
///
/// # Algorithm
/// DFS over predecessor → successor edges. Visiting a node that is still on
/// the recursion stack is a back-edge; the stack suffix from that node is
/// the cycle.
fn detect_cycle(job_id: &str, tasks: &[&Task]) -> Option<ConfigurationError> {
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        if let Some(pred) = &task.predecessor {
            adj.entry(pred.as_str()).or_default().push(task.id.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut stack = Vec::new();

    for task in tasks {
        let node = task.id.as_str();
        if visited.contains(node) {
            continue;
        }
        if let Some(cycle) = find_cycle_dfs(node, &adj, &mut visited, &mut stack) {
            return Some(ConfigurationError::PredecessorCycle {
                job_id: job_id.to_string(),
                task_ids: cycle.into_iter().map(str::to_string).collect(),
            });
        }
    }

    None
}

fn find_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<&'a str>> {
    visited.insert(node);
    stack.push(node);

    if let Some(successors) = adj.get(node) {
        for &next in successors {
            if let Some(pos) = stack.iter().position(|&n| n == next) {
                return Some(stack[pos..].to_vec()); // Back edge → cycle
            }
            if !visited.contains(next) {
                if let Some(cycle) = find_cycle_dfs(next, adj, visited, stack) {
                    return Some(cycle);
                }
            }
        }
    }

    stack.pop();
    None
}
