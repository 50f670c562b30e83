//! Machine utilization and schedule quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Utilization | busy minutes / calendar capacity × 100 |
//! | Makespan (C_max) | Latest completion time |
//! | Job completion (C_j) | End of a job's last task |
//! | Avg Flow Time | Mean C_j (all jobs released at 0) |
//!
//! Utilization uses the machine's calendar as denominator. A machine whose
//! calendar is empty has no meaningful utilization; it reports 0% and is
//! flagged with `has_capacity = false` instead of producing an error.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Schedule, ShopModel};

/// Utilization of one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineUtilization {
    /// Machine identifier.
    pub machine_id: String,
    /// Sum of scheduled task durations (minutes).
    pub busy_min: f64,
    /// Working minutes in the machine's calendar.
    pub capacity_min: i64,
    /// busy / capacity × 100, or 0 without capacity.
    pub percent: f64,
    /// Whether the calendar has any working minute.
    pub has_capacity: bool,
}

/// Per-machine utilization, in machine declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReport {
    /// One entry per machine.
    pub machines: Vec<MachineUtilization>,
}

impl UtilizationReport {
    /// Computes utilization of every machine in `model`.
    pub fn calculate(model: &ShopModel, schedule: &Schedule) -> Self {
        let mut busy: HashMap<&str, f64> = HashMap::new();
        for entry in &schedule.entries {
            *busy.entry(entry.machine_id.as_str()).or_default() += entry.duration();
        }

        let machines = model
            .machines()
            .iter()
            .map(|machine| {
                let busy_min = busy.get(machine.id.as_str()).copied().unwrap_or(0.0);
                let capacity_min = machine.capacity_min();
                let has_capacity = capacity_min > 0;
                let percent = if has_capacity {
                    busy_min / capacity_min as f64 * 100.0
                } else {
                    0.0
                };
                MachineUtilization {
                    machine_id: machine.id.clone(),
                    busy_min,
                    capacity_min,
                    percent,
                    has_capacity,
                }
            })
            .collect();

        Self { machines }
    }

    /// Utilization of one machine.
    pub fn machine(&self, machine_id: &str) -> Option<&MachineUtilization> {
        self.machines.iter().find(|m| m.machine_id == machine_id)
    }

    /// Mean percentage over machines that have capacity.
    pub fn average_percent(&self) -> f64 {
        let (sum, n) = self
            .machines
            .iter()
            .filter(|m| m.has_capacity)
            .fold((0.0, 0usize), |(s, n), m| (s + m.percent, n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Machines whose calendar is empty.
    pub fn without_capacity(&self) -> Vec<&str> {
        self.machines
            .iter()
            .filter(|m| !m.has_capacity)
            .map(|m| m.machine_id.as_str())
            .collect()
    }
}

/// Schedule performance indicators.
///
/// All time values are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: f64,
    /// Completion time per job, in job order.
    pub job_completion: Vec<(String, f64)>,
    /// Mean job completion time.
    pub avg_flow_time: f64,
    /// Mean utilization percentage over machines with capacity.
    pub avg_utilization_percent: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its utilization report.
    pub fn calculate(
        model: &ShopModel,
        schedule: &Schedule,
        utilization: &UtilizationReport,
    ) -> Self {
        let job_completion: Vec<(String, f64)> = model
            .jobs()
            .iter()
            .filter_map(|job| {
                schedule
                    .job_completion_time(&job.id)
                    .map(|c| (job.id.clone(), c))
            })
            .collect();

        let avg_flow_time = if job_completion.is_empty() {
            0.0
        } else {
            job_completion.iter().map(|(_, c)| c).sum::<f64>() / job_completion.len() as f64
        };

        Self {
            makespan: schedule.makespan(),
            job_completion,
            avg_flow_time,
            avg_utilization_percent: utilization.average_percent(),
        }
    }

    /// Completion time of one job.
    pub fn completion_of(&self, job_id: &str) -> Option<f64> {
        self.job_completion
            .iter()
            .find(|(id, _)| id == job_id)
            .map(|&(_, c)| c)
    }
}
