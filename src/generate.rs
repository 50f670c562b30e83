//! Seeded random job-shop instances.
//!
//! Each job visits a random subset of the machines in random order (no
//! machine twice), with tasks chained by predecessor links. This is the
//! classic job-shop structure (Taillard 1993) and keeps the number of
//! tasks per machine at most the number of jobs.
//!
//! The same seed always yields the same instance.
//!
//! # Reference
//! Taillard (1993), "Benchmarks for basic scheduling problems", EJOR 64(2)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::ScheduleError;
use crate::models::{Calendar, Machine, ShopModel, Task};

/// Random instance generator.
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    jobs: usize,
    machines: usize,
    tasks_per_job: (usize, usize),
    duration_range: (u32, u32),
    shift: (i64, i64),
}

impl InstanceGenerator {
    /// Creates a generator for `jobs` jobs on `machines` machines.
    ///
    /// Defaults: every job visits every machine, durations 1..=100 minutes,
    /// machines work 480..960 (08:00 to 16:00).
    pub fn new(jobs: usize, machines: usize) -> Self {
        Self {
            jobs,
            machines,
            tasks_per_job: (machines, machines),
            duration_range: (1, 100),
            shift: (480, 960),
        }
    }

    /// Sets the inclusive range of tasks per job (capped at the machine count).
    pub fn with_tasks_per_job(mut self, min: usize, max: usize) -> Self {
        self.tasks_per_job = (min.min(max), max.max(min));
        self
    }

    /// Sets the inclusive duration range (minutes, at least 1).
    pub fn with_duration_range(mut self, min: u32, max: u32) -> Self {
        let min = min.max(1);
        self.duration_range = (min, max.max(min));
        self
    }

    /// Sets every machine's working window.
    pub fn with_shift(mut self, start_min: i64, end_min: i64) -> Self {
        self.shift = (start_min, end_min);
        self
    }

    /// Generates one instance.
    pub fn generate(&self, seed: u64) -> Result<ShopModel, ScheduleError> {
        let mut rng = StdRng::seed_from_u64(seed);

        let machine_ids: Vec<String> = (1..=self.machines).map(|m| format!("M{m}")).collect();
        let (shift_start, shift_end) = self.shift;
        let machines = machine_ids
            .iter()
            .map(|id| Machine::new(id).with_calendar(Calendar::from_range(shift_start, shift_end)))
            .collect();

        let lo = self.tasks_per_job.0.min(self.machines);
        let hi = self.tasks_per_job.1.min(self.machines);
        let mut tasks = Vec::new();
        for j in 1..=self.jobs {
            let job_id = format!("J{j}");
            let count = if hi == 0 { 0 } else { rng.random_range(lo.max(1)..=hi) };

            let mut route: Vec<&String> = machine_ids.iter().collect();
            route.shuffle(&mut rng);

            let mut previous: Option<String> = None;
            for (k, machine) in route.into_iter().take(count).enumerate() {
                let task_id = format!("O{}", k + 1);
                let duration = rng.random_range(self.duration_range.0..=self.duration_range.1);
                let mut task = Task::new(&job_id, &task_id, machine.as_str(), f64::from(duration));
                if let Some(p) = previous.take() {
                    task = task.with_predecessor(p);
                }
                previous = Some(task_id);
                tasks.push(task);
            }
        }

        ShopModel::new(machines, tasks)
    }

    /// Generates `count` instances with consecutive seeds.
    pub fn generate_many(
        &self,
        count: usize,
        base_seed: u64,
    ) -> Result<Vec<ShopModel>, ScheduleError> {
        (0..count as u64)
            .map(|k| self.generate(base_seed.wrapping_add(k)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_deterministic() {
        let g = InstanceGenerator::new(4, 3).with_tasks_per_job(1, 3);
        let a = g.generate(7).unwrap();
        let b = g.generate(7).unwrap();
        let tasks_a: Vec<_> = a.task_indices().map(|i| a.task(i).clone()).collect();
        let tasks_b: Vec<_> = b.task_indices().map(|i| b.task(i).clone()).collect();
        assert_eq!(tasks_a, tasks_b);
    }

    #[test]
    fn test_full_routes() {
        let model = InstanceGenerator::new(3, 4).generate(1).unwrap();
        assert_eq!(model.task_count(), 12);
        for job in model.jobs() {
            let machines: HashSet<&str> = job.tasks.iter().map(|t| t.machine_id.as_str()).collect();
            assert_eq!(machines.len(), 4, "job {} repeats a machine", job.id);
        }
        assert_eq!(model.machines()[0].capacity_min(), 480);
    }

    #[test]
    fn test_chained_predecessors() {
        let model = InstanceGenerator::new(2, 3).generate(3).unwrap();
        for job in model.jobs() {
            assert!(job.tasks[0].predecessor.is_none());
            for w in job.tasks.windows(2) {
                assert_eq!(w[1].predecessor.as_deref(), Some(w[0].id.as_str()));
            }
        }
    }

    #[test]
    fn test_ranges_respected() {
        let g = InstanceGenerator::new(5, 3)
            .with_tasks_per_job(1, 2)
            .with_duration_range(10, 20);
        for seed in 0..20 {
            let model = g.generate(seed).unwrap();
            for job in model.jobs() {
                assert!((1..=2).contains(&job.task_count()));
            }
            for i in model.task_indices() {
                let d = model.task(i).duration_min;
                assert!((10.0..=20.0).contains(&d));
            }
        }
    }

    #[test]
    fn test_generate_many() {
        let models = InstanceGenerator::new(2, 2).generate_many(4, 100).unwrap();
        assert_eq!(models.len(), 4);
    }

    #[test]
    fn test_no_machines() {
        let model = InstanceGenerator::new(3, 0).generate(0).unwrap();
        assert_eq!(model.task_count(), 0);
    }
}
