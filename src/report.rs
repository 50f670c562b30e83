//! Text report and Gantt chart data.
//!
//! Presentation only; everything here reads an already verified
//! [`Schedule`] and [`UtilizationReport`].

use serde::{Deserialize, Serialize};

use crate::models::{Schedule, ShopModel};
use crate::scheduler::UtilizationReport;

/// One bar of a Gantt chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttBar {
    /// Machine the bar is drawn on.
    pub machine_id: String,
    /// Row of the machine (declaration order).
    pub lane: usize,
    /// Left edge (minutes).
    pub start: f64,
    /// Width (minutes).
    pub duration: f64,
    /// `Job-Task`.
    pub label: String,
}

/// Renders the schedule as plain text.
///
/// ```text
/// Schedule:
/// Job1 - Cutting (LaserCutter): Start=0.0 End=180.0
/// ...
///
/// Total Makespan: 480.0 minutes
///
/// Machine Utilization:
/// LaserCutter: 55.56%
/// ```
///
/// Machines without calendar capacity print `n/a`.
pub fn render_text(schedule: &Schedule, utilization: &UtilizationReport) -> String {
    let mut out = String::new();

    out.push_str("Schedule:\n");
    for e in &schedule.entries {
        out.push_str(&format!(
            "{} - {} ({}): Start={:.1} End={:.1}\n",
            e.job_id, e.task_id, e.machine_id, e.start, e.end
        ));
    }

    out.push_str(&format!(
        "\nTotal Makespan: {:.1} minutes\n",
        schedule.makespan()
    ));

    out.push_str("\nMachine Utilization:\n");
    for m in &utilization.machines {
        let line = if m.has_capacity {
            format!("{}: {:.2}%\n", m.machine_id, m.percent)
        } else {
            format!("{}: n/a (no working minutes)\n", m.machine_id)
        };
        out.push_str(&line);
    }

    out
}

/// Chart-ready bars, ordered by lane then start.
pub fn gantt_bars(model: &ShopModel, schedule: &Schedule) -> Vec<GanttBar> {
    let mut bars: Vec<GanttBar> = model
        .machines()
        .iter()
        .enumerate()
        .flat_map(|(lane, machine)| {
            schedule
                .entries_for_machine(&machine.id)
                .into_iter()
                .map(move |e| GanttBar {
                    machine_id: machine.id.clone(),
                    lane,
                    start: e.start,
                    duration: e.duration(),
                    label: e.label(),
                })
        })
        .collect();
    bars.sort_by(|a, b| a.lane.cmp(&b.lane).then(a.start.total_cmp(&b.start)));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, Machine, ScheduledTask, Task};

    fn model() -> ShopModel {
        ShopModel::new(
            vec![
                Machine::new("Saw").with_calendar(Calendar::from_range(0, 300)),
                Machine::new("Drill"),
            ],
            vec![
                Task::new("J1", "Cut", "Saw", 60.0),
                Task::new("J1", "Bore", "Drill", 30.0).with_predecessor("Cut"),
                Task::new("J2", "Cut", "Saw", 45.0),
            ],
        )
        .unwrap()
    }

    fn schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(ScheduledTask::new("J1", "Cut", "Saw", 45.0, 105.0));
        s.add_entry(ScheduledTask::new("J1", "Bore", "Drill", 105.0, 135.0));
        s.add_entry(ScheduledTask::new("J2", "Cut", "Saw", 0.0, 45.0));
        s
    }

    #[test]
    fn test_render_text() {
        let m = model();
        let s = schedule();
        let text = render_text(&s, &UtilizationReport::calculate(&m, &s));
        let expected = "\
Schedule:
J1 - Cut (Saw): Start=45.0 End=105.0
J1 - Bore (Drill): Start=105.0 End=135.0
J2 - Cut (Saw): Start=0.0 End=45.0

Total Makespan: 135.0 minutes

Machine Utilization:
Saw: 35.00%
Drill: n/a (no working minutes)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_gantt_bars() {
        let bars = gantt_bars(&model(), &schedule());
        assert_eq!(bars.len(), 3);

        assert_eq!(bars[0].label, "J2-Cut");
        assert_eq!(bars[0].lane, 0);
        assert_eq!(bars[1].label, "J1-Cut");
        assert!((bars[1].start - 45.0).abs() < 1e-10);
        assert!((bars[1].duration - 60.0).abs() < 1e-10);
        assert_eq!(bars[2].machine_id, "Drill");
        assert_eq!(bars[2].lane, 1);
    }

    #[test]
    fn test_gantt_serializes() {
        let bars = gantt_bars(&model(), &schedule());
        let json = serde_json::to_value(&bars[0]).unwrap();
        assert_eq!(json["machine_id"], "Saw");
        assert_eq!(json["label"], "J2-Cut");
    }
}
