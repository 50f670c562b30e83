//! Machine working calendars.
//!
//! A calendar is the set of minutes during which a machine is staffed.
//! It is consumed only as the denominator of utilization; the scheduler
//! never restricts task placement to calendar minutes.
//!
//! # Time Model
//! All times are integer minutes relative to a scheduling epoch (t=0).
//! Internally the minute set is stored as sorted, merged half-open windows,
//! so a calendar given as an explicit minute list and one given as a range
//! compare equal when they cover the same minutes.

use serde::{Deserialize, Serialize};

/// A minute interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeWindow {
    /// Interval start (minute, inclusive).
    pub start_min: i64,
    /// Interval end (minute, exclusive).
    pub end_min: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_min: i64, end_min: i64) -> Self {
        Self { start_min, end_min }
    }

    /// Length of this window in minutes (0 for inverted windows).
    #[inline]
    pub fn duration_min(&self) -> i64 {
        (self.end_min - self.start_min).max(0)
    }
}

/// Working calendar of a machine.
///
/// An empty calendar has zero capacity. Utilization against an empty
/// calendar is reported as 0% with the machine flagged as having no
/// declared capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    windows: Vec<TimeWindow>,
}

impl Calendar {
    /// Creates an empty calendar (zero capacity).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calendar covering the minute range [start, end).
    pub fn from_range(start_min: i64, end_min: i64) -> Self {
        Self::new().with_window(start_min, end_min)
    }

    /// Creates a calendar from an explicit set of working minutes.
    ///
    /// Duplicates are ignored; consecutive minutes collapse into windows.
    pub fn from_minutes<I>(minutes: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut sorted: Vec<i64> = minutes.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut windows: Vec<TimeWindow> = Vec::new();
        for minute in sorted {
            match windows.last_mut() {
                Some(last) if last.end_min == minute => last.end_min += 1,
                _ => windows.push(TimeWindow::new(minute, minute + 1)),
            }
        }
        Self { windows }
    }

    /// Adds a working window, merging it with any overlapping or
    /// touching windows.
    pub fn with_window(mut self, start_min: i64, end_min: i64) -> Self {
        if end_min > start_min {
            self.windows.push(TimeWindow::new(start_min, end_min));
            self.normalize();
        }
        self
    }

    /// Normalized working windows, sorted by start.
    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    /// Whether the calendar declares any working minute.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Total number of working minutes.
    pub fn capacity_min(&self) -> i64 {
        self.windows.iter().map(TimeWindow::duration_min).sum()
    }

    fn normalize(&mut self) {
        self.windows.sort();
        let mut merged: Vec<TimeWindow> = Vec::with_capacity(self.windows.len());
        for w in self.windows.drain(..) {
            match merged.last_mut() {
                Some(last) if w.start_min <= last.end_min => {
                    last.end_min = last.end_min.max(w.end_min);
                }
                _ => merged.push(w),
            }
        }
        self.windows = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_capacity() {
        // LaserCutter shift: 08:00-17:00
        let cal = Calendar::from_range(480, 1020);
        assert_eq!(cal.capacity_min(), 540);
        assert_eq!(cal.windows(), &[TimeWindow::new(480, 1020)]);
    }

    #[test]
    fn test_from_minutes_collapses_runs() {
        let cal = Calendar::from_minutes(vec![5, 1, 2, 3, 2, 6, 10]);
        assert_eq!(
            cal.windows(),
            &[
                TimeWindow::new(1, 4),
                TimeWindow::new(5, 7),
                TimeWindow::new(10, 11)
            ]
        );
        assert_eq!(cal.capacity_min(), 6);
    }

    #[test]
    fn test_minutes_equal_range() {
        assert_eq!(Calendar::from_minutes(480..960), Calendar::from_range(480, 960));
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let cal = Calendar::new()
            .with_window(0, 100)
            .with_window(50, 150)
            .with_window(150, 200)
            .with_window(300, 310);
        assert_eq!(cal.windows().len(), 2);
        assert_eq!(cal.capacity_min(), 210);
    }

    #[test]
    fn test_empty_calendar() {
        let cal = Calendar::new().with_window(10, 10);
        assert!(cal.is_empty());
        assert_eq!(cal.capacity_min(), 0);
    }
}
