//! Machine model.
//!
//! A machine processes one task at a time. Beyond its identity it only
//! carries a working calendar, which feeds utilization reporting.

use serde::{Deserialize, Serialize};

use super::Calendar;

/// A machine that tasks are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    /// Unique machine identifier.
    pub id: String,
    /// Working calendar (utilization denominator only).
    #[serde(default)]
    pub calendar: Calendar,
}

impl Machine {
    /// Creates a machine with an empty calendar.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            calendar: Calendar::new(),
        }
    }

    /// Sets the working calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Total working minutes declared by the calendar.
    pub fn capacity_min(&self) -> i64 {
        self.calendar.capacity_min()
    }
}
