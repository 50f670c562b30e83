//! JSON problem data.
//!
//! ```json
//! {
//!   "machines": [
//!     { "id": "LaserCutter", "calendar": { "start": 480, "end": 1020 } },
//!     { "id": "Oven", "calendar": [600, 601, 602] }
//!   ],
//!   "tasks": [
//!     { "job": "Job1", "task": "Cutting", "machine": "LaserCutter", "duration": 180 },
//!     { "job": "Job1", "task": "Baking", "machine": "Oven", "duration": 2, "predecessor": "Cutting" }
//!   ]
//! }
//! ```
//!
//! A calendar is either a half-open minute range or an explicit list of
//! working minutes. A missing calendar means zero capacity.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ScheduleError;
use crate::models::{Calendar, Machine, ShopModel, Task};

/// Errors while loading problem data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Working calendar as written in input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarSpec {
    /// Minutes in `[start, end)`.
    Range { start: i64, end: i64 },
    /// Explicit working minutes.
    Minutes(Vec<i64>),
}

impl CalendarSpec {
    /// Converts to a normalized [`Calendar`].
    pub fn to_calendar(&self) -> Calendar {
        match self {
            Self::Range { start, end } => Calendar::from_range(*start, *end),
            Self::Minutes(minutes) => Calendar::from_minutes(minutes.iter().copied()),
        }
    }
}

/// Machine entry of the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarSpec>,
}

/// Raw, unvalidated problem data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemData {
    pub machines: Vec<MachineSpec>,
    pub tasks: Vec<Task>,
}

impl ProblemData {
    /// Parses problem data from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads problem data from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Validates the data and builds the model.
    ///
    /// # Errors
    /// `ScheduleError::Configuration` listing every problem found.
    pub fn into_model(self) -> Result<ShopModel, ScheduleError> {
        let machines = self
            .machines
            .into_iter()
            .map(|spec| {
                let machine = Machine::new(spec.id);
                match spec.calendar {
                    Some(cal) => machine.with_calendar(cal.to_calendar()),
                    None => machine,
                }
            })
            .collect();
        ShopModel::new(machines, self.tasks)
    }
}
