//! Job-shop domain models.
//!
//! Provides the data types for describing a job-shop problem and its
//! solution: machines with working calendars, jobs made of tasks with
//! predecessor links, the validated [`ShopModel`], and the resolved
//! [`Schedule`].
//!
//! # Domain Mappings
//!
//! | u-jobshop | Manufacturing | Healthcare | Logistics |
//! |-----------|--------------|------------|-----------|
//! | Job | Order | Patient Case | Shipment |
//! | Task | Operation | Procedure | Transport Leg |
//! | Machine | Machine/Station | Room | Truck |
//! | Schedule | Production Plan | OR Schedule | Route Plan |

mod calendar;
mod job;
mod machine;
mod schedule;
mod shop;
mod task;

pub use calendar::{Calendar, TimeWindow};
pub use job::Job;
pub use machine::Machine;
pub use schedule::{Schedule, ScheduledTask, Violation, ViolationType};
pub use shop::{ShopModel, TaskIndex};
pub use task::Task;
