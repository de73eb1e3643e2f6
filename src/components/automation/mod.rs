//! Driving the timesheet portal over a range of dates.

pub mod driver;
mod filler;
pub mod models;

pub use driver::{DriverAction, PortalDriver, RecordingDriver};
pub use filler::FormFiller;
pub use models::{FillReport, FillRequest, PeriodRequest, PortalTask, TimeEntry};
