//! Daily work schedule generation and validation.
//!
//! A day is two shifts whose four boundaries are drawn from narrow windows
//! around 09:00, 12:00, 13:00 and 18:00. Draws are kept only when the lunch
//! break (the gap) and the time worked across both shifts (the span) stay
//! plausible.

mod generator;
pub mod models;
mod validator;

use std::ops::RangeInclusive;

pub use generator::{
    generate_daily_schedule, generate_daily_schedule_with, generate_with_budget,
};
pub use models::{ClockTime, DailySchedule, GeneratedSchedule, ShiftWindow};
pub use validator::{
    check_intervals, check_schedule, validate_hours, validate_schedule, ScheduleViolation,
};

/// Morning start window, 08:55-09:00
pub const MORNING_START: RangeInclusive<u32> = 535..=540;
/// Morning end window, 12:00-12:15
pub const MORNING_END: RangeInclusive<u32> = 720..=735;
/// Afternoon start window, 13:00-13:15
pub const AFTERNOON_START: RangeInclusive<u32> = 780..=795;
/// Afternoon end window, 18:00-18:15
pub const AFTERNOON_END: RangeInclusive<u32> = 1080..=1095;
/// Allowed lunch break, 45min to 1h15
pub const GAP_MINUTES: RangeInclusive<u32> = 45..=75;
/// Allowed time worked across both shifts, 8h give or take 15min
pub const SPAN_MINUTES: RangeInclusive<u32> = 465..=495;
/// Draws attempted before falling back to the fixed schedule
pub const MAX_ATTEMPTS: u32 = 200;
