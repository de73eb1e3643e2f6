use super::models::{ClockTime, DailySchedule};
use super::{
    AFTERNOON_END, AFTERNOON_START, GAP_MINUTES, MORNING_END, MORNING_START, SPAN_MINUTES,
};
use crate::error::AutofillResult;
use thiserror::Error;

/// The first constraint a schedule breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("morning start {0} outside the allowed window (08:55-09:00)")]
    MorningStart(ClockTime),

    #[error("morning end {0} outside the allowed window (12:00-12:15)")]
    MorningEnd(ClockTime),

    #[error("afternoon start {0} outside the allowed window (13:00-13:15)")]
    AfternoonStart(ClockTime),

    #[error("afternoon end {0} outside the allowed window (18:00-18:15)")]
    AfternoonEnd(ClockTime),

    #[error("gap between morning end and afternoon start is {0}min (must be 45-75min)")]
    Gap(u32),

    #[error("span of hours worked is {0}min (must be 465-495min, about 8h)")]
    Span(u32),
}

/// Check the lunch break and the time worked, ignoring the shift windows
pub fn check_intervals(schedule: &DailySchedule) -> Result<(), ScheduleViolation> {
    let gap = schedule.gap_minutes();
    if !GAP_MINUTES.contains(&gap) {
        return Err(ScheduleViolation::Gap(gap));
    }

    let span = schedule.span_minutes();
    if !SPAN_MINUTES.contains(&span) {
        return Err(ScheduleViolation::Span(span));
    }

    Ok(())
}

/// Check every constraint in order, stopping at the first one broken
pub fn check_schedule(schedule: &DailySchedule) -> Result<(), ScheduleViolation> {
    let DailySchedule { morning, afternoon } = *schedule;

    if !MORNING_START.contains(&morning.start.minutes()) {
        return Err(ScheduleViolation::MorningStart(morning.start));
    }
    if !MORNING_END.contains(&morning.end.minutes()) {
        return Err(ScheduleViolation::MorningEnd(morning.end));
    }
    if !AFTERNOON_START.contains(&afternoon.start.minutes()) {
        return Err(ScheduleViolation::AfternoonStart(afternoon.start));
    }
    if !AFTERNOON_END.contains(&afternoon.end.minutes()) {
        return Err(ScheduleViolation::AfternoonEnd(afternoon.end));
    }

    check_intervals(schedule)
}

/// Validate a schedule, returning whether it is acceptable and why
pub fn validate_schedule(schedule: &DailySchedule) -> (bool, String) {
    match check_schedule(schedule) {
        Ok(()) => (true, "valid".to_string()),
        Err(violation) => (false, violation.to_string()),
    }
}

/// Validate four HH:MM strings; malformed times are an error, not a violation
pub fn validate_hours(
    morning_start: &str,
    morning_end: &str,
    afternoon_start: &str,
    afternoon_end: &str,
) -> AutofillResult<(bool, String)> {
    let schedule =
        DailySchedule::from_hours(morning_start, morning_end, afternoon_start, afternoon_end)?;
    Ok(validate_schedule(&schedule))
}
