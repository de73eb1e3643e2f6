use crate::error::{format_error, Error};
use crate::utils::time::{elapsed_minutes, to_minutes, to_text, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A time of day as minutes since midnight, always within 00:00-23:59
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    /// Create a clock time from minutes since midnight, wrapping past one day
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes % MINUTES_PER_DAY)
    }

    /// Minutes since midnight
    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_minutes(s).map(Self)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<u32> for ClockTime {
    type Error = Error;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if minutes >= MINUTES_PER_DAY {
            return Err(format_error(&format!("{} minutes is past 23:59", minutes)));
        }
        Ok(Self(minutes))
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_text(self.0))
    }
}

/// One contiguous work session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ShiftWindow {
    /// Create a shift from two clock times
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Length of the shift, wrapping past midnight when it ends "before" it starts
    pub fn duration_minutes(&self) -> u32 {
        elapsed_minutes(self.start.minutes(), self.end.minutes())
    }

    /// Parse a shift from two HH:MM strings
    pub fn parse(start: &str, end: &str) -> Result<Self, Error> {
        Ok(Self::new(start.parse()?, end.parse()?))
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The two shifts worked on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub morning: ShiftWindow,
    pub afternoon: ShiftWindow,
}

impl DailySchedule {
    /// Create a schedule from its two shifts
    pub fn new(morning: ShiftWindow, afternoon: ShiftWindow) -> Self {
        Self { morning, afternoon }
    }

    /// Build a schedule from four HH:MM strings
    pub fn from_hours(
        morning_start: &str,
        morning_end: &str,
        afternoon_start: &str,
        afternoon_end: &str,
    ) -> Result<Self, Error> {
        Ok(Self::new(
            ShiftWindow::parse(morning_start, morning_end)?,
            ShiftWindow::parse(afternoon_start, afternoon_end)?,
        ))
    }

    /// Lunch break length, wrapping past midnight when the afternoon starts "earlier"
    pub fn gap_minutes(&self) -> u32 {
        elapsed_minutes(self.morning.end.minutes(), self.afternoon.start.minutes())
    }

    /// Minutes worked across both shifts, i.e. the workday minus the lunch break
    pub fn span_minutes(&self) -> u32 {
        self.morning.duration_minutes() + self.afternoon.duration_minutes()
    }

    /// The fixed schedule used when random generation gives up
    pub fn fallback() -> Self {
        Self::new(
            ShiftWindow::new(ClockTime(9 * 60), ClockTime(12 * 60)),
            ShiftWindow::new(ClockTime(13 * 60), ClockTime(18 * 60)),
        )
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "morning {}, afternoon {}", self.morning, self.afternoon)
    }
}

/// Result of one generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSchedule {
    pub schedule: DailySchedule,
    /// Whether the retry budget ran out and the fixed fallback was returned
    pub used_fallback: bool,
    /// Number of draws made, including the accepted one
    pub attempts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_time_parse_and_display() {
        let time: ClockTime = "08:55".parse().unwrap();
        assert_eq!(time.minutes(), 535);
        assert_eq!(time.to_string(), "08:55");

        assert!("8h55".parse::<ClockTime>().is_err());
        assert!(ClockTime::try_from(1440_u32).is_err());
        assert_eq!(ClockTime::from_minutes(1500).to_string(), "01:00");
    }

    #[test]
    fn test_schedule_serializes_as_hh_mm() {
        let schedule = DailySchedule::fallback();
        let json = serde_json::to_value(schedule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "morning": {"start": "09:00", "end": "12:00"},
                "afternoon": {"start": "13:00", "end": "18:00"}
            })
        );

        let parsed: DailySchedule = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, schedule);
    }

    #[test]
    fn test_schedule_rejects_malformed_json_times() {
        let json = serde_json::json!({
            "morning": {"start": "9am", "end": "12:00"},
            "afternoon": {"start": "13:00", "end": "18:00"}
        });
        assert!(serde_json::from_value::<DailySchedule>(json).is_err());
    }

    #[test]
    fn test_gap_and_span() {
        let schedule = DailySchedule::fallback();
        assert_eq!(schedule.gap_minutes(), 60);
        assert_eq!(schedule.span_minutes(), 480);

        // Afternoon "before" the morning wraps to the next day
        let wrapped = DailySchedule::from_hours("09:00", "12:15", "12:00", "18:00").unwrap();
        assert_eq!(wrapped.gap_minutes(), 1425);

        let long_day = DailySchedule::from_hours("08:55", "12:00", "13:00", "18:15").unwrap();
        assert_eq!(long_day.span_minutes(), 500);

        let night = ShiftWindow::parse("22:00", "02:00").unwrap();
        assert_eq!(night.duration_minutes(), 240);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DailySchedule::fallback().to_string(),
            "morning 09:00-12:00, afternoon 13:00-18:00"
        );
    }
}
