use crate::components::schedule::ClockTime;
use crate::error::AutofillResult;
use crate::utils::time::parse_portal_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task row extracted from the portal's task table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PortalTask {
    pub proposal: String,
    pub client: String,
    pub project: String,
    pub task: String,
    pub hours_allowed: String,
    pub hours_logged: String,
    pub balance: String,
}

/// One row of the time entry form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    /// Date in DD/MM/YYYY
    pub date: String,
    pub start: ClockTime,
    pub end: ClockTime,
    pub description: String,
    /// Form row: 0 for the morning, 1 for the afternoon
    pub row: usize,
}

/// A period as submitted by the operator, dates in DD/MM/YYYY
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodRequest {
    pub from: String,
    pub to: String,
    pub task_index: usize,
    pub desc_morning: String,
    pub desc_afternoon: String,
    /// One morning description per business day, one per line
    #[serde(default)]
    pub desc_morning_by_date: Option<String>,
    /// One afternoon description per business day, one per line
    #[serde(default)]
    pub desc_afternoon_by_date: Option<String>,
}

/// A parsed request to fill every business day in a date range
#[derive(Debug, Clone)]
pub struct FillRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub task_index: usize,
    pub desc_morning: String,
    pub desc_afternoon: String,
    pub desc_morning_by_date: Option<String>,
    pub desc_afternoon_by_date: Option<String>,
}

impl FillRequest {
    /// Request for a single day with fixed descriptions
    pub fn single_day(
        date: NaiveDate,
        task_index: usize,
        desc_morning: impl Into<String>,
        desc_afternoon: impl Into<String>,
    ) -> Self {
        Self {
            start: date,
            end: date,
            task_index,
            desc_morning: desc_morning.into(),
            desc_afternoon: desc_afternoon.into(),
            desc_morning_by_date: None,
            desc_afternoon_by_date: None,
        }
    }

    /// Morning description for the `day_index`-th business day
    pub fn morning_description(&self, day_index: usize) -> String {
        description_for_day(self.desc_morning_by_date.as_deref(), day_index, &self.desc_morning)
    }

    /// Afternoon description for the `day_index`-th business day
    pub fn afternoon_description(&self, day_index: usize) -> String {
        description_for_day(
            self.desc_afternoon_by_date.as_deref(),
            day_index,
            &self.desc_afternoon,
        )
    }
}

impl TryFrom<&PeriodRequest> for FillRequest {
    type Error = crate::error::Error;

    fn try_from(period: &PeriodRequest) -> AutofillResult<Self> {
        Ok(Self {
            start: parse_portal_date(&period.from)?,
            end: parse_portal_date(&period.to)?,
            task_index: period.task_index,
            desc_morning: period.desc_morning.clone(),
            desc_afternoon: period.desc_afternoon.clone(),
            desc_morning_by_date: period.desc_morning_by_date.clone(),
            desc_afternoon_by_date: period.desc_afternoon_by_date.clone(),
        })
    }
}

/// Pick line `day_index` of `by_date` when it has text, otherwise the default
fn description_for_day(by_date: Option<&str>, day_index: usize, default: &str) -> String {
    by_date
        .and_then(|text| text.lines().nth(day_index))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Outcome of filling one or more periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub success: bool,
    /// Dates (DD/MM/YYYY) whose two entries were filled
    pub filled_dates: Vec<String>,
    pub errors: Vec<String>,
    pub total_entries: usize,
    /// Dates whose hours came from the fixed fallback schedule
    pub fallback_dates: Vec<String>,
}

impl Default for FillReport {
    fn default() -> Self {
        Self {
            success: true,
            filled_dates: Vec::new(),
            errors: Vec::new(),
            total_entries: 0,
            fallback_dates: Vec::new(),
        }
    }
}

impl FillReport {
    /// Record an error and mark the report as failed
    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.errors.push(message.into());
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: FillReport) {
        self.success &= other.success;
        self.filled_dates.extend(other.filled_dates);
        self.errors.extend(other.errors);
        self.total_entries += other.total_entries;
        self.fallback_dates.extend(other.fallback_dates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> PeriodRequest {
        PeriodRequest {
            from: "06/01/2025".to_string(),
            to: "10/01/2025".to_string(),
            task_index: 2,
            desc_morning: "Development".to_string(),
            desc_afternoon: "Code review".to_string(),
            desc_morning_by_date: Some("Sprint planning\n\n  Design review  ".to_string()),
            desc_afternoon_by_date: None,
        }
    }

    #[test]
    fn test_fill_request_from_period() {
        let request = FillRequest::try_from(&period()).unwrap();
        assert_eq!(request.start, NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(request.end, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(request.task_index, 2);

        let mut bad = period();
        bad.to = "2025-01-10".to_string();
        assert!(FillRequest::try_from(&bad).is_err());
    }

    #[test]
    fn test_descriptions_by_date() {
        let request = FillRequest::try_from(&period()).unwrap();

        assert_eq!(request.morning_description(0), "Sprint planning");
        // Blank line falls back to the default
        assert_eq!(request.morning_description(1), "Development");
        // Lines are trimmed
        assert_eq!(request.morning_description(2), "Design review");
        // Past the last line
        assert_eq!(request.morning_description(3), "Development");

        assert_eq!(request.afternoon_description(0), "Code review");
    }

    #[test]
    fn test_report_merge() {
        let mut total = FillReport::default();
        total.merge(FillReport {
            success: true,
            filled_dates: vec!["06/01/2025".to_string()],
            errors: Vec::new(),
            total_entries: 2,
            fallback_dates: Vec::new(),
        });
        assert!(total.success);

        let mut failed = FillReport::default();
        failed.fail("Failed to select task 9");
        total.merge(failed);

        assert!(!total.success);
        assert_eq!(total.filled_dates, vec!["06/01/2025"]);
        assert_eq!(total.errors, vec!["Failed to select task 9"]);
        assert_eq!(total.total_entries, 2);
    }
}
