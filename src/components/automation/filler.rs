use super::driver::PortalDriver;
use super::models::{FillReport, FillRequest, TimeEntry};
use crate::components::schedule::{
    generate_daily_schedule_with, validate_schedule, DailySchedule, ShiftWindow,
};
use crate::error::Error;
use crate::utils::time::{business_days, format_portal_date};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fills the portal's time entry form day by day
pub struct FormFiller<'a, D: PortalDriver + ?Sized> {
    driver: &'a mut D,
    rng: StdRng,
    step_delay: Duration,
}

impl<'a, D: PortalDriver + ?Sized> FormFiller<'a, D> {
    /// Create a filler over a logged-in driver
    pub fn new(driver: &'a mut D) -> Self {
        Self {
            driver,
            rng: StdRng::from_rng(&mut rand::rng()),
            step_delay: Duration::from_secs(2),
        }
    }

    /// Use a specific random source for the generated hours
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Pause between page steps so the portal and the operator can keep up
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Fill every business day of the request
    pub async fn fill_date_range(&mut self, request: &FillRequest) -> FillReport {
        self.fill_date_range_with_progress(request, |_, _| {}).await
    }

    /// Fill one day
    pub async fn fill_single_date(
        &mut self,
        date: NaiveDate,
        task_index: usize,
        desc_morning: &str,
        desc_afternoon: &str,
    ) -> bool {
        let request = FillRequest::single_day(date, task_index, desc_morning, desc_afternoon);
        self.fill_date_range(&request).await.success
    }

    /// Fill every business day of the request, reporting `(percent, message)` after each day.
    ///
    /// Failing to reach the entry page or to select the task aborts the run.
    /// A failure on one day is recorded in the report and the next day is
    /// still attempted.
    pub async fn fill_date_range_with_progress<F>(
        &mut self,
        request: &FillRequest,
        mut progress: F,
    ) -> FillReport
    where
        F: FnMut(f64, &str) + Send,
    {
        let mut report = FillReport::default();
        let dates = business_days(request.start, request.end);
        let total = dates.len();

        // Open the month of the first day
        let month_year = dates.first().map(|date| (date.month(), date.year()));
        if let Err(e) = self.driver.navigate_to_entries(month_year).await {
            let message = match month_year {
                Some((month, year)) => {
                    format!("Failed to open entries for {:02}/{}: {}", month, year, e)
                }
                None => format!("Failed to open the entries page: {}", e),
            };
            error!("{}", message);
            report.fail(message);
            return report;
        }

        if let Err(e) = self.driver.select_task(request.task_index).await {
            let message = format!("Failed to select task {}: {}", request.task_index, e);
            error!("{}", message);
            report.fail(message);
            return report;
        }

        // Some portal versions need an extra click before the form shows up
        match self.driver.open_entry_form().await {
            Ok(true) => tokio::time::sleep(self.step_delay).await,
            Ok(false) => debug!("No entry form button, assuming the form is already open"),
            Err(e) => debug!("Could not open entry form, continuing: {}", e),
        }

        for (index, date) in dates.iter().enumerate() {
            let date_str = format_portal_date(*date);
            info!("Processing {}", date_str);

            if let Err(message) = self.fill_day(request, index, &date_str, &mut report).await {
                error!("{}", message);
                report.errors.push(message);
                continue;
            }

            report.filled_dates.push(date_str.clone());
            report.total_entries += 2;
            info!("{} filled, waiting for manual confirmation", date_str);

            let percent = (index + 1) as f64 / total as f64 * 100.0;
            progress(percent, &format!("Filled: {}", date_str));
        }

        if !report.errors.is_empty() {
            report.success = false;
        }

        report
    }

    /// Fill the morning and afternoon rows of one day
    async fn fill_day(
        &mut self,
        request: &FillRequest,
        index: usize,
        date_str: &str,
        report: &mut FillReport,
    ) -> Result<(), String> {
        let schedule = self.schedule_for(date_str, report);
        info!("Hours for {}: {}", date_str, schedule);

        let morning = entry(date_str, schedule.morning, request.morning_description(index), 0);
        self.driver
            .fill_time_entry(&morning)
            .await
            .map_err(|e| row_error("morning", date_str, e))?;

        // The portal usually adds the second row by itself after the first is filled
        tokio::time::sleep(self.step_delay).await;
        self.driver
            .ensure_entry_row(1)
            .await
            .map_err(|e| row_error("afternoon", date_str, e))?;

        let afternoon = entry(
            date_str,
            schedule.afternoon,
            request.afternoon_description(index),
            1,
        );
        self.driver
            .fill_time_entry(&afternoon)
            .await
            .map_err(|e| row_error("afternoon", date_str, e))?;

        match self.driver.save_available().await {
            Ok(true) => debug!("Save button available for {}", date_str),
            Ok(false) => warn!("Save button not found for {}, save manually", date_str),
            Err(e) => warn!("Could not check the save button for {}: {}", date_str, e),
        }

        tokio::time::sleep(self.step_delay).await;
        Ok(())
    }

    /// Generate and double-check the hours for one day
    fn schedule_for(&mut self, date_str: &str, report: &mut FillReport) -> DailySchedule {
        let generated = generate_daily_schedule_with(&mut self.rng);
        if generated.used_fallback {
            warn!("Using default hours for {}", date_str);
            report.fallback_dates.push(date_str.to_string());
        }

        let (valid, reason) = validate_schedule(&generated.schedule);
        if valid {
            return generated.schedule;
        }

        warn!("Generated hours for {} rejected: {}", date_str, reason);
        report
            .errors
            .push(format!("{}: {} (using default hours)", date_str, reason));
        report.fallback_dates.push(date_str.to_string());
        DailySchedule::fallback()
    }
}

fn entry(date_str: &str, shift: ShiftWindow, description: String, row: usize) -> TimeEntry {
    TimeEntry {
        date: date_str.to_string(),
        start: shift.start,
        end: shift.end,
        description,
        row,
    }
}

fn row_error(which: &str, date_str: &str, e: Error) -> String {
    format!("Failed to fill {} entry for {}: {}", which, date_str, e)
}
