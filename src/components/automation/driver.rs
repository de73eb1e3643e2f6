use super::models::{PortalTask, TimeEntry};
use crate::error::AutofillResult;
use async_trait::async_trait;
use tracing::info;

/// Page-level operations on the timesheet portal.
///
/// Implementations wrap a real browser session. Every operation either
/// succeeds or returns an error describing which step failed; none of them
/// submits the timesheet, which stays a manual step for the operator.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// Sign in to the portal
    async fn login(&mut self, email: &str, password: &str) -> AutofillResult<()>;

    /// Open the time entry page, optionally switching to a month and year
    async fn navigate_to_entries(&mut self, month_year: Option<(u32, i32)>) -> AutofillResult<()>;

    /// Read the task table of the current page
    async fn load_tasks(&mut self) -> AutofillResult<Vec<PortalTask>>;

    /// Select the task at `index` in the task table
    async fn select_task(&mut self, index: usize) -> AutofillResult<()>;

    /// Click the button that opens the entry form, returning false when the page has none
    async fn open_entry_form(&mut self) -> AutofillResult<bool>;

    /// Fill one row of the entry form
    async fn fill_time_entry(&mut self, entry: &TimeEntry) -> AutofillResult<()>;

    /// Make sure form row `row` exists, adding one if the page did not
    async fn ensure_entry_row(&mut self, row: usize) -> AutofillResult<()>;

    /// Whether the save button is present; it is never clicked
    async fn save_available(&mut self) -> AutofillResult<bool>;

    /// Close the browser session
    async fn close(&mut self) -> AutofillResult<()>;

    /// Whether a browser session is currently open
    fn session_open(&self) -> bool;
}

/// Something a driver was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverAction {
    Login { email: String },
    Navigate { month_year: Option<(u32, i32)> },
    LoadTasks,
    SelectTask(usize),
    OpenEntryForm,
    FillEntry(TimeEntry),
    EnsureRow(usize),
    CheckSave,
    Close,
}

/// Driver that performs no browser work and only logs and records each step.
///
/// Used for dry runs when no browser binding is configured.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    portal_url: String,
    headless: bool,
    open: bool,
    tasks: Vec<PortalTask>,
    actions: Vec<DriverAction>,
}

impl RecordingDriver {
    /// Create a recording driver for the given portal
    pub fn new(portal_url: impl Into<String>, headless: bool) -> Self {
        Self {
            portal_url: portal_url.into(),
            headless,
            ..Default::default()
        }
    }

    /// Whether the session would run without a window
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Tasks returned by `load_tasks`
    pub fn with_tasks(mut self, tasks: Vec<PortalTask>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Every action performed so far
    pub fn actions(&self) -> &[DriverAction] {
        &self.actions
    }
}

#[async_trait]
impl PortalDriver for RecordingDriver {
    async fn login(&mut self, email: &str, _password: &str) -> AutofillResult<()> {
        if !self.open {
            info!("[dry run] Launching browser (headless={})", self.headless);
            self.open = true;
        }
        info!("[dry run] Logging in to {} as {}", self.portal_url, email);
        self.actions.push(DriverAction::Login {
            email: email.to_string(),
        });
        Ok(())
    }

    async fn navigate_to_entries(&mut self, month_year: Option<(u32, i32)>) -> AutofillResult<()> {
        match month_year {
            Some((month, year)) => info!("[dry run] Opening entries for {:02}/{}", month, year),
            None => info!("[dry run] Opening entries page"),
        }
        self.actions.push(DriverAction::Navigate { month_year });
        Ok(())
    }

    async fn load_tasks(&mut self) -> AutofillResult<Vec<PortalTask>> {
        self.actions.push(DriverAction::LoadTasks);
        Ok(self.tasks.clone())
    }

    async fn select_task(&mut self, index: usize) -> AutofillResult<()> {
        info!("[dry run] Selecting task {}", index);
        self.actions.push(DriverAction::SelectTask(index));
        Ok(())
    }

    async fn open_entry_form(&mut self) -> AutofillResult<bool> {
        self.actions.push(DriverAction::OpenEntryForm);
        Ok(true)
    }

    async fn fill_time_entry(&mut self, entry: &TimeEntry) -> AutofillResult<()> {
        info!(
            "[dry run] Row {} on {}: {}-{} \"{}\"",
            entry.row, entry.date, entry.start, entry.end, entry.description
        );
        self.actions.push(DriverAction::FillEntry(entry.clone()));
        Ok(())
    }

    async fn ensure_entry_row(&mut self, row: usize) -> AutofillResult<()> {
        self.actions.push(DriverAction::EnsureRow(row));
        Ok(())
    }

    async fn save_available(&mut self) -> AutofillResult<bool> {
        self.actions.push(DriverAction::CheckSave);
        Ok(true)
    }

    async fn close(&mut self) -> AutofillResult<()> {
        info!("[dry run] Closing browser session");
        self.actions.push(DriverAction::Close);
        self.open = false;
        Ok(())
    }

    fn session_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_follows_login_and_close() {
        let mut driver = RecordingDriver::new("https://portal.example", true);
        assert!(driver.headless());
        assert!(!driver.session_open());

        driver.login("ana@example.com", "s3cret").await.unwrap();
        assert!(driver.session_open());

        driver.close().await.unwrap();
        assert!(!driver.session_open());
        assert_eq!(
            driver.actions(),
            &[
                DriverAction::Login {
                    email: "ana@example.com".to_string()
                },
                DriverAction::Close,
            ]
        );
    }
}
