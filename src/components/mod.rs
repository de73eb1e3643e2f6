//! The building blocks of an automation run: schedules, the portal driver and the login store.

pub mod automation;
pub mod credentials;
pub mod schedule;

pub use automation::{FormFiller, PortalDriver};
pub use credentials::{Credentials, EncryptedFileStore, SecretStore};
pub use schedule::{generate_daily_schedule, validate_schedule, DailySchedule};
