use super::models::{ClockTime, DailySchedule, GeneratedSchedule, ShiftWindow};
use super::validator::check_intervals;
use super::{AFTERNOON_END, AFTERNOON_START, MAX_ATTEMPTS, MORNING_END, MORNING_START};
use rand::Rng;
use tracing::{debug, trace, warn};

/// Generate a schedule for one day using the thread-local random source
pub fn generate_daily_schedule() -> GeneratedSchedule {
    generate_daily_schedule_with(&mut rand::rng())
}

/// Generate a schedule for one day from the given random source
pub fn generate_daily_schedule_with<R: Rng + ?Sized>(rng: &mut R) -> GeneratedSchedule {
    generate_with_budget(rng, MAX_ATTEMPTS)
}

/// Rejection-sample a schedule, giving up after `max_attempts` draws.
///
/// Each attempt draws all four boundaries independently and discards the whole
/// draw if the lunch break or the time worked is out of bounds. Once the
/// budget is spent the fixed 09:00-12:00 / 13:00-18:00 schedule is returned
/// with `used_fallback` set, so this never fails.
pub fn generate_with_budget<R: Rng + ?Sized>(
    rng: &mut R,
    max_attempts: u32,
) -> GeneratedSchedule {
    for attempt in 1..=max_attempts {
        let schedule = DailySchedule::new(
            ShiftWindow::new(
                ClockTime::from_minutes(rng.random_range(MORNING_START)),
                ClockTime::from_minutes(rng.random_range(MORNING_END)),
            ),
            ShiftWindow::new(
                ClockTime::from_minutes(rng.random_range(AFTERNOON_START)),
                ClockTime::from_minutes(rng.random_range(AFTERNOON_END)),
            ),
        );

        if let Err(violation) = check_intervals(&schedule) {
            trace!("Attempt {} rejected: {}", attempt, violation);
            continue;
        }

        debug!("Generated schedule {} after {} attempt(s)", schedule, attempt);
        return GeneratedSchedule {
            schedule,
            used_fallback: false,
            attempts: attempt,
        };
    }

    warn!(
        "No valid schedule after {} attempts, using the fixed fallback",
        max_attempts
    );
    GeneratedSchedule {
        schedule: DailySchedule::fallback(),
        used_fallback: true,
        attempts: max_attempts,
    }
}
