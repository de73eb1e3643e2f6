use crate::error::{date_error, format_error, AutofillResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

/// Minutes in one day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Date format used by the portal
pub const PORTAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a time string in HH:MM format into minutes since midnight
pub fn to_minutes(time_str: &str) -> AutofillResult<u32> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return Err(format_error(&format!("'{}' is not HH:MM", time_str)));
    }

    let hour = parse_component(parts[0], time_str)?;
    let minute = parse_component(parts[1], time_str)?;
    if hour > 23 || minute > 59 {
        return Err(format_error(&format!("'{}' is outside 00:00-23:59", time_str)));
    }

    Ok(hour * 60 + minute)
}

fn parse_component(part: &str, time_str: &str) -> AutofillResult<u32> {
    // u32::from_str would also accept a leading '+'
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(format_error(&format!("'{}' is not HH:MM", time_str)));
    }
    part.parse::<u32>()
        .map_err(|_| format_error(&format!("'{}' is not HH:MM", time_str)))
}

/// Format minutes since midnight as HH:MM, wrapping values past one day
pub fn to_text(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Minutes elapsed from `from` to `to`, assuming `to` is on the next day when it is earlier
pub fn elapsed_minutes(from: u32, to: u32) -> u32 {
    if to < from {
        to + MINUTES_PER_DAY - from
    } else {
        to - from
    }
}

/// Pick a uniformly random time between two HH:MM bounds (inclusive).
///
/// When `start >= end` the end bound is taken to be on the following day, so
/// "23:50".."00:10" samples across midnight. The result is always a valid
/// clock face time.
pub fn random_in_range<R: Rng + ?Sized>(
    start_str: &str,
    end_str: &str,
    rng: &mut R,
) -> AutofillResult<String> {
    let start = to_minutes(start_str)?;
    let mut end = to_minutes(end_str)?;

    if start >= end {
        end += MINUTES_PER_DAY;
    }

    let minutes = rng.random_range(start..=end) % MINUTES_PER_DAY;
    Ok(to_text(minutes))
}

/// All Monday-to-Friday dates between `start` and `end`, inclusive
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;

    while current <= end {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(current);
        }
        current += Duration::days(1);
    }

    days
}

/// Parse a DD/MM/YYYY date
pub fn parse_portal_date(date_str: &str) -> AutofillResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), PORTAL_DATE_FORMAT)
        .map_err(|e| date_error(&format!("'{}': {}", date_str, e)))
}

/// Format a date as DD/MM/YYYY
pub fn format_portal_date(date: NaiveDate) -> String {
    date.format(PORTAL_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_to_minutes() {
        // Valid cases
        assert_eq!(to_minutes("00:00").unwrap(), 0);
        assert_eq!(to_minutes("08:55").unwrap(), 535);
        assert_eq!(to_minutes("12:15").unwrap(), 735);
        assert_eq!(to_minutes("23:59").unwrap(), 1439);
        assert_eq!(to_minutes("9:05").unwrap(), 545);

        // Invalid cases
        assert!(to_minutes("24:00").is_err()); // Hour out of range
        assert!(to_minutes("12:60").is_err()); // Minute out of range
        assert!(to_minutes("12:30:45").is_err()); // Too many parts
        assert!(to_minutes("12").is_err()); // Too few parts
        assert!(to_minutes("12:ab").is_err());
        assert!(to_minutes("+1:30").is_err());
        assert!(to_minutes(":30").is_err());
        assert!(to_minutes("").is_err());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(0), "00:00");
        assert_eq!(to_text(535), "08:55");
        assert_eq!(to_text(1439), "23:59");

        // Values past one day wrap around the clock face
        assert_eq!(to_text(1440), to_text(0));
        assert_eq!(to_text(1500), to_text(60));
        assert_eq!(to_text(1500), "01:00");
    }

    #[test]
    fn test_round_trip_every_minute() {
        for minutes in 0..MINUTES_PER_DAY {
            assert_eq!(to_minutes(&to_text(minutes)).unwrap(), minutes);
        }
    }

    #[test]
    fn test_elapsed_minutes() {
        assert_eq!(elapsed_minutes(720, 780), 60);
        assert_eq!(elapsed_minutes(780, 780), 0);
        // Crossing midnight
        assert_eq!(elapsed_minutes(1430, 10), 20);
    }

    #[test]
    fn test_random_in_range_same_day() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let value = to_minutes(&random_in_range("08:55", "09:00", &mut rng).unwrap()).unwrap();
            assert!((535..=540).contains(&value));
        }
    }

    #[test]
    fn test_random_in_range_wraps_past_midnight() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let value = to_minutes(&random_in_range("23:50", "00:10", &mut rng).unwrap()).unwrap();
            assert!(value >= 1430 || value <= 10, "unexpected {}", value);
        }
    }

    #[test]
    fn test_random_in_range_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_in_range("25:00", "09:00", &mut rng).is_err());
        assert!(random_in_range("08:00", "nine", &mut rng).is_err());
    }

    #[test]
    fn test_business_days() {
        // Friday 2025-01-03 to Tuesday 2025-01-07
        let start = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let days = business_days(start, end);
        let formatted: Vec<String> = days.into_iter().map(format_portal_date).collect();
        assert_eq!(formatted, vec!["03/01/2025", "06/01/2025", "07/01/2025"]);

        // Weekend only
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 4).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert!(business_days(saturday, sunday).is_empty());

        // Reversed range
        assert!(business_days(end, start).is_empty());
    }

    #[test]
    fn test_portal_dates() {
        let date = parse_portal_date("31/01/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(format_portal_date(date), "31/01/2025");

        assert!(parse_portal_date("2025-01-31").is_err());
        assert!(parse_portal_date("31/02/2025").is_err());
    }
}
