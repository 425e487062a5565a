//! Arrival time formatting.

use chrono::{DateTime, Duration, TimeZone};

/// Format the free-text ETA string from the remaining travel time.
///
/// The wall clock is passed in rather than read here so callers (and tests)
/// control the reference time. Non-positive remaining time yields an empty
/// string, matching the "no ETA" wire default.
pub fn format_eta<Tz: TimeZone>(remaining_secs: i32, now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if remaining_secs <= 0 {
        return String::new();
    }
    let arrival = now + Duration::seconds(remaining_secs as i64);
    let hours = remaining_secs / 3600;
    let mins = (remaining_secs % 3600) / 60;
    if hours > 0 {
        format!("ETA {} ({} h {} min)", arrival.format("%H:%M"), hours, mins)
    } else {
        format!("ETA {} ({} min)", arrival.format("%H:%M"), mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_minutes_only() {
        assert_eq!(format_eta(12 * 60, at(17, 30)), "ETA 17:42 (12 min)");
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(format_eta(3900, at(17, 30)), "ETA 18:35 (1 h 5 min)");
    }

    #[test]
    fn test_non_positive_is_empty() {
        assert_eq!(format_eta(0, at(12, 0)), "");
        assert_eq!(format_eta(-30, at(12, 0)), "");
    }
}
