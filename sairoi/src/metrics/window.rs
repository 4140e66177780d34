//! Reporting windows: day-count parsing and the lower bound they imply.

use chrono::{DateTime, Duration, Utc};

/// Interpret a `days` query value, clamping into `1..=max`.
///
/// Absent or non-numeric input falls back to `default`; out-of-range input is clamped rather
/// than rejected.
pub fn clamp_days(raw: Option<&str>, default: i64, max: i64) -> i64 {
    let days = raw.and_then(|value| value.trim().parse::<i64>().ok()).unwrap_or(default);
    days.clamp(1, max.max(1))
}

/// Start of the window: `days` before `now`, truncated to 00:00 UTC.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let start = now - Duration::days(days);
    start
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(None, 7, 90), 7);
        assert_eq!(clamp_days(Some("30"), 7, 90), 30);
        assert_eq!(clamp_days(Some("0"), 7, 90), 1);
        assert_eq!(clamp_days(Some("-5"), 7, 90), 1);
        assert_eq!(clamp_days(Some("400"), 7, 90), 90);
        assert_eq!(clamp_days(Some("400"), 7, 365), 365);
        assert_eq!(clamp_days(Some("abc"), 7, 90), 7);
        assert_eq!(clamp_days(Some(""), 7, 90), 7);
        assert_eq!(clamp_days(Some(" 14 "), 7, 90), 14);
    }

    #[test]
    fn test_window_start_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 42, 7).unwrap();
        assert_eq!(window_start(now, 7), Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap());
        assert_eq!(window_start(now, 1), Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_start_crosses_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap();
        assert_eq!(window_start(now, 7), Utc.with_ymd_and_hms(2026, 2, 23, 0, 0, 0).unwrap());
    }
}
