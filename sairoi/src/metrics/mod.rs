//! ROI metrics over a scoped, windowed set of events.
//!
//! Everything here is pure: callers fetch the events, the user count and the hourly rate, and
//! [`roi::summarize`] reduces them. Time saved is always credited at the low end of the
//! recorded bucket (see [`conservative_minutes`]) so the reported value never overstates.

pub mod roi;
pub mod window;

use crate::api::models::WireCode;
use crate::api::models::events::TimeSavedBucket;

/// Minutes credited for a stored bucket code; 0 for a code that is not a current bucket.
pub fn conservative_minutes(code: &str) -> u64 {
    TimeSavedBucket::from_code(code).map_or(0, TimeSavedBucket::conservative_minutes)
}

/// Round to `places` decimals with halves going away from zero.
///
/// `format!` alone rounds exact ties to even, so displayed figures pass through this first.
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Display form of a minute total in hours: one decimal below 10 hours, whole hours above.
pub fn format_hours(minutes: u64) -> String {
    let hours = minutes as f64 / 60.0;
    if hours < 10.0 {
        format!("{:.1}", round_half_up(hours, 1))
    } else {
        format!("{:.0}", hours.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservative_minutes_table() {
        assert_eq!(conservative_minutes("M1_2"), 1);
        assert_eq!(conservative_minutes("M3_5"), 3);
        assert_eq!(conservative_minutes("M6_10"), 6);
        assert_eq!(conservative_minutes("M11_20"), 11);
        assert_eq!(conservative_minutes("M20_PLUS"), 20);
    }

    #[test]
    fn test_unknown_bucket_counts_zero() {
        assert_eq!(conservative_minutes("M2_4"), 0);
        assert_eq!(conservative_minutes(""), 0);
        assert_eq!(conservative_minutes("m1_2"), 0);
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(300), "5.0");
        assert_eq!(format_hours(900), "15");
        assert_eq!(format_hours(0), "0.0");
        assert_eq!(format_hours(599), "10.0");
        assert_eq!(format_hours(600), "10");
        assert_eq!(format_hours(633), "11");
        assert_eq!(format_hours(50), "0.8");
    }

    #[test]
    fn test_format_hours_rounds_halves_up() {
        assert_eq!(format_hours(15), "0.3");
        assert_eq!(format_hours(135), "2.3");
        assert_eq!(format_hours(315), "5.3");
        assert_eq!(format_hours(570), "9.5");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(0.125, 2), 0.13);
        assert_eq!(round_half_up(2.25, 1), 2.3);
        assert_eq!(round_half_up(7.0, 2), 7.0);
    }
}
