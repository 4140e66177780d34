//! Database models for key/value settings.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Key of the blended hourly rate, in GBP per hour.
pub const BLENDED_HOURLY_RATE_KEY: &str = "BLENDED_HOURLY_RATE_GBP";

/// Rate used when the setting is absent or not a finite number.
pub const FALLBACK_HOURLY_RATE: f64 = 20.0;

#[derive(Debug, Clone, FromRow)]
pub struct SettingDBResponse {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Parse a stored rate, falling back when it is missing or non-finite.
pub fn parse_rate(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .unwrap_or(FALLBACK_HOURLY_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate(Some("32.5")), 32.5);
        assert_eq!(parse_rate(Some(" 18 ")), 18.0);
        assert_eq!(parse_rate(None), FALLBACK_HOURLY_RATE);
        assert_eq!(parse_rate(Some("twenty")), FALLBACK_HOURLY_RATE);
        assert_eq!(parse_rate(Some("NaN")), FALLBACK_HOURLY_RATE);
        assert_eq!(parse_rate(Some("inf")), FALLBACK_HOURLY_RATE);
    }
}
