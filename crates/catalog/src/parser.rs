//! Parsers for the value encodings the platform uses.
//!
//! - durations: ISO-8601 `PnDTnHnMnS` (`PT1H2M3S`, `PT45S`, `P0D`)
//! - timestamps: RFC 3339 (`2024-03-01T17:00:04Z`), sub-second precision kept

use crate::error::{CatalogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Designators in the order they must appear on each side of the `T`
const DATE_UNITS: &str = "YMWD";
const TIME_UNITS: &str = "HMS";

/// Parse an ISO-8601 duration into fractional minutes.
///
/// Only the units the platform emits are accepted: weeks and days before the
/// `T`, hours, minutes and (possibly fractional) seconds after it. Calendar
/// units (years, months) have no fixed length and are rejected.
pub fn parse_duration_minutes(value: &str) -> Result<f64> {
    let invalid = |reason: &str| CatalogError::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let body = value
        .strip_prefix('P')
        .ok_or_else(|| invalid("missing leading 'P'"))?;
    if body.is_empty() {
        return Err(invalid("no components"));
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return Err(invalid("empty time section"));
            }
            (date, Some(time))
        }
        None => (body, None),
    };

    let mut seconds = 0.0;
    for (amount, unit) in components(date_part, DATE_UNITS).map_err(|reason| invalid(reason))? {
        seconds += match unit {
            'W' => amount * 7.0 * 86_400.0,
            'D' => amount * 86_400.0,
            'Y' | 'M' => return Err(invalid("calendar units are not supported")),
            _ => return Err(invalid("unknown date unit")),
        };
    }
    if let Some(time_part) = time_part {
        for (amount, unit) in components(time_part, TIME_UNITS).map_err(|reason| invalid(reason))? {
            seconds += match unit {
                'H' => amount * 3_600.0,
                'M' => amount * 60.0,
                'S' => amount,
                _ => return Err(invalid("unknown time unit")),
            };
        }
    }

    Ok(seconds / SECONDS_PER_MINUTE)
}

/// Split `1H2M3.5S` into `[(1.0, 'H'), (2.0, 'M'), (3.5, 'S')]`.
///
/// Each designator listed in `order` may appear at most once, in that order.
fn components(section: &str, order: &str) -> std::result::Result<Vec<(f64, char)>, &'static str> {
    let mut parsed = Vec::new();
    let mut number = String::new();
    let mut last_position: Option<usize> = None;

    for ch in section.chars() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            number.push(if ch == ',' { '.' } else { ch });
            continue;
        }
        if number.is_empty() {
            return Err("unit without a number");
        }
        let amount = number.parse::<f64>().map_err(|_| "malformed number")?;
        if let Some(position) = order.find(ch) {
            if last_position.is_some_and(|last| position <= last) {
                return Err("unit repeated or out of order");
            }
            last_position = Some(position);
        }
        parsed.push((amount, ch));
        number.clear();
    }

    if !number.is_empty() {
        return Err("number without a unit");
    }
    Ok(parsed)
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Render a timestamp the way the platform does (`Z` suffix, minimal fraction)
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_duration_full() {
        let minutes = parse_duration_minutes("PT1H2M30S").unwrap();
        assert!((minutes - 62.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_seconds_only() {
        let minutes = parse_duration_minutes("PT45S").unwrap();
        assert!((minutes - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_days_and_zero() {
        assert!((parse_duration_minutes("P1DT1M").unwrap() - 1441.0).abs() < 1e-9);
        assert_eq!(parse_duration_minutes("P0D").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_duration_fractional_seconds() {
        let minutes = parse_duration_minutes("PT30M6S").unwrap();
        assert!((minutes - 30.1).abs() < 1e-9);
        let minutes = parse_duration_minutes("PT1.5S").unwrap();
        assert!((minutes - 0.025).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_rejects_malformed() {
        for bad in [
            "", "1H", "P", "PT", "PTH", "PT5", "P1Y", "PT1X", "PT1M1M", "PT5S1H", "PT1H2H",
            "P1D1W", "P1D2D",
        ] {
            assert!(
                parse_duration_minutes(bad).is_err(),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_timestamp_keeps_subseconds() {
        let ts = parse_timestamp("2024-03-01T17:00:04.250Z").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 4).unwrap() + chrono::Duration::milliseconds(250));
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let ts = parse_timestamp("2024-03-01T12:00:00-05:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_format_timestamp_round_trips() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 4).unwrap();
        let text = format_timestamp(ts);
        assert_eq!(text, "2024-03-01T17:00:04Z");
        assert_eq!(parse_timestamp(&text).unwrap(), ts);
    }
}
