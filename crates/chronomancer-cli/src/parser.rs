use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses a user supplied date.
///
/// Accepts RFC 3339 timestamps, plain `YYYY-MM-DD` dates (midnight UTC) and
/// natural language such as "next friday", relative to `now`.
pub fn parse_date_relative_to(date_str: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    parse_date_string(date_str, now, Dialect::Us)
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

pub fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    parse_date_relative_to(date_str, Utc::now())
}

/// Parses an optional date argument.
pub fn parse_optional_date(date_str: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    date_str.map(parse_date).transpose()
}
