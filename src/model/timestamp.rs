use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("Not a valid date time: `{0}`")]
    Unrecognized(String),
}

/// Parses an exported timestamp cell.
///
/// Blank cells are missing values (`Ok(None)`), not errors. Values carrying
/// an offset keep it, so hour-of-day and weekday stay local to the author.
/// Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<Option<DateTime<FixedOffset>>, TimestampError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(datetime));
    }
    for format in OFFSET_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(raw, format) {
            return Ok(Some(datetime));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(from_naive_utc(naive)));
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(from_naive_utc(naive)));
    }
    Err(TimestampError::Unrecognized(raw.to_string()))
}

fn from_naive_utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset()
}
