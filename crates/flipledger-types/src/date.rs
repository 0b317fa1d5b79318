//! Record date parsing
//!
//! The inventory application stores dates as strings and has changed format
//! over time, so records are parsed on use rather than at load.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// A record date string that matches none of the accepted formats
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable date: {value:?}")]
pub struct DateParseError {
    pub value: String,
}

/// Parse a record date into a calendar day.
///
/// Accepted forms:
/// - `2024-03-05` (plain date)
/// - `2024-03-05T14:30:00Z` / `2024-03-05T14:30:00-05:00` (RFC 3339, converted to the local day)
/// - `2024-03-05T14:30:00` (naive timestamp, taken as local)
/// - `03/05/2024` (US form used by older spreadsheet imports)
///
/// # Examples
/// ```
/// use flipledger_types::parse_record_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(
///     parse_record_date("2024-03-05").unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
/// );
/// assert!(parse_record_date("soon").is_err());
/// ```
pub fn parse_record_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let value = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Local).date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%m/%d/%Y") {
        return Ok(date);
    }

    Err(DateParseError {
        value: raw.to_string(),
    })
}
