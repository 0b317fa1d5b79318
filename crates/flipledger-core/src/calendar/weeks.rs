//! Sunday-anchored week numbering
//!
//! Week 1 runs from January 1 through the first Saturday, so it is a partial
//! week unless the year starts on a Sunday. Every later week is a full
//! Sunday-to-Saturday span, except the last one which stops at December 31.
//! All week math in the crate goes through this module.

use chrono::{Datelike, Duration, NaiveDate};

/// Week number (1-based) of `date` within its own year
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use flipledger_core::calendar::week_of_year;
///
/// // 2023-01-01 is a Sunday: the first week is complete
/// assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2023, 1, 7).unwrap()), 1);
/// assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2023, 1, 8).unwrap()), 2);
///
/// // 2022-01-01 is a Saturday: week 1 is a single day
/// assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()), 1);
/// assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 2).unwrap()), 2);
/// ```
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + jan1_offset(date)) / 7 + 1
}

/// Number of Sunday-anchored weeks in `year` (53 or 54 with partial weeks)
pub fn weeks_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(0, week_of_year)
}

/// First and last day of week `week` in `year`, clipped to the year
///
/// Returns `None` for week 0 or a week past the end of the year.
pub fn week_bounds(year: i32, week: u32) -> Option<(NaiveDate, NaiveDate)> {
    if week == 0 || week > weeks_in_year(year) {
        return None;
    }

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31)?;
    let offset = i64::from(jan1_offset(jan1));
    let week = i64::from(week);

    let start = if week == 1 {
        jan1
    } else {
        jan1 + Duration::days(7 * (week - 1) - offset)
    };
    let end = (jan1 + Duration::days(7 * week - offset - 1)).min(dec31);

    Some((start, end))
}

/// Display label for a week, e.g. `Jan 1-7`, `8-14`, `29-Feb 4`.
///
/// The start day carries a month abbreviation only when its month differs
/// from the end of the previous week (or there is no previous week); the end
/// day carries one only when the week crosses into a new month.
pub fn week_label(start: NaiveDate, end: NaiveDate, previous_end: Option<NaiveDate>) -> String {
    let start_part = match previous_end {
        Some(prev) if prev.month() == start.month() => start.day().to_string(),
        _ => format!("{} {}", month_abbrev(start.month()), start.day()),
    };

    if start == end {
        return start_part;
    }

    let end_part = if end.month() == start.month() {
        end.day().to_string()
    } else {
        format!("{} {}", month_abbrev(end.month()), end.day())
    };

    format!("{}-{}", start_part, end_part)
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    (month as usize)
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx))
        .copied()
        .unwrap_or("Unknown")
}

/// Three-letter month abbreviation for a 1-based month number
pub fn month_abbrev(month: u32) -> &'static str {
    let name = month_name(month);
    &name[..3.min(name.len())]
}

/// Weekday index of January 1 of `date`'s year (0 = Sunday)
fn jan1_offset(date: NaiveDate) -> u32 {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    let ordinal0 = i64::from(date.ordinal0());
    (weekday - ordinal0).rem_euclid(7) as u32
}
