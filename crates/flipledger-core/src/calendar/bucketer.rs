//! Calendar bucketer: gap-filled frames and dated passes over records

use chrono::{Datelike, Months, NaiveDate};
use flipledger_types::parse_record_date;
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, RangeInclusive};
use tracing::{debug, warn};

use super::group::group_by_key;
use super::series::{Bucket, BucketKey, Granularity, Series};
use super::weeks::{month_abbrev, month_name, week_bounds, week_label, week_of_year, weeks_in_year};
use crate::error::CoreError;

/// Which years a series covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearScope {
    /// One calendar year
    Single(i32),
    /// Every year from `first` through `last`, inclusive
    Span { first: i32, last: i32 },
}

impl YearScope {
    /// Span between two years in either order
    pub fn span(a: i32, b: i32) -> Self {
        YearScope::Span {
            first: a.min(b),
            last: a.max(b),
        }
    }

    /// Span from the earliest of `dates` through today's year (or the latest
    /// date if it is later). With no dates, the span is just today's year.
    pub fn spanning(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> Self {
        let (first, last) = dates
            .into_iter()
            .fold((today.year(), today.year()), |(lo, hi), d| {
                (lo.min(d.year()), hi.max(d.year()))
            });
        YearScope::Span { first, last }
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        match *self {
            YearScope::Single(year) => year..=year,
            YearScope::Span { first, last } => first..=last,
        }
    }

    pub fn is_multi_year(&self) -> bool {
        matches!(self, YearScope::Span { .. })
    }
}

/// Outcome of one dated pass over a record collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Records folded into a bucket
    pub bucketed: usize,
    /// Records whose date failed to parse
    pub malformed: usize,
    /// Records dated outside the frame (other years, or after today)
    pub outside_range: usize,
}

/// Buckets records by one of their dates into a complete, gap-filled series.
///
/// Ranges per year: every period of a past (or future) year, and periods up
/// to and including today for the current year. In multi-year mode, day and
/// week granularity collapse into one bucket per year unless the bucketer is
/// built with [`Bucketer::expanded`].
#[derive(Debug, Clone, Copy)]
pub struct Bucketer {
    granularity: Granularity,
    scope: YearScope,
    today: NaiveDate,
    collapse: bool,
}

impl Bucketer {
    pub fn new(granularity: Granularity, scope: YearScope, today: NaiveDate) -> Self {
        Self {
            granularity,
            scope,
            today,
            collapse: true,
        }
    }

    /// Multi-year bucketer that keeps day/week buckets instead of collapsing
    /// them into years (all-time record tracking)
    pub fn expanded(granularity: Granularity, scope: YearScope, today: NaiveDate) -> Self {
        Self {
            collapse: false,
            ..Self::new(granularity, scope, today)
        }
    }

    pub fn scope(&self) -> YearScope {
        self.scope
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Granularity actually produced
    pub fn effective_granularity(&self) -> Granularity {
        match self.granularity {
            Granularity::Day | Granularity::Week if self.collapse && self.scope.is_multi_year() => {
                Granularity::Year
            }
            g => g,
        }
    }

    /// Zero-valued series with every bucket of the range
    pub fn frame<A: Default>(&self) -> Series<A> {
        let granularity = self.effective_granularity();
        let mut buckets = Vec::new();

        for year in self.scope.years() {
            let (Some(jan1), Some(dec31)) = (
                NaiveDate::from_ymd_opt(year, 1, 1),
                NaiveDate::from_ymd_opt(year, 12, 31),
            ) else {
                warn!(year, "Year outside supported calendar range, skipping");
                continue;
            };
            let is_current = year == self.today.year();

            match granularity {
                Granularity::Day => {
                    let last = if is_current { self.today } else { dec31 };
                    buckets.extend(jan1.iter_days().take_while(|d| *d <= last).map(|date| {
                        Bucket {
                            key: BucketKey::Day { date },
                            label: date.format("%Y-%m-%d").to_string(),
                            start: date,
                            end: date,
                            value: A::default(),
                        }
                    }));
                }
                Granularity::Week => {
                    let last = if is_current {
                        week_of_year(self.today)
                    } else {
                        weeks_in_year(year)
                    };
                    let mut previous_end = None;
                    for week in 1..=last {
                        let Some((start, end)) = week_bounds(year, week) else {
                            continue;
                        };
                        buckets.push(Bucket {
                            key: BucketKey::Week { year, week },
                            label: week_label(start, end, previous_end),
                            start,
                            end,
                            value: A::default(),
                        });
                        previous_end = Some(end);
                    }
                }
                Granularity::Month => {
                    let last = if is_current { self.today.month() } else { 12 };
                    for month in 1..=last {
                        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
                            continue;
                        };
                        let end = start
                            .checked_add_months(Months::new(1))
                            .and_then(|next| next.pred_opt())
                            .unwrap_or(dec31);
                        let label = if self.scope.is_multi_year() {
                            format!("{} {}", month_abbrev(month), year)
                        } else {
                            month_name(month).to_string()
                        };
                        buckets.push(Bucket {
                            key: BucketKey::Month { year, month },
                            label,
                            start,
                            end,
                            value: A::default(),
                        });
                    }
                }
                Granularity::Year => buckets.push(Bucket {
                    key: BucketKey::Year { year },
                    label: year.to_string(),
                    start: jan1,
                    end: dec31,
                    value: A::default(),
                }),
            }
        }

        Series::from_buckets(granularity, buckets)
    }

    /// Fold `records` into `series` by the date `select` picks out.
    ///
    /// `select` returning `None` means the record has no such date and is
    /// ignored silently. A date that fails to parse excludes the record from
    /// this pass only; it is logged and counted, never fatal.
    pub fn pass<R, A, S, F>(
        &self,
        series: &mut Series<A>,
        records: &[R],
        field: &str,
        select: S,
        mut fold: F,
    ) -> PassOutcome
    where
        A: Default + AddAssign,
        S: Fn(&R) -> Option<&str>,
        F: FnMut(&mut A, &R),
    {
        let granularity = series.granularity;
        let mut outcome = PassOutcome::default();

        let grouped = group_by_key(
            records,
            |record| {
                let raw = select(record)?;
                match parse_record_date(raw) {
                    Ok(date) => Some(BucketKey::for_date(granularity, date)),
                    Err(e) => {
                        let error = CoreError::MalformedDate {
                            field: field.to_string(),
                            value: e.value,
                        };
                        warn!(error = %error, "Record skipped for this bucketing pass");
                        outcome.malformed += 1;
                        None
                    }
                }
            },
            |(acc, count): &mut (A, usize), record| {
                *count += 1;
                fold(acc, record);
            },
        );

        for (key, (acc, count)) in grouped {
            match series.get_mut(&key) {
                Some(bucket) => {
                    bucket.value += acc;
                    outcome.bucketed += count;
                }
                None => outcome.outside_range += count,
            }
        }

        if outcome.outside_range > 0 {
            debug!(
                field,
                records = outcome.outside_range,
                "Records dated outside the requested range"
            );
        }

        series.skipped_records += outcome.malformed;
        outcome
    }

    /// Frame plus a single pass
    pub fn bucket<R, A, S, F>(&self, records: &[R], field: &str, select: S, fold: F) -> Series<A>
    where
        A: Default + AddAssign,
        S: Fn(&R) -> Option<&str>,
        F: FnMut(&mut A, &R),
    {
        let mut series = self.frame();
        self.pass(&mut series, records, field, select, fold);
        series
    }
}
