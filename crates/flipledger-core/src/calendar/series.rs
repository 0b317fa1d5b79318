//! Ordered, gap-filled bucket series

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::weeks::week_of_year;

/// Bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Granularities tracked for milestones
    pub const TRACKED: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn name(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            "year" | "yearly" => Ok(Granularity::Year),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}

/// Identity of one bucket.
///
/// The derived ordering is chronological within a single granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BucketKey {
    Day { date: NaiveDate },
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl BucketKey {
    /// Key of the bucket holding `date` at `granularity`
    pub fn for_date(granularity: Granularity, date: NaiveDate) -> Self {
        match granularity {
            Granularity::Day => BucketKey::Day { date },
            Granularity::Week => BucketKey::Week {
                year: date.year(),
                week: week_of_year(date),
            },
            Granularity::Month => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Granularity::Year => BucketKey::Year { year: date.year() },
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            BucketKey::Day { .. } => Granularity::Day,
            BucketKey::Week { .. } => Granularity::Week,
            BucketKey::Month { .. } => Granularity::Month,
            BucketKey::Year { .. } => Granularity::Year,
        }
    }

    /// Stable machine-readable form, e.g. `2024-03-05`, `2024-W09`, `2024-03`, `2024`
    pub fn id(&self) -> String {
        match self {
            BucketKey::Day { date } => date.format("%Y-%m-%d").to_string(),
            BucketKey::Week { year, week } => format!("{}-W{:02}", year, week),
            BucketKey::Month { year, month } => format!("{}-{:02}", year, month),
            BucketKey::Year { year } => year.to_string(),
        }
    }
}

/// One time period with its aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<A> {
    pub key: BucketKey,
    /// Display label (`2024-03-05`, `Jan 1-6`, `March`, `2024`)
    pub label: String,
    /// First day covered
    pub start: NaiveDate,
    /// Last day covered
    pub end: NaiveDate,
    pub value: A,
}

impl<A> Bucket<A> {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Chronologically ordered buckets covering a whole range without gaps
#[derive(Debug, Clone, Serialize)]
pub struct Series<A> {
    /// Effective granularity (day/week collapse to year in multi-year mode)
    pub granularity: Granularity,
    pub buckets: Vec<Bucket<A>>,
    /// Records excluded because a date failed to parse
    pub skipped_records: usize,
    #[serde(skip)]
    index: HashMap<BucketKey, usize>,
}

impl<A> Series<A> {
    pub(crate) fn from_buckets(granularity: Granularity, buckets: Vec<Bucket<A>>) -> Self {
        let index = buckets
            .iter()
            .enumerate()
            .map(|(idx, bucket)| (bucket.key, idx))
            .collect();

        Self {
            granularity,
            buckets,
            skipped_records: 0,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket<A>> {
        self.buckets.iter()
    }

    pub fn get(&self, key: &BucketKey) -> Option<&Bucket<A>> {
        self.index.get(key).map(|&idx| &self.buckets[idx])
    }

    pub(crate) fn get_mut(&mut self, key: &BucketKey) -> Option<&mut Bucket<A>> {
        match self.index.get(key) {
            Some(&idx) => self.buckets.get_mut(idx),
            None => None,
        }
    }

    /// Bucket covering `date`, if the series reaches that far
    pub fn bucket_containing(&self, date: NaiveDate) -> Option<&Bucket<A>> {
        self.get(&BucketKey::for_date(self.granularity, date))
            .filter(|bucket| bucket.contains(date))
    }

    /// Extract one number per bucket, in order
    pub fn values(&self, f: impl Fn(&A) -> f64) -> Vec<f64> {
        self.buckets.iter().map(|b| f(&b.value)).collect()
    }

    pub fn total(&self, f: impl Fn(&A) -> f64) -> f64 {
        self.buckets.iter().map(|b| f(&b.value)).sum()
    }

    /// Mean per bucket over the whole gap-filled range.
    ///
    /// Empty periods count toward the denominator. An empty series averages
    /// to `0.0`.
    pub fn average(&self, f: impl Fn(&A) -> f64) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.total(f) / self.buckets.len() as f64
    }
}

impl<'a, A> IntoIterator for &'a Series<A> {
    type Item = &'a Bucket<A>;
    type IntoIter = std::slice::Iter<'a, Bucket<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bucket(date: NaiveDate, value: f64) -> Bucket<f64> {
        Bucket {
            key: BucketKey::Day { date },
            label: date.to_string(),
            start: date,
            end: date,
            value,
        }
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("Monthly".parse::<Granularity>().unwrap(), Granularity::Month);
        assert!("fortnight".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_key_for_date() {
        let date = ymd(2024, 1, 7);
        assert_eq!(
            BucketKey::for_date(Granularity::Week, date),
            BucketKey::Week { year: 2024, week: 2 }
        );
        assert_eq!(
            BucketKey::for_date(Granularity::Month, date),
            BucketKey::Month { year: 2024, month: 1 }
        );
        assert_eq!(
            BucketKey::for_date(Granularity::Year, date),
            BucketKey::Year { year: 2024 }
        );
    }

    #[test]
    fn test_key_ids() {
        assert_eq!(BucketKey::Day { date: ymd(2024, 3, 5) }.id(), "2024-03-05");
        assert_eq!(BucketKey::Week { year: 2024, week: 9 }.id(), "2024-W09");
        assert_eq!(BucketKey::Month { year: 2024, month: 11 }.id(), "2024-11");
        assert_eq!(BucketKey::Year { year: 2024 }.id(), "2024");
    }

    #[test]
    fn test_key_ordering_is_chronological() {
        let mut keys = vec![
            BucketKey::Week { year: 2024, week: 3 },
            BucketKey::Week { year: 2023, week: 52 },
            BucketKey::Week { year: 2024, week: 1 },
        ];
        keys.sort();
        assert_eq!(keys[0], BucketKey::Week { year: 2023, week: 52 });
        assert_eq!(keys[2], BucketKey::Week { year: 2024, week: 3 });
    }

    #[test]
    fn test_average_of_zero_series_is_zero() {
        let series = Series::from_buckets(
            Granularity::Day,
            vec![bucket(ymd(2024, 1, 1), 0.0), bucket(ymd(2024, 1, 2), 0.0)],
        );
        let avg = series.average(|v| *v);
        assert_eq!(avg, 0.0);
        assert!(!avg.is_nan());
    }

    #[test]
    fn test_average_of_empty_series_is_zero() {
        let series: Series<f64> = Series::from_buckets(Granularity::Day, Vec::new());
        assert_eq!(series.average(|v| *v), 0.0);
    }

    #[test]
    fn test_average_counts_empty_buckets() {
        let series = Series::from_buckets(
            Granularity::Day,
            vec![
                bucket(ymd(2024, 1, 1), 9.0),
                bucket(ymd(2024, 1, 2), 0.0),
                bucket(ymd(2024, 1, 3), 0.0),
            ],
        );
        assert_eq!(series.average(|v| *v), 3.0);
        assert_eq!(series.total(|v| *v), 9.0);
    }

    #[test]
    fn test_lookup_by_key_and_date() {
        let series = Series::from_buckets(
            Granularity::Day,
            vec![bucket(ymd(2024, 1, 1), 1.0), bucket(ymd(2024, 1, 2), 2.0)],
        );
        let b = series.bucket_containing(ymd(2024, 1, 2)).unwrap();
        assert_eq!(b.value, 2.0);
        assert!(series.bucket_containing(ymd(2024, 1, 3)).is_none());
    }
}
