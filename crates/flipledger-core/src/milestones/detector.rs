//! All-time best buckets per granularity and metric

use chrono::NaiveDate;
use flipledger_types::InventoryItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::metric::Metric;
use crate::calendar::{
    activity_scope, activity_series, ActivityAggregate, BucketKey, Bucketer, Granularity, Series,
    YearScope,
};

/// Relative tolerance for treating two float totals as tied
const TIE_EPSILON: f64 = 1e-9;

/// A bucket that holds the all-time best value for at least one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub granularity: Granularity,
    pub key: BucketKey,
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub aggregate: ActivityAggregate,
    /// Metrics this bucket is the record-holder for (never empty)
    pub competition: Vec<Metric>,
}

impl Milestone {
    pub fn won(&self, metric: Metric) -> bool {
        self.competition.contains(&metric)
    }

    pub fn value(&self, metric: Metric) -> f64 {
        metric.value(&self.aggregate)
    }
}

/// Milestones grouped by granularity, chronological within each
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneBoard {
    boards: BTreeMap<Granularity, Vec<Milestone>>,
}

impl MilestoneBoard {
    pub fn milestones(&self, granularity: Granularity) -> &[Milestone] {
        self.boards
            .get(&granularity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Record-holders for one metric; more than one when tied
    pub fn winners(
        &self,
        granularity: Granularity,
        metric: Metric,
    ) -> impl Iterator<Item = &Milestone> + '_ {
        self.milestones(granularity)
            .iter()
            .filter(move |m| m.won(metric))
    }

    /// Metric -> winners map for one granularity
    pub fn by_metric(&self, granularity: Granularity) -> BTreeMap<Metric, Vec<&Milestone>> {
        let mut map: BTreeMap<Metric, Vec<&Milestone>> = BTreeMap::new();
        for milestone in self.milestones(granularity) {
            for metric in &milestone.competition {
                map.entry(*metric).or_default().push(milestone);
            }
        }
        map
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> + '_ {
        self.boards.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.boards.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_tied(value: f64, best: f64) -> bool {
    (best - value).abs() <= TIE_EPSILON * best.abs().max(1.0)
}

/// Find the record-holding buckets of each series for every metric in `metrics`.
///
/// Ties keep every tied bucket. A metric whose best value is zero has no
/// winner. Output depends only on the input, so identical input always yields
/// an identical board.
pub fn detect_milestones<'a>(
    series: impl IntoIterator<Item = &'a Series<ActivityAggregate>>,
    metrics: &[Metric],
) -> MilestoneBoard {
    let mut board = MilestoneBoard::default();

    for series in series {
        let mut winners: BTreeMap<BucketKey, Milestone> = BTreeMap::new();

        for &metric in metrics {
            let best = series
                .iter()
                .map(|bucket| metric.value(&bucket.value))
                .fold(f64::NEG_INFINITY, f64::max);

            if best <= 0.0 {
                debug!(granularity = %series.granularity, metric = %metric, "No activity, no record-holder");
                continue;
            }

            for bucket in series
                .iter()
                .filter(|bucket| is_tied(metric.value(&bucket.value), best))
            {
                let milestone = winners.entry(bucket.key).or_insert_with(|| Milestone {
                    granularity: series.granularity,
                    key: bucket.key,
                    label: bucket.label.clone(),
                    start: bucket.start,
                    end: bucket.end,
                    aggregate: bucket.value,
                    competition: Vec::new(),
                });
                if !milestone.competition.contains(&metric) {
                    milestone.competition.push(metric);
                }
            }
        }

        board
            .boards
            .entry(series.granularity)
            .or_default()
            .extend(winners.into_values());
    }

    for milestones in board.boards.values_mut() {
        milestones.sort_by_key(|m| m.key);
    }

    board
}

/// All-time day, week and month activity, used for record tracking
#[derive(Debug, Clone)]
pub struct ActivityBook {
    pub scope: YearScope,
    pub day: Series<ActivityAggregate>,
    pub week: Series<ActivityAggregate>,
    pub month: Series<ActivityAggregate>,
}

impl ActivityBook {
    /// Every year from the earliest dated record through today
    pub fn all_time(items: &[Arc<InventoryItem>], today: NaiveDate) -> Self {
        Self::for_scope(items, activity_scope(items, today), today)
    }

    pub fn for_scope(items: &[Arc<InventoryItem>], scope: YearScope, today: NaiveDate) -> Self {
        let build = |granularity| activity_series(items, &Bucketer::expanded(granularity, scope, today));
        Self {
            scope,
            day: build(Granularity::Day),
            week: build(Granularity::Week),
            month: build(Granularity::Month),
        }
    }

    pub fn get(&self, granularity: Granularity) -> Option<&Series<ActivityAggregate>> {
        match granularity {
            Granularity::Day => Some(&self.day),
            Granularity::Week => Some(&self.week),
            Granularity::Month => Some(&self.month),
            Granularity::Year => None,
        }
    }

    pub fn series(&self) -> [&Series<ActivityAggregate>; 3] {
        [&self.day, &self.week, &self.month]
    }

    pub fn milestones(&self, metrics: &[Metric]) -> MilestoneBoard {
        detect_milestones(self.series(), metrics)
    }
}

/// Record-holding buckets dated today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaysMilestones {
    pub date: NaiveDate,
    pub milestones: Vec<Milestone>,
}

impl TodaysMilestones {
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Stable identity of this winner set, e.g. `2024-03-05|2024-03-05:sold,sales`.
    ///
    /// Equal inputs always give equal fingerprints.
    pub fn fingerprint(&self) -> String {
        let parts: Vec<String> = self
            .milestones
            .iter()
            .map(|m| {
                let metrics: Vec<&str> = m.competition.iter().map(Metric::name).collect();
                format!("{}:{}", m.key.id(), metrics.join(","))
            })
            .collect();
        format!("{}|{}", self.date.format("%Y-%m-%d"), parts.join(";"))
    }
}

/// Winners whose bucket key is today's date
pub fn find_todays_milestones(board: &MilestoneBoard, today: NaiveDate) -> TodaysMilestones {
    let key = BucketKey::Day { date: today };
    TodaysMilestones {
        date: today,
        milestones: board
            .milestones(Granularity::Day)
            .iter()
            .filter(|m| m.key == key)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sold(id: &str, bought: &str, sold_on: &str, price: f64, sale: f64) -> Arc<InventoryItem> {
        let mut item = InventoryItem::new(id, bought, price);
        item.listing_date = Some(bought.to_string());
        item.sold_date = Some(sold_on.to_string());
        item.sale_price = Some(sale);
        item.profit = Some(sale - price);
        item.status = flipledger_types::ItemStatus::Sold;
        Arc::new(item)
    }

    fn day_series(today: NaiveDate, items: &[Arc<InventoryItem>]) -> Series<ActivityAggregate> {
        activity_series(
            items,
            &Bucketer::new(Granularity::Day, YearScope::Single(2024), today),
        )
    }

    #[test]
    fn test_ties_keep_every_bucket() {
        let today = ymd(2024, 3, 31);
        let items = vec![
            sold("a", "2024-03-01", "2024-03-10", 10.0, 30.0),
            sold("b", "2024-03-02", "2024-03-12", 10.0, 30.0),
        ];
        let series = day_series(today, &items);

        let board = detect_milestones([&series], &[Metric::Sold, Metric::Sales]);
        let sold_days: Vec<BucketKey> = board
            .winners(Granularity::Day, Metric::Sold)
            .map(|m| m.key)
            .collect();

        assert_eq!(
            sold_days,
            vec![
                BucketKey::Day { date: ymd(2024, 3, 10) },
                BucketKey::Day { date: ymd(2024, 3, 12) },
            ]
        );
        for milestone in board.milestones(Granularity::Day) {
            assert!(!milestone.competition.is_empty());
        }
    }

    #[test]
    fn test_bucket_accumulates_competition() {
        let today = ymd(2024, 3, 31);
        let items = vec![
            sold("a", "2024-03-01", "2024-03-10", 10.0, 30.0),
            sold("b", "2024-03-01", "2024-03-10", 10.0, 25.0),
            sold("c", "2024-03-05", "2024-03-20", 10.0, 20.0),
        ];
        let series = day_series(today, &items);
        let board = detect_milestones([&series], &Metric::ALL);

        let best = board
            .milestones(Granularity::Day)
            .iter()
            .find(|m| m.key == BucketKey::Day { date: ymd(2024, 3, 10) })
            .unwrap();
        assert!(best.won(Metric::Sold));
        assert!(best.won(Metric::Sales));
        assert_eq!(best.value(Metric::Sales), 55.0);

        // Mar 1 wins pulled, spent and listed
        let pulled = board.by_metric(Granularity::Day);
        assert_eq!(pulled[&Metric::Pulled].len(), 1);
        assert_eq!(pulled[&Metric::Pulled][0].key, BucketKey::Day { date: ymd(2024, 3, 1) });
    }

    #[test]
    fn test_zero_activity_has_no_winner() {
        let series = day_series(ymd(2024, 1, 10), &[]);
        let board = detect_milestones([&series], &Metric::ALL);
        assert!(board.is_empty());
    }

    #[test]
    fn test_detection_is_idempotent() {
        let today = ymd(2024, 3, 31);
        let items = vec![
            sold("a", "2024-03-01", "2024-03-10", 10.0, 30.0),
            sold("b", "2024-03-02", "2024-03-12", 10.0, 30.0),
            sold("c", "2024-03-02", "2024-03-15", 12.0, 18.0),
        ];
        let book = ActivityBook::for_scope(&items, YearScope::Single(2024), today);

        let first = book.milestones(&Metric::ALL);
        let second = book.milestones(&Metric::ALL);
        assert_eq!(first, second);

        let again = ActivityBook::for_scope(&items, YearScope::Single(2024), today);
        assert_eq!(again.milestones(&Metric::ALL), first);
    }

    #[test]
    fn test_all_time_book_spans_years() {
        let today = ymd(2024, 2, 1);
        let items = vec![
            sold("a", "2023-12-30", "2024-01-02", 10.0, 30.0),
            sold("b", "2022-06-01", "2022-06-05", 10.0, 30.0),
        ];
        let book = ActivityBook::all_time(&items, today);

        assert_eq!(book.scope, YearScope::Span { first: 2022, last: 2024 });
        assert_eq!(book.day.granularity, Granularity::Day);
        // 365 + 365 + 32 days
        assert_eq!(book.day.len(), 762);

        let board = book.milestones(&[Metric::Sold]);
        let winners: Vec<_> = board.winners(Granularity::Day, Metric::Sold).collect();
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn test_todays_milestones() {
        let today = ymd(2024, 3, 12);
        let items = vec![
            sold("a", "2024-03-01", "2024-03-10", 10.0, 30.0),
            sold("b", "2024-03-02", "2024-03-12", 10.0, 40.0),
        ];
        let series = day_series(today, &items);
        let board = detect_milestones([&series], &Metric::ALL);

        let todays = find_todays_milestones(&board, today);
        assert_eq!(todays.milestones.len(), 1);
        assert!(todays.milestones[0].won(Metric::Sales));
        assert_eq!(todays.fingerprint(), "2024-03-12|2024-03-12:sold,sales");

        let yesterday = find_todays_milestones(&board, ymd(2024, 3, 11));
        assert!(yesterday.is_empty());
    }
}
