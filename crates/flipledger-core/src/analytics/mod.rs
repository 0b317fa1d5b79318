//! Dashboard analytics over the current item and expense collections
//!
//! Ties the calendar bucketer, milestone detector, trip clusterer and chart
//! adapter together into one synchronous recomputation.

use chrono::NaiveDate;
use flipledger_types::{Expense, InventoryItem};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::calendar::{
    activity_scope, activity_series, expense_series, ActivityAggregate, Bucketer,
    ExpenseAggregate, Granularity, Series, YearScope,
};
use crate::chart::{activity_charts, ChartSeries};
use crate::config::AnalyticsConfig;
use crate::milestones::{find_todays_milestones, ActivityBook, MilestoneBoard, TodaysMilestones};
use crate::trips::{detect_trips, most_recent_trip, TripReport};


/// Granularity and year range of the dashboard series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub granularity: Granularity,
    pub scope: YearScope,
}

impl ReportPeriod {
    /// One calendar year
    pub fn year(granularity: Granularity, year: i32) -> Self {
        Self {
            granularity,
            scope: YearScope::Single(year),
        }
    }

    /// Every year with activity, through today
    pub fn all_years(granularity: Granularity, items: &[Arc<InventoryItem>], today: NaiveDate) -> Self {
        Self {
            granularity,
            scope: activity_scope(items, today),
        }
    }

    pub fn bucketer(&self, today: NaiveDate) -> Bucketer {
        Bucketer::new(self.granularity, self.scope, today)
    }
}

/// Totals over the dashboard period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub activity: ActivityAggregate,
    pub expenses: ExpenseAggregate,
    /// Sales minus purchase spend minus expenses
    pub net: f64,
}

impl PeriodTotals {
    fn from_series(activity: &Series<ActivityAggregate>, expenses: &Series<ExpenseAggregate>) -> Self {
        let mut totals = Self::default();
        for bucket in activity {
            totals.activity += bucket.value;
        }
        for bucket in expenses {
            totals.expenses += bucket.value;
        }
        totals.net = totals.activity.sales - totals.activity.spent - totals.expenses.amount;
        totals
    }
}

/// Everything the reporting views consume, computed in one pass
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub today: NaiveDate,
    pub period: ReportPeriod,
    pub activity: Series<ActivityAggregate>,
    pub expenses: Series<ExpenseAggregate>,
    pub totals: PeriodTotals,
    pub charts: Vec<ChartSeries>,
    pub expense_chart: ChartSeries,
    /// All-time record holders per granularity
    pub milestones: MilestoneBoard,
    pub todays_milestones: TodaysMilestones,
    /// Trip history, most recent first
    pub trips: Vec<TripReport>,
    /// Latest trip under the looser latest-trip gap
    pub latest_trip: Option<TripReport>,
}

impl DashboardData {
    /// Recompute every view from the current collections.
    ///
    /// Pure and synchronous: the same input always yields the same output.
    pub fn compute(
        items: &[Arc<InventoryItem>],
        expenses: &[Expense],
        config: &AnalyticsConfig,
        period: ReportPeriod,
        today: NaiveDate,
    ) -> Self {
        let bucketer = period.bucketer(today);
        let activity = activity_series(items, &bucketer);
        let expense_buckets = expense_series(expenses, &bucketer);
        let totals = PeriodTotals::from_series(&activity, &expense_buckets);

        let metrics = &config.milestones.metrics;
        let charts = activity_charts(&activity, metrics);
        let expense_chart = ChartSeries::expenses(&expense_buckets);

        let milestones = ActivityBook::all_time(items, today).milestones(metrics);
        let todays_milestones = find_todays_milestones(&milestones, today);

        let trips = detect_trips(items, &config.all_trip_options(), today)
            .iter()
            .map(|trip| TripReport::compute(trip, expenses, None))
            .collect();
        let latest_trip = most_recent_trip(items, &config.latest_trip_options(), today)
            .map(|trip| TripReport::compute(&trip, expenses, None));

        debug!(
            items = items.len(),
            expenses = expenses.len(),
            buckets = activity.len(),
            milestones = milestones.len(),
            "Dashboard recomputed"
        );

        Self {
            today,
            period,
            activity,
            expenses: expense_buckets,
            totals,
            charts,
            expense_chart,
            milestones,
            todays_milestones,
            trips,
            latest_trip,
        }
    }
}
