//! flipledger-core - Core library for flipledger
//!
//! Calendar bucketing, milestone detection, trip clustering and payoff
//! projection over reseller inventory records, plus loading, configuration,
//! export and an in-memory store.

pub mod analytics;
pub mod calendar;
pub mod chart;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod loader;
pub mod milestones;
pub mod store;
pub mod trips;

pub use analytics::{DashboardData, PeriodTotals, ReportPeriod};
pub use calendar::{ActivityAggregate, Bucketer, Granularity, Series, YearScope};
pub use chart::{ChartPoint, ChartSeries};
pub use config::AnalyticsConfig;
pub use error::{CoreError, LoadReport};
pub use event::{DataEvent, EventBus};
pub use export::{
    export_series_to_csv, export_series_to_json, export_trips_to_csv, export_trips_to_json,
};
pub use loader::{RecordLoader, RecordSet};
pub use milestones::{Metric, MilestoneBoard, MilestoneNotifier, TodaysMilestones};
pub use store::DataStore;
pub use trips::{LocationFilter, Payoff, Trip, TripOptions, TripReport};
