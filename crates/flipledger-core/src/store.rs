//! Data store with parking_lot::RwLock
//!
//! Holds the current item and expense collections as one `Arc` snapshot.
//! Every view is recomputed synchronously from a snapshot taken under a short
//! read lock, so readers never observe a partially computed result.

use chrono::NaiveDate;
use flipledger_types::{Expense, InventoryItem};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::analytics::{DashboardData, ReportPeriod};
use crate::calendar::Granularity;
use crate::config::AnalyticsConfig;
use crate::error::LoadReport;
use crate::event::{DataEvent, EventBus};
use crate::loader::{RecordLoader, RecordSet};
use crate::milestones::{
    find_todays_milestones, ActivityBook, MilestoneBoard, MilestoneNotifier, TodaysMilestones,
};
use crate::trips::{detect_trips, most_recent_trip, LocationFilter, Trip, TripReport};

/// Configuration for the data store
#[derive(Debug, Clone)]
pub struct DataStoreConfig {
    /// Record parser retry count
    pub load_retry_count: u32,
    /// Record parser retry delay
    pub load_retry_delay: Duration,
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            load_retry_count: 2,
            load_retry_delay: Duration::from_millis(100),
        }
    }
}

/// Central data store for flipledger
pub struct DataStore {
    /// Directory holding items.json and expenses.json
    data_dir: PathBuf,

    config: DataStoreConfig,

    analytics: RwLock<AnalyticsConfig>,

    /// Items and expenses, swapped together in one write
    records: RwLock<Arc<RecordSet>>,

    /// Suppresses repeat announcements of the same records
    notifier: MilestoneNotifier,

    event_bus: EventBus,
}

impl DataStore {
    pub fn new(data_dir: PathBuf, analytics: AnalyticsConfig, config: DataStoreConfig) -> Self {
        Self {
            data_dir,
            config,
            analytics: RwLock::new(analytics),
            records: RwLock::new(Arc::new(RecordSet::default())),
            notifier: MilestoneNotifier::new(),
            event_bus: EventBus::default_capacity(),
        }
    }

    pub fn with_defaults(data_dir: PathBuf) -> Self {
        Self::new(data_dir, AnalyticsConfig::default(), DataStoreConfig::default())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Load records from the data directory and replace the current collections
    pub async fn initial_load(&self, today: NaiveDate) -> LoadReport {
        info!(data_dir = %self.data_dir.display(), "Starting record load");

        let loader = RecordLoader::new()
            .with_retries(self.config.load_retry_count, self.config.load_retry_delay);
        let (records, report) = loader.load_dir(&self.data_dir).await;

        self.replace_records(records.items, records.expenses, today);
        self.event_bus.publish(DataEvent::LoadCompleted);

        info!(
            items = report.items_loaded,
            expenses = report.expenses_loaded,
            errors = report.errors.len(),
            "Initial load complete"
        );
        report
    }

    /// Swap in new collections, then announce today's records if they are new.
    ///
    /// Returns today's winners whether or not they were announced.
    pub fn replace_records(
        &self,
        items: Vec<Arc<InventoryItem>>,
        expenses: Vec<Expense>,
        today: NaiveDate,
    ) -> TodaysMilestones {
        let counts = (items.len(), expenses.len());
        let records = Arc::new(RecordSet { items, expenses });
        *self.records.write() = Arc::clone(&records);

        debug!(items = counts.0, expenses = counts.1, "Records replaced");
        self.event_bus.publish(DataEvent::RecordsReplaced {
            items: counts.0,
            expenses: counts.1,
        });

        let todays = find_todays_milestones(&self.milestones_of(&records, today), today);
        let bus = &self.event_bus;
        self.notifier.observe(&todays, |winners| {
            info!(fingerprint = %winners.fingerprint(), "New milestone today");
            bus.publish(DataEvent::MilestoneReached(winners.clone()));
        });
        todays
    }

    // ===================
    // Read accessors
    // ===================

    /// Current items and expenses as one consistent snapshot
    pub fn snapshot(&self) -> Arc<RecordSet> {
        Arc::clone(&self.records.read())
    }

    pub fn item_count(&self) -> usize {
        self.records.read().items.len()
    }

    pub fn analytics_config(&self) -> AnalyticsConfig {
        self.analytics.read().clone()
    }

    pub fn set_analytics_config(&self, config: AnalyticsConfig) {
        *self.analytics.write() = config;
        self.event_bus.publish(DataEvent::ConfigChanged);
    }

    // ===================
    // Computed views
    // ===================
    //
    // Each view reads one snapshot, so items and expenses always come from
    // the same replace_records call.

    pub fn dashboard(&self, period: ReportPeriod, today: NaiveDate) -> DashboardData {
        let records = self.snapshot();
        let config = self.analytics_config();
        DashboardData::compute(&records.items, &records.expenses, &config, period, today)
    }

    /// Dashboard over every year with activity
    pub fn dashboard_all_years(&self, granularity: Granularity, today: NaiveDate) -> DashboardData {
        let records = self.snapshot();
        let config = self.analytics_config();
        let period = ReportPeriod::all_years(granularity, &records.items, today);
        DashboardData::compute(&records.items, &records.expenses, &config, period, today)
    }

    pub fn milestones(&self, today: NaiveDate) -> MilestoneBoard {
        self.milestones_of(&self.snapshot(), today)
    }

    fn milestones_of(&self, records: &RecordSet, today: NaiveDate) -> MilestoneBoard {
        let config = self.analytics_config();
        ActivityBook::all_time(&records.items, today).milestones(&config.milestones.metrics)
    }

    pub fn todays_milestones(&self, today: NaiveDate) -> TodaysMilestones {
        find_todays_milestones(&self.milestones(today), today)
    }

    /// Trip history, most recent first
    pub fn trips(&self, today: NaiveDate) -> Vec<Trip> {
        detect_trips(&self.snapshot().items, &self.analytics_config().all_trip_options(), today)
    }

    pub fn trip_reports(&self, today: NaiveDate) -> Vec<TripReport> {
        let records = self.snapshot();
        let options = self.analytics_config().all_trip_options();
        detect_trips(&records.items, &options, today)
            .iter()
            .map(|trip| TripReport::compute(trip, &records.expenses, None))
            .collect()
    }

    /// Report for one trip of the history (0 = most recent)
    pub fn trip_report_at(
        &self,
        index: usize,
        filter: Option<&LocationFilter>,
        today: NaiveDate,
    ) -> Option<TripReport> {
        let records = self.snapshot();
        let options = self.analytics_config().all_trip_options();
        detect_trips(&records.items, &options, today)
            .get(index)
            .map(|trip| TripReport::compute(trip, &records.expenses, filter))
    }

    /// Report for the latest trip, optionally restricted to some locations
    pub fn latest_trip_report(
        &self,
        filter: Option<&LocationFilter>,
        today: NaiveDate,
    ) -> Option<TripReport> {
        let records = self.snapshot();
        let options = self.analytics_config().latest_trip_options();
        most_recent_trip(&records.items, &options, today)
            .map(|trip| TripReport::compute(&trip, &records.expenses, filter))
    }
}
