//! End-to-end: data directory -> store -> reports -> export
//!
//! Run with:
//! ```bash
//! cargo test --test store_integration
//! ```

use chrono::NaiveDate;
use flipledger_core::calendar::Granularity;
use flipledger_core::export::{export_series_to_csv, export_trips_to_json};
use flipledger_core::milestones::Metric;
use flipledger_core::trips::{LocationFilter, Payoff};
use flipledger_core::{DataEvent, DataStore, ReportPeriod};
use tempfile::TempDir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const ITEMS: &str = r#"[
    {"id": "lamp", "name": "Brass lamp", "purchaseDate": "2024-05-03", "purchasePrice": 8,
     "listingDate": "2024-05-04", "soldDate": "2024-05-20", "salePrice": 60, "profit": 52,
     "purchaseLocation": "Goodwill", "status": "sold"},
    {"id": "jacket", "name": "Denim jacket", "purchaseDate": "2024-05-04", "purchasePrice": 12,
     "listingDate": "2024-05-05", "soldDate": "2024-05-28", "salePrice": 45, "profit": 33,
     "purchaseLocation": "Savers", "status": "sold"},
    {"id": "vase", "name": "Cracked vase", "purchaseDate": "2024-05-04", "purchasePrice": 6,
     "wastedDate": "2024-05-10", "purchaseLocation": "Goodwill", "status": "waste"},
    {"id": "boots", "name": "Boots", "purchaseDate": "2024-05-04", "purchasePrice": 20,
     "listingDate": "2024-05-06", "profit": 25, "purchaseLocation": "Estate sale"},
    {"id": "old", "name": "Board game", "purchaseDate": "2024-04-01", "purchasePrice": 3,
     "purchaseLocation": "Goodwill"},
    {"id": "broken", "purchaseDate": "sometime", "purchasePrice": 4}
]"#;

const EXPENSES: &str = r#"[
    {"id": "gas", "date": "2024-05-03", "amount": 14, "category": "mileage"},
    {"id": "bags", "date": "2024-05-15", "amount": 9, "category": "supplies"}
]"#;

async fn loaded_store(today: NaiveDate) -> (TempDir, DataStore) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("items.json"), ITEMS).unwrap();
    std::fs::write(dir.path().join("expenses.json"), EXPENSES).unwrap();

    let store = DataStore::with_defaults(dir.path().to_path_buf());
    let report = store.initial_load(today).await;
    assert_eq!(report.items_loaded, 6);
    assert_eq!(report.records_with_bad_dates, 1);
    assert!(!report.has_fatal_errors());
    (dir, store)
}

#[tokio::test]
async fn latest_trip_report_end_to_end() {
    let today = ymd(2024, 6, 1);
    let (_dir, store) = loaded_store(today).await;

    let report = store.latest_trip_report(None, today).unwrap();

    assert_eq!((report.start, report.end), (ymd(2024, 5, 3), ymd(2024, 5, 4)));
    assert_eq!(report.item_count, 4);
    assert_eq!(report.items_cost, 46.0);
    assert_eq!(report.expenses, 14.0);
    assert_eq!(report.total_investment, 60.0);
    // lamp 60 + jacket 45 + vase -6
    assert_eq!(report.revenue_received, 99.0);
    assert_eq!(report.items_finalized, 3);
    assert_eq!(report.items_remaining, 1);
    assert_eq!(report.locations, vec!["Goodwill", "Estate sale", "Savers"]);
    // Profit: vase -6 on 5/10, lamp +52 on 5/20 (46), jacket +33 on 5/28 (79)
    assert_eq!(
        report.payoff,
        Payoff::Reached {
            date: ymd(2024, 5, 28),
            days: 25
        }
    );
    assert_eq!(report.roi_now, 65.0);

    let goodwill = LocationFilter::new(["Goodwill"]);
    let filtered = store.latest_trip_report(Some(&goodwill), today).unwrap();
    assert_eq!(filtered.total_investment, 14.0);
    assert_eq!(filtered.revenue_received, 54.0);
    assert_ne!(filtered.roi_now, report.roi_now);
}

#[tokio::test]
async fn trip_history_uses_strict_adjacency() {
    let today = ymd(2024, 6, 1);
    let (_dir, store) = loaded_store(today).await;

    let trips = store.trip_reports(today);
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].start, ymd(2024, 5, 3));
    assert_eq!(trips[1].start, ymd(2024, 4, 1));
    assert_eq!(trips[1].expenses, 0.0);
}

#[tokio::test]
async fn milestone_event_fires_on_record_day() {
    let today = ymd(2024, 5, 20);
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("items.json"), ITEMS).unwrap();
    std::fs::write(dir.path().join("expenses.json"), EXPENSES).unwrap();

    let store = DataStore::with_defaults(dir.path().to_path_buf());
    let mut rx = store.event_bus().subscribe();
    store.initial_load(today).await;

    let mut reached = None;
    while let Ok(event) = rx.try_recv() {
        if let DataEvent::MilestoneReached(todays) = event {
            reached = Some(todays);
        }
    }
    let todays = reached.expect("milestone event");
    assert_eq!(todays.date, today);
    assert!(todays.milestones[0].won(Metric::Sales));

    // Reloading identical data does not announce again
    let mut rx = store.event_bus().subscribe();
    store.initial_load(today).await;
    while let Ok(event) = rx.try_recv() {
        assert!(!matches!(event, DataEvent::MilestoneReached(_)));
    }
}

#[tokio::test]
async fn dashboard_exports() {
    let today = ymd(2024, 6, 1);
    let (dir, store) = loaded_store(today).await;

    let dashboard = store.dashboard(ReportPeriod::year(Granularity::Month, 2024), today);
    assert_eq!(dashboard.activity.len(), 6);
    assert_eq!(dashboard.activity.skipped_records, 1);
    assert_eq!(dashboard.totals.activity.sold, 2);
    assert_eq!(dashboard.totals.activity.sales, 105.0);
    assert_eq!(dashboard.totals.expenses.amount, 23.0);

    let csv = dir.path().join("out/activity.csv");
    export_series_to_csv(&dashboard.activity, &csv).unwrap();
    let contents = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(contents.lines().count(), 7);
    assert!(contents.contains("\"May\",2024-05,2024-05-01,2024-05-31,3,2,105.00,4,46.00"));

    let json = dir.path().join("out/trips.json");
    export_trips_to_json(&dashboard.trips, &json).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
}
