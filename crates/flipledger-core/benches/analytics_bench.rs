//! Performance benchmarks for bucketing, milestones and trips
//!
//! Targets:
//! - activity_series(5000 items, day granularity, one year) → <20ms
//! - ActivityBook::all_time(5000 items) + milestones → <100ms
//! - detect_trips(5000 items) → <10ms

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flipledger_core::analytics::{DashboardData, ReportPeriod};
use flipledger_core::calendar::{activity_series, Bucketer, Granularity, YearScope};
use flipledger_core::milestones::{ActivityBook, Metric};
use flipledger_core::trips::{detect_trips, TripOptions};
use flipledger_core::AnalyticsConfig;
use flipledger_types::{InventoryItem, ItemStatus};
use std::sync::Arc;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
}

/// Items spread over the two years before `today`, every third one sold
fn generate_test_items(count: usize) -> Vec<Arc<InventoryItem>> {
    let origin = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let bought = origin + Days::new((i * 7 % 730) as u64);
            let mut item = InventoryItem::new(
                format!("item-{}", i),
                bought.format("%Y-%m-%d").to_string(),
                5.0 + (i % 20) as f64,
            );
            item.listing_date = Some((bought + Days::new(2)).format("%Y-%m-%d").to_string());
            item.purchase_location = Some(format!("store-{}", i % 6));
            if i % 3 == 0 {
                item.status = ItemStatus::Sold;
                item.sold_date = Some((bought + Days::new(14)).format("%Y-%m-%d").to_string());
                item.profit = Some(12.0);
            }
            Arc::new(item)
        })
        .collect()
}

/// Benchmark 1: activity_series per granularity
fn bucketing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("activity_series");
    let items = generate_test_items(5000);

    for granularity in [Granularity::Day, Granularity::Week, Granularity::Month] {
        let bucketer = Bucketer::new(granularity, YearScope::Single(2024), today());
        group.bench_with_input(
            BenchmarkId::new("granularity", granularity),
            &items,
            |b, items| {
                b.iter(|| {
                    black_box(activity_series(items, &bucketer));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark 2: all-time book plus milestone detection
fn milestones_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("milestones");

    for count in [100, 1000, 5000] {
        let items = generate_test_items(count);
        group.bench_with_input(BenchmarkId::new("items", count), &items, |b, items| {
            b.iter(|| {
                let book = ActivityBook::all_time(items, today());
                black_box(book.milestones(&Metric::ALL));
            });
        });
    }

    group.finish();
}

/// Benchmark 3: trip clustering
fn trips_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_trips");

    for count in [100, 1000, 5000] {
        let items = generate_test_items(count);
        group.bench_with_input(BenchmarkId::new("items", count), &items, |b, items| {
            b.iter(|| {
                black_box(detect_trips(items, &TripOptions::all_trips(), today()));
            });
        });
    }

    group.finish();
}

/// Benchmark 4: full dashboard recompute
fn dashboard_benchmark(c: &mut Criterion) {
    let items = generate_test_items(1000);
    let config = AnalyticsConfig::default();

    c.bench_function("dashboard_compute_1000", |b| {
        b.iter(|| {
            black_box(DashboardData::compute(
                &items,
                &[],
                &config,
                ReportPeriod::year(Granularity::Month, 2024),
                today(),
            ));
        });
    });
}

criterion_group!(
    benches,
    bucketing_benchmark,
    milestones_benchmark,
    trips_benchmark,
    dashboard_benchmark
);
criterion_main!(benches);
