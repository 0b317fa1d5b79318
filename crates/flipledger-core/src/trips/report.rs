//! Per-trip financial report

use chrono::NaiveDate;
use flipledger_types::{Expense, InventoryItem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::cluster::Trip;
use super::payoff::{project_payoff, roi_percent, FinalizedEvent, Payoff};
use crate::error::CoreError;

/// Restricts a trip report to some of the visited locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    locations: Vec<String>,
}

impl LocationFilter {
    pub fn new<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for location in locations {
            let location = location.as_ref().trim();
            if !location.is_empty() && !normalized.iter().any(|l| l.eq_ignore_ascii_case(location)) {
                normalized.push(location.to_string());
            }
        }
        Self {
            locations: normalized,
        }
    }

    /// An empty filter selects nothing and is treated as no filter
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        item.location().is_some_and(|location| {
            self.locations
                .iter()
                .any(|l| l.eq_ignore_ascii_case(location))
        })
    }
}

/// Derived metrics for one trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    /// Visited locations in first-visit order (whole trip)
    pub locations: Vec<String>,
    /// Locations the report is restricted to, if any
    pub location_filter: Option<Vec<String>>,
    pub item_count: usize,
    pub items_cost: f64,
    /// Expenses dated within the trip (zero when filtered by location)
    pub expenses: f64,
    pub total_investment: f64,
    pub revenue_received: f64,
    pub potential_revenue: f64,
    pub profit: f64,
    pub potential_profit: f64,
    pub roi_now: f64,
    pub roi_potential: f64,
    pub items_finalized: usize,
    pub items_remaining: usize,
    pub payoff: Payoff,
}

impl TripReport {
    /// Compute the report for `trip`.
    ///
    /// Unfiltered, investment is item cost plus expenses dated within the
    /// trip. With a non-empty `filter`, only items bought at the selected
    /// locations count and investment is their cost alone.
    pub fn compute(trip: &Trip, expenses: &[Expense], filter: Option<&LocationFilter>) -> Self {
        let filter = filter.filter(|f| !f.is_empty());

        let members: Vec<&Arc<InventoryItem>> = trip
            .members
            .iter()
            .filter(|item| filter.map_or(true, |f| f.matches(item)))
            .collect();

        let items_cost: f64 = members.iter().map(|item| item.purchase_price).sum();
        let expenses_total = match filter {
            Some(_) => 0.0,
            None => expenses_within(trip, expenses),
        };
        let total_investment = items_cost + expenses_total;

        let revenue_received: f64 = members
            .iter()
            .filter_map(|item| item.revenue_received())
            .sum();
        let potential_revenue: f64 = members.iter().map(|item| item.potential_revenue()).sum();

        let finalized: Vec<FinalizedEvent> = members
            .iter()
            .filter_map(|item| {
                item.finalized_on().map(|date| FinalizedEvent {
                    date,
                    amount: item.current_profit(),
                })
            })
            .collect();
        let items_finalized = finalized.len();

        Self {
            start: trip.start,
            end: trip.end,
            label: trip.label(),
            locations: trip.locations(),
            location_filter: filter.map(|f| f.locations().to_vec()),
            item_count: members.len(),
            items_cost,
            expenses: expenses_total,
            total_investment,
            revenue_received,
            potential_revenue,
            profit: revenue_received - total_investment,
            potential_profit: potential_revenue - total_investment,
            roi_now: roi_percent(revenue_received, total_investment),
            roi_potential: roi_percent(potential_revenue, total_investment),
            items_finalized,
            items_remaining: members.len() - items_finalized,
            payoff: project_payoff(trip.start, &finalized, total_investment),
        }
    }
}

fn expenses_within(trip: &Trip, expenses: &[Expense]) -> f64 {
    expenses
        .iter()
        .filter_map(|expense| match expense.spent_on() {
            Ok(date) => trip.contains(date).then_some(expense.amount),
            Err(e) => {
                let error = CoreError::MalformedDate {
                    field: "expense_date".to_string(),
                    value: e.value,
                };
                warn!(expense = %expense.id, error = %error, "Expense skipped for trip report");
                None
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::{detect_trips, TripOptions};
    use flipledger_types::ItemStatus;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: &str, date: &str, price: f64, location: &str) -> InventoryItem {
        let mut item = InventoryItem::new(id, date, price);
        item.purchase_location = Some(location.to_string());
        item
    }

    fn sold(mut item: InventoryItem, on: &str, profit: f64) -> InventoryItem {
        item.status = ItemStatus::Sold;
        item.sold_date = Some(on.to_string());
        item.sale_price = Some(item.purchase_price + profit);
        item.profit = Some(profit);
        item
    }

    fn trip_fixture() -> Trip {
        let items: Vec<Arc<InventoryItem>> = vec![
            sold(item("a", "2024-03-01", 40.0, "Goodwill"), "2024-03-10", 60.0),
            sold(item("b", "2024-03-01", 20.0, "Savers"), "2024-03-12", 10.0),
            item("c", "2024-03-02", 40.0, "Goodwill"),
        ]
        .into_iter()
        .map(|mut i| {
            if i.id == "c" {
                i.profit = Some(20.0);
            }
            Arc::new(i)
        })
        .collect();
        detect_trips(&items, &TripOptions::all_trips(), ymd(2024, 4, 1))
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_unfiltered_report() {
        let trip = trip_fixture();
        let expenses = vec![
            Expense::new("gas", "2024-03-01", 20.0),
            Expense::new("later", "2024-03-20", 500.0),
        ];

        let report = TripReport::compute(&trip, &expenses, None);

        assert_eq!(report.items_cost, 100.0);
        assert_eq!(report.expenses, 20.0);
        assert_eq!(report.total_investment, 120.0);
        // a: 40 + 60, b: 20 + 10
        assert_eq!(report.revenue_received, 130.0);
        assert_eq!(report.potential_revenue, 190.0);
        assert!((report.roi_now - 8.333333333333334).abs() < 1e-9);
        assert_eq!(report.items_finalized, 2);
        assert_eq!(report.items_remaining, 1);
        assert_eq!(report.locations, vec!["Goodwill", "Savers"]);
        // Profit 60 + 10 falls short of 120; 2 more sales, 2 days apart
        assert_eq!(
            report.payoff,
            Payoff::Projected {
                date: ymd(2024, 3, 16),
                days: 15
            }
        );
    }

    #[test]
    fn test_payoff_walks_realized_profit() {
        let items: Vec<Arc<InventoryItem>> = vec![
            sold(item("a", "2024-03-01", 40.0, "Goodwill"), "2024-03-02", 40.0),
            sold(item("b", "2024-03-01", 30.0, "Goodwill"), "2024-03-06", 30.0),
            sold(item("c", "2024-03-01", 30.0, "Goodwill"), "2024-03-11", 40.0),
        ]
        .into_iter()
        .map(Arc::new)
        .collect();
        let trip = detect_trips(&items, &TripOptions::all_trips(), ymd(2024, 4, 1))
            .into_iter()
            .next()
            .unwrap();

        let report = TripReport::compute(&trip, &[], None);

        assert_eq!(report.total_investment, 100.0);
        // Revenue crosses 100 on the second sale, profit only on the third
        assert_eq!(report.revenue_received, 210.0);
        assert_eq!(report.payoff.days(), Some(10));
        assert_eq!(report.payoff.date(), Some(ymd(2024, 3, 11)));
        assert!(report.payoff.is_reached());
    }

    #[test]
    fn test_location_filter_changes_denominator() {
        let trip = trip_fixture();
        let expenses = vec![Expense::new("gas", "2024-03-01", 20.0)];

        let unfiltered = TripReport::compute(&trip, &expenses, None);
        let filter = LocationFilter::new(["goodwill"]);
        let filtered = TripReport::compute(&trip, &expenses, Some(&filter));

        assert_eq!(filtered.item_count, 2);
        assert_eq!(filtered.items_cost, 80.0);
        assert_eq!(filtered.expenses, 0.0);
        assert_eq!(filtered.total_investment, 80.0);
        assert_eq!(filtered.revenue_received, 100.0);
        assert_eq!(filtered.roi_now, 25.0);
        assert_ne!(filtered.roi_now, unfiltered.roi_now);
        assert_ne!(filtered.total_investment, unfiltered.total_investment);
    }

    #[test]
    fn test_empty_filter_is_unfiltered() {
        let trip = trip_fixture();
        let filter = LocationFilter::new(Vec::<String>::new());

        let report = TripReport::compute(&trip, &[], Some(&filter));
        assert_eq!(report.location_filter, None);
        assert_eq!(report, TripReport::compute(&trip, &[], None));
    }

    #[test]
    fn test_waste_counts_as_loss() {
        let mut wasted = item("w", "2024-03-01", 30.0, "Goodwill");
        wasted.status = ItemStatus::Waste;
        wasted.wasted_date = Some("2024-03-05".to_string());
        let items = vec![Arc::new(wasted)];
        let trip = detect_trips(&items, &TripOptions::all_trips(), ymd(2024, 4, 1))
            .into_iter()
            .next()
            .unwrap();

        let report = TripReport::compute(&trip, &[], None);
        assert_eq!(report.revenue_received, -30.0);
        assert_eq!(report.profit, -60.0);
        assert_eq!(report.items_finalized, 1);
        assert_eq!(
            report.payoff,
            Payoff::Unprojectable(crate::trips::UnprojectableReason::InsufficientHistory {
                finalized: 1
            })
        );
    }
}
