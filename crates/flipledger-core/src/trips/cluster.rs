//! Purchase-date clustering into trips

use chrono::{Datelike, Months, NaiveDate};
use flipledger_types::InventoryItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Clustering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripOptions {
    /// Largest day gap between consecutive purchases of one trip
    pub gap_tolerance_days: i64,
    /// Only purchases within this many months before today are considered
    pub lookback_months: Option<u32>,
}

impl TripOptions {
    pub const ALL_TRIPS_GAP_DAYS: i64 = 1;
    pub const DEFAULT_LOOKBACK_MONTHS: u32 = 24;

    /// Trip history: strict 1-day adjacency over the last two years
    pub fn all_trips() -> Self {
        Self {
            gap_tolerance_days: Self::ALL_TRIPS_GAP_DAYS,
            lookback_months: Some(Self::DEFAULT_LOOKBACK_MONTHS),
        }
    }

    /// Latest-trip view: looser gap, no lookback
    pub fn latest_trip(gap_tolerance_days: i64) -> Self {
        Self {
            gap_tolerance_days: gap_tolerance_days.max(0),
            lookback_months: None,
        }
    }
}

impl Default for TripOptions {
    fn default() -> Self {
        Self::all_trips()
    }
}

/// A run of purchases grouped by date proximity
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Member purchases, oldest first
    pub members: Vec<Arc<InventoryItem>>,
}

impl Trip {
    /// Calendar days covered, inclusive
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Purchase locations in order of first visit, without duplicates
    pub fn locations(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for location in self.members.iter().filter_map(|item| item.location()) {
            if !seen.iter().any(|s| s == location) {
                seen.push(location.to_string());
            }
        }
        seen
    }

    pub fn items_cost(&self) -> f64 {
        self.members.iter().map(|item| item.purchase_price).sum()
    }

    /// `Mar 1 - Mar 2, 2024`, or `Mar 1, 2024` for a one-day trip
    pub fn label(&self) -> String {
        if self.start == self.end {
            return self.start.format("%b %-d, %Y").to_string();
        }
        if self.start.year() == self.end.year() {
            format!(
                "{} - {}",
                self.start.format("%b %-d"),
                self.end.format("%b %-d, %Y")
            )
        } else {
            format!(
                "{} - {}",
                self.start.format("%b %-d, %Y"),
                self.end.format("%b %-d, %Y")
            )
        }
    }
}

/// Group purchases into non-overlapping trips, most recent first.
///
/// Only items with a positive purchase price and a parseable purchase date
/// take part. Walking purchases newest to oldest, an item joins the current
/// trip when its date is within `gap_tolerance_days` of the previous one.
pub fn detect_trips(
    items: &[Arc<InventoryItem>],
    options: &TripOptions,
    today: NaiveDate,
) -> Vec<Trip> {
    let cutoff = options
        .lookback_months
        .and_then(|months| today.checked_sub_months(Months::new(months)));

    let mut events: Vec<(NaiveDate, &Arc<InventoryItem>)> = items
        .iter()
        .filter(|item| item.purchase_price > 0.0)
        .filter_map(|item| match item.purchased_on() {
            Ok(date) => Some((date, item)),
            Err(e) => {
                let error = CoreError::MalformedDate {
                    field: "purchase_date".to_string(),
                    value: e.value,
                };
                warn!(item = %item.id, error = %error, "Purchase skipped for trip detection");
                None
            }
        })
        .filter(|(date, _)| cutoff.map_or(true, |cutoff| *date >= cutoff))
        .collect();

    events.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

    let mut trips = Vec::new();
    let mut current: Vec<(NaiveDate, &Arc<InventoryItem>)> = Vec::new();

    for event in events {
        if let Some(&(previous, _)) = current.last() {
            if (previous - event.0).num_days() > options.gap_tolerance_days {
                trips.push(close_trip(std::mem::take(&mut current)));
            }
        }
        current.push(event);
    }
    if !current.is_empty() {
        trips.push(close_trip(current));
    }

    debug!(
        trips = trips.len(),
        gap = options.gap_tolerance_days,
        "Trip detection complete"
    );
    trips
}

fn close_trip(mut members: Vec<(NaiveDate, &Arc<InventoryItem>)>) -> Trip {
    members.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
    let start = members.first().map(|(d, _)| *d).unwrap_or_default();
    let end = members.last().map(|(d, _)| *d).unwrap_or(start);
    Trip {
        start,
        end,
        members: members.into_iter().map(|(_, item)| Arc::clone(item)).collect(),
    }
}

pub fn most_recent_trip(
    items: &[Arc<InventoryItem>],
    options: &TripOptions,
    today: NaiveDate,
) -> Option<Trip> {
    detect_trips(items, options, today).into_iter().next()
}
