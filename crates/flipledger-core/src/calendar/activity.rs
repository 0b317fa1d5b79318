//! Inventory activity and expense series
//!
//! The business event decides which date drives each metric:
//! purchase date for pulled/spent, listing date for listed, sale date for
//! sold/sales.

use chrono::NaiveDate;
use flipledger_types::{Expense, InventoryItem, ItemStatus};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::sync::Arc;

use super::bucketer::{Bucketer, YearScope};
use super::series::Series;

/// Per-bucket inventory activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityAggregate {
    /// Items listed for sale
    pub listed: u64,
    /// Items sold
    pub sold: u64,
    /// Items pulled (purchased)
    pub pulled: u64,
    /// Sales amount
    pub sales: f64,
    /// Purchase spend
    pub spent: f64,
}

impl AddAssign for ActivityAggregate {
    fn add_assign(&mut self, other: Self) {
        self.listed += other.listed;
        self.sold += other.sold;
        self.pulled += other.pulled;
        self.sales += other.sales;
        self.spent += other.spent;
    }
}

/// Per-bucket expense totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAggregate {
    pub count: u64,
    pub amount: f64,
}

impl AddAssign for ExpenseAggregate {
    fn add_assign(&mut self, other: Self) {
        self.count += other.count;
        self.amount += other.amount;
    }
}

/// Bucket inventory activity with three dated passes over the same frame
pub fn activity_series(items: &[Arc<InventoryItem>], bucketer: &Bucketer) -> Series<ActivityAggregate> {
    let mut series = bucketer.frame();

    bucketer.pass(
        &mut series,
        items,
        "purchase_date",
        |item| Some(item.purchase_date.as_str()),
        |agg: &mut ActivityAggregate, item| {
            agg.pulled += 1;
            agg.spent += item.purchase_price;
        },
    );

    bucketer.pass(
        &mut series,
        items,
        "listing_date",
        |item| item.listing_date.as_deref(),
        |agg: &mut ActivityAggregate, _| agg.listed += 1,
    );

    bucketer.pass(
        &mut series,
        items,
        "sold_date",
        |item| match item.status {
            ItemStatus::Sold => item.sold_date.as_deref(),
            _ => None,
        },
        |agg: &mut ActivityAggregate, item| {
            agg.sold += 1;
            agg.sales += item.sales_amount();
        },
    );

    series
}

/// Years from the earliest purchase, listing or sale date through today
pub fn activity_scope(items: &[Arc<InventoryItem>], today: NaiveDate) -> YearScope {
    let dates = items.iter().flat_map(|item| {
        [
            item.purchased_on().ok(),
            item.listed_on().and_then(Result::ok),
            item.sold_on().and_then(Result::ok),
        ]
        .into_iter()
        .flatten()
    });
    YearScope::spanning(dates, today)
}

pub fn expense_series(expenses: &[Expense], bucketer: &Bucketer) -> Series<ExpenseAggregate> {
    bucketer.bucket(
        expenses,
        "expense_date",
        |expense| Some(expense.date.as_str()),
        |agg: &mut ExpenseAggregate, expense| {
            agg.count += 1;
            agg.amount += expense.amount;
        },
    )
}
