//! Inventory item records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{parse_record_date, DateParseError};

/// Lifecycle state of an inventory item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Purchased, possibly listed, not yet sold
    #[default]
    Active,
    /// Sold to a buyer
    Sold,
    /// Written off (damaged, donated, unsellable)
    Waste,
}

impl ItemStatus {
    /// Terminal states carry a realized profit or loss
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Sold | ItemStatus::Waste)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Sold => "sold",
            ItemStatus::Waste => "waste",
        }
    }
}

/// One purchased inventory item as supplied by the inventory application
///
/// Dates stay raw strings; use the `*_on` accessors to parse them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub purchase_date: String,

    #[serde(default)]
    pub listing_date: Option<String>,

    #[serde(default)]
    pub sold_date: Option<String>,

    #[serde(default)]
    pub wasted_date: Option<String>,

    #[serde(default)]
    pub purchase_price: f64,

    #[serde(default)]
    pub sale_price: Option<f64>,

    /// Realized profit for sold/waste items, expected profit while active
    #[serde(default)]
    pub profit: Option<f64>,

    #[serde(default)]
    pub purchase_location: Option<String>,

    #[serde(default)]
    pub status: ItemStatus,
}

impl InventoryItem {
    /// Minimal active item, mostly useful for building fixtures
    pub fn new(id: impl Into<String>, purchase_date: impl Into<String>, purchase_price: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            purchase_date: purchase_date.into(),
            listing_date: None,
            sold_date: None,
            wasted_date: None,
            purchase_price,
            sale_price: None,
            profit: None,
            purchase_location: None,
            status: ItemStatus::Active,
        }
    }

    pub fn purchased_on(&self) -> Result<NaiveDate, DateParseError> {
        parse_record_date(&self.purchase_date)
    }

    /// `None` when the item was never listed
    pub fn listed_on(&self) -> Option<Result<NaiveDate, DateParseError>> {
        self.listing_date.as_deref().map(parse_record_date)
    }

    /// `None` when no sold date is recorded
    pub fn sold_on(&self) -> Option<Result<NaiveDate, DateParseError>> {
        self.sold_date.as_deref().map(parse_record_date)
    }

    /// `None` when no wasted date is recorded
    pub fn wasted_on(&self) -> Option<Result<NaiveDate, DateParseError>> {
        self.wasted_date.as_deref().map(parse_record_date)
    }

    /// Date the item reached its terminal state.
    ///
    /// Only sold items with a valid sold date and waste items with a valid
    /// wasted date are finalized.
    pub fn finalized_on(&self) -> Option<NaiveDate> {
        match self.status {
            ItemStatus::Sold => self.sold_on().and_then(Result::ok),
            ItemStatus::Waste => self.wasted_on().and_then(Result::ok),
            ItemStatus::Active => None,
        }
    }

    /// Trimmed purchase location, `None` when blank
    pub fn location(&self) -> Option<&str> {
        self.purchase_location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Profit on a sale: recorded profit, else sale price minus cost
    pub fn sold_profit(&self) -> f64 {
        self.profit.unwrap_or_else(|| {
            self.sale_price
                .map(|price| price - self.purchase_price)
                .unwrap_or(0.0)
        })
    }

    /// Loss on a write-off, never positive.
    ///
    /// Without a recorded profit the whole purchase price is lost.
    pub fn waste_profit(&self) -> f64 {
        self.profit
            .map(|p| p.min(0.0))
            .unwrap_or(-self.purchase_price)
    }

    /// Profit for whatever state the item is in (expected profit while active)
    pub fn current_profit(&self) -> f64 {
        match self.status {
            ItemStatus::Sold => self.sold_profit(),
            ItemStatus::Waste => self.waste_profit(),
            ItemStatus::Active => self.profit.unwrap_or(0.0),
        }
    }

    /// Cash actually returned by this item.
    ///
    /// Sold: purchase price + profit. Waste: the (non-positive) loss only.
    /// Active: `None`.
    pub fn revenue_received(&self) -> Option<f64> {
        match self.status {
            ItemStatus::Sold => Some(self.purchase_price + self.sold_profit()),
            ItemStatus::Waste => Some(self.waste_profit()),
            ItemStatus::Active => None,
        }
    }

    /// Revenue if every active item sells at its expected profit
    pub fn potential_revenue(&self) -> f64 {
        self.revenue_received()
            .unwrap_or(self.purchase_price + self.profit.unwrap_or(0.0))
    }

    /// Sale amount counted in sales totals
    pub fn sales_amount(&self) -> f64 {
        self.sale_price
            .unwrap_or(self.purchase_price + self.sold_profit())
    }
}
