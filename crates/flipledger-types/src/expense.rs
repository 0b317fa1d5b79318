//! Expense records (mileage, supplies, fees)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date::{parse_record_date, DateParseError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Expense {
    pub fn new(id: impl Into<String>, date: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            date: date.into(),
            amount,
            category: String::new(),
            title: None,
        }
    }

    pub fn spent_on(&self) -> Result<NaiveDate, DateParseError> {
        parse_record_date(&self.date)
    }

    /// Title when present, category otherwise
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.category)
    }
}
