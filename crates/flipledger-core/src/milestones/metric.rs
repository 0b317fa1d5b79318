//! Activity metrics that compete for milestones

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::ActivityAggregate;

/// Tracked activity metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Listed,
    Sold,
    Sales,
    Pulled,
    Spent,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Listed,
        Metric::Sold,
        Metric::Sales,
        Metric::Pulled,
        Metric::Spent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Listed => "listed",
            Metric::Sold => "sold",
            Metric::Sales => "sales",
            Metric::Pulled => "pulled",
            Metric::Spent => "spent",
        }
    }

    /// Human-readable label for tables and charts
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Listed => "Items Listed",
            Metric::Sold => "Items Sold",
            Metric::Sales => "Sales",
            Metric::Pulled => "Items Pulled",
            Metric::Spent => "Spent",
        }
    }

    pub fn value(&self, aggregate: &ActivityAggregate) -> f64 {
        match self {
            Metric::Listed => aggregate.listed as f64,
            Metric::Sold => aggregate.sold as f64,
            Metric::Sales => aggregate.sales,
            Metric::Pulled => aggregate.pulled as f64,
            Metric::Spent => aggregate.spent,
        }
    }

    /// Currency metrics format as dollars, the rest as counts
    pub fn is_currency(&self) -> bool {
        matches!(self, Metric::Sales | Metric::Spent)
    }

    pub fn format_value(&self, value: f64) -> String {
        if self.is_currency() {
            format!("${:.2}", value)
        } else if value.fract() == 0.0 {
            format!("{}", value as i64)
        } else {
            format!("{:.1}", value)
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "listed" => Ok(Metric::Listed),
            "sold" => Ok(Metric::Sold),
            "sales" => Ok(Metric::Sales),
            "pulled" | "purchased" => Ok(Metric::Pulled),
            "spent" => Ok(Metric::Spent),
            other => Err(format!(
                "unknown metric '{}' (expected listed, sold, sales, pulled or spent)",
                other
            )),
        }
    }
}
