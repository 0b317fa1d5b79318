//! Display-ready point series for charting

use serde::{Deserialize, Serialize};

use crate::calendar::{ActivityAggregate, ExpenseAggregate, Granularity, Series};
use crate::milestones::Metric;

/// One labelled value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: f64,
}

/// Ordered points for one metric, with the per-bucket average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub granularity: Granularity,
    /// Metric name, or `expenses` for expense charts
    pub metric: String,
    pub currency: bool,
    pub points: Vec<ChartPoint>,
    pub total: f64,
    /// Mean over every bucket, empty ones included; 0 when there are none
    pub average: f64,
}

impl ChartSeries {
    pub fn activity(series: &Series<ActivityAggregate>, metric: Metric) -> Self {
        Self::build(series, metric.name(), metric.is_currency(), |agg| {
            metric.value(agg)
        })
    }

    pub fn expenses(series: &Series<ExpenseAggregate>) -> Self {
        Self::build(series, "expenses", true, |agg| agg.amount)
    }

    fn build<A>(series: &Series<A>, metric: &str, currency: bool, value: impl Fn(&A) -> f64) -> Self {
        let points = series
            .iter()
            .map(|bucket| ChartPoint {
                x: bucket.label.clone(),
                y: value(&bucket.value),
            })
            .collect();

        Self {
            granularity: series.granularity,
            metric: metric.to_string(),
            currency,
            points,
            total: series.total(&value),
            average: series.average(&value),
        }
    }

    /// Highest positive point, first one on ties
    pub fn peak(&self) -> Option<&ChartPoint> {
        self.points
            .iter()
            .filter(|p| p.y > 0.0)
            .fold(None, |best: Option<&ChartPoint>, p| match best {
                Some(b) if b.y >= p.y => Some(b),
                _ => Some(p),
            })
    }
}

/// One chart per metric, in `metrics` order
pub fn activity_charts(series: &Series<ActivityAggregate>, metrics: &[Metric]) -> Vec<ChartSeries> {
    metrics
        .iter()
        .map(|&metric| ChartSeries::activity(series, metric))
        .collect()
}
