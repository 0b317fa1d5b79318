//! Calendar bucketing
//!
//! Buckets timestamped records into day / Sunday-anchored week / month / year
//! periods, synthesizing zero buckets so every period of the requested range
//! exists even without activity.

pub mod activity;
pub mod bucketer;
pub mod group;
pub mod series;
pub mod weeks;

pub use activity::{
    activity_scope, activity_series, expense_series, ActivityAggregate, ExpenseAggregate,
};
pub use bucketer::{Bucketer, PassOutcome, YearScope};
pub use group::group_by_key;
pub use series::{Bucket, BucketKey, Granularity, Series};
pub use weeks::{month_abbrev, month_name, week_bounds, week_label, week_of_year, weeks_in_year};
