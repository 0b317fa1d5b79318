//! Record/milestone detection over activity series
//!
//! [`detect_milestones`] scans each granularity for the bucket(s) holding the
//! best-ever value of every tracked [`Metric`]. [`find_todays_milestones`]
//! narrows that to today's day bucket and [`MilestoneNotifier`] turns it into
//! at most one notification per distinct winner set.

mod detector;
mod metric;
mod notifier;

pub use detector::{
    detect_milestones, find_todays_milestones, ActivityBook, Milestone, MilestoneBoard,
    TodaysMilestones,
};
pub use metric::Metric;
pub use notifier::MilestoneNotifier;
