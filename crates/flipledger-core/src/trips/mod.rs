//! Trip clustering and payoff projection
//!
//! Purchases are grouped into trips by date adjacency ([`detect_trips`]).
//! A [`TripReport`] derives cost, revenue, ROI and a payoff date for one
//! trip, optionally restricted to some of its locations.

mod cluster;
mod payoff;
mod report;

pub use cluster::{detect_trips, most_recent_trip, Trip, TripOptions};
pub use payoff::{project_payoff, roi_percent, FinalizedEvent, Payoff, UnprojectableReason};
pub use report::{LocationFilter, TripReport};
