//! Break-even walk and linear payoff projection

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// An item reaching its terminal state, with the profit it realized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalizedEvent {
    pub date: NaiveDate,
    /// Realized profit: sale profit for a sale, the (non-positive) loss for waste
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnprojectableReason {
    /// Fewer than two finalizations to extrapolate from
    InsufficientHistory { finalized: usize },
    /// Finalizations so far profit nothing on average
    NonPositiveReturn,
    /// Projected date falls outside the supported calendar
    BeyondCalendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Payoff {
    /// Cumulative profit met the investment on `date`
    Reached { date: NaiveDate, days: i64 },
    /// Linear projection of when it will
    Projected { date: NaiveDate, days: i64 },
    Unprojectable(UnprojectableReason),
}

impl Payoff {
    /// Days from trip start to payoff, reached or projected
    pub fn days(&self) -> Option<i64> {
        match self {
            Payoff::Reached { days, .. } | Payoff::Projected { days, .. } => Some(*days),
            Payoff::Unprojectable(_) => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Payoff::Reached { date, .. } | Payoff::Projected { date, .. } => Some(*date),
            Payoff::Unprojectable(_) => None,
        }
    }

    pub fn is_reached(&self) -> bool {
        matches!(self, Payoff::Reached { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Payoff::Reached { date, days } => format!("paid off {} ({} days)", date, days),
            Payoff::Projected { date, days } => format!("projected {} ({} days)", date, days),
            Payoff::Unprojectable(UnprojectableReason::InsufficientHistory { finalized }) => {
                format!("unable to project ({} finalized)", finalized)
            }
            Payoff::Unprojectable(UnprojectableReason::NonPositiveReturn) => {
                "unable to project (no profit yet)".to_string()
            }
            Payoff::Unprojectable(UnprojectableReason::BeyondCalendar) => {
                "unable to project".to_string()
            }
        }
    }
}

/// Walk finalizations in date order until the cumulative profit covers
/// `investment`; if it never does, extrapolate from the average profit per
/// finalization and the average gap between finalizations.
///
/// Extrapolation needs at least two finalizations. Gaps average at least
/// one day.
pub fn project_payoff(start: NaiveDate, events: &[FinalizedEvent], investment: f64) -> Payoff {
    if investment <= 0.0 {
        return Payoff::Reached {
            date: start,
            days: 0,
        };
    }

    let mut ordered = events.to_vec();
    ordered.sort_by_key(|e| e.date);

    let mut cumulative = 0.0;
    for event in &ordered {
        cumulative += event.amount;
        if cumulative >= investment {
            return Payoff::Reached {
                date: event.date,
                days: (event.date - start).num_days(),
            };
        }
    }

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Payoff::Unprojectable(UnprojectableReason::InsufficientHistory { finalized: 0 });
    };
    let finalized = ordered.len();
    if finalized < 2 {
        return Payoff::Unprojectable(UnprojectableReason::InsufficientHistory { finalized });
    }

    let average_profit = cumulative / finalized as f64;
    if average_profit <= 0.0 || !average_profit.is_finite() {
        return Payoff::Unprojectable(UnprojectableReason::NonPositiveReturn);
    }

    let average_gap =
        ((last.date - first.date).num_days() as f64 / (finalized - 1) as f64).max(1.0);
    let events_needed = ((investment - cumulative) / average_profit).ceil();
    let days_after_last = (events_needed * average_gap).ceil();

    if !days_after_last.is_finite() || days_after_last > u32::MAX as f64 {
        return Payoff::Unprojectable(UnprojectableReason::BeyondCalendar);
    }

    match last.date.checked_add_days(Days::new(days_after_last as u64)) {
        Some(date) => Payoff::Projected {
            date,
            days: (date - start).num_days(),
        },
        None => Payoff::Unprojectable(UnprojectableReason::BeyondCalendar),
    }
}

/// Return on investment as a percentage, in three regimes:
/// 0 with no revenue; revenue over investment while revenue is below
/// investment; profit over investment once it meets or exceeds it.
pub fn roi_percent(revenue: f64, investment: f64) -> f64 {
    if investment <= 0.0 || revenue == 0.0 {
        return 0.0;
    }
    let roi = if revenue < investment {
        revenue / investment * 100.0
    } else {
        (revenue - investment) / investment * 100.0
    };
    if roi.is_finite() {
        roi
    } else {
        0.0
    }
}
