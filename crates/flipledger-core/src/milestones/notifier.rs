//! Duplicate-suppressing milestone notifications

use parking_lot::Mutex;
use tracing::debug;

use super::detector::TodaysMilestones;

/// Fires a caller-supplied callback once per distinct set of today's winners.
///
/// Recomputing milestones after every data change is expected; the notifier
/// remembers the fingerprint of the last set it announced and stays quiet
/// until that set changes.
#[derive(Debug, Default)]
pub struct MilestoneNotifier {
    last: Mutex<Option<String>>,
}

impl MilestoneNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a fingerprint the caller persisted earlier
    pub fn with_seen(fingerprint: impl Into<String>) -> Self {
        Self {
            last: Mutex::new(Some(fingerprint.into())),
        }
    }

    /// Call `on_new` if `todays` is non-empty and not already announced.
    ///
    /// Returns true when the callback ran.
    pub fn observe<F>(&self, todays: &TodaysMilestones, on_new: F) -> bool
    where
        F: FnOnce(&TodaysMilestones),
    {
        if todays.is_empty() {
            return false;
        }

        let fingerprint = todays.fingerprint();
        {
            let mut last = self.last.lock();
            if last.as_deref() == Some(fingerprint.as_str()) {
                debug!(fingerprint = %fingerprint, "Milestones already announced");
                return false;
            }
            *last = Some(fingerprint);
        }

        on_new(todays);
        true
    }

    pub fn last_fingerprint(&self) -> Option<String> {
        self.last.lock().clone()
    }

    pub fn reset(&self) {
        *self.last.lock() = None;
    }
}
