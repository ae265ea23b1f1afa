//! Scheduler counters for diagnosing lossy resolvers and churning actors.
//!
//! Counters only ever grow; [`crate::Scheduler::reset`] starts a fresh set.

use lookup_hub::SubmitOutcome;

/// Monotonic counters maintained by the scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Cycles in which at least one actor was active.
    pub busy_cycles: u64,
    /// Lookups handed to the resolver, accepted or not.
    pub lookups_issued: u64,
    /// Lookups the resolver refused (`Dropped`, `WouldBlock` or `Closed`).
    pub submit_rejections: u64,
    /// Wait windows that expired with entries still pending.
    pub reissue_windows: u64,
    /// Actors cancelled because they disconnected.
    pub disconnect_cancels: u64,
    /// Results that matched nothing pending.
    pub stale_results: u64,
    /// Raw results that could not be read as a description.
    pub invalid_results: u64,
    /// Actors whose every lookup was resolved.
    pub finished_actors: u64,
}

impl SchedulerStats {
    /// Records one resolver submission.
    pub fn record_submit(&mut self, outcome: SubmitOutcome) {
        self.lookups_issued = self.lookups_issued.saturating_add(1);
        if !outcome.is_accepted() {
            self.submit_rejections = self.submit_rejections.saturating_add(1);
        }
    }

    pub(crate) fn bump(counter: &mut u64) {
        *counter = counter.saturating_add(1);
    }
}
