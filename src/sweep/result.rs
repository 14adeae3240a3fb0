//! Aggregated outcomes of one sweep.

use std::time::Duration;

use uuid::Uuid;

use crate::probe::ProbeOutcome;

/// How the collecting phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    /// Every probe finished on its own.
    Completed,
    /// The cycle deadline elapsed; pending probes were cancelled.
    DeadlineElapsed,
    /// Shutdown was requested; pending probes were cancelled.
    Shutdown,
}

/// Outcomes of one cycle, in arrival order. One entry per probed peer.
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub cycle: u64,
    pub cycle_id: Uuid,
    pub outcomes: Vec<ProbeOutcome>,
    /// Number of PeerSet entries skipped as the local address.
    pub excluded: usize,
    pub elapsed: Duration,
    pub end: CycleEnd,
}

impl CycleResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn successes(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.successes().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// First recorded outcome for `peer`.
    pub fn outcome_for(&self, peer: &str) -> Option<&ProbeOutcome> {
        self.outcomes.iter().find(|o| o.peer() == peer)
    }
}
