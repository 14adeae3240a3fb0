//! One sweep: fan out a probe per peer, fan in every outcome.
//!
//! # States
//! ```text
//! Idle → FanningOut → Collecting → Done
//! ```
//! Collecting ends when every probe has reported, the cycle deadline
//! elapses, or shutdown is requested. In the last two cases the cycle scope
//! is cancelled and the remaining probes are drained, each reporting
//! `Cancelled`, so every probed peer still ends with exactly one outcome.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{self, JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::peers::{PeerAddress, PeerSet};
use crate::probe::{hard_limit, ProbeExecutor, ProbeFailure, ProbeOutcome};
use crate::sweep::result::{CycleEnd, CycleResult};
use crate::sweep::scope::{CycleScope, TaskGauge};

/// Stand-in for a deadline too large to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    FanningOut,
    Collecting,
    Done,
}

/// Parameters shared by every cycle.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub interface: String,
    pub probe_timeout: Duration,
    /// Authoritative bound on a whole sweep, even when it is shorter than
    /// `probe_timeout`.
    pub cycle_deadline: Duration,
}

pub struct SweepCycle {
    number: u64,
    id: Uuid,
    state: CycleState,
    executor: Arc<dyn ProbeExecutor>,
    settings: SweepSettings,
    gauge: TaskGauge,
    scope: CycleScope,
    tasks: JoinSet<(usize, ProbeOutcome)>,
    targets: Vec<PeerAddress>,
    recorded: Vec<bool>,
    outcomes: Vec<ProbeOutcome>,
    task_slots: HashMap<task::Id, usize>,
    excluded: usize,
}

impl SweepCycle {
    pub fn new(
        number: u64,
        executor: Arc<dyn ProbeExecutor>,
        settings: SweepSettings,
        gauge: TaskGauge,
    ) -> Self {
        Self {
            number,
            id: Uuid::new_v4(),
            state: CycleState::Idle,
            executor,
            settings,
            gauge,
            scope: CycleScope::new(),
            tasks: JoinSet::new(),
            targets: Vec::new(),
            recorded: Vec::new(),
            outcomes: Vec::new(),
            task_slots: HashMap::new(),
            excluded: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Drive the cycle to `Done`.
    ///
    /// `stop` resolving is treated like the deadline firing early.
    pub async fn run<F>(mut self, peers: &PeerSet, local: &str, stop: F) -> CycleResult
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.settings.cycle_deadline)
            .unwrap_or_else(|| started + FAR_FUTURE);

        self.fan_out(peers, local);
        let end = self.collect(deadline, stop).await;
        self.finish(started, end)
    }

    fn transition(&mut self, next: CycleState) {
        tracing::trace!(from = ?self.state, to = ?next, "Cycle state change");
        self.state = next;
    }

    fn fan_out(&mut self, peers: &PeerSet, local: &str) {
        self.transition(CycleState::FanningOut);

        self.targets = peers.excluding(local);
        self.excluded = peers.len() - self.targets.len();
        if self.excluded > 0 {
            tracing::debug!(local = %local, "Skipping local node");
        }
        self.recorded = vec![false; self.targets.len()];

        for (idx, peer) in self.targets.iter().enumerate() {
            let executor = self.executor.clone();
            let interface = self.settings.interface.clone();
            let timeout = self.settings.probe_timeout;
            let limit = hard_limit(timeout);
            let mut cancel = self.scope.signal();
            let guard = self.gauge.enter();
            let peer = peer.clone();
            let span = tracing::debug_span!("probe", peer = %peer);

            let handle = self.tasks.spawn(
                async move {
                    let _guard = guard;
                    let result = tokio::select! {
                        result = time::timeout(limit, executor.probe(&interface, &peer, timeout)) => {
                            result.unwrap_or_else(|_| Err(ProbeFailure::Timeout(timeout)))
                        }
                        _ = cancel.cancelled() => Err(ProbeFailure::Cancelled),
                    };
                    (idx, ProbeOutcome::from_result(peer, result))
                }
                .instrument(span),
            );
            self.task_slots.insert(handle.id(), idx);
        }

        tracing::debug!(probes = self.targets.len(), "Fan-out complete");
        self.transition(CycleState::Collecting);
    }

    async fn collect<F>(&mut self, deadline: Instant, stop: F) -> CycleEnd
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);

        let end = loop {
            tokio::select! {
                joined = self.tasks.join_next() => match joined {
                    Some(joined) => self.record(joined),
                    None => break CycleEnd::Completed,
                },
                _ = time::sleep_until(deadline) => break CycleEnd::DeadlineElapsed,
                _ = &mut stop => break CycleEnd::Shutdown,
            }
        };

        if end != CycleEnd::Completed {
            tracing::warn!(
                pending = self.tasks.len(),
                reason = ?end,
                "Cancelling pending probes"
            );
            self.scope.cancel();
            while let Some(joined) = self.tasks.join_next().await {
                self.record(joined);
            }
        }

        for idx in 0..self.targets.len() {
            if !self.recorded[idx] {
                self.record_aborted(idx, "probe task ended without an outcome".to_string());
            }
        }

        end
    }

    fn record(&mut self, joined: Result<(usize, ProbeOutcome), JoinError>) {
        match joined {
            Ok((idx, outcome)) => match self.recorded.get_mut(idx) {
                Some(seen) if !*seen => {
                    *seen = true;
                    self.outcomes.push(outcome);
                }
                _ => tracing::error!(peer = %outcome.peer(), "Duplicate probe outcome discarded"),
            },
            Err(e) => {
                tracing::error!(error = %e, "Probe task failed");
                match self.task_slots.get(&e.id()).copied() {
                    Some(idx) if !self.recorded[idx] => self.record_aborted(idx, e.to_string()),
                    _ => {}
                }
            }
        }
    }

    fn record_aborted(&mut self, idx: usize, detail: String) {
        self.recorded[idx] = true;
        self.outcomes.push(ProbeOutcome::Failure {
            peer: self.targets[idx].clone(),
            error: ProbeFailure::Aborted(detail),
        });
    }

    fn finish(mut self, started: Instant, end: CycleEnd) -> CycleResult {
        debug_assert!(self.tasks.is_empty());
        self.transition(CycleState::Done);

        CycleResult {
            cycle: self.number,
            cycle_id: self.id,
            outcomes: std::mem::take(&mut self.outcomes),
            excluded: self.excluded,
            elapsed: started.elapsed(),
            end,
        }
    }
}
