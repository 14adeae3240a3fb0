//! Sweep scheduler.
//!
//! # Responsibilities
//! - Refresh the peer set per policy, keeping the last known set on failure
//! - Run one [`SweepCycle`] at a time and hand its result to the sink
//! - Sleep `cadence` after each cycle ends, then repeat until shutdown
//!
//! # Design Decisions
//! - Strictly sequential: cycle N+1 never starts before cycle N is `Done`
//! - All cycle resources are owned by the cycle value and dropped with it
//! - Shutdown cancels the in-flight cycle, reports it, then returns

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tracing::Instrument;

use crate::config::{MonitorConfig, PeerRefresh};
use crate::lifecycle::ShutdownListener;
use crate::peers::{MembershipError, PeerSet, PeerSource};
use crate::probe::ProbeExecutor;
use crate::report::{ReportEvent, ReportSink};
use crate::sweep::{CycleEnd, CycleResult, SweepCycle, SweepSettings, TaskGauge};

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub sweep: SweepSettings,
    pub cadence: Duration,
    pub peer_refresh: PeerRefresh,
    pub membership_timeout: Duration,
}

impl SchedulerSettings {
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            sweep: SweepSettings {
                interface: config.probe.interface.clone(),
                probe_timeout: config.probe.timeout(),
                cycle_deadline: config.schedule.cycle_deadline(),
            },
            cadence: config.schedule.cadence(),
            peer_refresh: config.schedule.peer_refresh,
            membership_timeout: config.schedule.membership_timeout(),
        }
    }
}

pub struct Scheduler {
    settings: SchedulerSettings,
    local: String,
    peers: PeerSet,
    peer_source: Arc<dyn PeerSource>,
    executor: Arc<dyn ProbeExecutor>,
    sink: Arc<dyn ReportSink>,
    gauge: TaskGauge,
    cycles: u64,
}

impl Scheduler {
    /// `initial_peers` is the set fetched at startup; it is the fallback
    /// until the first successful refresh.
    pub fn new(
        settings: SchedulerSettings,
        local: String,
        initial_peers: PeerSet,
        peer_source: Arc<dyn PeerSource>,
        executor: Arc<dyn ProbeExecutor>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            settings,
            local,
            peers: initial_peers,
            peer_source,
            executor,
            sink,
            gauge: TaskGauge::new(),
            cycles: 0,
        }
    }

    /// Probe tasks alive right now, across all cycles.
    pub fn live_probes(&self) -> usize {
        self.gauge.live()
    }

    pub fn cycles_run(&self) -> u64 {
        self.cycles
    }

    /// Peer set used by the most recent cycle.
    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    /// Run cycles until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        tracing::info!(
            interface = %self.settings.sweep.interface,
            local = %self.local,
            cadence_secs = self.settings.cadence.as_secs(),
            probe_timeout_secs = self.settings.sweep.probe_timeout.as_secs(),
            cycle_deadline_secs = self.settings.sweep.cycle_deadline.as_secs(),
            refresh = ?self.settings.peer_refresh,
            "Scheduler starting"
        );

        loop {
            let result = self.run_cycle(&mut shutdown).await;
            if result.end == CycleEnd::Shutdown || shutdown.is_triggered() {
                break;
            }

            tokio::select! {
                _ = time::sleep(self.settings.cadence) => {}
                _ = shutdown.recv() => break,
            }
        }

        tracing::info!(cycles = self.cycles, "Scheduler stopped");
    }

    /// Refresh peers, run one sweep, report it.
    pub async fn run_cycle(&mut self, shutdown: &mut ShutdownListener) -> CycleResult {
        self.cycles += 1;
        let number = self.cycles;

        if self.settings.peer_refresh == PeerRefresh::EveryCycle {
            self.refresh_peers(number).await;
        }

        let cycle = SweepCycle::new(
            number,
            self.executor.clone(),
            self.settings.sweep.clone(),
            self.gauge.clone(),
        );
        let span = tracing::info_span!("cycle", cycle = number, cycle_id = %cycle.id());

        let result = cycle
            .run(&self.peers, &self.local, shutdown.recv())
            .instrument(span)
            .await;

        self.sink.report(ReportEvent::Cycle(result.clone()));
        result
    }

    async fn refresh_peers(&mut self, cycle: u64) {
        let fetched = time::timeout(self.settings.membership_timeout, self.peer_source.peers()).await;
        let error = match fetched {
            Ok(Ok(peers)) => {
                if peers != self.peers {
                    tracing::info!(cycle, before = self.peers.len(), after = peers.len(), "Peer set changed");
                }
                self.peers = peers;
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => MembershipError::Timeout(self.settings.membership_timeout).to_string(),
        };

        self.sink.report(ReportEvent::MembershipFailure {
            cycle,
            error,
            reused_peers: self.peers.len(),
        });
    }
}
