//! Report sinks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::probe::ProbeOutcome;
use crate::sweep::{CycleEnd, CycleResult};

/// Something the scheduler wants recorded.
#[derive(Debug, Clone)]
pub enum ReportEvent {
    /// A finished sweep.
    Cycle(CycleResult),
    /// The membership source failed; the previous peer set was reused.
    MembershipFailure {
        cycle: u64,
        error: String,
        reused_peers: usize,
    },
}

/// Consumer of scheduler events.
///
/// `report` is called from the scheduler loop and must not block it.
pub trait ReportSink: Send + Sync {
    fn report(&self, event: ReportEvent);
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn report(&self, event: ReportEvent) {
        (**self).report(event)
    }
}

/// Writes events to the tracing subscriber and the metrics recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, event: ReportEvent) {
        match event {
            ReportEvent::Cycle(result) => log_cycle(&result),
            ReportEvent::MembershipFailure {
                cycle,
                error,
                reused_peers,
            } => {
                metrics::record_membership_failure();
                tracing::error!(
                    cycle,
                    error = %error,
                    reused_peers,
                    "Membership fetch failed, reusing last known peers"
                );
            }
        }
    }
}

fn log_cycle(result: &CycleResult) {
    for outcome in &result.outcomes {
        match outcome {
            ProbeOutcome::Success { peer, output } => {
                tracing::info!(cycle = result.cycle, peer = %peer, "{}", output.trim_end());
            }
            ProbeOutcome::Failure { peer, error } => {
                tracing::error!(cycle = result.cycle, peer = %peer, error = %error, "Ping failed");
            }
        }
    }

    let summary = format!(
        "Cycle finished: {} reachable, {} failed",
        result.success_count(),
        result.failure_count()
    );
    if result.end == CycleEnd::Completed {
        tracing::info!(
            cycle = result.cycle,
            cycle_id = %result.cycle_id,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "{}",
            summary
        );
    } else {
        tracing::warn!(
            cycle = result.cycle,
            cycle_id = %result.cycle_id,
            elapsed_ms = result.elapsed.as_millis() as u64,
            end = ?result.end,
            "{}",
            summary
        );
    }

    metrics::record_cycle(result);
}

/// Buffers events for a background reporter task.
///
/// The channel is unbounded so `report` never waits on the consumer.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ReportEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ReportSink for ChannelSink {
    fn report(&self, event: ReportEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!(event = ?e.0, "Reporter task gone, event dropped");
        }
    }
}

/// Forward every buffered event to `inner` until all senders are dropped.
pub fn spawn_reporter<S>(mut rx: mpsc::UnboundedReceiver<ReportEvent>, inner: S) -> JoinHandle<()>
where
    S: ReportSink + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            inner.report(event);
        }
        tracing::debug!("Reporter drained");
    })
}
