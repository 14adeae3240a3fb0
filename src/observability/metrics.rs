//! Metrics collection and exposition.
//!
//! # Metrics
//! - `network_monitor_probes_total` (counter): probes by result and reason
//! - `network_monitor_cycle_duration_seconds` (histogram): sweep wall-clock time
//! - `network_monitor_peers` (gauge): peers probed in the last cycle
//! - `network_monitor_peers_reachable` (gauge): successful probes in the last cycle
//! - `network_monitor_membership_failures_total` (counter)
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::probe::ProbeOutcome;
use crate::sweep::CycleResult;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Success { .. } => {
            metrics::counter!("network_monitor_probes_total", "result" => "success", "reason" => "ok")
                .increment(1);
        }
        ProbeOutcome::Failure { error, .. } => {
            metrics::counter!("network_monitor_probes_total", "result" => "failure", "reason" => error.reason())
                .increment(1);
        }
    }
}

pub fn record_cycle(result: &CycleResult) {
    for outcome in &result.outcomes {
        record_probe(outcome);
    }
    metrics::histogram!("network_monitor_cycle_duration_seconds").record(result.elapsed.as_secs_f64());
    metrics::gauge!("network_monitor_peers").set(result.len() as f64);
    metrics::gauge!("network_monitor_peers_reachable").set(result.success_count() as f64);
}

pub fn record_membership_failure() {
    metrics::counter!("network_monitor_membership_failures_total").increment(1);
}
