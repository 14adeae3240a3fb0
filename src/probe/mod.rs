//! Reachability probes.
//!
//! # Responsibilities
//! - Run one bounded-time probe against one peer over one interface
//! - Turn every failure mode into a [`ProbeFailure`] value
//!
//! # Design Decisions
//! - Single-shot probes (one packet), not a continuous stream
//! - Cancellation is by dropping the probe future; implementations must
//!   release spawned processes on drop
//! - A peer's unreachability is data, never a process error

pub mod outcome;
pub mod ping;

use std::time::Duration;

use async_trait::async_trait;

pub use outcome::{ProbeFailure, ProbeOutcome};
pub use ping::PingExecutor;

/// Time a probe may take before an outer bound reports it as timed out.
///
/// `ping -W` waits in whole seconds and only exits after that wait, so the
/// outer bound sits past the rounded-up wait. An unanswered ping then always
/// reports `Unreachable` rather than racing a `Timeout`.
pub const EXIT_GRACE: Duration = Duration::from_millis(500);

pub fn hard_limit(timeout: Duration) -> Duration {
    Duration::from_secs(ping::wait_secs(timeout)).saturating_add(EXIT_GRACE)
}

/// Performs a single reachability probe.
#[async_trait]
pub trait ProbeExecutor: Send + Sync {
    /// Probe `target` over `interface`, giving up after `timeout`.
    ///
    /// Returns the raw probe output on success.
    async fn probe(
        &self,
        interface: &str,
        target: &str,
        timeout: Duration,
    ) -> Result<String, ProbeFailure>;
}
