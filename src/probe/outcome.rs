//! Per-peer probe results.

use std::time::Duration;

use thiserror::Error;

use crate::peers::PeerAddress;

/// Why a single probe did not succeed.
///
/// Always recorded as an outcome; never propagated as a process error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    #[error("failed to launch probe: {0}")]
    Spawn(String),

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("probe cancelled before completion")]
    Cancelled,

    #[error("probe task aborted: {0}")]
    Aborted(String),
}

impl ProbeFailure {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ProbeFailure::Unreachable(_) => "unreachable",
            ProbeFailure::Spawn(_) => "spawn",
            ProbeFailure::Timeout(_) => "timeout",
            ProbeFailure::Cancelled => "cancelled",
            ProbeFailure::Aborted(_) => "aborted",
        }
    }
}

/// Outcome recorded for exactly one peer in one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { peer: PeerAddress, output: String },
    Failure { peer: PeerAddress, error: ProbeFailure },
}

impl ProbeOutcome {
    pub fn from_result(peer: PeerAddress, result: Result<String, ProbeFailure>) -> Self {
        match result {
            Ok(output) => ProbeOutcome::Success { peer, output },
            Err(error) => ProbeOutcome::Failure { peer, error },
        }
    }

    pub fn peer(&self) -> &str {
        match self {
            ProbeOutcome::Success { peer, .. } | ProbeOutcome::Failure { peer, .. } => peer.as_str(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    pub fn failure(&self) -> Option<&ProbeFailure> {
        match self {
            ProbeOutcome::Failure { error, .. } => Some(error),
            ProbeOutcome::Success { .. } => None,
        }
    }
}
