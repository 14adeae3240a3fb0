//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve this node's address (explicit, else `hostname -I`)
//! - Fetch the first peer set
//!
//! # Design Decisions
//! - Fail fast: without a local address the monitor would probe itself, and
//!   without a first peer set there is nothing to monitor

use std::time::Duration;

use thiserror::Error;
use tokio::time;

use crate::config::MonitorConfig;
use crate::peers::{
    HostnameLocalAddress, LocalAddressError, LocalAddressSource, MembershipError, PeerSet,
    PeerSource, StaticLocalAddress,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot determine local address: {0}")]
    LocalAddress(#[from] LocalAddressError),

    #[error("cannot reach membership source: {0}")]
    Membership(#[from] MembershipError),
}

/// Pick the local address source for the configuration.
pub fn local_address_source(config: &MonitorConfig) -> Box<dyn LocalAddressSource> {
    match &config.node.local_ip {
        Some(ip) => Box::new(StaticLocalAddress::new(ip.clone())),
        None => Box::new(HostnameLocalAddress::new(config.schedule.membership_timeout())),
    }
}

pub async fn resolve_local_address(
    source: &dyn LocalAddressSource,
) -> Result<String, StartupError> {
    let local = source.local_address().await?;
    tracing::info!(local = %local, "Resolved local address");
    Ok(local)
}

/// First membership fetch, bounded by `timeout`.
pub async fn initial_peers(
    source: &dyn PeerSource,
    timeout: Duration,
) -> Result<PeerSet, StartupError> {
    let peers = time::timeout(timeout, source.peers())
        .await
        .map_err(|_| MembershipError::Timeout(timeout))??;
    tracing::info!(count = peers.len(), peers = ?peers.as_slice(), "Fetched initial peer set");
    Ok(peers)
}
