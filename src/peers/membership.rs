//! Cluster membership from the `pxctl status -j` JSON document.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MembershipConfig;
use crate::peers::command::{run_command, CommandError};
use crate::peers::{PeerSet, PeerSource};

/// Failure to obtain the peer list.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to parse cluster status JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("membership query did not finish within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Deserialize)]
struct Status {
    cluster: Cluster,
}

#[derive(Debug, Deserialize)]
struct Cluster {
    #[serde(rename = "Nodes", default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(rename = "DataIp", default)]
    data_ip: String,
}

/// Extract node data addresses from a cluster status document.
///
/// Nodes without a data address are skipped; everything else is kept in
/// document order, duplicates included.
pub fn parse_status(json: &[u8]) -> Result<PeerSet, MembershipError> {
    let status: Status = serde_json::from_slice(json)?;
    let peers = status
        .cluster
        .nodes
        .into_iter()
        .map(|node| node.data_ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .collect();
    Ok(PeerSet::new(peers))
}

/// Peer source backed by the cluster CLI.
pub struct PxctlPeerSource {
    config: MembershipConfig,
    timeout: Duration,
}

impl PxctlPeerSource {
    pub fn new(config: MembershipConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }
}

#[async_trait]
impl PeerSource for PxctlPeerSource {
    async fn peers(&self) -> Result<PeerSet, MembershipError> {
        let out = run_command(&self.config.pxctl_bin, &self.config.args, self.timeout).await?;
        let peers = parse_status(&out)?;
        tracing::debug!(count = peers.len(), "Fetched cluster membership");
        Ok(peers)
    }
}
