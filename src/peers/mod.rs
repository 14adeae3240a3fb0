//! Peer discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     LocalAddressSource → local address (fatal on failure)
//!     PeerSource         → first PeerSet (fatal on failure)
//!
//! Every cycle (peer_refresh = every_cycle):
//!     PeerSource → PeerSet snapshot, or last known set on failure
//! ```
//!
//! # Design Decisions
//! - A PeerSet is an immutable snapshot for one cycle
//! - Sources are traits so tests and alternative backends can stand in
//!   for the cluster CLI

pub mod command;
pub mod local;
pub mod membership;

use async_trait::async_trait;

pub use command::CommandError;
pub use local::{HostnameLocalAddress, LocalAddressError, StaticLocalAddress};
pub use membership::{MembershipError, PxctlPeerSource};

/// Address of a cluster node as reported by the membership source.
pub type PeerAddress = String;

/// Ordered peer addresses for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerSet(Vec<PeerAddress>);

impl PeerSet {
    pub fn new(peers: Vec<PeerAddress>) -> Self {
        Self(peers)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PeerAddress] {
        &self.0
    }

    /// Peers to probe: every entry not equal to `local`, in order.
    pub fn excluding(&self, local: &str) -> Vec<PeerAddress> {
        self.0.iter().filter(|p| p.as_str() != local).cloned().collect()
    }
}

impl From<Vec<PeerAddress>> for PeerSet {
    fn from(peers: Vec<PeerAddress>) -> Self {
        Self(peers)
    }
}

impl<'a> FromIterator<&'a str> for PeerSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Supplies the current cluster peer list.
#[async_trait]
pub trait PeerSource: Send + Sync {
    async fn peers(&self) -> Result<PeerSet, MembershipError>;
}

/// Supplies this node's own address.
#[async_trait]
pub trait LocalAddressSource: Send + Sync {
    async fn local_address(&self) -> Result<String, LocalAddressError>;
}
