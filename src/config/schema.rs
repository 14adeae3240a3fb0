//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the network monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Probe settings (interface, per-probe timeout).
    pub probe: ProbeConfig,

    /// Sweep cadence and cycle deadline.
    pub schedule: ScheduleConfig,

    /// Cluster membership query.
    pub membership: MembershipConfig,

    /// Local node identity.
    pub node: NodeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Service unit rendering.
    pub service: ServiceConfig,
}

/// Probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Network interface the probes are bound to (e.g., "eth1").
    pub interface: String,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// Ping binary to invoke.
    pub ping_bin: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            timeout_secs: 5,
            ping_bin: "ping".to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// When the peer list is fetched from the membership source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeerRefresh {
    /// Query membership before every cycle, falling back to the last known set.
    #[default]
    EveryCycle,
    /// Query membership once at startup and reuse that set forever.
    Startup,
}

impl PeerRefresh {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerRefresh::EveryCycle => "every_cycle",
            PeerRefresh::Startup => "startup",
        }
    }
}

impl std::str::FromStr for PeerRefresh {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "every_cycle" | "every-cycle" => Ok(PeerRefresh::EveryCycle),
            "startup" => Ok(PeerRefresh::Startup),
            other => Err(format!("unknown peer refresh policy '{}'", other)),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Delay between the end of one cycle and the start of the next, in seconds.
    pub cadence_secs: u64,

    /// Maximum wall-clock duration of one sweep, in seconds.
    pub cycle_deadline_secs: u64,

    /// Peer list refresh policy.
    pub peer_refresh: PeerRefresh,

    /// Upper bound on a single membership query, in seconds.
    pub membership_timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cadence_secs: 3,
            cycle_deadline_secs: 300,
            peer_refresh: PeerRefresh::EveryCycle,
            membership_timeout_secs: 10,
        }
    }
}

impl ScheduleConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_secs(self.cadence_secs)
    }

    pub fn cycle_deadline(&self) -> Duration {
        Duration::from_secs(self.cycle_deadline_secs)
    }

    pub fn membership_timeout(&self) -> Duration {
        Duration::from_secs(self.membership_timeout_secs)
    }
}

/// Membership command configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MembershipConfig {
    /// Cluster status binary.
    pub pxctl_bin: String,

    /// Arguments producing the JSON status document.
    pub args: Vec<String>,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            pxctl_bin: "/opt/pwx/bin/pxctl".to_string(),
            args: vec!["status".to_string(), "-j".to_string()],
        }
    }
}

/// Local node identity.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NodeConfig {
    /// This node's address. Auto-detected via `hostname -I` when absent.
    pub local_ip: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log line format.
    pub log_format: LogFormat,

    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9464".to_string(),
        }
    }
}

/// Paths used when rendering the service unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Unit name.
    pub unit_name: String,

    /// Binary the unit re-invokes.
    pub monitor_bin: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            unit_name: "portworx_network_monitor.service".to_string(),
            monitor_bin: "/opt/pwx/oci/rootfs/usr/local/bin/network_monitor".to_string(),
        }
    }
}
