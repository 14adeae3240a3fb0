//! Cluster Network Monitor
//!
//! Pings every cluster peer from a chosen interface on a fixed cadence and
//! logs per-peer reachability.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   PeerSet    ┌───────────────────────────────┐
//!   │ PeerSource   │─────────────▶│          Scheduler            │
//!   │ (pxctl JSON) │              │  refresh → sweep → report →   │
//!   └──────────────┘              │  sleep(cadence) → repeat      │
//!                                 └──────────────┬────────────────┘
//!                                                │ one SweepCycle at a time
//!                                                ▼
//!                                 ┌───────────────────────────────┐
//!                                 │ SweepCycle (JoinSet + scope)  │
//!                                 │  probe(peer 1) ... probe(N)   │──▶ ping -I <if> -c 1
//!                                 │  deadline / shutdown → cancel │
//!                                 └──────────────┬────────────────┘
//!                                                │ CycleResult
//!                                                ▼
//!                                 ┌───────────────────────────────┐
//!                                 │ ChannelSink → reporter task   │
//!                                 │ → tracing + metrics           │
//!                                 └───────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use network_monitor::config::{read_config, validation::config_warnings, MonitorConfig, PeerRefresh};
use network_monitor::lifecycle::{service, signals, startup, Shutdown};
use network_monitor::observability::{logging, metrics};
use network_monitor::peers::PxctlPeerSource;
use network_monitor::probe::PingExecutor;
use network_monitor::report::{spawn_reporter, ChannelSink, LogSink};
use network_monitor::{Scheduler, SchedulerSettings};

#[derive(Parser)]
#[command(name = "network-monitor")]
#[command(about = "Periodically ping cluster peers over a given interface", long_about = None)]
struct Cli {
    /// Interface to run ping from
    #[arg(long)]
    interface: Option<String>,

    /// Seconds between the end of one sweep and the start of the next
    #[arg(long)]
    frequency: Option<u64>,

    /// This node's IP (excluded from probing)
    #[arg(long)]
    ip: Option<String>,

    /// Run the monitor directly instead of printing a service unit
    #[arg(short = 'r', long = "run")]
    run: bool,

    /// Peer refresh policy: every_cycle or startup
    #[arg(long)]
    refresh: Option<PeerRefresh>,

    /// Per-probe timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Cycle deadline in seconds
    #[arg(long)]
    deadline: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(interface) = &self.interface {
            config.probe.interface = interface.clone();
        }
        if let Some(frequency) = self.frequency {
            config.schedule.cadence_secs = frequency;
        }
        if let Some(ip) = &self.ip {
            config.node.local_ip = Some(ip.clone());
        }
        if let Some(refresh) = self.refresh {
            config.schedule.peer_refresh = refresh;
        }
        if let Some(timeout) = self.timeout {
            config.probe.timeout_secs = timeout;
        }
        if let Some(deadline) = self.deadline {
            config.schedule.cycle_deadline_secs = deadline;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => MonitorConfig::default(),
    };
    cli.apply(&mut config);
    let config = config.validated()?;

    logging::init_logging(&config.observability)?;
    tracing::info!("network-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    for warning in config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    let local_source = startup::local_address_source(&config);
    let local = startup::resolve_local_address(local_source.as_ref())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Startup failed"))?;

    if !cli.run {
        println!("# {}", config.service.unit_name);
        print!("{}", service::render_unit(&config, &local));
        return Ok(());
    }

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let peer_source = Arc::new(PxctlPeerSource::new(
        config.membership.clone(),
        config.schedule.membership_timeout(),
    ));
    let peers = startup::initial_peers(peer_source.as_ref(), config.schedule.membership_timeout())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Startup failed"))?;

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_handler(shutdown.clone());

    let (sink, events) = ChannelSink::new();
    let reporter = spawn_reporter(events, LogSink);

    let scheduler = Scheduler::new(
        SchedulerSettings::from_config(&config),
        local,
        peers,
        peer_source,
        Arc::new(PingExecutor::new(config.probe.ping_bin.clone())),
        Arc::new(sink),
    );
    scheduler.run(shutdown.subscribe()).await;

    // The scheduler held the only sender; the reporter ends once drained.
    reporter.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
