//! Service unit rendering for the installer run mode.
//!
//! Without `--run` the monitor does not probe; it prints a systemd unit that
//! re-invokes this binary in run mode. Installing, enabling and removing the
//! unit is left to the installer that consumes this output.

use crate::config::MonitorConfig;

/// Command line the unit's `ExecStart` runs.
pub fn exec_start(config: &MonitorConfig, local_ip: &str) -> String {
    format!(
        "{} --interface {} --frequency {} --ip {} --refresh {} --run",
        config.service.monitor_bin,
        config.probe.interface,
        config.schedule.cadence_secs,
        local_ip,
        config.schedule.peer_refresh.as_str(),
    )
}

/// Render the unit file contents.
///
/// The runtime cap restarts the monitor every 30 minutes; the task and
/// memory limits bound a runaway sweep.
pub fn render_unit(config: &MonitorConfig, local_ip: &str) -> String {
    format!(
        "[Unit]
Description=portworx network monitor service
After=portworx.service
StartLimitIntervalSec=0s

[Service]
Type=simple
RuntimeMaxSec=1800s
Restart=always
User=root
ExecStart={}
TasksMax=200
MemoryMax=60M

[Install]
WantedBy=multi-user.target
",
        exec_start(config, local_ip)
    )
}
