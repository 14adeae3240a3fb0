//! ICMP reachability via the system `ping` binary.
//!
//! One packet, bound to one interface:
//! `ping -I <interface> -c 1 -W <secs> <target>`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;

use crate::probe::{hard_limit, ProbeExecutor, ProbeFailure};

pub struct PingExecutor {
    bin: String,
}

impl PingExecutor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Default for PingExecutor {
    fn default() -> Self {
        Self::new("ping")
    }
}

/// `-W` takes whole seconds, minimum 1.
pub fn wait_secs(timeout: Duration) -> u64 {
    timeout.as_secs_f64().ceil().max(1.0) as u64
}

/// Arguments for a single-shot ping.
pub fn ping_args(interface: &str, target: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-I".to_string(),
        interface.to_string(),
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        wait_secs(timeout).to_string(),
        target.to_string(),
    ]
}

#[async_trait]
impl ProbeExecutor for PingExecutor {
    async fn probe(
        &self,
        interface: &str,
        target: &str,
        timeout: Duration,
    ) -> Result<String, ProbeFailure> {
        // kill_on_drop: a cancelled probe must not leave a ping process behind.
        let child = Command::new(&self.bin)
            .args(ping_args(interface, target, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeFailure::Spawn(format!("{}: {}", self.bin, e)))?;

        let output = match time::timeout(hard_limit(timeout), child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ProbeFailure::Spawn(e.to_string())),
            Err(_) => return Err(ProbeFailure::Timeout(timeout)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("{} ({})", last_line(&stdout), output.status)
        } else {
            format!("{} ({})", stderr.trim(), output.status)
        };
        Err(ProbeFailure::Unreachable(detail))
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("no reply")
        .trim()
}
