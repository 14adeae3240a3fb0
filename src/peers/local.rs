//! Local node identity.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::peers::command::{run_command, CommandError};
use crate::peers::LocalAddressSource;

#[derive(Debug, Error)]
pub enum LocalAddressError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("no IP address returned by hostname")]
    Empty,
}

/// Explicitly configured address (`--ip` / `node.local_ip`).
pub struct StaticLocalAddress(String);

impl StaticLocalAddress {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }
}

#[async_trait]
impl LocalAddressSource for StaticLocalAddress {
    async fn local_address(&self) -> Result<String, LocalAddressError> {
        let addr = self.0.trim();
        if addr.is_empty() {
            return Err(LocalAddressError::Empty);
        }
        Ok(addr.to_string())
    }
}

/// Best-effort detection: first address printed by `hostname -I`.
///
/// This may not be the address bound to the probe interface.
pub struct HostnameLocalAddress {
    timeout: Duration,
}

impl HostnameLocalAddress {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl LocalAddressSource for HostnameLocalAddress {
    async fn local_address(&self) -> Result<String, LocalAddressError> {
        let out = run_command("hostname", &["-I".to_string()], self.timeout).await?;
        first_address(&String::from_utf8_lossy(&out)).ok_or(LocalAddressError::Empty)
    }
}

fn first_address(output: &str) -> Option<String> {
    output.split_whitespace().next().map(str::to_string)
}
