//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. All errors are
//! collected rather than stopping at the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MonitorConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe.interface must not be empty")]
    MissingInterface,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("membership.pxctl_bin must not be empty")]
    MissingMembershipCommand,
}

/// Validate a loaded configuration, returning every error found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.probe.interface.trim().is_empty() {
        errors.push(ValidationError::MissingInterface);
    }
    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "probe.timeout_secs" });
    }
    if config.schedule.cadence_secs == 0 {
        errors.push(ValidationError::Zero { field: "schedule.cadence_secs" });
    }
    if config.schedule.cycle_deadline_secs == 0 {
        errors.push(ValidationError::Zero { field: "schedule.cycle_deadline_secs" });
    }
    if config.schedule.membership_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "schedule.membership_timeout_secs" });
    }
    if config.membership.pxctl_bin.trim().is_empty() {
        errors.push(ValidationError::MissingMembershipCommand);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Non-fatal observations about the configuration.
///
/// A probe timeout longer than the cycle deadline is allowed; the deadline
/// still cancels the probe.
pub fn config_warnings(config: &MonitorConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.probe.timeout_secs > config.schedule.cycle_deadline_secs {
        warnings.push(format!(
            "probe.timeout_secs ({}) exceeds schedule.cycle_deadline_secs ({}); probes will be cancelled at the cycle deadline",
            config.probe.timeout_secs, config.schedule.cycle_deadline_secs
        ));
    }
    if config.node.local_ip.is_none() {
        warnings.push(
            "node.local_ip not set; falling back to the first address from `hostname -I`".to_string(),
        );
    }
    warnings
}
