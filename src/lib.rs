//! Cluster Network Monitor Library
//!
//! Periodically pings every cluster peer over a chosen interface and reports
//! per-peer reachability.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod peers;
pub mod probe;
pub mod report;
pub mod scheduler;
pub mod sweep;

pub use config::schema::MonitorConfig;
pub use lifecycle::Shutdown;
pub use scheduler::{Scheduler, SchedulerSettings};
