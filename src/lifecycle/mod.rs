//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Resolve local address → First peer fetch
//!
//! Run mode:
//!     --run   → Scheduler loop
//!     default → service.rs renders the unit for the installer
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → cancel in-flight cycle → report it → drain reporter → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown waits for the in-flight cycle; that wait is bounded by the
//!   cycle deadline

pub mod service;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownListener};
pub use startup::StartupError;
