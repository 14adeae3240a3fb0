//! Result reporting.
//!
//! # Data Flow
//! ```text
//! Scheduler
//!     → ChannelSink (unbounded buffer, never blocks the loop)
//!     → reporter task
//!     → LogSink (tracing events + metrics)
//! ```

pub mod sink;

pub use sink::{spawn_reporter, ChannelSink, LogSink, ReportEvent, ReportSink};
