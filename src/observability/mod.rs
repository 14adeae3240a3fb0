//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler / sweep / report sink produce:
//!     → logging.rs (structured log events, one span per cycle)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```

pub mod logging;
pub mod metrics;
