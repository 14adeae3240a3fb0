//! Probe sweeps.
//!
//! # Data Flow
//! ```text
//! PeerSet snapshot
//!     → exclude local address
//!     → one probe task per peer (cycle.rs), all under one CycleScope
//!     → fan-in until done / deadline / shutdown
//!     → CycleResult (result.rs)
//! ```
//!
//! # Design Decisions
//! - Every task of a cycle lives in that cycle's JoinSet; nothing outlives it
//! - Cancellation is a single per-cycle signal (scope.rs)
//! - Exactly one outcome per probed peer, including panicked or cancelled probes

pub mod cycle;
pub mod result;
pub mod scope;

pub use cycle::{CycleState, SweepCycle, SweepSettings};
pub use result::{CycleEnd, CycleResult};
pub use scope::{CycleScope, TaskGauge};
