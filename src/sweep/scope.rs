//! Cycle-scoped cancellation and live-task accounting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Cancellation authority for one cycle.
///
/// Every probe task of the cycle holds a [`CancelSignal`]; firing the scope
/// resolves all of them. Dropping the scope counts as cancellation.
pub struct CycleScope {
    tx: watch::Sender<bool>,
}

impl CycleScope {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for CycleScope {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Resolve once the owning scope is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Count of probe tasks currently alive, shared across cycles.
#[derive(Clone, Default)]
pub struct TaskGauge {
    live: Arc<AtomicUsize>,
}

impl TaskGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live task; the count drops when the guard does.
    pub fn enter(&self) -> TaskGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            live: self.live.clone(),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

pub struct TaskGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
