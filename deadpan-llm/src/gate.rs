//! Enrichment gate: at most one text-generation request in flight.
//!
//! Local models serve one request at a time, and a reaction that arrives
//! late is worse than no reaction. So contention is never queued: a caller
//! that finds the slot taken is told "no" immediately and falls back to a
//! canned line.
//!
//! The gate is cheap to clone; clones share the same slot and statistics.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// Admission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Requests that got the slot.
    pub admitted: u64,
    /// Requests turned away because the slot was taken.
    pub dropped: u64,
}

/// Single-slot, non-blocking admission control.
#[derive(Debug, Clone)]
pub struct EnrichmentGate {
    slot: Arc<Semaphore>,
    stats: Arc<Mutex<GateStats>>,
}

/// Proof of holding the slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct GatePass {
    _permit: OwnedSemaphorePermit,
}

impl EnrichmentGate {
    /// Create an idle gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Semaphore::new(1)),
            stats: Arc::new(Mutex::new(GateStats::default())),
        }
    }

    /// Take the slot if it is free. Never waits.
    #[must_use]
    pub fn try_enter(&self) -> Option<GatePass> {
        if let Ok(permit) = Arc::clone(&self.slot).try_acquire_owned() {
            self.stats.lock().admitted += 1;
            trace!("enrichment slot taken");
            Some(GatePass { _permit: permit })
        } else {
            self.stats.lock().dropped += 1;
            trace!("enrichment slot busy, request dropped");
            None
        }
    }

    /// Whether a request currently holds the slot.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> GateStats {
        *self.stats.lock()
    }
}

impl Default for EnrichmentGate {
    fn default() -> Self {
        Self::new()
    }
}
