//! Statistics and metrics for the chat core

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters, updated lock-free from every session
#[derive(Debug, Default)]
pub struct ServerStats {
    sessions_admitted: AtomicU64,
    sessions_closed: AtomicU64,
    messages_ingested: AtomicU64,
    events_broadcast: AtomicU64,
    delivery_failures: AtomicU64,
}

impl ServerStats {
    /// Create a zeroed stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admission(&self) {
        self.sessions_admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_close(&self) {
        self.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message(&self) {
        self.messages_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.events_broadcast.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let admitted = self.sessions_admitted.load(Ordering::Relaxed);
        let closed = self.sessions_closed.load(Ordering::Relaxed);
        StatsSnapshot {
            sessions_admitted: admitted,
            sessions_closed: closed,
            active_sessions: admitted.saturating_sub(closed),
            messages_ingested: self.messages_ingested.load(Ordering::Relaxed),
            events_broadcast: self.events_broadcast.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Sessions ever admitted.
    pub sessions_admitted: u64,
    /// Sessions that completed teardown.
    pub sessions_closed: u64,
    /// Admitted minus closed.
    pub active_sessions: u64,
    /// Messages accepted into some room's log.
    pub messages_ingested: u64,
    /// Broadcast fan-outs performed (one per event, not per recipient).
    pub events_broadcast: u64,
    /// Individual recipient deliveries that failed.
    pub delivery_failures: u64,
}
