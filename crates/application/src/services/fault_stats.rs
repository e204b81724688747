//! Counters for fault-injection activity

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Snapshot of fault-injection statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultStats {
    /// Requests that entered the transport
    pub total_requests: u64,
    /// Requests dropped by fault injection
    pub dropped: u64,
    /// Requests handed to the underlying transport
    pub forwarded: u64,
    /// Forwarded requests that came back with an error
    pub forward_failures: u64,
    /// Requests cancelled during an injected delay
    pub cancelled: u64,
    /// Total injected delay that fully elapsed (milliseconds)
    pub injected_delay_ms: u64,
}

impl FaultStats {
    /// Fraction of requests that were dropped
    #[allow(clippy::cast_precision_loss)]
    pub fn drop_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.dropped as f64 / self.total_requests as f64
        }
    }

    /// Requests that have not finished (or were cancelled before the drop check)
    pub const fn in_flight_or_abandoned(&self) -> u64 {
        self.total_requests
            .saturating_sub(self.dropped)
            .saturating_sub(self.forwarded)
    }
}

/// Lock-free counters shared by concurrent requests
#[derive(Debug, Default)]
pub(crate) struct FaultCounters {
    total_requests: AtomicU64,
    dropped: AtomicU64,
    forwarded: AtomicU64,
    forward_failures: AtomicU64,
    cancelled: AtomicU64,
    injected_delay_ms: AtomicU64,
}

impl FaultCounters {
    pub(crate) fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forward(&self, succeeded: bool) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.forward_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_cancel(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn record_delay(&self, delay: Duration) {
        self.injected_delay_ms
            .fetch_add(delay.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> FaultStats {
        FaultStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            forward_failures: self.forward_failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            injected_delay_ms: self.injected_delay_ms.load(Ordering::Relaxed),
        }
    }
}
