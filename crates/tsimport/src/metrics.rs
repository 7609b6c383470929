// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Delivery counters shared between producers and the batching worker.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Import delivery metrics
#[derive(Debug)]
pub struct ImportMetrics {
    /// Payloads admitted into the intake queue
    pub payloads_accepted: AtomicU64,
    /// Payloads refused because stop had been raised
    pub payloads_rejected: AtomicU64,
    /// Batches the remote endpoint accepted
    pub batches_sent: AtomicU64,
    /// Batches discarded after a transport or status failure
    pub batches_failed: AtomicU64,
    /// Payloads inside accepted batches
    pub payloads_delivered: AtomicU64,
    /// Payloads inside discarded batches
    pub payloads_discarded: AtomicU64,
}

impl ImportMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self {
            payloads_accepted: AtomicU64::new(0),
            payloads_rejected: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            payloads_delivered: AtomicU64::new(0),
            payloads_discarded: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.payloads_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.payloads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sent(&self, count: usize) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
        self.payloads_delivered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self, count: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.payloads_discarded
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> ImportMetricsSnapshot {
        ImportMetricsSnapshot {
            payloads_accepted: self.payloads_accepted.load(Ordering::Relaxed),
            payloads_rejected: self.payloads_rejected.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            payloads_delivered: self.payloads_delivered.load(Ordering::Relaxed),
            payloads_discarded: self.payloads_discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for ImportMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics snapshot (for logging/monitoring)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportMetricsSnapshot {
    pub payloads_accepted: u64,
    pub payloads_rejected: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub payloads_delivered: u64,
    pub payloads_discarded: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = ImportMetrics::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_rejected();
        metrics.record_sent(2);
        metrics.record_failed(5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.payloads_accepted, 2);
        assert_eq!(snapshot.payloads_rejected, 1);
        assert_eq!(snapshot.batches_sent, 1);
        assert_eq!(snapshot.payloads_delivered, 2);
        assert_eq!(snapshot.batches_failed, 1);
        assert_eq!(snapshot.payloads_discarded, 5);
    }
}
