// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded intake queue between producers and the batching worker.
//!
//! A full queue blocks the producer (backpressure, not loss). The only way a
//! payload is refused is a raised stop signal: either already raised when
//! `enqueue` is called, or raised while the producer is blocked on a full
//! queue.

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Arc;

use crate::importer::Lifecycle;
use crate::metrics::ImportMetrics;
use crate::Payload;

/// Result of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Payload admitted into the queue.
    Accepted,
    /// Payload dropped because the importer is stopping or stopped.
    Rejected,
}

impl Enqueued {
    /// Check if the payload was admitted.
    pub fn is_accepted(self) -> bool {
        self == Enqueued::Accepted
    }
}

/// Producer side of the bounded intake queue.
pub struct IntakeQueue {
    sender: Sender<Payload>,
    stop_rx: Receiver<()>,
    capacity: usize,
    lifecycle: Arc<Lifecycle>,
    metrics: Arc<ImportMetrics>,
}

impl IntakeQueue {
    /// Create the queue, returning the single consumer receiver alongside it.
    pub(crate) fn new(
        capacity: usize,
        stop_rx: Receiver<()>,
        lifecycle: Arc<Lifecycle>,
        metrics: Arc<ImportMetrics>,
    ) -> (Self, Receiver<Payload>) {
        let (sender, receiver) = channel::bounded(capacity);
        let queue = Self {
            sender,
            stop_rx,
            capacity,
            lifecycle,
            metrics,
        };
        (queue, receiver)
    }

    /// Enqueue a payload, blocking while the queue is full.
    pub fn enqueue(&self, payload: Payload) -> Enqueued {
        if self.lifecycle.is_stopped() {
            tracing::warn!("importer stopped, ignoring new payload");
            self.metrics.record_rejected();
            return Enqueued::Rejected;
        }

        channel::select! {
            send(self.sender, payload) -> res => {
                if res.is_ok() {
                    self.metrics.record_accepted();
                    Enqueued::Accepted
                } else {
                    // Worker already gone; nothing will ever drain the queue.
                    tracing::warn!("import worker exited, ignoring new payload");
                    self.metrics.record_rejected();
                    Enqueued::Rejected
                }
            },
            recv(self.stop_rx) -> _ => {
                tracing::warn!("importer stopping, ignoring new payload");
                self.metrics.record_rejected();
                Enqueued::Rejected
            },
        }
    }

    /// Payloads currently waiting. Advisory only under concurrency.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Check if no payloads are waiting.
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Fixed queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
