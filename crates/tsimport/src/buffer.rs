// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch assembly for dequeued payloads.
//!
//! The buffer only enforces the size bound. Time-based flushing is driven by
//! the worker's periodic tick, which is independent of batch completions.

use crate::Payload;

/// Accumulates payloads until `max_size` is reached.
///
/// Owned by the batching worker alone; never shared between threads.
pub struct BatchBuffer {
    payloads: Vec<Payload>,
    max_size: usize,
}

impl BatchBuffer {
    /// Create a new batch buffer holding at most `max_size` payloads.
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            payloads: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Add a payload to the buffer.
    ///
    /// Returns `Some(batch)` if the buffer is now full and must be submitted,
    /// or `None` if there is still room.
    pub fn add(&mut self, payload: Payload) -> Option<Vec<Payload>> {
        self.payloads.push(payload);
        if self.payloads.len() >= self.max_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Take all accumulated payloads, leaving the buffer empty.
    pub fn take(&mut self) -> Vec<Payload> {
        std::mem::replace(&mut self.payloads, Vec::with_capacity(self.max_size))
    }

    /// Get the current number of buffered payloads.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Configured maximum batch size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
