// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Importer lifecycle: start on construction, idempotent stop, drain.

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::{ConfigError, ImportConfig};
use crate::metrics::ImportMetrics;
use crate::queue::{Enqueued, IntakeQueue};
use crate::sink::{BatchSink, HttpSink};
use crate::stats::ImportStats;
use crate::worker::BatchWorker;
use crate::Payload;

/// Importer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Accepting payloads.
    Running = 0,
    /// Stop raised; the worker is draining its current batch.
    Stopping = 1,
    /// Worker exited.
    Stopped = 2,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LifecycleState::Running,
            1 => LifecycleState::Stopping,
            _ => LifecycleState::Stopped,
        }
    }
}

/// Shared lifecycle flag plus the stop signal.
///
/// The stop signal is the disconnection of every `stop_rx` receiver, which
/// happens when the single sender is dropped.
pub(crate) struct Lifecycle {
    state: AtomicU8,
    stop_tx: Mutex<Option<Sender<()>>>,
}

impl Lifecycle {
    pub(crate) fn new(stop_tx: Sender<()>) -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Running as u8),
            stop_tx: Mutex::new(Some(stop_tx)),
        }
    }

    pub(crate) fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True once stop has been raised, whether or not draining finished.
    pub(crate) fn is_stopped(&self) -> bool {
        self.state() != LifecycleState::Running
    }

    /// Running -> Stopping, then raise the signal. Only the caller that wins
    /// the transition raises it; returns whether that was this caller.
    pub(crate) fn begin_stop(&self) -> bool {
        let won = self
            .state
            .compare_exchange(
                LifecycleState::Running as u8,
                LifecycleState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            drop(self.stop_tx.lock().take());
        }
        won
    }

    pub(crate) fn mark_terminated(&self) {
        self.state
            .store(LifecycleState::Stopped as u8, Ordering::Release);
    }
}

/// Buffered importer.
///
/// Producers call [`add_payload`](Self::add_payload) from any thread; a single
/// background worker batches and submits. Share it across threads with `Arc`.
pub struct Importer {
    queue: IntakeQueue,
    lifecycle: Arc<Lifecycle>,
    metrics: Arc<ImportMetrics>,
    batch_size: usize,
    submit_interval: std::time::Duration,
    endpoint: String,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Importer {
    /// Create an importer posting to the configured HTTP endpoint and start
    /// its worker.
    pub fn new(config: ImportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sink = HttpSink::from_config(&config)?;
        Self::with_sink(config, sink)
    }

    /// Create an importer around a custom sink and start its worker.
    pub fn with_sink<S: BatchSink>(config: ImportConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let lifecycle = Arc::new(Lifecycle::new(stop_tx));
        let metrics = Arc::new(ImportMetrics::new());

        let (queue, receiver) = IntakeQueue::new(
            config.channel_capacity,
            stop_rx.clone(),
            Arc::clone(&lifecycle),
            Arc::clone(&metrics),
        );

        let endpoint = sink.endpoint();
        let worker = BatchWorker::new(
            receiver,
            stop_rx,
            Box::new(sink),
            config.batch_size,
            config.submit_interval(),
            Arc::clone(&lifecycle),
            Arc::clone(&metrics),
        );

        #[allow(clippy::expect_used)] // thread spawn failure is unrecoverable
        let handle = std::thread::Builder::new()
            .name("tsimport-worker".to_string())
            .spawn(move || worker.run())
            .expect("Failed to spawn import worker thread");

        Ok(Self {
            queue,
            lifecycle,
            metrics,
            batch_size: config.batch_size,
            submit_interval: config.submit_interval(),
            endpoint,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Add one serialized record, blocking while the queue is full.
    ///
    /// Dropped with a warning once stop has been raised.
    pub fn add_payload(&self, payload: impl Into<Payload>) -> &Self {
        self.queue.enqueue(payload.into());
        self
    }

    /// Like [`add_payload`](Self::add_payload), reporting whether the payload
    /// was admitted.
    pub fn enqueue(&self, payload: impl Into<Payload>) -> Enqueued {
        self.queue.enqueue(payload.into())
    }

    /// Payloads waiting in the intake queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the intake queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Intake queue capacity.
    pub fn cap(&self) -> usize {
        self.queue.capacity()
    }

    /// Raise the stop signal. Safe to call any number of times from any
    /// thread; only the first call acts. Does not wait for the drain.
    ///
    /// Returns `true` if this call performed the stop.
    pub fn stop(&self) -> bool {
        let stopped = self.lifecycle.begin_stop();
        if stopped {
            tracing::info!("importer stopped");
        }
        stopped
    }

    /// Whether stop has been raised (not whether draining finished).
    pub fn is_stopped(&self) -> bool {
        self.lifecycle.is_stopped()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Block until the worker has drained and exited.
    ///
    /// Returns immediately if already joined. Call [`stop`](Self::stop)
    /// first, otherwise this blocks for the importer's lifetime.
    pub fn wait(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("import worker panicked");
            }
        }
    }

    /// Delivery counters.
    pub fn metrics(&self) -> &ImportMetrics {
        &self.metrics
    }

    /// Snapshot of queue occupancy, configuration and counters.
    pub fn stats(&self) -> ImportStats {
        ImportStats::new(
            self.len(),
            self.cap(),
            self.batch_size,
            self.submit_interval,
            self.endpoint.clone(),
            self.is_stopped(),
            self.metrics.snapshot(),
        )
    }
}

impl Drop for Importer {
    fn drop(&mut self) {
        self.stop();
        self.wait();
    }
}
