// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching worker.
//!
//! # State machine
//!
//! ```text
//!   Collecting --(batch full | tick with data)--> Flushing --> Collecting
//!   Collecting --(stop signal)--> Draining --(flush remainder)--> Terminated
//! ```
//!
//! The worker is the only consumer of the intake queue and the only owner of
//! the current batch. It blocks on whichever fires first of: a payload, the
//! periodic tick, or the stop signal. The tick cadence is independent of
//! size-triggered flushes. Payloads still queued when draining starts are
//! abandoned.

use crossbeam::channel::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use crate::buffer::BatchBuffer;
use crate::importer::Lifecycle;
use crate::lines::join_lines;
use crate::metrics::ImportMetrics;
use crate::sink::{BatchSink, SubmitError};
use crate::Payload;

/// Outcome of one three-way wait.
enum WorkerEvent {
    Payload(Payload),
    Tick,
    Stop,
}

/// Why a batch is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushTrigger {
    Size,
    Tick,
    Drain,
}

pub(crate) struct BatchWorker {
    receiver: Receiver<Payload>,
    stop_rx: Receiver<()>,
    sink: Box<dyn BatchSink>,
    buffer: BatchBuffer,
    submit_interval: Duration,
    lifecycle: Arc<Lifecycle>,
    metrics: Arc<ImportMetrics>,
}

impl BatchWorker {
    pub(crate) fn new(
        receiver: Receiver<Payload>,
        stop_rx: Receiver<()>,
        sink: Box<dyn BatchSink>,
        batch_size: usize,
        submit_interval: Duration,
        lifecycle: Arc<Lifecycle>,
        metrics: Arc<ImportMetrics>,
    ) -> Self {
        Self {
            receiver,
            stop_rx,
            sink,
            buffer: BatchBuffer::new(batch_size),
            submit_interval,
            lifecycle,
            metrics,
        }
    }

    /// Run until the stop signal is observed, then drain and return.
    pub(crate) fn run(self) {
        let Self {
            receiver,
            stop_rx,
            mut sink,
            mut buffer,
            submit_interval,
            lifecycle,
            metrics,
        } = self;

        tracing::debug!(
            batch_size = buffer.max_size(),
            interval = ?submit_interval,
            "import worker started"
        );

        let ticker = channel::tick(submit_interval);

        loop {
            // A raised stop wins over queued data, so the drain boundary is
            // fixed once a submission returns.
            if lifecycle.is_stopped() {
                break;
            }

            let event = channel::select! {
                recv(receiver) -> msg => {
                    // Disconnected means every producer handle is gone.
                    msg.map_or(WorkerEvent::Stop, WorkerEvent::Payload)
                },
                recv(ticker) -> _ => { WorkerEvent::Tick },
                recv(stop_rx) -> _ => { WorkerEvent::Stop },
            };

            match event {
                WorkerEvent::Payload(payload) => {
                    if let Some(batch) = buffer.add(payload) {
                        submit_batch(sink.as_mut(), &metrics, batch, FlushTrigger::Size);
                    }
                }
                WorkerEvent::Tick => {
                    if !buffer.is_empty() {
                        submit_batch(sink.as_mut(), &metrics, buffer.take(), FlushTrigger::Tick);
                    }
                }
                WorkerEvent::Stop => break,
            }
        }

        tracing::debug!(
            pending = buffer.len(),
            abandoned = receiver.len(),
            "import worker draining"
        );
        if !buffer.is_empty() {
            submit_batch(sink.as_mut(), &metrics, buffer.take(), FlushTrigger::Drain);
        }

        lifecycle.mark_terminated();
        tracing::debug!("import worker terminated");
    }
}

/// Join and submit one batch. Failures are logged and the batch discarded.
fn submit_batch(
    sink: &mut dyn BatchSink,
    metrics: &ImportMetrics,
    batch: Vec<Payload>,
    trigger: FlushTrigger,
) {
    if batch.is_empty() {
        return;
    }
    let count = batch.len();
    let body = join_lines(&batch);
    tracing::debug!(count, bytes = body.len(), ?trigger, "submitting batch");

    match sink.submit(&body, count) {
        Ok(()) => metrics.record_sent(count),
        Err(SubmitError::Status { status, body }) => {
            tracing::error!(
                count,
                status_code = status,
                response = %body,
                "batch import rejected, data discarded"
            );
            metrics.record_failed(count);
        }
        Err(e) => {
            tracing::error!(count, error = %e, "batch import failed, data discarded");
            metrics.record_failed(count);
        }
    }
}
