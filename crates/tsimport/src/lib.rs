// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffered time-series import client.
//!
//! Accepts a high-rate stream of pre-serialized time-series records and
//! forwards them to a remote time-series database (VictoriaMetrics-style
//! `/api/v1/import`) as JSON Lines over HTTP.
//!
//! This crate provides:
//! - A bounded intake queue with producer backpressure
//! - A single batching worker flushing on batch size or a periodic tick
//! - Exact-size JSON Lines joining of batches
//! - An HTTP submission sink (best-effort, at-most-once)
//! - Idempotent stop with drain of the in-flight batch
//!
//! # Overview
//!
//! ```text
//! producer --> IntakeQueue --> worker --> BatchBuffer --(size | tick)--> join_lines --> HttpSink
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tsimport::{ImportConfig, Importer, TimeSeries};
//!
//! let config = ImportConfig::default().with_base_url("http://localhost:8428");
//! let importer = Importer::new(config)?;
//!
//! let mut series = TimeSeries::new([("__name__", "cpu_usage"), ("host", "a1")]);
//! series.add_value(0.42, 1_700_000_000_000);
//! importer.add_payload(series.to_json()?);
//!
//! importer.stop();
//! importer.wait();
//! ```

pub mod buffer;
pub mod config;
pub mod importer;
pub mod lines;
pub mod metrics;
pub mod queue;
pub mod series;
pub mod sink;
pub mod stats;
pub mod transport;
mod worker;

pub use config::{ConfigError, ImportConfig};
pub use importer::{Importer, LifecycleState};
pub use lines::join_lines;
pub use metrics::{ImportMetrics, ImportMetricsSnapshot};
pub use queue::{Enqueued, IntakeQueue};
pub use series::{SeriesError, TimeSeries};
pub use sink::{BatchSink, HttpSink, SubmitError};
pub use stats::ImportStats;
pub use transport::HttpTransport;

/// One fully serialized record. Never inspected by the import path.
pub type Payload = Vec<u8>;
