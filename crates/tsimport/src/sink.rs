// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch submission sinks.
//!
//! A sink receives one joined JSON Lines buffer per batch and reports the
//! outcome. Every failure is terminal for that batch: the worker logs it and
//! discards the batch.

use reqwest::StatusCode;
use reqwest::Url;

use crate::config::{ConfigError, ImportConfig};
use crate::series::{SeriesError, TimeSeries};
use crate::transport::HttpTransport;

/// Submission failures.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// No response was obtained.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with something other than 204 No Content.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// A record could not be serialized.
    #[error(transparent)]
    Series(#[from] SeriesError),
    /// Any other sink-specific failure.
    #[error("{0}")]
    Other(String),
}

impl SubmitError {
    /// HTTP status code, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SubmitError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Destination for joined batches.
///
/// Implementations are moved into the worker thread and called from it only.
pub trait BatchSink: Send + 'static {
    /// Submit one joined batch holding `count` payloads.
    fn submit(&mut self, body: &[u8], count: usize) -> Result<(), SubmitError>;

    /// Human-readable destination, reported in statistics.
    fn endpoint(&self) -> String;
}

/// HTTP POST sink for a JSON Lines import endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    transport: HttpTransport,
    endpoint: Url,
}

impl HttpSink {
    /// Build the transport and resolve the import URL from configuration.
    pub fn from_config(config: &ImportConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config)?;
        Self::new(transport, &config.url)
    }

    /// Create a sink posting to `url` (path or absolute) over `transport`.
    pub fn new(transport: HttpTransport, url: &str) -> Result<Self, ConfigError> {
        let endpoint = transport.resolve(url)?;
        Ok(Self {
            transport,
            endpoint,
        })
    }

    /// Resolved import URL.
    pub fn url(&self) -> &Url {
        &self.endpoint
    }

    /// Push a single series immediately, bypassing any buffering.
    pub fn push_series(&self, series: &TimeSeries) -> Result<(), SubmitError> {
        let payload = series.to_json()?;
        self.post(&payload)
    }

    fn post(&self, body: &[u8]) -> Result<(), SubmitError> {
        let response = self.transport.post_json(&self.endpoint, body)?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(SubmitError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl BatchSink for HttpSink {
    fn submit(&mut self, body: &[u8], _count: usize) -> Result<(), SubmitError> {
        self.post(body)
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
