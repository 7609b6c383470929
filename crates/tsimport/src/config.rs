// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Import configuration.
//!
//! Every field is optional when loading from YAML; missing keys take the
//! defaults below.
//!
//! ```yaml
//! base_url: "http://victoria.example.com:8428"
//! url: "/api/v1/import"
//! channel_capacity: 100000
//! batch_size: 10000
//! submit_interval_ms: 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default HTTP base URL for the transport.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8428";

/// Default import endpoint (VictoriaMetrics JSON Lines import).
pub const DEFAULT_IMPORT_PATH: &str = "/api/v1/import";

/// Default intake queue capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100_000;

/// Default maximum batch size.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default flush interval (milliseconds).
pub const DEFAULT_SUBMIT_INTERVAL_MS: u64 = 1000;

/// Default HTTP request timeout (milliseconds).
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default transport retry count for connection errors.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default idle connections kept per host.
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 50;

/// Default idle connection timeout (milliseconds).
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 90_000;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Base URL or import URL could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// A numeric setting is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Settings for an [`Importer`](crate::Importer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Base URL of the time-series database.
    pub base_url: String,
    /// Import path relative to `base_url`, or an absolute URL overriding it.
    pub url: String,
    /// Intake queue capacity.
    pub channel_capacity: usize,
    /// Maximum payloads per submitted batch.
    pub batch_size: usize,
    /// Periodic flush interval in milliseconds.
    pub submit_interval_ms: u64,
    /// HTTP request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Transport-level retries for connection errors.
    pub retry_count: u32,
    /// Idle pooled connections kept per host.
    pub max_idle_per_host: usize,
    /// Idle pooled connection timeout in milliseconds.
    pub idle_timeout_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            url: DEFAULT_IMPORT_PATH.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            submit_interval_ms: DEFAULT_SUBMIT_INTERVAL_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }
}

impl ImportConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ImportConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Set the import URL (path or absolute URL).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the transport base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the intake queue capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the maximum batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the periodic flush interval.
    ///
    /// Stored with millisecond granularity, rounded up: any non-zero
    /// interval becomes at least 1 ms.
    pub fn with_submit_interval(mut self, interval: Duration) -> Self {
        self.submit_interval_ms = millis_ceil(interval);
        self
    }

    /// Set the HTTP request timeout (millisecond granularity, rounded up).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = millis_ceil(timeout);
        self
    }

    /// Set the transport retry count.
    pub fn with_retry_count(mut self, retries: u32) -> Self {
        self.retry_count = retries;
        self
    }

    /// Periodic flush interval.
    pub fn submit_interval(&self) -> Duration {
        Duration::from_millis(self.submit_interval_ms)
    }

    /// HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Idle pooled connection timeout.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Check value ranges. URLs are checked when the transport is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity",
                reason: "must be at least 1",
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: "must be at least 1",
            });
        }
        if self.submit_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "submit_interval_ms",
                reason: "must be greater than zero",
            });
        }
        if self.url.is_empty() {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "empty import URL".to_string(),
            });
        }
        Ok(())
    }
}

fn millis_ceil(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}
