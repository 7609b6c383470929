// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-only statistics snapshot.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::metrics::ImportMetricsSnapshot;

/// Usage percentage at or above which the queue counts as nearly full.
pub const NEARLY_FULL_PERCENT: f64 = 90.0;

/// Snapshot of queue occupancy, configuration and delivery counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportStats {
    pub channel_len: usize,
    pub channel_cap: usize,
    /// Usage formatted as `"12.34%"`.
    pub channel_usage: String,
    pub channel_usage_percent: f64,
    pub channel_free: usize,
    pub batch_size: usize,
    /// Flush interval formatted as `"1s"`, `"250ms"`.
    pub submit_interval: String,
    pub url: String,
    pub is_channel_full: bool,
    pub is_nearly_full: bool,
    pub is_stopped: bool,
    #[serde(flatten)]
    pub delivery: ImportMetricsSnapshot,
}

impl ImportStats {
    /// Assemble a snapshot from raw readings.
    ///
    /// `channel_len` is clamped to `channel_cap`: both are read without a
    /// common lock and may race.
    pub fn new(
        channel_len: usize,
        channel_cap: usize,
        batch_size: usize,
        submit_interval: Duration,
        url: String,
        is_stopped: bool,
        delivery: ImportMetricsSnapshot,
    ) -> Self {
        let channel_len = channel_len.min(channel_cap);
        let usage = if channel_cap == 0 {
            0.0
        } else {
            channel_len as f64 / channel_cap as f64 * 100.0
        };

        Self {
            channel_len,
            channel_cap,
            channel_usage: format!("{:.2}%", usage),
            channel_usage_percent: usage,
            channel_free: channel_cap - channel_len,
            batch_size,
            submit_interval: format!("{:?}", submit_interval),
            url,
            is_channel_full: channel_len == channel_cap,
            is_nearly_full: usage >= NEARLY_FULL_PERCENT,
            is_stopped,
            delivery,
        }
    }

    /// Serialize as a JSON object.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queue {}/{} ({}), batch_size={}, interval={}, url={}, stopped={}, sent={} failed={}",
            self.channel_len,
            self.channel_cap,
            self.channel_usage,
            self.batch_size,
            self.submit_interval,
            self.url,
            self.is_stopped,
            self.delivery.batches_sent,
            self.delivery.batches_failed,
        )
    }
}
