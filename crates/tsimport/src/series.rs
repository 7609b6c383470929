// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time series container producing one JSON Lines import record.
//!
//! Wire shape:
//! ```text
//! {"metric":{"__name__":"cpu","host":"a1"},"values":[0.5,0.7],"timestamps":[1700000000000,1700000001000]}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Payload;

/// Errors building or serializing a series.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// `values` and `timestamps` differ in length.
    #[error("values and timestamps length mismatch: {values} values, {timestamps} timestamps")]
    LengthMismatch { values: usize, timestamps: usize },
    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One time series: labels plus parallel value/timestamp arrays.
///
/// Timestamps are Unix milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Label set, including `__name__`.
    pub metric: BTreeMap<String, String>,
    /// Sample values.
    pub values: Vec<f64>,
    /// Sample timestamps (ms), parallel to `values`.
    pub timestamps: Vec<i64>,
}

impl TimeSeries {
    /// Create an empty series with the given labels.
    pub fn new<K, V>(labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            metric: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            values: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    /// Append one sample.
    pub fn add_value(&mut self, value: f64, timestamp_ms: i64) {
        self.values.push(value);
        self.timestamps.push(timestamp_ms);
    }

    /// Append several samples. Nothing is appended on length mismatch.
    pub fn add_multi(&mut self, values: &[f64], timestamps_ms: &[i64]) -> Result<(), SeriesError> {
        if values.len() != timestamps_ms.len() {
            return Err(SeriesError::LengthMismatch {
                values: values.len(),
                timestamps: timestamps_ms.len(),
            });
        }
        self.values.extend_from_slice(values);
        self.timestamps.extend_from_slice(timestamps_ms);
        Ok(())
    }

    /// Replace all samples.
    pub fn set_values(&mut self, values: Vec<f64>, timestamps_ms: Vec<i64>) -> Result<(), SeriesError> {
        if values.len() != timestamps_ms.len() {
            return Err(SeriesError::LengthMismatch {
                values: values.len(),
                timestamps: timestamps_ms.len(),
            });
        }
        self.values = values;
        self.timestamps = timestamps_ms;
        Ok(())
    }

    /// Insert or overwrite a label.
    pub fn set_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metric.insert(key.into(), value.into());
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize to a single-line JSON payload.
    pub fn to_json(&self) -> Result<Payload, SeriesError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_wire_shape() {
        let mut series = TimeSeries::new([("__name__", "cpu_usage"), ("host", "a1")]);
        series.add_value(0.5, 1_700_000_000_000);
        series.add_value(1.0, 1_700_000_001_000);

        let json = String::from_utf8(series.to_json().expect("serialize")).expect("utf8");
        assert_eq!(
            json,
            r#"{"metric":{"__name__":"cpu_usage","host":"a1"},"values":[0.5,1.0],"timestamps":[1700000000000,1700000001000]}"#
        );
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_series_add_multi() {
        let mut series = TimeSeries::new([("__name__", "m")]);
        series
            .add_multi(&[1.0, 2.0, 3.0], &[10, 20, 30])
            .expect("matching lengths");

        assert_eq!(series.len(), 3);
        assert_eq!(series.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.timestamps, vec![10, 20, 30]);
    }

    #[test]
    fn test_series_add_multi_mismatch_appends_nothing() {
        let mut series = TimeSeries::new([("__name__", "m")]);
        series.add_value(1.0, 1);

        let err = series.add_multi(&[2.0, 3.0], &[2]).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::LengthMismatch {
                values: 2,
                timestamps: 1
            }
        ));
        assert_eq!(series.len(), 1);

        assert!(series.set_values(vec![1.0], vec![]).is_err());
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_series_set_label_overwrites() {
        let mut series = TimeSeries::new([("job", "old")]);
        series.set_label("job", "new");
        series.set_label("instance", "i-1");

        assert_eq!(series.metric.get("job").map(String::as_str), Some("new"));
        assert_eq!(series.metric.len(), 2);
        assert!(series.is_empty());
    }

    #[test]
    fn test_series_roundtrip_through_json() {
        let mut series = TimeSeries::new([("__name__", "temp")]);
        series.add_value(-3.25, 42);

        let payload = series.to_json().expect("serialize");
        let parsed: TimeSeries = serde_json::from_slice(&payload).expect("parse");
        assert_eq!(parsed, series);
    }
}
