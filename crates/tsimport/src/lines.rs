// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON Lines joining.
//!
//! Format:
//! ```text
//! {"metric":{...},"values":[...],"timestamps":[...]}\n{"metric":{...},...}
//! ```
//!
//! One newline between consecutive payloads, none leading or trailing.

use std::borrow::Cow;

use crate::Payload;

/// Join a batch of payloads into a single newline-delimited buffer.
///
/// - Empty batch: empty buffer.
/// - Single payload: borrowed as-is, no copy.
/// - Otherwise: one allocation of exactly `sum(len) + (count - 1)` bytes.
pub fn join_lines(batch: &[Payload]) -> Cow<'_, [u8]> {
    match batch {
        [] => Cow::Borrowed(&[]),
        [single] => Cow::Borrowed(single.as_slice()),
        _ => {
            let total = joined_len(batch);
            let mut out = Vec::with_capacity(total);
            let last = batch.len() - 1;
            for (i, payload) in batch.iter().enumerate() {
                out.extend_from_slice(payload);
                if i < last {
                    out.push(b'\n');
                }
            }
            debug_assert_eq!(out.len(), total);
            Cow::Owned(out)
        }
    }
}

/// Exact length of the joined buffer for `batch`.
pub fn joined_len(batch: &[Payload]) -> usize {
    let bytes: usize = batch.iter().map(Vec::len).sum();
    bytes + batch.len().saturating_sub(1)
}
