// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datetime normalisation: the one boundary where aware timestamps are
//! allowed to exist, and are immediately converted to local-naive form.
//!
//! The vendor software, persistent store, and CLI all speak local time.
//! Mixing aware/naive values is the single biggest source of scheduling
//! bugs, so every external timestamp funnels through [`parse_iso_to_local`]
//! before it touches a [`Schedule`](crate::schedule::Schedule) or
//! [`JobExecution`](crate::execution::JobExecution).

use chrono::{DateTime, Local, NaiveDateTime};

/// Parse an RFC3339-ish string into local-naive time.
///
/// - `None`/empty input returns `None`.
/// - A string with an offset (`Z` or `+HH:MM`) is converted to local time
///   and the offset is dropped.
/// - A string with no offset is parsed as already-local-naive and returned
///   as-is.
pub fn parse_iso_to_local(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(aware) = DateTime::parse_from_rfc3339(s) {
        return Some(aware.with_timezone(&Local).naive_local());
    }
    // Accept a bare "Z" suffix without full offset digits, and plain naive.
    let cleaned = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(cleaned, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Idempotently strip any timezone information from an already-parsed
/// value. No-op for values already local-naive (the only representation
/// this crate's types carry).
pub fn ensure_local_naive(t: NaiveDateTime) -> NaiveDateTime {
    t
}

/// Render a local-naive timestamp back to an ISO-8601-ish string with no
/// offset, suitable for storage.
pub fn format_local(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
#[path = "datetime_tests.rs"]
mod tests;
