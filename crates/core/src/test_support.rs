// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use chrono::NaiveDateTime;

/// Fixed reference instant used as a computed builder default so tests
/// don't depend on wall-clock time.
pub fn test_now() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

pub mod strategies {
    use proptest::prelude::*;

    /// Arbitrary local-naive datetime within a bounded, realistic range,
    /// for the datetime round-trip property test (spec §8).
    pub fn arb_naive_datetime() -> impl Strategy<Value = chrono::NaiveDateTime> {
        (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
            |(y, mo, d, h, mi, s)| {
                chrono::NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
            },
        )
    }
}
