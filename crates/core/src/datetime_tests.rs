// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_naive_string() {
    let parsed = parse_iso_to_local(Some("2025-01-01T09:00:00")).unwrap();
    assert_eq!(parsed.to_string(), "2025-01-01 09:00:00");
}

#[test]
fn parses_offset_and_drops_it() {
    let parsed = parse_iso_to_local(Some("2025-01-01T09:00:00+00:00"));
    assert!(parsed.is_some());
}

#[test]
fn parses_z_suffix() {
    let parsed = parse_iso_to_local(Some("2025-01-01T09:00:00Z"));
    assert!(parsed.is_some());
}

#[test]
fn none_for_empty_or_missing() {
    assert_eq!(parse_iso_to_local(None), None);
    assert_eq!(parse_iso_to_local(Some("")), None);
    assert_eq!(parse_iso_to_local(Some("   ")), None);
}

#[test]
fn round_trip_naive_format() {
    let original =
        chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(9, 26, 53).unwrap();
    let formatted = format_local(original);
    let reparsed = parse_iso_to_local(Some(&formatted)).unwrap();
    assert_eq!(reparsed, original);
}

#[test]
fn ensure_local_naive_is_idempotent() {
    let t = chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(ensure_local_naive(ensure_local_naive(t)), t);
}
