// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn candidate_names_includes_med_and_hsl_stem_variants() {
    let names = candidate_names("EvoYeast", Some("C:\\Methods\\EvoYeast.med"));
    assert_eq!(names, vec!["EvoYeast".to_string(), "EvoYeast.med".to_string(), "EvoYeast.hsl".to_string()]);
}

#[test]
fn candidate_names_without_path_is_just_method_name() {
    assert_eq!(candidate_names("EvoYeast", None), vec!["EvoYeast".to_string()]);
}

#[tokio::test]
async fn fake_adapter_returns_configured_run_state() {
    let adapter = FakeVendorDbAdapter::new();
    adapter.set_run_state("EvoYeast", robosched_core::RunState::Complete);
    let state = adapter.get_latest_run_state("EvoYeast", None).await;
    assert_eq!(state, Some(robosched_core::RunState::Complete));
}

#[tokio::test]
async fn fake_adapter_returns_none_when_unreachable() {
    let adapter = FakeVendorDbAdapter::new();
    adapter.set_run_state("EvoYeast", robosched_core::RunState::Complete);
    adapter.set_unreachable(true);
    assert_eq!(adapter.get_latest_run_state("EvoYeast", None).await, None);
}

#[tokio::test]
async fn fake_adapter_records_exclusive_set_calls() {
    let adapter = FakeVendorDbAdapter::new();
    assert!(adapter.set_exclusive_evoyeast_experiment("exp-1").await);
    assert_eq!(adapter.exclusive_sets(), vec!["exp-1".to_string()]);
}

#[tokio::test]
async fn fake_adapter_records_scheduled_to_run_sets() {
    let adapter = FakeVendorDbAdapter::new();
    assert!(adapter.set_scheduled_to_run("Demo", true).await);
    assert!(adapter.set_scheduled_to_run("Demo", false).await);
    assert_eq!(adapter.scheduled_to_run_sets(), vec![("Demo".to_string(), true), ("Demo".to_string(), false)]);
}

#[tokio::test]
async fn fake_adapter_records_reset_calls() {
    let adapter = FakeVendorDbAdapter::new();
    assert!(adapter.reset_hamilton_tables("EvoYeast", Some(&["LiquidHandlerDeck".to_string()])).await);
    assert_eq!(adapter.reset_calls(), vec![("EvoYeast".to_string(), Some(vec!["LiquidHandlerDeck".to_string()]))]);
}
