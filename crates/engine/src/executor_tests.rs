// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeCommandRunner;
use super::*;
use robosched_adapters::{FakeProcessMonitor, FakeVendorDbAdapter};
use robosched_core::{BackoffStrategy, RetryConfig, RunState, Schedule};
use std::time::Duration;
use tempfile::tempdir;

fn make_schedule(path: &std::path::Path) -> Schedule {
    Schedule::builder().experiment_path(path.to_string_lossy().into_owned()).build()
}

#[test]
fn resolve_method_path_adds_med_suffix() {
    let base = std::path::Path::new("/base");
    let resolved = resolve_method_path("DemoRun", base);
    assert_eq!(resolved, std::path::PathBuf::from("/base/DemoRun.med"));
}

#[test]
fn resolve_method_path_keeps_absolute_paths_as_is() {
    let resolved = resolve_method_path("/abs/DemoRun.med", std::path::Path::new("/base"));
    assert_eq!(resolved, std::path::PathBuf::from("/abs/DemoRun.med"));
}

#[test]
fn backoff_linear_ignores_attempt_number() {
    let cfg = RetryConfig { retry_delay_minutes: 2, backoff_strategy: BackoffStrategy::Linear, ..RetryConfig::default() };
    assert_eq!(backoff_duration(&cfg, 0), Duration::from_secs(120));
    assert_eq!(backoff_duration(&cfg, 3), Duration::from_secs(120));
}

#[test]
fn backoff_exponential_caps_at_thirty_minutes() {
    let cfg = RetryConfig { retry_delay_minutes: 10, backoff_strategy: BackoffStrategy::Exponential, ..RetryConfig::default() };
    assert_eq!(backoff_duration(&cfg, 0), Duration::from_secs(600));
    assert_eq!(backoff_duration(&cfg, 10), Duration::from_secs(30 * 60));
}

#[tokio::test]
async fn execute_fails_fast_when_method_path_missing() {
    let dir = tempdir().unwrap();
    let schedule = make_schedule(&dir.path().join("NoSuchFile.med"));
    let executor = ExperimentExecutor::new(
        FakeCommandRunner::new(),
        FakeProcessMonitor::new(),
        FakeVendorDbAdapter::new(),
        dir.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let result = executor.execute(&schedule).await;
    assert!(matches!(result, Err(ExecuteError::PathNotFound(_))));
}

#[tokio::test]
async fn execute_succeeds_on_zero_exit_code() {
    let dir = tempdir().unwrap();
    let method_path = dir.path().join("Demo.med");
    std::fs::write(&method_path, b"").unwrap();
    let schedule = make_schedule(&method_path);
    let runner = FakeCommandRunner::new();
    runner.push_outcome(CommandOutcome { exit_code: Some(0), stderr: String::new(), timed_out: false });
    let executor = ExperimentExecutor::new(
        runner,
        FakeProcessMonitor::new(),
        FakeVendorDbAdapter::new(),
        dir.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let outcome = executor.execute(&schedule).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.exit_code, Some(0));
}

#[tokio::test]
async fn execute_reclassifies_zero_exit_as_abort_when_vendor_db_says_so() {
    let dir = tempdir().unwrap();
    let method_path = dir.path().join("Demo.med");
    std::fs::write(&method_path, b"").unwrap();
    let schedule = make_schedule(&method_path);
    let runner = FakeCommandRunner::new();
    runner.push_outcome(CommandOutcome { exit_code: Some(0), stderr: String::new(), timed_out: false });
    let vendor_db = FakeVendorDbAdapter::new();
    vendor_db.set_run_state(&schedule.experiment_name, RunState::Aborted);
    let executor = ExperimentExecutor::new(runner, FakeProcessMonitor::new(), vendor_db, dir.path().to_path_buf(), Duration::from_secs(5));
    let outcome = executor.execute(&schedule).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.error_message.unwrap().contains("Hamilton reported last run as Aborted"));
}

#[tokio::test]
async fn execute_retries_until_max_attempts_then_reports_failure() {
    let dir = tempdir().unwrap();
    let method_path = dir.path().join("Demo.med");
    std::fs::write(&method_path, b"").unwrap();
    let mut schedule = make_schedule(&method_path);
    schedule.retry_config.max_retries = 2;
    schedule.retry_config.retry_delay_minutes = 0;
    let runner = FakeCommandRunner::new();
    runner.push_outcome(CommandOutcome { exit_code: Some(1), stderr: "boom".into(), timed_out: false });
    runner.push_outcome(CommandOutcome { exit_code: Some(1), stderr: "boom".into(), timed_out: false });
    let executor = ExperimentExecutor::new(
        runner.clone(),
        FakeProcessMonitor::new(),
        FakeVendorDbAdapter::new(),
        dir.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let outcome = executor.execute(&schedule).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(runner.call_count(), 2);
}
