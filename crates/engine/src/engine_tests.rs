// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::executor::fake::FakeCommandRunner;
use crate::executor::{CommandOutcome, ExperimentExecutor};
use crate::notifier::NotificationDispatcher;
use robosched_adapters::{FakeNotifyAdapter, FakeProcessMonitor, FakeVendorDbAdapter};
use robosched_core::{FakeClock, RetryConfig, Schedule, ScheduleType};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

type TestEngine = SchedulerEngine<FakeCommandRunner, FakeProcessMonitor, FakeVendorDbAdapter, FakeNotifyAdapter, FakeClock>;

fn build_engine(store: Arc<SqliteStore>) -> (Arc<TestEngine>, FakeCommandRunner, FakeProcessMonitor, FakeVendorDbAdapter) {
    let runner = FakeCommandRunner::new();
    let process_monitor = FakeProcessMonitor::new();
    let vendor_db = FakeVendorDbAdapter::new();
    let base_path = tempdir().unwrap().into_path();
    std::fs::write(base_path.join("demo.med"), b"").unwrap();
    let executor = Arc::new(ExperimentExecutor::new(
        runner.clone(),
        process_monitor.clone(),
        vendor_db.clone(),
        base_path,
        Duration::from_secs(60),
    ));
    let notify = FakeNotifyAdapter::new();
    let notifier = Arc::new(NotificationDispatcher::new(Arc::clone(&store), notify, FakeClock::new()));
    let engine = Arc::new(SchedulerEngine::new(
        store,
        executor,
        vendor_db.clone(),
        process_monitor.clone(),
        notifier,
        FakeClock::new(),
        EngineConfig { check_interval: Duration::from_millis(1), startup_delay: Duration::from_millis(0), max_concurrent_jobs: 1 },
    ));
    (engine, runner, process_monitor, vendor_db)
}

fn due_schedule() -> Schedule {
    Schedule::builder()
        .schedule_type(ScheduleType::Once)
        .experiment_path("demo.med")
        .start_time(robosched_core::test_support::test_now())
        // single attempt, no real sleeping between retries in tests
        .retry_config(RetryConfig { max_retries: 1, retry_delay_minutes: 0, ..RetryConfig::default() })
        .build()
}

async fn wait_until(mut pred: impl FnMut() -> bool) {
    for _ in 0..200 {
        if pred() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never became true");
}

#[tokio::test]
async fn tick_dispatches_a_due_schedule_and_completes_it() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let schedule = due_schedule();
    store.create_schedule(&schedule).unwrap();
    let (engine, runner, _pm, _vdb) = build_engine(Arc::clone(&store));
    runner.push_outcome(CommandOutcome { exit_code: Some(0), stderr: String::new(), timed_out: false });

    engine.tick().await.unwrap();
    wait_until(|| runner.call_count() == 1).await;
    wait_until(|| !store.get_schedule(schedule.schedule_id).unwrap().is_active).await;

    let reloaded = store.get_schedule(schedule.schedule_id).unwrap();
    assert!(!reloaded.is_active, "once schedule deactivates after a successful run");
}

#[tokio::test]
async fn tick_skips_dispatch_when_vendor_is_running() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let schedule = due_schedule();
    store.create_schedule(&schedule).unwrap();
    let (engine, runner, process_monitor, _vdb) = build_engine(Arc::clone(&store));
    process_monitor.set_running(true);

    engine.tick().await.unwrap();
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn tick_skips_dispatch_during_global_recovery() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let schedule = due_schedule();
    store.create_schedule(&schedule).unwrap();
    let mut recovery = store.get_manual_recovery_state().unwrap();
    recovery.active = true;
    store.set_global_recovery(&recovery).unwrap();
    let (engine, runner, _pm, _vdb) = build_engine(Arc::clone(&store));

    engine.tick().await.unwrap();
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn failing_execution_marks_schedule_for_recovery_on_abort_keyword() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let schedule = due_schedule();
    store.create_schedule(&schedule).unwrap();
    let (engine, runner, _pm, _vdb) = build_engine(Arc::clone(&store));
    runner.push_outcome(CommandOutcome { exit_code: Some(1), stderr: "manual abort requested".into(), timed_out: false });

    engine.tick().await.unwrap();
    wait_until(|| store.get_schedule(schedule.schedule_id).unwrap().recovery_required).await;

    let reloaded = store.get_schedule(schedule.schedule_id).unwrap();
    assert_eq!(reloaded.failed_execution_count, 1);
    assert!(reloaded.recovery_required);
}

#[tokio::test]
async fn overdue_schedule_records_a_missed_execution() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut schedule = due_schedule();
    schedule.start_time = Some(robosched_core::test_support::test_now() - chrono::Duration::hours(1));
    store.create_schedule(&schedule).unwrap();
    let (engine, runner, _pm, _vdb) = build_engine(Arc::clone(&store));

    engine.tick().await.unwrap();

    assert_eq!(runner.call_count(), 0);
    let history = store.get_execution_history(Some(schedule.schedule_id), 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, robosched_core::ExecutionStatus::Missed);
    assert!(history[0].error_message.as_deref().unwrap_or_default().contains("overdue"));
}

#[tokio::test]
async fn schedule_over_max_retries_is_deactivated() {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let mut schedule = due_schedule();
    schedule.failed_execution_count = schedule.retry_config.max_retries + 1;
    store.create_schedule(&schedule).unwrap();
    let (engine, runner, _pm, _vdb) = build_engine(Arc::clone(&store));

    engine.tick().await.unwrap();

    assert_eq!(runner.call_count(), 0);
    assert!(!store.get_schedule(schedule.schedule_id).unwrap().is_active);
}
