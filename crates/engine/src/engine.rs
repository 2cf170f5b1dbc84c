// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler engine (spec §4.H): single background loop, single
//! instrument, co-operative with the manual-recovery and process-monitor
//! gates. Generic over the adapter traits the same way the executor is, so
//! tests drive it against fakes instead of real SMTP/SQL Server/processes.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::ExperimentExecutor;
use crate::next_time::{calculate_next_execution_time, classify_due, DueOutcome};
use crate::notifier::{NotificationContext, NotificationDispatcher};
use crate::watch::ExecutionWatch;
use crate::CommandRunner;
use robosched_adapters::{NotifyAdapter, ProcessMonitor, VendorDbAdapter};
use robosched_core::{
    AbortTaxonomy, Clock, ExecutionId, ExecutionStatus, EventType, JobExecution, Schedule, ScheduleId, ScheduleType,
};
use robosched_storage::SqliteStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Instrument;

struct EngineState<C> {
    running: HashSet<ScheduleId>,
    watches: HashMap<ExecutionId, ExecutionWatch<C>>,
    recovery_active: bool,
}

/// The single background scheduler loop (spec §4.H).
pub struct SchedulerEngine<R, P, V, N, C> {
    store: Arc<SqliteStore>,
    executor: Arc<ExperimentExecutor<R, P, V>>,
    vendor_db: V,
    process_monitor: P,
    notifier: Arc<NotificationDispatcher<N, C>>,
    clock: C,
    abort_taxonomy: AbortTaxonomy,
    config: EngineConfig,
    started: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    state: Arc<parking_lot::Mutex<EngineState<C>>>,
}

impl<R, P, V, N, C> SchedulerEngine<R, P, V, N, C>
where
    R: CommandRunner,
    P: ProcessMonitor,
    V: VendorDbAdapter,
    N: NotifyAdapter,
    C: Clock + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<SqliteStore>,
        executor: Arc<ExperimentExecutor<R, P, V>>,
        vendor_db: V,
        process_monitor: P,
        notifier: Arc<NotificationDispatcher<N, C>>,
        clock: C,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            executor,
            vendor_db,
            process_monitor,
            notifier,
            clock,
            abort_taxonomy: AbortTaxonomy::default(),
            config,
            started: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
            state: Arc::new(parking_lot::Mutex::new(EngineState {
                running: HashSet::new(),
                watches: HashMap::new(),
                recovery_active: false,
            })),
        }
    }

    /// Signal the loop to stop after its current sleep; in-flight executions
    /// are left to finish (spec §4.H Shutdown, §5 Cancellation).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A cheap handle callers outside this generic type (the `Api`
    /// implementation, the daemon's shutdown handler) can hold without
    /// naming `R, P, V, N, C` themselves.
    pub fn handle(&self) -> crate::api::EngineHandle {
        crate::api::EngineHandle { started: Arc::clone(&self.started), cancelled: Arc::clone(&self.cancelled) }
    }

    /// Run the scheduler loop until cancelled. Intended to be spawned as a
    /// background task by the daemon (spec §4.J).
    pub async fn run(self: Arc<Self>) {
        tokio::time::sleep(self.config.startup_delay).await;
        self.started.store(true, Ordering::SeqCst);
        tracing::info!("scheduler engine started");
        while !self.is_cancelled() {
            let result = self.tick().instrument(tracing::info_span!("scheduler_tick")).await;
            if let Err(err) = result {
                tracing::error!(error = %err, "scheduler tick failed");
            }
            tokio::time::sleep(self.config.check_interval).await;
        }
        tracing::info!("scheduler engine stopped");
    }

    /// One pass over all active schedules plus the watchdog (spec §4.H
    /// state machine diagram).
    pub async fn tick(self: &Arc<Self>) -> Result<(), EngineError> {
        let recovery = self.store.get_manual_recovery_state()?;
        self.log_recovery_transition(recovery.active);
        if recovery.active {
            tracing::debug!("global manual recovery active, skipping tick");
            self.run_watchdog().await?;
            return Ok(());
        }

        let vendor_running = self.process_monitor.is_vendor_running();
        if vendor_running {
            tracing::debug!("instrument running, skipping dispatch this tick");
            self.run_watchdog().await?;
            return Ok(());
        }

        let now = self.clock.now_local();
        for schedule in self.store.list_schedules(true)? {
            if let Err(err) = self.evaluate_schedule(schedule, now).await {
                tracing::error!(error = %err, "failed to evaluate schedule");
            }
        }

        self.run_watchdog().await?;
        Ok(())
    }

    fn log_recovery_transition(&self, active: bool) {
        let mut state = self.state.lock();
        if state.recovery_active != active {
            tracing::warn!(active, "global manual recovery state changed");
            state.recovery_active = active;
        }
    }

    async fn evaluate_schedule(self: &Arc<Self>, schedule: Schedule, now: chrono::NaiveDateTime) -> Result<(), EngineError> {
        if !schedule.is_dispatchable() {
            return Ok(());
        }
        if schedule.failed_execution_count > schedule.retry_config.max_retries {
            let mut deactivated = schedule;
            deactivated.is_active = false;
            self.store.update_schedule(&deactivated)?;
            tracing::warn!(schedule_id = %deactivated.schedule_id, "schedule exceeded max retries, deactivating");
            return Ok(());
        }

        let due = match schedule.start_time {
            Some(start_time) => start_time <= now,
            None => schedule.schedule_type == ScheduleType::Cron,
        };
        if !due {
            return Ok(());
        }

        match classify_due(&schedule, now) {
            DueOutcome::Missed => self.record_missed(schedule, now),
            DueOutcome::Dispatch => {
                if self.state.lock().running.len() >= self.config.max_concurrent_jobs {
                    return Ok(());
                }
                self.dispatch(schedule, now);
                Ok(())
            }
        }
    }

    /// Missed-job policy (spec §4.H): `once` deactivates, `interval`
    /// advances to its next slot and stays active. Records a `Missed`
    /// execution row either way (spec scenario 4, §7).
    fn record_missed(&self, mut schedule: Schedule, now: chrono::NaiveDateTime) -> Result<(), EngineError> {
        tracing::warn!(schedule_id = %schedule.schedule_id, "schedule missed its window");
        let missed_time = schedule.start_time.unwrap_or(now);
        let execution = JobExecution {
            execution_id: ExecutionId::new(),
            schedule_id: schedule.schedule_id,
            status: ExecutionStatus::Missed,
            attempt: 1,
            scheduled_time: missed_time,
            started_at: None,
            completed_at: None,
            exit_code: None,
            error_message: Some(format!("execution window at {missed_time} is overdue")),
            was_abort: false,
            created_at: now,
            updated_at: now,
        };
        self.store.create_execution(&execution)?;

        match schedule.schedule_type {
            ScheduleType::Once => schedule.is_active = false,
            ScheduleType::Interval => schedule.start_time = Some(calculate_next_execution_time(&schedule, now)),
            ScheduleType::Cron => {}
        }
        self.store.update_schedule(&schedule)?;
        Ok(())
    }

    /// Dispatch (spec §4.H steps 1-7): insert the pending execution,
    /// register the watch, and hand the rest to a worker task.
    fn dispatch(self: &Arc<Self>, schedule: Schedule, now: chrono::NaiveDateTime) {
        let execution = JobExecution {
            execution_id: ExecutionId::new(),
            schedule_id: schedule.schedule_id,
            status: ExecutionStatus::Pending,
            attempt: 1,
            scheduled_time: now,
            started_at: None,
            completed_at: None,
            exit_code: None,
            error_message: None,
            was_abort: false,
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = self.store.create_execution(&execution) {
            tracing::error!(error = %err, "failed to create execution row");
            return;
        }

        {
            let mut state = self.state.lock();
            state.running.insert(schedule.schedule_id);
            state.watches.insert(
                execution.execution_id,
                ExecutionWatch::new(
                    execution.execution_id,
                    schedule.schedule_id,
                    schedule.estimated_duration_minutes,
                    schedule.notification_contact_ids.iter().copied().collect(),
                    self.clock.clone(),
                ),
            );
        }

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_worker(schedule, execution).await;
        });
    }

    async fn run_worker(&self, schedule: Schedule, mut execution: JobExecution) {
        execution.status = ExecutionStatus::Running;
        execution.started_at = Some(self.clock.now_local());
        if let Err(err) = self.store.update_execution(&execution) {
            tracing::error!(error = %err, "failed to mark execution running");
        }

        let pipeline_result = crate::pipeline::run_pipeline(&self.vendor_db, &schedule).await;
        let outcome = match pipeline_result {
            Ok(()) => self.executor.execute(&schedule).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(outcome) if outcome.success => {
                self.finish_success(&schedule, &mut execution, outcome).await;
            }
            Ok(outcome) => {
                self.finish_failure(&schedule, &mut execution, outcome.exit_code, outcome.error_message).await;
            }
            Err(err) => {
                self.finish_failure(&schedule, &mut execution, None, Some(err.to_string())).await;
            }
        }

        self.clear_watch(execution.execution_id, schedule.schedule_id);
    }

    async fn finish_success(&self, schedule: &Schedule, execution: &mut JobExecution, outcome: crate::executor::ExecutionOutcome) {
        execution.status = ExecutionStatus::Completed;
        execution.completed_at = Some(self.clock.now_local());
        execution.exit_code = outcome.exit_code.map(i64::from);
        if let Err(err) = self.store.update_execution(execution) {
            tracing::error!(error = %err, "failed to record successful execution");
        }

        let mut updated = schedule.clone();
        updated.failed_execution_count = 0;
        match schedule.schedule_type {
            ScheduleType::Once => updated.is_active = false,
            ScheduleType::Interval => {
                updated.start_time = Some(calculate_next_execution_time(schedule, self.clock.now_local()))
            }
            ScheduleType::Cron => {}
        }
        if let Err(err) = self.store.update_schedule(&updated) {
            tracing::error!(error = %err, "failed to advance schedule after success");
        }
        tracing::info!(schedule_id = %schedule.schedule_id, execution_id = %execution.execution_id, "execution completed");
    }

    async fn finish_failure(&self, schedule: &Schedule, execution: &mut JobExecution, exit_code: Option<i32>, error_message: Option<String>) {
        execution.status = ExecutionStatus::Failed;
        execution.completed_at = Some(self.clock.now_local());
        execution.exit_code = exit_code.map(i64::from);
        execution.error_message = error_message.clone();

        let is_abort = self.abort_taxonomy.message_indicates_abort(error_message.as_deref())
            || self
                .vendor_db
                .get_latest_run_state(&schedule.experiment_name, Some(&schedule.experiment_path))
                .await
                .map(|state| state.is_abort())
                .unwrap_or(false);
        execution.was_abort = is_abort;

        if let Err(err) = self.store.update_execution(execution) {
            tracing::error!(error = %err, "failed to record failed execution");
        }

        let mut updated = schedule.clone();
        updated.failed_execution_count += 1;
        if let Err(err) = self.store.update_schedule(&updated) {
            tracing::error!(error = %err, "failed to bump failed_execution_count");
        }

        if is_abort {
            tracing::warn!(schedule_id = %schedule.schedule_id, "execution aborted, marking schedule for manual recovery");
            let marked = self.store.mark_recovery_required(
                updated,
                error_message.clone(),
                "scheduler".to_string(),
                self.clock.now_local(),
            );
            if let Err(err) = marked {
                tracing::error!(error = %err, "failed to mark recovery required");
            }

            let ctx = NotificationContext {
                schedule_id: Some(schedule.schedule_id),
                execution_id: Some(execution.execution_id),
                event_type: EventType::Aborted,
                contact_ids: schedule.notification_contact_ids.iter().copied().collect(),
                subject: format!("{} aborted", schedule.experiment_name),
                body: error_message.unwrap_or_else(|| "execution aborted".to_string()),
            };
            if let Err(err) = self.notifier.dispatch(ctx).await {
                tracing::error!(error = %err, "failed to dispatch abort notification");
            }
        }
    }

    fn clear_watch(&self, execution_id: ExecutionId, schedule_id: ScheduleId) {
        let mut state = self.state.lock();
        state.watches.remove(&execution_id);
        state.running.remove(&schedule_id);
    }

    /// Long-running watchdog (spec §4.H): notify once per watch when
    /// elapsed time passes `2 * expected_minutes`.
    async fn run_watchdog(&self) -> Result<(), EngineError> {
        let overdue: Vec<(ExecutionId, ScheduleId, Vec<robosched_core::ContactId>, u64)> = {
            let mut state = self.state.lock();
            let mut overdue = Vec::new();
            for watch in state.watches.values_mut() {
                if watch.is_overdue_for_watchdog() {
                    watch.notified_long_running = true;
                    overdue.push((watch.execution_id, watch.schedule_id, watch.contact_ids.clone(), watch.elapsed_minutes()));
                }
            }
            overdue
        };

        for (execution_id, schedule_id, contact_ids, elapsed_minutes) in overdue {
            let ctx = NotificationContext {
                schedule_id: Some(schedule_id),
                execution_id: Some(execution_id),
                event_type: EventType::LongRunning,
                contact_ids,
                subject: "Experiment running longer than expected".to_string(),
                body: format!("execution {execution_id} has run for {elapsed_minutes} minutes"),
            };
            self.notifier.dispatch(ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
