// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The narrow in-process API surface (spec §6.5): every operation a caller
//! (the admin CLI today, conceivably an HTTP handler later) needs, realized
//! as a trait over the store and the running engine rather than a network
//! protocol. `SchedulingApi` is the one production implementation.

use crate::notifier::{NotificationContext, NotificationDispatcher};
use crate::queue::{detect_scheduling_conflicts, JobWindow};
use async_trait::async_trait;
use robosched_adapters::NotifyAdapter;
use robosched_core::{
    ApiError, Clock, ConflictInfo, ContactId, EventType, ManualRecoveryState, NotificationContact,
    NotificationLogEntry, NotificationSettings, Priority, Schedule, ScheduleId,
};
use robosched_storage::{ExecutionSummary, NotificationLogFilter, SqliteStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether the scheduler's background loop is currently running, for
/// `get_scheduler_status` (spec §6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerStatus {
    Running,
    Stopped,
}

/// A cheap, cloneable remote control for a [`crate::engine::SchedulerEngine`]
/// that doesn't require naming its adapter type parameters. The engine hands
/// one of these out via `handle()`; `Api` implementations hold it instead of
/// the engine itself, keeping the narrow-interface discipline (spec §9
/// Design Notes: break cyclic references via narrow interfaces).
#[derive(Clone)]
pub struct EngineHandle {
    pub(crate) started: Arc<AtomicBool>,
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl EngineHandle {
    /// A handle with no engine behind it: `status()` always reports
    /// `Stopped` and `stop()` is a no-op. For callers in a separate
    /// process from the daemon (the admin CLI, spec §4.M) that share the
    /// store but cannot reach the daemon's in-process engine directly —
    /// see DESIGN.md for this limitation.
    pub fn detached() -> Self {
        Self { started: Arc::new(AtomicBool::new(false)), cancelled: Arc::new(AtomicBool::new(true)) }
    }

    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn status(&self) -> SchedulerStatus {
        if self.started.load(Ordering::SeqCst) && !self.cancelled.load(Ordering::SeqCst) {
            SchedulerStatus::Running
        } else {
            SchedulerStatus::Stopped
        }
    }
}

/// Every operation §6.5 requires any caller to be able to perform.
#[async_trait]
pub trait Api: Send + Sync {
    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, ApiError>;
    async fn list_schedules(&self, active_only: bool) -> Result<Vec<Schedule>, ApiError>;
    async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, ApiError>;
    async fn update_schedule(&self, schedule: Schedule) -> Result<Schedule, ApiError>;
    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), ApiError>;

    async fn mark_recovery_required(
        &self,
        schedule_id: ScheduleId,
        note: Option<String>,
        actor: String,
    ) -> Result<(Schedule, ManualRecoveryState), ApiError>;
    async fn resolve_recovery_required(&self, schedule_id: ScheduleId, actor: String) -> Result<(Schedule, ManualRecoveryState), ApiError>;

    async fn get_manual_recovery_state(&self) -> Result<ManualRecoveryState, ApiError>;

    async fn list_upcoming(&self, hours_ahead: u32) -> Result<Vec<Schedule>, ApiError>;
    async fn check_conflicts(&self, drafts: Vec<Schedule>) -> Result<HashMap<ScheduleId, Vec<ConflictInfo>>, ApiError>;

    fn start_scheduler(&self) -> Result<(), ApiError>;
    fn stop_scheduler(&self) -> Result<(), ApiError>;
    fn get_scheduler_status(&self) -> SchedulerStatus;

    async fn create_contact(&self, contact: NotificationContact) -> Result<NotificationContact, ApiError>;
    async fn list_contacts(&self) -> Result<Vec<NotificationContact>, ApiError>;
    async fn update_contact(&self, contact: NotificationContact) -> Result<NotificationContact, ApiError>;
    async fn delete_contact(&self, id: ContactId) -> Result<(), ApiError>;

    async fn list_notification_logs(&self, filter: NotificationLogFilter) -> Result<Vec<NotificationLogEntry>, ApiError>;
    async fn get_notification_settings(&self) -> Result<NotificationSettings, ApiError>;
    async fn update_notification_settings(&self, settings: NotificationSettings) -> Result<(), ApiError>;

    async fn get_schedule_execution_summary(&self, schedule_id: ScheduleId) -> Result<ExecutionSummary, ApiError>;

    /// Send a one-off `Test` event notification to the given contacts, to
    /// verify SMTP configuration without waiting for a real scheduler
    /// event (spec §4.M `notifications send-test`).
    async fn send_test_notification(&self, contact_ids: Vec<ContactId>) -> Result<(), ApiError>;
}

/// The one production `Api` implementation: a thin pass-through to the
/// store plus a handle on the running engine for scheduler control.
pub struct SchedulingApi<C, N = robosched_adapters::SmtpNotifyAdapter> {
    store: Arc<SqliteStore>,
    engine: EngineHandle,
    clock: C,
    notifier: NotificationDispatcher<N, C>,
}

impl<C: Clock + Clone, N: NotifyAdapter> SchedulingApi<C, N> {
    pub fn new(store: Arc<SqliteStore>, engine: EngineHandle, clock: C, notify: N) -> Self {
        let notifier = NotificationDispatcher::new(Arc::clone(&store), notify, clock.clone());
        Self { store, engine, clock, notifier }
    }
}

#[async_trait]
impl<C: Clock + Clone, N: NotifyAdapter> Api for SchedulingApi<C, N> {
    async fn create_schedule(&self, schedule: Schedule) -> Result<Schedule, ApiError> {
        schedule.validate()?;
        self.store.create_schedule(&schedule)?;
        Ok(schedule)
    }

    async fn list_schedules(&self, active_only: bool) -> Result<Vec<Schedule>, ApiError> {
        Ok(self.store.list_schedules(active_only)?)
    }

    async fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, ApiError> {
        Ok(self.store.get_schedule(id)?)
    }

    async fn update_schedule(&self, schedule: Schedule) -> Result<Schedule, ApiError> {
        schedule.validate()?;
        self.store.update_schedule(&schedule)?;
        Ok(self.store.get_schedule(schedule.schedule_id)?)
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<(), ApiError> {
        Ok(self.store.delete_schedule(id)?)
    }

    async fn mark_recovery_required(
        &self,
        schedule_id: ScheduleId,
        note: Option<String>,
        actor: String,
    ) -> Result<(Schedule, ManualRecoveryState), ApiError> {
        let schedule = self.store.get_schedule(schedule_id)?;
        let updated = self.store.mark_recovery_required(schedule, note, actor, self.clock.now_local())?;
        let state = self.store.get_manual_recovery_state()?;
        Ok((updated, state))
    }

    async fn resolve_recovery_required(&self, schedule_id: ScheduleId, actor: String) -> Result<(Schedule, ManualRecoveryState), ApiError> {
        let schedule = self.store.get_schedule(schedule_id)?;
        let updated = self.store.resolve_recovery_required(schedule, actor)?;
        let state = self.store.get_manual_recovery_state()?;
        Ok((updated, state))
    }

    async fn get_manual_recovery_state(&self) -> Result<ManualRecoveryState, ApiError> {
        Ok(self.store.get_manual_recovery_state()?)
    }

    async fn list_upcoming(&self, hours_ahead: u32) -> Result<Vec<Schedule>, ApiError> {
        if !(1..=168).contains(&hours_ahead) {
            return Err(ApiError::validation("hours_ahead", "must be in [1,168]"));
        }
        let now = self.clock.now_local();
        let horizon = now + chrono::Duration::hours(i64::from(hours_ahead));
        let mut upcoming: Vec<Schedule> = self
            .store
            .list_schedules(true)?
            .into_iter()
            .filter(|s| matches!(s.start_time, Some(t) if t >= now && t <= horizon))
            .collect();
        upcoming.sort_by_key(|s| s.start_time);
        Ok(upcoming)
    }

    async fn check_conflicts(&self, drafts: Vec<Schedule>) -> Result<HashMap<ScheduleId, Vec<ConflictInfo>>, ApiError> {
        let now = self.clock.now_local();
        let windows: Vec<JobWindow> = drafts
            .iter()
            .map(|s| JobWindow {
                schedule_id: s.schedule_id,
                // Schedule carries no priority field of its own; every
                // draft is compared at Normal priority (spec §9 Open
                // Questions has no resolution naming a priority source, so
                // this defaults uniformly rather than guessing per-draft).
                priority: Priority::Normal,
                scheduled_time: s.start_time.unwrap_or(now),
                created_at: s.created_at,
                estimated_duration_minutes: s.estimated_duration_minutes,
            })
            .collect();
        Ok(detect_scheduling_conflicts(&windows, false))
    }

    fn start_scheduler(&self) -> Result<(), ApiError> {
        if self.engine.status() == SchedulerStatus::Running {
            return Err(ApiError::Conflict);
        }
        self.engine.cancelled.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop_scheduler(&self) -> Result<(), ApiError> {
        self.engine.stop();
        Ok(())
    }

    fn get_scheduler_status(&self) -> SchedulerStatus {
        self.engine.status()
    }

    async fn create_contact(&self, contact: NotificationContact) -> Result<NotificationContact, ApiError> {
        contact.validate()?;
        self.store.create_contact(&contact)?;
        Ok(contact)
    }

    async fn list_contacts(&self) -> Result<Vec<NotificationContact>, ApiError> {
        Ok(self.store.list_contacts()?)
    }

    async fn update_contact(&self, contact: NotificationContact) -> Result<NotificationContact, ApiError> {
        contact.validate()?;
        self.store.update_contact(&contact)?;
        Ok(self.store.get_contact(contact.contact_id)?)
    }

    async fn delete_contact(&self, id: ContactId) -> Result<(), ApiError> {
        Ok(self.store.delete_contact(id)?)
    }

    async fn list_notification_logs(&self, filter: NotificationLogFilter) -> Result<Vec<NotificationLogEntry>, ApiError> {
        Ok(self.store.get_notification_logs(&filter)?)
    }

    async fn get_notification_settings(&self) -> Result<NotificationSettings, ApiError> {
        let mut settings = self.store.get_notification_settings()?;
        settings.smtp_password_encrypted.clear();
        Ok(settings)
    }

    async fn update_notification_settings(&self, settings: NotificationSettings) -> Result<(), ApiError> {
        settings.validate()?;
        Ok(self.store.update_notification_settings(&settings)?)
    }

    async fn get_schedule_execution_summary(&self, schedule_id: ScheduleId) -> Result<ExecutionSummary, ApiError> {
        Ok(self.store.get_schedule_execution_summary(schedule_id)?)
    }

    async fn send_test_notification(&self, contact_ids: Vec<ContactId>) -> Result<(), ApiError> {
        let ctx = NotificationContext {
            schedule_id: None,
            execution_id: None,
            event_type: EventType::Test,
            contact_ids,
            subject: "robosched test notification".to_string(),
            body: "This is a test notification from robosched.".to_string(),
        };
        self.notifier.dispatch(ctx).await.map_err(|err| ApiError::Internal(err.to_string()))
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
