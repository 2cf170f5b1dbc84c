// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule CRUD (spec §4.B, §6.1) with optimistic concurrency on
//! `updated_at`.

use crate::row::{bool_to_int, format_timestamp, format_timestamp_opt, int_to_bool, parse_timestamp};
use crate::{SqliteStore, StoreError, UPDATED_AT_TOLERANCE_SECONDS};
use robosched_core::{
    BackoffStrategy, Clock, ContactId, PrerequisiteStep, RetryConfig, Schedule, ScheduleId, ScheduleType,
};
use rusqlite::{params, Row};
use std::collections::HashSet;

impl<C: Clock> SqliteStore<C> {
    pub fn create_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO schedules (
                schedule_id, experiment_name, experiment_path, schedule_type,
                interval_hours, start_time, estimated_duration_minutes, created_by,
                is_active, retry_config, prerequisites, notification_contact_ids,
                failed_execution_count, recovery_required, recovery_note,
                recovery_marked_at, recovery_marked_by, recovery_resolved_at,
                recovery_resolved_by, created_at, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21)",
            params![
                schedule.schedule_id.to_string(),
                schedule.experiment_name,
                schedule.experiment_path,
                schedule.schedule_type.to_string(),
                schedule.interval_hours,
                format_timestamp_opt(schedule.start_time),
                schedule.estimated_duration_minutes,
                schedule.created_by,
                bool_to_int(schedule.is_active),
                serde_json::to_string(&schedule.retry_config)?,
                serde_json::to_string(&schedule.prerequisites)?,
                serde_json::to_string(
                    &schedule.notification_contact_ids.iter().map(|c| c.to_string()).collect::<Vec<_>>()
                )?,
                schedule.failed_execution_count,
                bool_to_int(schedule.recovery_required),
                schedule.recovery_note,
                format_timestamp_opt(schedule.recovery_marked_at),
                schedule.recovery_marked_by,
                format_timestamp_opt(schedule.recovery_resolved_at),
                schedule.recovery_resolved_by,
                format_timestamp(schedule.created_at),
                format_timestamp(schedule.updated_at),
            ],
        )?;
        tracing::info!(schedule_id = %schedule.schedule_id, "created schedule");
        Ok(())
    }

    pub fn get_schedule(&self, id: ScheduleId) -> Result<Schedule, StoreError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT * FROM schedules WHERE schedule_id = ?1", params![id.to_string()], row_to_schedule)
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("schedule {id}")),
                other => StoreError::Sqlite(other),
            })?
    }

    /// All schedules, or only active ones when `active_only`.
    pub fn list_schedules(&self, active_only: bool) -> Result<Vec<Schedule>, StoreError> {
        let conn = self.conn.lock();
        let sql = if active_only {
            "SELECT * FROM schedules WHERE is_active = 1 ORDER BY start_time ASC"
        } else {
            "SELECT * FROM schedules ORDER BY start_time ASC"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], row_to_schedule)?;
        rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect::<Result<Vec<_>, _>>()
    }

    /// Replace a schedule's mutable fields, rejecting the write if
    /// `expected_updated_at` has drifted more than
    /// [`UPDATED_AT_TOLERANCE_SECONDS`] from the stored value (spec §4.B).
    /// `schedule.updated_at` is used only as that comparison token; the
    /// store generates the persisted `updated_at` itself from its own
    /// clock, so it is always strictly greater than the prior value (spec
    /// §4.B: "the store owns `updated_at` generation on every write").
    pub fn update_schedule(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let stored_updated_at: String = conn
            .query_row(
                "SELECT updated_at FROM schedules WHERE schedule_id = ?1",
                params![schedule.schedule_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("schedule {}", schedule.schedule_id))
                }
                other => StoreError::Sqlite(other),
            })?;
        let stored = parse_timestamp(Some(stored_updated_at)).ok_or_else(|| StoreError::Corrupt {
            entity: "schedule",
            id: schedule.schedule_id.to_string(),
            message: "unparseable updated_at".into(),
        })?;
        let drift = (stored - schedule.updated_at).num_seconds().abs();
        if drift > UPDATED_AT_TOLERANCE_SECONDS {
            return Err(StoreError::Conflict { entity: "schedule", id: schedule.schedule_id.to_string() });
        }
        let now = self.clock.now_local();

        conn.execute(
            "UPDATE schedules SET
                experiment_name=?2, experiment_path=?3, schedule_type=?4, interval_hours=?5,
                start_time=?6, estimated_duration_minutes=?7, is_active=?8, retry_config=?9,
                prerequisites=?10, notification_contact_ids=?11, failed_execution_count=?12,
                recovery_required=?13, recovery_note=?14, recovery_marked_at=?15,
                recovery_marked_by=?16, recovery_resolved_at=?17, recovery_resolved_by=?18,
                updated_at=?19
             WHERE schedule_id=?1",
            params![
                schedule.schedule_id.to_string(),
                schedule.experiment_name,
                schedule.experiment_path,
                schedule.schedule_type.to_string(),
                schedule.interval_hours,
                format_timestamp_opt(schedule.start_time),
                schedule.estimated_duration_minutes,
                bool_to_int(schedule.is_active),
                serde_json::to_string(&schedule.retry_config)?,
                serde_json::to_string(&schedule.prerequisites)?,
                serde_json::to_string(
                    &schedule.notification_contact_ids.iter().map(|c| c.to_string()).collect::<Vec<_>>()
                )?,
                schedule.failed_execution_count,
                bool_to_int(schedule.recovery_required),
                schedule.recovery_note,
                format_timestamp_opt(schedule.recovery_marked_at),
                schedule.recovery_marked_by,
                format_timestamp_opt(schedule.recovery_resolved_at),
                schedule.recovery_resolved_by,
                format_timestamp(now),
            ],
        )?;
        Ok(())
    }

    pub fn delete_schedule(&self, id: ScheduleId) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM schedules WHERE schedule_id = ?1", params![id.to_string()])?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("schedule {id}")));
        }
        Ok(())
    }
}

fn row_to_schedule(row: &Row<'_>) -> rusqlite::Result<Result<Schedule, StoreError>> {
    Ok(try_row_to_schedule(row))
}

fn try_row_to_schedule(row: &Row<'_>) -> Result<Schedule, StoreError> {
    let schedule_id: String = row.get("schedule_id")?;
    let schedule_type: String = row.get("schedule_type")?;
    let retry_config: Option<String> = row.get("retry_config")?;
    let prerequisites: Option<String> = row.get("prerequisites")?;
    let contact_ids: Option<String> = row.get("notification_contact_ids")?;

    let schedule_id: ScheduleId = schedule_id.parse().map_err(|_| StoreError::Corrupt {
        entity: "schedule",
        id: row.get::<_, String>("schedule_id").unwrap_or_default(),
        message: "invalid schedule_id uuid".into(),
    })?;

    let schedule_type = match schedule_type.as_str() {
        "once" => ScheduleType::Once,
        "interval" => ScheduleType::Interval,
        "cron" => ScheduleType::Cron,
        other => {
            return Err(StoreError::Corrupt {
                entity: "schedule",
                id: schedule_id.to_string(),
                message: format!("unknown schedule_type {other}"),
            })
        }
    };

    let retry_config: RetryConfig = match retry_config {
        Some(json) => serde_json::from_str(&json)?,
        None => RetryConfig { backoff_strategy: BackoffStrategy::Linear, ..RetryConfig::default() },
    };
    let prerequisites: Vec<PrerequisiteStep> = match prerequisites {
        Some(json) => serde_json::from_str(&json)?,
        None => Vec::new(),
    };
    let notification_contact_ids: HashSet<ContactId> = match contact_ids {
        Some(json) => {
            let raw: Vec<String> = serde_json::from_str(&json)?;
            raw.iter().filter_map(|s| s.parse().ok()).collect()
        }
        None => HashSet::new(),
    };

    Ok(Schedule {
        schedule_id,
        experiment_name: row.get("experiment_name")?,
        experiment_path: row.get("experiment_path")?,
        schedule_type,
        interval_hours: row.get("interval_hours")?,
        start_time: parse_timestamp(row.get("start_time")?),
        estimated_duration_minutes: row.get("estimated_duration_minutes")?,
        is_active: int_to_bool(row.get("is_active")?),
        retry_config,
        prerequisites,
        notification_contact_ids,
        failed_execution_count: row.get("failed_execution_count")?,
        recovery_required: int_to_bool(row.get("recovery_required")?),
        recovery_note: row.get("recovery_note")?,
        recovery_marked_at: parse_timestamp(row.get("recovery_marked_at")?),
        recovery_marked_by: row.get("recovery_marked_by")?,
        recovery_resolved_at: parse_timestamp(row.get("recovery_resolved_at")?),
        recovery_resolved_by: row.get("recovery_resolved_by")?,
        created_by: row.get("created_by")?,
        created_at: parse_timestamp(row.get("created_at")?).unwrap_or_default(),
        updated_at: parse_timestamp(row.get("updated_at")?).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteStore;
    use robosched_core::test_support::test_now;
    use robosched_core::FakeClock;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_get_round_trips() {
        let store = store();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();
        let fetched = store.get_schedule(schedule.schedule_id).unwrap();
        assert_eq!(fetched.experiment_name, schedule.experiment_name);
        assert_eq!(fetched.schedule_type, schedule.schedule_type);
    }

    #[test]
    fn get_missing_schedule_errors_not_found() {
        let store = store();
        let err = store.get_schedule(ScheduleId::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_active_only_filters_inactive() {
        let store = store();
        let active = Schedule::builder().start_time(test_now()).is_active(true).build();
        let inactive = Schedule::builder().start_time(test_now()).is_active(false).build();
        store.create_schedule(&active).unwrap();
        store.create_schedule(&inactive).unwrap();
        let listed = store.list_schedules(true).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].schedule_id, active.schedule_id);
    }

    #[test]
    fn update_rejects_stale_updated_at() {
        let store = store();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();

        let mut stale = schedule.clone();
        stale.experiment_name = "Renamed".into();
        stale.updated_at = test_now() - chrono::Duration::hours(1);
        let err = store.update_schedule(&stale).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn update_within_tolerance_window_succeeds() {
        let store = store();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();

        let mut edited = schedule.clone();
        edited.experiment_name = "Renamed".into();
        edited.updated_at = schedule.updated_at + chrono::Duration::milliseconds(500);
        store.update_schedule(&edited).unwrap();

        let fetched = store.get_schedule(schedule.schedule_id).unwrap();
        assert_eq!(fetched.experiment_name, "Renamed");
    }

    #[test]
    fn update_server_generates_updated_at_ignoring_caller_value() {
        let clock = FakeClock::new();
        clock.set_local(test_now());
        let store = SqliteStore::open_in_memory_with_clock(clock.clone()).unwrap();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();

        clock.advance(std::time::Duration::from_secs(3600));
        let mut edited = schedule.clone();
        edited.experiment_name = "Renamed".into();
        // caller's token matches the stored value within tolerance, so the
        // write is accepted; the persisted updated_at nonetheless comes
        // from the store's own clock, not the caller-supplied token.
        store.update_schedule(&edited).unwrap();

        let fetched = store.get_schedule(schedule.schedule_id).unwrap();
        assert_eq!(fetched.experiment_name, "Renamed");
        assert_eq!(fetched.updated_at, clock.now_local());
        assert_ne!(fetched.updated_at, schedule.updated_at);
    }

    #[test]
    fn delete_removes_schedule() {
        let store = store();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();
        store.delete_schedule(schedule.schedule_id).unwrap();
        assert!(matches!(store.get_schedule(schedule.schedule_id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_missing_schedule_errors() {
        let store = store();
        assert!(matches!(store.delete_schedule(ScheduleId::new()), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn prerequisites_and_contacts_round_trip() {
        let store = store();
        let mut schedule = Schedule::builder().start_time(test_now()).build();
        schedule.prerequisites = vec![PrerequisiteStep::parse("ResetHamiltonTables:Queue")];
        schedule.notification_contact_ids = [ContactId::new()].into_iter().collect();
        store.create_schedule(&schedule).unwrap();
        let fetched = store.get_schedule(schedule.schedule_id).unwrap();
        assert_eq!(fetched.prerequisites.len(), 1);
        assert_eq!(fetched.notification_contact_ids.len(), 1);
    }
}
