// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobExecution CRUD, history, and per-schedule summary (spec §4.B, §6.2).

use crate::row::{bool_to_int, format_timestamp, format_timestamp_opt, int_to_bool, parse_timestamp};
use crate::{SqliteStore, StoreError};
use robosched_core::{Clock, ExecutionId, ExecutionStatus, JobExecution, ScheduleId};
use rusqlite::{params, Row};
use serde::Serialize;

impl<C: Clock> SqliteStore<C> {
    pub fn create_execution(&self, execution: &JobExecution) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO job_executions (
                execution_id, schedule_id, status, attempt, scheduled_time,
                started_at, completed_at, exit_code, error_message, was_abort,
                created_at, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                execution.execution_id.to_string(),
                execution.schedule_id.to_string(),
                execution.status.to_string(),
                execution.attempt,
                format_timestamp(execution.scheduled_time),
                format_timestamp_opt(execution.started_at),
                format_timestamp_opt(execution.completed_at),
                execution.exit_code,
                execution.error_message,
                bool_to_int(execution.was_abort),
                format_timestamp(execution.created_at),
                format_timestamp(execution.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn update_execution(&self, execution: &JobExecution) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "UPDATE job_executions SET
                status=?2, attempt=?3, started_at=?4, completed_at=?5, exit_code=?6,
                error_message=?7, was_abort=?8, updated_at=?9
             WHERE execution_id=?1",
            params![
                execution.execution_id.to_string(),
                execution.status.to_string(),
                execution.attempt,
                format_timestamp_opt(execution.started_at),
                format_timestamp_opt(execution.completed_at),
                execution.exit_code,
                execution.error_message,
                bool_to_int(execution.was_abort),
                format_timestamp(execution.updated_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("execution {}", execution.execution_id)));
        }
        Ok(())
    }

    pub fn get_execution(&self, id: ExecutionId) -> Result<JobExecution, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM job_executions WHERE execution_id = ?1",
            params![id.to_string()],
            row_to_execution,
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("execution {id}")),
            other => StoreError::Sqlite(other),
        })?
    }

    /// History ordered most-recent-first, optionally scoped to one
    /// schedule, bounded by `limit` (spec §6.2 `get_execution_history`).
    pub fn get_execution_history(
        &self,
        schedule_id: Option<ScheduleId>,
        limit: u32,
    ) -> Result<Vec<JobExecution>, StoreError> {
        let conn = self.conn.lock();
        let rows = match schedule_id {
            Some(id) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM job_executions WHERE schedule_id = ?1
                     ORDER BY scheduled_time DESC LIMIT ?2",
                )?;
                stmt.query_map(params![id.to_string(), limit], row_to_execution)?
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM job_executions ORDER BY scheduled_time DESC LIMIT ?1")?;
                stmt.query_map(params![limit], row_to_execution)?.collect::<Result<Vec<_>, _>>()?
            }
        };
        rows.into_iter().collect()
    }

    /// Aggregate stats for one schedule (spec §6.2
    /// `get_schedule_execution_summary`).
    pub fn get_schedule_execution_summary(&self, schedule_id: ScheduleId) -> Result<ExecutionSummary, StoreError> {
        let executions = self.get_execution_history(Some(schedule_id), u32::MAX)?;
        let total = executions.len() as u32;
        let success = executions.iter().filter(|e| e.status == ExecutionStatus::Completed).count() as u32;
        let failed = executions
            .iter()
            .filter(|e| matches!(e.status, ExecutionStatus::Failed | ExecutionStatus::Missed))
            .count() as u32;
        let durations_minutes: Vec<i64> = executions
            .iter()
            .filter_map(|e| match (e.started_at, e.completed_at) {
                (Some(start), Some(end)) => Some((end - start).num_minutes()),
                _ => None,
            })
            .collect();
        let avg_duration_minutes = if durations_minutes.is_empty() {
            None
        } else {
            Some(durations_minutes.iter().sum::<i64>() as f64 / durations_minutes.len() as f64)
        };
        let last = executions.first().cloned();
        let success_rate = if total == 0 { None } else { Some(success as f64 / total as f64) };

        Ok(ExecutionSummary { total, success, failed, avg_duration_minutes, last, success_rate })
    }
}

/// Aggregate execution statistics for a schedule (spec §6.2). `next` is
/// computed by the engine from the schedule's recurrence, not stored here.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
    pub avg_duration_minutes: Option<f64>,
    pub last: Option<JobExecution>,
    pub success_rate: Option<f64>,
}

fn row_to_execution(row: &Row<'_>) -> rusqlite::Result<Result<JobExecution, StoreError>> {
    Ok(try_row_to_execution(row))
}

fn try_row_to_execution(row: &Row<'_>) -> Result<JobExecution, StoreError> {
    let execution_id: String = row.get("execution_id")?;
    let schedule_id: String = row.get("schedule_id")?;
    let status: String = row.get("status")?;

    let execution_id: ExecutionId = execution_id.parse().map_err(|_| StoreError::Corrupt {
        entity: "execution",
        id: execution_id.clone(),
        message: "invalid execution_id uuid".into(),
    })?;
    let schedule_id: ScheduleId = schedule_id.parse().map_err(|_| StoreError::Corrupt {
        entity: "execution",
        id: execution_id.to_string(),
        message: "invalid schedule_id uuid".into(),
    })?;
    let status = match status.as_str() {
        "pending" => ExecutionStatus::Pending,
        "queued" => ExecutionStatus::Queued,
        "running" => ExecutionStatus::Running,
        "completed" => ExecutionStatus::Completed,
        "failed" => ExecutionStatus::Failed,
        "missed" => ExecutionStatus::Missed,
        "blocked" => ExecutionStatus::Blocked,
        "retrying" => ExecutionStatus::Retrying,
        "cancelled" => ExecutionStatus::Cancelled,
        other => {
            return Err(StoreError::Corrupt {
                entity: "execution",
                id: execution_id.to_string(),
                message: format!("unknown status {other}"),
            })
        }
    };

    Ok(JobExecution {
        execution_id,
        schedule_id,
        status,
        attempt: row.get("attempt")?,
        scheduled_time: parse_timestamp(row.get("scheduled_time")?).unwrap_or_default(),
        started_at: parse_timestamp(row.get("started_at")?),
        completed_at: parse_timestamp(row.get("completed_at")?),
        exit_code: row.get("exit_code")?,
        error_message: row.get("error_message")?,
        was_abort: int_to_bool(row.get("was_abort")?),
        created_at: parse_timestamp(row.get("created_at")?).unwrap_or_default(),
        updated_at: parse_timestamp(row.get("updated_at")?).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use robosched_core::test_support::test_now;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        let schedule = robosched_core::Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();
        store
    }

    #[test]
    fn create_and_get_round_trips() {
        let store = store();
        let schedule_id = store.list_schedules(true).unwrap()[0].schedule_id;
        let execution = JobExecution::builder().schedule_id(schedule_id).build();
        store.create_execution(&execution).unwrap();
        let fetched = store.get_execution(execution.execution_id).unwrap();
        assert_eq!(fetched.status, ExecutionStatus::Pending);
    }

    #[test]
    fn update_changes_status() {
        let store = store();
        let schedule_id = store.list_schedules(true).unwrap()[0].schedule_id;
        let mut execution = JobExecution::builder().schedule_id(schedule_id).build();
        store.create_execution(&execution).unwrap();
        execution.status = ExecutionStatus::Running;
        store.update_execution(&execution).unwrap();
        let fetched = store.get_execution(execution.execution_id).unwrap();
        assert_eq!(fetched.status, ExecutionStatus::Running);
    }

    #[test]
    fn history_orders_most_recent_first() {
        let store = store();
        let schedule_id = store.list_schedules(true).unwrap()[0].schedule_id;
        let older = JobExecution::builder()
            .schedule_id(schedule_id)
            .scheduled_time(test_now())
            .build();
        let newer = JobExecution::builder()
            .schedule_id(schedule_id)
            .scheduled_time(test_now() + chrono::Duration::hours(1))
            .build();
        store.create_execution(&older).unwrap();
        store.create_execution(&newer).unwrap();
        let history = store.get_execution_history(Some(schedule_id), 10).unwrap();
        assert_eq!(history[0].execution_id, newer.execution_id);
    }

    #[test]
    fn summary_computes_success_rate() {
        let store = store();
        let schedule_id = store.list_schedules(true).unwrap()[0].schedule_id;
        let mut completed = JobExecution::builder().schedule_id(schedule_id).build();
        completed.status = ExecutionStatus::Completed;
        completed.started_at = Some(test_now());
        completed.completed_at = Some(test_now() + chrono::Duration::minutes(10));
        let mut failed = JobExecution::builder().schedule_id(schedule_id).build();
        failed.status = ExecutionStatus::Failed;
        store.create_execution(&completed).unwrap();
        store.create_execution(&failed).unwrap();

        let summary = store.get_schedule_execution_summary(schedule_id).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.success_rate, Some(0.5));
        assert_eq!(summary.avg_duration_minutes, Some(10.0));
    }
}
