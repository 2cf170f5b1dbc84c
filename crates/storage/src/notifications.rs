// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NotificationLogEntry and NotificationSettings persistence (spec §4.B,
//! §4.G, §6.4). The `(execution_id, event_type)` unique index enforces
//! at-most-once delivery per execution/event.

use crate::row::{bool_to_int, format_timestamp, format_timestamp_opt, int_to_bool, parse_timestamp};
use crate::{SqliteStore, StoreError};
use robosched_core::{Clock, EventType, ExecutionId, LogId, LogStatus, NotificationLogEntry, NotificationSettings, ScheduleId};
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

/// Filters for `get_notification_logs` (spec §6.4): `limit` must be in
/// `[1, 200]`, validated by the API layer before reaching the store.
#[derive(Debug, Clone, Default)]
pub struct NotificationLogFilter {
    pub schedule_id: Option<ScheduleId>,
    pub event_type: Option<EventType>,
    pub status: Option<LogStatus>,
    pub limit: u32,
}

impl<C: Clock> SqliteStore<C> {
    pub fn notification_log_exists(&self, execution_id: ExecutionId, event_type: EventType) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM notification_log WHERE execution_id = ?1 AND event_type = ?2",
                params![execution_id.to_string(), event_type.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn create_notification_log(&self, entry: &NotificationLogEntry) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notification_log (
                log_id, schedule_id, execution_id, event_type, status, recipients,
                subject, message, error_message, metadata, triggered_at, processed_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12)",
            params![
                entry.log_id.to_string(),
                entry.schedule_id.map(|id| id.to_string()),
                entry.execution_id.map(|id| id.to_string()),
                entry.event_type.to_string(),
                entry.status.to_string(),
                serde_json::to_string(&entry.recipients)?,
                entry.subject,
                entry.message,
                entry.error_message,
                serde_json::to_string(&entry.metadata)?,
                format_timestamp(entry.triggered_at),
                format_timestamp_opt(entry.processed_at),
            ],
        )?;
        Ok(())
    }

    pub fn update_notification_log(&self, entry: &NotificationLogEntry) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "UPDATE notification_log SET status=?2, error_message=?3, processed_at=?4 WHERE log_id=?1",
            params![
                entry.log_id.to_string(),
                entry.status.to_string(),
                entry.error_message,
                format_timestamp_opt(entry.processed_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("notification log {}", entry.log_id)));
        }
        Ok(())
    }

    pub fn get_notification_logs(&self, filter: &NotificationLogFilter) -> Result<Vec<NotificationLogEntry>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt_sql = "SELECT * FROM notification_log WHERE 1=1".to_string();
        if filter.schedule_id.is_some() {
            stmt_sql.push_str(" AND schedule_id = :schedule_id");
        }
        if filter.event_type.is_some() {
            stmt_sql.push_str(" AND event_type = :event_type");
        }
        if filter.status.is_some() {
            stmt_sql.push_str(" AND status = :status");
        }
        stmt_sql.push_str(" ORDER BY triggered_at DESC LIMIT :limit");

        let mut stmt = conn.prepare(&stmt_sql)?;
        let schedule_id = filter.schedule_id.map(|id| id.to_string());
        let event_type = filter.event_type.map(|e| e.to_string());
        let status = filter.status.map(|s| s.to_string());
        let mut named: Vec<(&str, &dyn rusqlite::ToSql)> = Vec::new();
        if let Some(ref id) = schedule_id {
            named.push((":schedule_id", id));
        }
        if let Some(ref et) = event_type {
            named.push((":event_type", et));
        }
        if let Some(ref st) = status {
            named.push((":status", st));
        }
        named.push((":limit", &filter.limit));

        let rows = stmt.query_map(named.as_slice(), row_to_log)?;
        rows.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
    }

    pub fn get_notification_settings(&self) -> Result<NotificationSettings, StoreError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT * FROM notification_settings WHERE id = 1", [], row_to_settings)?
    }

    pub fn update_notification_settings(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE notification_settings SET
                smtp_host=?1, smtp_port=?2, smtp_username=?3, smtp_password_encrypted=?4,
                sender_address=?5, use_tls=?6, use_ssl=?7, manual_recovery_recipients=?8,
                updated_at=?9
             WHERE id = 1",
            params![
                settings.smtp_host,
                settings.smtp_port,
                settings.smtp_username,
                settings.smtp_password_encrypted,
                settings.sender_address,
                bool_to_int(settings.use_tls),
                bool_to_int(settings.use_ssl),
                serde_json::to_string(&settings.manual_recovery_recipients)?,
                format_timestamp(settings.updated_at),
            ],
        )?;
        Ok(())
    }
}

fn row_to_log(row: &Row<'_>) -> rusqlite::Result<Result<NotificationLogEntry, StoreError>> {
    Ok(try_row_to_log(row))
}

fn try_row_to_log(row: &Row<'_>) -> Result<NotificationLogEntry, StoreError> {
    let log_id: String = row.get("log_id")?;
    let log_id: LogId = log_id
        .parse()
        .map_err(|_| StoreError::Corrupt { entity: "notification_log", id: log_id.clone(), message: "invalid log_id uuid".into() })?;
    let schedule_id: Option<String> = row.get("schedule_id")?;
    let execution_id: Option<String> = row.get("execution_id")?;
    let event_type: String = row.get("event_type")?;
    let status: String = row.get("status")?;
    let recipients: String = row.get("recipients")?;
    let metadata: Option<String> = row.get("metadata")?;

    let event_type = parse_event_type(&event_type).ok_or_else(|| StoreError::Corrupt {
        entity: "notification_log",
        id: log_id.to_string(),
        message: format!("unknown event_type {event_type}"),
    })?;
    let status = match status.as_str() {
        "pending" => LogStatus::Pending,
        "sent" => LogStatus::Sent,
        "error" => LogStatus::Error,
        other => {
            return Err(StoreError::Corrupt {
                entity: "notification_log",
                id: log_id.to_string(),
                message: format!("unknown status {other}"),
            })
        }
    };

    Ok(NotificationLogEntry {
        log_id,
        schedule_id: schedule_id.and_then(|s| s.parse().ok()),
        execution_id: execution_id.and_then(|s| s.parse().ok()),
        event_type,
        status,
        recipients: serde_json::from_str(&recipients)?,
        subject: row.get("subject")?,
        message: row.get("message")?,
        error_message: row.get("error_message")?,
        metadata: match metadata {
            Some(json) => serde_json::from_str(&json)?,
            None => HashMap::new(),
        },
        triggered_at: parse_timestamp(row.get("triggered_at")?).unwrap_or_default(),
        processed_at: parse_timestamp(row.get("processed_at")?),
    })
}

fn parse_event_type(s: &str) -> Option<EventType> {
    Some(match s {
        "aborted" => EventType::Aborted,
        "long_running" => EventType::LongRunning,
        "manual_recovery_required" => EventType::ManualRecoveryRequired,
        "manual_recovery_cleared" => EventType::ManualRecoveryCleared,
        "test" => EventType::Test,
        _ => return None,
    })
}

fn row_to_settings(row: &Row<'_>) -> rusqlite::Result<Result<NotificationSettings, StoreError>> {
    Ok(try_row_to_settings(row))
}

fn try_row_to_settings(row: &Row<'_>) -> Result<NotificationSettings, StoreError> {
    let recipients: Option<String> = row.get("manual_recovery_recipients")?;
    Ok(NotificationSettings {
        smtp_host: row.get("smtp_host")?,
        smtp_port: row.get("smtp_port")?,
        smtp_username: row.get("smtp_username")?,
        smtp_password_encrypted: row.get::<_, Option<Vec<u8>>>("smtp_password_encrypted")?.unwrap_or_default(),
        sender_address: row.get("sender_address")?,
        use_tls: int_to_bool(row.get("use_tls")?),
        use_ssl: int_to_bool(row.get("use_ssl")?),
        manual_recovery_recipients: match recipients {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        },
        created_at: parse_timestamp(row.get("created_at")?).unwrap_or_default(),
        updated_at: parse_timestamp(row.get("updated_at")?).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use robosched_core::test_support::test_now;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn log_exists_is_false_until_created() {
        let store = store();
        let execution_id = ExecutionId::new();
        assert!(!store.notification_log_exists(execution_id, EventType::Aborted).unwrap());

        let entry = NotificationLogEntry::builder().execution_id(execution_id).event_type(EventType::Aborted).build();
        store.create_notification_log(&entry).unwrap();
        assert!(store.notification_log_exists(execution_id, EventType::Aborted).unwrap());
    }

    #[test]
    fn duplicate_execution_event_pair_is_rejected_by_unique_index() {
        let store = store();
        let execution_id = ExecutionId::new();
        let first = NotificationLogEntry::builder().execution_id(execution_id).event_type(EventType::Aborted).build();
        let second = NotificationLogEntry::builder().execution_id(execution_id).event_type(EventType::Aborted).build();
        store.create_notification_log(&first).unwrap();
        assert!(store.create_notification_log(&second).is_err());
    }

    #[test]
    fn update_log_marks_sent() {
        let store = store();
        let mut entry = NotificationLogEntry::builder().build();
        store.create_notification_log(&entry).unwrap();
        entry.status = LogStatus::Sent;
        entry.processed_at = Some(test_now());
        store.update_notification_log(&entry).unwrap();

        let fetched = store.get_notification_logs(&NotificationLogFilter { limit: 10, ..Default::default() }).unwrap();
        assert_eq!(fetched[0].status, LogStatus::Sent);
    }

    #[test]
    fn settings_singleton_round_trips() {
        let store = store();
        let mut settings = store.get_notification_settings().unwrap();
        settings.smtp_host = "smtp.example.com".into();
        store.update_notification_settings(&settings).unwrap();
        let fetched = store.get_notification_settings().unwrap();
        assert_eq!(fetched.smtp_host, "smtp.example.com");
    }
}
