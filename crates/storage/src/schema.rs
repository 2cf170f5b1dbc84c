// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema creation and column migration.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`, then any columns
//! added by later revisions of this schema are back-filled via
//! `PRAGMA table_info` + `ALTER TABLE ... ADD COLUMN`, the same pattern the
//! original scheduling database used so an existing `.db` file can be
//! opened by a newer binary without a separate migration tool.

use crate::error::StoreError;
use rusqlite::Connection;
use std::collections::HashSet;

const CREATE_SCHEDULES: &str = "
CREATE TABLE IF NOT EXISTS schedules (
    schedule_id TEXT PRIMARY KEY,
    experiment_name TEXT NOT NULL,
    experiment_path TEXT NOT NULL,
    schedule_type TEXT NOT NULL,
    interval_hours REAL,
    start_time TEXT,
    estimated_duration_minutes INTEGER NOT NULL DEFAULT 60,
    created_by TEXT NOT NULL DEFAULT 'system',
    is_active INTEGER NOT NULL DEFAULT 1,
    retry_config TEXT,
    prerequisites TEXT,
    notification_contact_ids TEXT,
    failed_execution_count INTEGER NOT NULL DEFAULT 0,
    recovery_required INTEGER NOT NULL DEFAULT 0,
    recovery_note TEXT,
    recovery_marked_at TEXT,
    recovery_marked_by TEXT,
    recovery_resolved_at TEXT,
    recovery_resolved_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const CREATE_JOB_EXECUTIONS: &str = "
CREATE TABLE IF NOT EXISTS job_executions (
    execution_id TEXT PRIMARY KEY,
    schedule_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    attempt INTEGER NOT NULL DEFAULT 1,
    scheduled_time TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    exit_code INTEGER,
    error_message TEXT,
    was_abort INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (schedule_id) REFERENCES schedules(schedule_id) ON DELETE CASCADE
)";

const CREATE_NOTIFICATION_CONTACTS: &str = "
CREATE TABLE IF NOT EXISTS notification_contacts (
    contact_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    email_address TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const CREATE_NOTIFICATION_LOG: &str = "
CREATE TABLE IF NOT EXISTS notification_log (
    log_id TEXT PRIMARY KEY,
    schedule_id TEXT,
    execution_id TEXT,
    event_type TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    recipients TEXT NOT NULL,
    subject TEXT NOT NULL,
    message TEXT NOT NULL,
    error_message TEXT,
    metadata TEXT,
    triggered_at TEXT NOT NULL,
    processed_at TEXT,
    UNIQUE (execution_id, event_type)
)";

const CREATE_NOTIFICATION_SETTINGS: &str = "
CREATE TABLE IF NOT EXISTS notification_settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    smtp_host TEXT NOT NULL DEFAULT '',
    smtp_port INTEGER NOT NULL DEFAULT 587,
    smtp_username TEXT NOT NULL DEFAULT '',
    smtp_password_encrypted BLOB,
    sender_address TEXT NOT NULL DEFAULT '',
    use_tls INTEGER NOT NULL DEFAULT 1,
    use_ssl INTEGER NOT NULL DEFAULT 0,
    manual_recovery_recipients TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const CREATE_SCHEDULER_STATE: &str = "
CREATE TABLE IF NOT EXISTS scheduler_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    recovery_active INTEGER NOT NULL DEFAULT 0,
    recovery_note TEXT,
    recovery_schedule_id TEXT,
    recovery_experiment_name TEXT,
    recovery_triggered_by TEXT,
    recovery_triggered_at TEXT,
    recovery_resolved_by TEXT,
    recovery_resolved_at TEXT
)";

/// Columns added after the initial release of each table, for
/// `PRAGMA table_info`-driven back-fill (spec §4.B implementation note).
const COLUMN_ALTERATIONS: &[(&str, &str, &str)] = &[
    (
        "schedules",
        "notification_contact_ids",
        "ALTER TABLE schedules ADD COLUMN notification_contact_ids TEXT",
    ),
    (
        "job_executions",
        "was_abort",
        "ALTER TABLE job_executions ADD COLUMN was_abort INTEGER NOT NULL DEFAULT 0",
    ),
];

pub fn initialize(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_SCHEDULES)?;
    conn.execute_batch(CREATE_JOB_EXECUTIONS)?;
    conn.execute_batch(CREATE_NOTIFICATION_CONTACTS)?;
    conn.execute_batch(CREATE_NOTIFICATION_LOG)?;
    conn.execute_batch(CREATE_NOTIFICATION_SETTINGS)?;
    conn.execute_batch(CREATE_SCHEDULER_STATE)?;

    conn.execute(
        "INSERT OR IGNORE INTO scheduler_state (id) VALUES (1)",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO notification_settings (id, created_at, updated_at) VALUES (1, '', '')",
        [],
    )?;

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_schedules_start_time ON schedules(start_time);
         CREATE INDEX IF NOT EXISTS idx_schedules_active ON schedules(is_active);
         CREATE INDEX IF NOT EXISTS idx_schedules_recovery_required ON schedules(recovery_required);
         CREATE INDEX IF NOT EXISTS idx_executions_status ON job_executions(status);
         CREATE INDEX IF NOT EXISTS idx_executions_schedule_id ON job_executions(schedule_id);
         CREATE INDEX IF NOT EXISTS idx_notification_log_event_type ON notification_log(event_type);",
    )?;

    backfill_columns(conn)?;
    Ok(())
}

fn backfill_columns(conn: &Connection) -> Result<(), StoreError> {
    for (table, column, alter_sql) in COLUMN_ALTERATIONS {
        let existing = existing_columns(conn, table)?;
        if !existing.contains(*column) {
            conn.execute(alter_sql, [])?;
            tracing::info!(table, column, "added column during schema migration");
        }
    }
    Ok(())
}

fn existing_columns(conn: &Connection, table: &str) -> Result<HashSet<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(names)
}
