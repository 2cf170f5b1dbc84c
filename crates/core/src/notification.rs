// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification log entries and SMTP settings (spec §3, §4.G).

use crate::ids::{ContactId, ExecutionId, LogId, ScheduleId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What triggered a notification (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Aborted,
    LongRunning,
    ManualRecoveryRequired,
    ManualRecoveryCleared,
    Test,
}

crate::simple_display! {
    EventType {
        Aborted => "aborted",
        LongRunning => "long_running",
        ManualRecoveryRequired => "manual_recovery_required",
        ManualRecoveryCleared => "manual_recovery_cleared",
        Test => "test",
    }
}

/// Delivery status of a [`NotificationLogEntry`] (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Pending,
    Sent,
    Error,
}

crate::simple_display! {
    LogStatus {
        Pending => "pending",
        Sent => "sent",
        Error => "error",
    }
}

/// A single notification attempt (spec §3). The pair `(execution_id,
/// event_type)` is unique at the store layer, enforcing at-most-once
/// delivery per execution/event (spec §4.G).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub log_id: LogId,
    pub schedule_id: Option<ScheduleId>,
    pub execution_id: Option<ExecutionId>,
    pub event_type: EventType,
    pub status: LogStatus,
    pub recipients: Vec<String>,
    pub subject: String,
    pub message: String,
    pub error_message: Option<String>,
    pub metadata: HashMap<String, String>,
    pub triggered_at: NaiveDateTime,
    pub processed_at: Option<NaiveDateTime>,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct NotificationLogEntryBuilder => NotificationLogEntry {
        into {
            subject: String = "Experiment aborted",
            message: String = "The experiment run was aborted.",
        }
        set {
            event_type: EventType = EventType::Aborted,
            status: LogStatus = LogStatus::Pending,
            recipients: Vec<String> = Vec::new(),
            metadata: HashMap<String, String> = HashMap::new(),
            triggered_at: NaiveDateTime = crate::test_support::test_now(),
        }
        option {
            schedule_id: ScheduleId = None,
            execution_id: ExecutionId = None,
            error_message: String = None,
            processed_at: NaiveDateTime = None,
        }
        computed {
            log_id: LogId = LogId::new(),
        }
    }
}

/// SMTP host/port plus the encrypted credential blob used to authenticate
/// (spec §4.G, §9 Open Questions: machine-scoped AES-GCM cipher rather than
/// the source's Windows DPAPI blob).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password_encrypted: Vec<u8>,
    pub sender_address: String,
    pub use_tls: bool,
    pub use_ssl: bool,
    pub manual_recovery_recipients: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NotificationSettings {
    /// `use_tls` (STARTTLS) and `use_ssl` (implicit TLS) are mutually
    /// exclusive on the wire (spec §4.G implementation note); both set is a
    /// configuration error rather than a silent precedence rule.
    pub fn validate(&self) -> Result<(), crate::error::ApiError> {
        if self.use_tls && self.use_ssl {
            return Err(crate::error::ApiError::validation(
                "use_tls/use_ssl",
                "mutually exclusive: choose STARTTLS or implicit TLS, not both",
            ));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(crate::error::ApiError::validation("smtp_host", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct NotificationSettingsBuilder => NotificationSettings {
        into {
            smtp_host: String = "smtp.example.com",
            smtp_username: String = "scheduler@example.com",
            sender_address: String = "scheduler@example.com",
        }
        set {
            smtp_port: u16 = 587,
            smtp_password_encrypted: Vec<u8> = Vec::new(),
            use_tls: bool = true,
            use_ssl: bool = false,
            manual_recovery_recipients: Vec<String> = Vec::new(),
        }
        computed {
            created_at: NaiveDateTime = crate::test_support::test_now(),
            updated_at: NaiveDateTime = crate::test_support::test_now(),
        }
    }
}
