// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification dispatcher (spec §4.G): event-typed, at-most-once per
//! `(execution_id, event_type)`, enforced by inserting a `pending` log row
//! before send and refusing the dispatch if a prior row for the pair
//! exists.

use chrono::NaiveDateTime;
use robosched_adapters::{NotifyAdapter, OutboundEmail};
use robosched_core::{
    Clock, ContactId, EventType, ExecutionId, LogStatus, NotificationContact, NotificationLogEntry, ScheduleId,
};
use robosched_storage::SqliteStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the dispatcher needs to know about the triggering event,
/// independent of how the caller templates subject/body (spec §4.G step 4:
/// "templated per event type").
pub struct NotificationContext {
    pub schedule_id: Option<ScheduleId>,
    pub execution_id: Option<ExecutionId>,
    pub event_type: EventType,
    pub contact_ids: Vec<ContactId>,
    pub subject: String,
    pub body: String,
}

/// Dispatches a single notification, enforcing at-most-once-per-event
/// delivery and writing the outcome back to the notification log.
pub struct NotificationDispatcher<N, C> {
    store: Arc<SqliteStore>,
    notify: N,
    clock: C,
}

impl<N, C> NotificationDispatcher<N, C>
where
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(store: Arc<SqliteStore>, notify: N, clock: C) -> Self {
        Self { store, notify, clock }
    }

    /// Run the full dispatch procedure (spec §4.G steps 1-5). No-ops
    /// silently when there is no `execution_id` to key at-most-once on, or
    /// when a log row for this `(execution_id, event_type)` already exists.
    pub async fn dispatch(&self, ctx: NotificationContext) -> Result<(), robosched_storage::StoreError> {
        if let Some(execution_id) = ctx.execution_id {
            if self.store.notification_log_exists(execution_id, ctx.event_type)? {
                tracing::debug!(?execution_id, event_type = %ctx.event_type, "notification already dispatched for this event, skipping");
                return Ok(());
            }
        }

        let (active_contacts, missing) = self.resolve_contacts(&ctx.contact_ids)?;
        if active_contacts.is_empty() {
            tracing::info!(event_type = %ctx.event_type, "no active contacts, skipping notification dispatch");
            return Ok(());
        }

        let recipients: Vec<String> = active_contacts.iter().map(|c| c.email_address.clone()).collect();
        let mut metadata = HashMap::new();
        metadata.insert("context".to_string(), ctx.event_type.to_string());
        if !missing.is_empty() {
            metadata.insert("missing_contacts".to_string(), missing.join(","));
        }

        let now = self.clock.now_local();
        let mut entry = NotificationLogEntry {
            log_id: robosched_core::LogId::new(),
            schedule_id: ctx.schedule_id,
            execution_id: ctx.execution_id,
            event_type: ctx.event_type,
            status: LogStatus::Pending,
            recipients: recipients.clone(),
            subject: ctx.subject.clone(),
            message: ctx.body.clone(),
            error_message: None,
            metadata,
            triggered_at: now,
            processed_at: None,
        };
        self.store.create_notification_log(&entry)?;

        let settings = self.store.get_notification_settings()?;
        let email = OutboundEmail { recipients, subject: ctx.subject, body: ctx.body };
        let send_result = self.notify.send(&settings, &email).await;

        self.finalize(&mut entry, send_result, now);
        self.store.update_notification_log(&entry)?;
        Ok(())
    }

    fn finalize(
        &self,
        entry: &mut NotificationLogEntry,
        send_result: Result<(), robosched_adapters::NotifyError>,
        processed_at: NaiveDateTime,
    ) {
        entry.processed_at = Some(processed_at);
        match send_result {
            Ok(()) => {
                entry.status = LogStatus::Sent;
                tracing::info!(event_type = %entry.event_type, "notification sent");
            }
            Err(err) => {
                entry.status = LogStatus::Error;
                entry.error_message = Some(err.to_string());
                tracing::warn!(event_type = %entry.event_type, error = %err, "notification send failed");
            }
        }
    }

    fn resolve_contacts(&self, contact_ids: &[ContactId]) -> Result<(Vec<NotificationContact>, Vec<String>), robosched_storage::StoreError> {
        let mut active = Vec::new();
        let mut missing = Vec::new();
        for id in contact_ids {
            match self.store.get_contact(*id) {
                Ok(contact) if contact.is_active => active.push(contact),
                Ok(_) => {}
                Err(robosched_storage::StoreError::NotFound(_)) => missing.push(id.to_string()),
                Err(err) => return Err(err),
            }
        }
        Ok((active, missing))
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
