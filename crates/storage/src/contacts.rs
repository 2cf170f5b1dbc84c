// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NotificationContact CRUD (spec §4.B, §6.4).

use crate::row::{bool_to_int, format_timestamp, int_to_bool, parse_timestamp};
use crate::{SqliteStore, StoreError};
use robosched_core::{Clock, ContactId, NotificationContact};
use rusqlite::{params, Row};

impl<C: Clock> SqliteStore<C> {
    pub fn create_contact(&self, contact: &NotificationContact) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notification_contacts (
                contact_id, display_name, email_address, is_active, created_at, updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6)",
            params![
                contact.contact_id.to_string(),
                contact.display_name,
                contact.email_address,
                bool_to_int(contact.is_active),
                format_timestamp(contact.created_at),
                format_timestamp(contact.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_contact(&self, id: ContactId) -> Result<NotificationContact, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT * FROM notification_contacts WHERE contact_id = ?1",
            params![id.to_string()],
            row_to_contact,
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("contact {id}")),
            other => StoreError::Sqlite(other),
        })?
    }

    pub fn list_contacts(&self) -> Result<Vec<NotificationContact>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM notification_contacts ORDER BY display_name ASC")?;
        stmt.query_map([], row_to_contact)?.collect::<Result<Vec<_>, _>>()?.into_iter().collect()
    }

    pub fn update_contact(&self, contact: &NotificationContact) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "UPDATE notification_contacts SET
                display_name=?2, email_address=?3, is_active=?4, updated_at=?5
             WHERE contact_id=?1",
            params![
                contact.contact_id.to_string(),
                contact.display_name,
                contact.email_address,
                bool_to_int(contact.is_active),
                format_timestamp(contact.updated_at),
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("contact {}", contact.contact_id)));
        }
        Ok(())
    }

    pub fn delete_contact(&self, id: ContactId) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM notification_contacts WHERE contact_id = ?1", params![id.to_string()])?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("contact {id}")));
        }
        Ok(())
    }
}

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<Result<NotificationContact, StoreError>> {
    Ok(try_row_to_contact(row))
}

fn try_row_to_contact(row: &Row<'_>) -> Result<NotificationContact, StoreError> {
    let contact_id: String = row.get("contact_id")?;
    let contact_id: ContactId = contact_id
        .parse()
        .map_err(|_| StoreError::Corrupt { entity: "contact", id: contact_id.clone(), message: "invalid contact_id uuid".into() })?;
    Ok(NotificationContact {
        contact_id,
        display_name: row.get("display_name")?,
        email_address: row.get("email_address")?,
        is_active: int_to_bool(row.get("is_active")?),
        created_at: parse_timestamp(row.get("created_at")?).unwrap_or_default(),
        updated_at: parse_timestamp(row.get("updated_at")?).unwrap_or_default(),
    })
}
