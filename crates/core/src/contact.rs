// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NotificationContact: an email recipient attachable to one or more
//! schedules (spec §3, §4.G).

use crate::error::ApiError;
use crate::ids::ContactId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An email recipient attachable to one or more schedules (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContact {
    pub contact_id: ContactId,
    pub display_name: String,
    pub email_address: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NotificationContact {
    /// Minimal address-shape validation; delivery failures surface later as
    /// `NotificationLogEntry` errors rather than being pre-validated here.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.display_name.trim().is_empty() {
            return Err(ApiError::validation("display_name", "must not be empty"));
        }
        let addr = self.email_address.trim();
        if addr.is_empty() || !addr.contains('@') || addr.starts_with('@') || addr.ends_with('@') {
            return Err(ApiError::validation("email_address", "must be a valid email address"));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct NotificationContactBuilder => NotificationContact {
        into {
            display_name: String = "Lab Operator",
            email_address: String = "operator@example.com",
        }
        set {
            is_active: bool = true,
        }
        computed {
            contact_id: ContactId = ContactId::new(),
            created_at: NaiveDateTime = crate::test_support::test_now(),
            updated_at: NaiveDateTime = crate::test_support::test_now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_contact_passes() {
        assert!(NotificationContact::builder().build().validate().is_ok());
    }

    #[test]
    fn blank_display_name_is_invalid() {
        let contact = NotificationContact::builder().display_name("").build();
        assert!(contact.validate().is_err());
    }

    #[test]
    fn address_without_at_sign_is_invalid() {
        let contact = NotificationContact::builder().email_address("not-an-address").build();
        assert!(contact.validate().is_err());
    }

    #[test]
    fn address_with_leading_or_trailing_at_is_invalid() {
        let contact = NotificationContact::builder().email_address("@example.com").build();
        assert!(contact.validate().is_err());
        let contact = NotificationContact::builder().email_address("operator@").build();
        assert!(contact.validate().is_err());
    }
}
