// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UUID-backed entity identifiers.
//!
//! The spec is explicit that entity ids are stable UUIDs (schedules,
//! executions, contacts, log entries), unlike the short nanoid-style
//! handles used elsewhere in this codebase family for ephemeral
//! in-process objects (timers, jobs). A single macro generates the
//! newtype boilerplate (`Display`, `FromStr`, serde, SQL conversions).

/// Define a UUID-backed id newtype.
macro_rules! define_uuid_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_uuid_id! {
    /// Identifies a [`Schedule`](crate::schedule::Schedule).
    pub struct ScheduleId;
}

define_uuid_id! {
    /// Identifies a [`JobExecution`](crate::execution::JobExecution).
    pub struct ExecutionId;
}

define_uuid_id! {
    /// Identifies a [`NotificationContact`](crate::contact::NotificationContact).
    pub struct ContactId;
}

define_uuid_id! {
    /// Identifies a [`NotificationLogEntry`](crate::notification::NotificationLogEntry).
    pub struct LogId;
}
