// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! robosched-storage: the embedded SQLite-backed scheduling store
//! (spec §4.B, §6.1).
//!
//! A single [`SqliteStore`] owns one [`rusqlite::Connection`] behind a
//! [`parking_lot::Mutex`] — the same single-connection-lock shape the
//! original scheduling database used, appropriate for a single-writer
//! embedded daemon rather than a pool.

mod contacts;
mod executions;
mod notifications;
mod recovery;
mod row;
mod schedules;

pub mod error;
mod schema;

pub use error::StoreError;
pub use executions::ExecutionSummary;
pub use notifications::NotificationLogFilter;

use parking_lot::Mutex;
use robosched_core::{Clock, SystemClock};
use rusqlite::Connection;
use std::path::Path;

/// Optimistic-concurrency tolerance window: an `updated_at` token within
/// this many seconds of the stored value is accepted as a match (spec
/// §4.B, §8 invariant 5) to absorb clock/serialisation jitter around the
/// second boundary.
pub const UPDATED_AT_TOLERANCE_SECONDS: i64 = 1;

/// The scheduling store: schedules, executions, contacts, notification
/// log/settings, and the global recovery flag (spec §4.B). Generic over
/// [`Clock`] so writes that server-generate `updated_at` (spec §4.B: "the
/// store owns `updated_at` generation on every write") can be driven by a
/// `FakeClock` in tests instead of the system clock.
pub struct SqliteStore<C = SystemClock> {
    conn: Mutex<Connection>,
    clock: C,
}

impl SqliteStore<SystemClock> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_clock(path, SystemClock)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open_in_memory_with_clock(SystemClock)
    }
}

impl<C: Clock> SqliteStore<C> {
    pub fn open_with_clock(path: impl AsRef<Path>, clock: C) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::initialize(&conn)?;
        Ok(Self { conn: Mutex::new(conn), clock })
    }

    pub fn open_in_memory_with_clock(clock: C) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::initialize(&conn)?;
        Ok(Self { conn: Mutex::new(conn), clock })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_in_memory_store() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }
}
