// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level integration specs, run against the built `robosched`
//! binary (spec §4.M). Each module exercises one command group end to
//! end against a fresh per-test SQLite store.

#[path = "specs/prelude.rs"]
mod prelude;
#[path = "specs/schedule.rs"]
mod schedule;
#[path = "specs/contact.rs"]
mod contact;
#[path = "specs/recovery.rs"]
mod recovery;
#[path = "specs/notifications.rs"]
mod notifications;
