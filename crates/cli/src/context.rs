// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the CLI against the same SQLite store the daemon uses (spec
//! §4.M). The CLI is a separate process: it gets its own `SchedulingApi`
//! over a detached [`EngineHandle`] rather than the daemon's running
//! engine, so `scheduler start/stop/status` only reflect store state, not
//! a live engine loop (see DESIGN.md).

use robosched_adapters::SmtpNotifyAdapter;
use robosched_core::SystemClock;
use robosched_engine::{EngineHandle, SchedulingApi};
use robosched_storage::SqliteStore;
use std::path::PathBuf;
use std::sync::Arc;

pub fn store_path() -> PathBuf {
    if let Ok(path) = std::env::var("ROBOSCHED_STORE_PATH") {
        return PathBuf::from(path);
    }
    let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("robosched");
    data_dir.join("robosched.sqlite3")
}

pub fn build_api() -> anyhow::Result<SchedulingApi<SystemClock, SmtpNotifyAdapter>> {
    let _ = dotenvy::dotenv();
    let path = store_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(SqliteStore::open(&path)?);
    Ok(SchedulingApi::new(store, EngineHandle::detached(), SystemClock, SmtpNotifyAdapter::new()))
}
