// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tracing-subscriber` setup: `EnvFilter` plus a daily rolling file
//! appender alongside stderr, matching the teacher daemon's logging setup
//! (spec §4.J, §4.L).

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber. The returned [`WorkerGuard`] must be
/// held for the process lifetime — dropping it stops the background
/// writer thread and silently truncates in-flight log lines.
pub fn init(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "robosched-daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("ROBOSCHED_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.and(std::io::stderr))
        .with_ansi(false)
        .init();

    Ok(guard)
}
