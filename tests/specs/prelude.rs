// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test harness: a temp-dir-backed store and a `robosched` command
//! builder pinned to it via `ROBOSCHED_STORE_PATH`.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Project {
    _dir: TempDir,
    store_path: PathBuf,
}

impl Project {
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store_path = dir.path().join("robosched.sqlite3");
        Self { _dir: dir, store_path }
    }

    pub fn robosched(&self) -> Command {
        let mut cmd = Command::cargo_bin("robosched").expect("find robosched binary");
        cmd.env("ROBOSCHED_STORE_PATH", &self.store_path);
        cmd.env_remove("ROBOSCHED_SMTP_HOST");
        cmd
    }
}

/// Pull the leading UUID off a `robosched ... create` text line, e.g.
/// `"3fae...  my-experiment  once  active=true  recovery_required=false"`.
pub fn first_token(stdout: &str) -> String {
    stdout.split_whitespace().next().unwrap_or_default().to_string()
}
