// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vendor process monitor (spec §4.C). Answers `is_vendor_running` cheaply
//! by polling the OS process table in a background task and caching the
//! result, rather than querying on every call.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::System;
use tokio::sync::watch;

/// Default poll interval (spec §6.6 `process_monitor.check_interval_seconds`).
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Narrow interface the engine consults before dispatch (spec §4.C, §4.F
/// `hamilton_busy`).
#[async_trait]
pub trait ProcessMonitor: Clone + Send + Sync + 'static {
    fn is_vendor_running(&self) -> bool;

    /// Poll until the vendor process is no longer running, or `timeout`
    /// elapses. Returns `true` if it became available within the window.
    async fn wait_for_available(&self, timeout: Duration) -> bool;
}

/// Real monitor: a background task polls `sysinfo`'s process table for a
/// process named `process_name` every `check_interval`, caching the last
/// answer behind a `watch` channel so readers never block on a syscall.
pub struct SysinfoProcessMonitor {
    running: watch::Receiver<bool>,
    _handle: Arc<tokio::task::JoinHandle<()>>,
}

impl Clone for SysinfoProcessMonitor {
    fn clone(&self) -> Self {
        Self { running: self.running.clone(), _handle: self._handle.clone() }
    }
}

impl SysinfoProcessMonitor {
    /// Spawn the background poller. `process_name` is matched
    /// case-insensitively against the OS process table (spec §4.C);
    /// on hosts where `sysinfo` can't enumerate processes the loop simply
    /// never flips `running` to true, which spec §4.C treats as the
    /// documented "returns false" fallback.
    pub fn spawn(process_name: impl Into<String>, check_interval: Duration) -> Self {
        let process_name = process_name.into();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut system = System::new();
            loop {
                system.refresh_processes();
                let running = system.processes().values().any(|p| p.name().to_lowercase().contains(&process_name.to_lowercase()));
                let _ = tx.send(running);
                tokio::time::sleep(check_interval).await;
            }
        });
        Self { running: rx, _handle: Arc::new(handle) }
    }
}

#[async_trait]
impl ProcessMonitor for SysinfoProcessMonitor {
    fn is_vendor_running(&self) -> bool {
        *self.running.borrow()
    }

    async fn wait_for_available(&self, timeout: Duration) -> bool {
        if !self.is_vendor_running() {
            return true;
        }
        let mut rx = self.running.clone();
        tokio::time::timeout(timeout, async {
            loop {
                if !*rx.borrow() {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        })
        .await
        .is_ok()
            && !self.is_vendor_running()
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::ProcessMonitor;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    /// Fake process monitor for testing: caller drives the running flag
    /// directly instead of waiting on real OS polling.
    #[derive(Clone, Default)]
    pub struct FakeProcessMonitor {
        running: Arc<Mutex<bool>>,
    }

    impl FakeProcessMonitor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_running(&self, running: bool) {
            *self.running.lock() = running;
        }
    }

    #[async_trait]
    impl ProcessMonitor for FakeProcessMonitor {
        fn is_vendor_running(&self) -> bool {
            *self.running.lock()
        }

        async fn wait_for_available(&self, timeout: Duration) -> bool {
            let deadline = tokio::time::Instant::now() + timeout;
            while self.is_vendor_running() {
                if tokio::time::Instant::now() >= deadline {
                    return false;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            true
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessMonitor;

#[cfg(test)]
#[path = "process_monitor_tests.rs"]
mod tests;
