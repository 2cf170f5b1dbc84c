// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment executor (spec §4.E): spawns the vendor binary, retries
//! against the process monitor, classifies outcomes, and reclassifies an
//! apparently-successful run as an abort if the instrument DB says
//! otherwise.

use crate::error::ExecuteError;
use async_trait::async_trait;
use robosched_adapters::{ProcessMonitor, VendorDbAdapter};
use robosched_core::{BackoffStrategy, RetryConfig, Schedule};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Result of a full execute attempt (including retries), before the
/// caller maps it onto a `JobExecution` row.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub error_message: Option<String>,
}

/// Resolve `experiment_path` against `method_base_path`, ensuring a
/// `.med` suffix (spec §4.E path resolution).
pub fn resolve_method_path(experiment_path: &str, method_base_path: &Path) -> PathBuf {
    let mut path = PathBuf::from(experiment_path);
    let has_med_extension = path.extension().map(|ext| ext == "med").unwrap_or(false);
    if !has_med_extension {
        path.set_extension("med");
    }
    if path.is_absolute() {
        path
    } else {
        method_base_path.join(path)
    }
}

/// Back-off duration before attempt `attempt` (0-indexed), per spec §4.E.
pub fn backoff_duration(retry_config: &RetryConfig, attempt: u32) -> Duration {
    let base = Duration::from_secs(u64::from(retry_config.retry_delay_minutes) * 60);
    match retry_config.backoff_strategy {
        BackoffStrategy::Linear => base,
        BackoffStrategy::Exponential => {
            let scaled = base.saturating_mul(2u32.saturating_pow(attempt));
            scaled.min(Duration::from_secs(30 * 60))
        }
    }
}

/// Narrow interface over "run the vendor binary once". Split out from
/// [`ExperimentExecutor`] so tests can substitute a fake without spawning
/// real processes (same pattern as the other adapter traits).
#[async_trait]
pub trait CommandRunner: Clone + Send + Sync + 'static {
    async fn run(&self, method_path: &Path, timeout: Duration) -> CommandOutcome;
}

#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub timed_out: bool,
}

/// Real vendor-binary invocation via `tokio::process::Command`.
#[derive(Clone)]
pub struct VendorBinaryRunner {
    vendor_bin_path: PathBuf,
}

impl VendorBinaryRunner {
    pub fn new(vendor_bin_path: impl Into<PathBuf>) -> Self {
        Self { vendor_bin_path: vendor_bin_path.into() }
    }
}

#[async_trait]
impl CommandRunner for VendorBinaryRunner {
    async fn run(&self, method_path: &Path, timeout: Duration) -> CommandOutcome {
        let mut command = Command::new(&self.vendor_bin_path);
        command.arg(method_path).arg("-t").stdout(Stdio::piped()).stderr(Stdio::piped());
        #[cfg(windows)]
        {
            // CREATE_NEW_PROCESS_GROUP so a break signal reaches only the
            // vendor process, not this one (spec §4.E, §6.2).
            use std::os::windows::process::CommandExt;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            command.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                return CommandOutcome { exit_code: None, stderr: err.to_string(), timed_out: false };
            }
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => CommandOutcome {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
            },
            Ok(Err(err)) => CommandOutcome { exit_code: None, stderr: err.to_string(), timed_out: false },
            Err(_) => CommandOutcome { exit_code: None, stderr: "execution timeout".into(), timed_out: true },
        }
    }
}

/// Coordinates path resolution, retry/back-off, process-monitor checks,
/// and abort reclassification around a single [`CommandRunner`].
pub struct ExperimentExecutor<R, P, V> {
    runner: R,
    process_monitor: P,
    vendor_db: V,
    method_base_path: PathBuf,
    execution_timeout: Duration,
}

impl<R, P, V> ExperimentExecutor<R, P, V>
where
    R: CommandRunner,
    P: ProcessMonitor,
    V: VendorDbAdapter,
{
    pub fn new(runner: R, process_monitor: P, vendor_db: V, method_base_path: PathBuf, execution_timeout: Duration) -> Self {
        Self { runner, process_monitor, vendor_db, method_base_path, execution_timeout }
    }

    /// Run `schedule` to completion, retrying per its `retry_config`
    /// (spec §4.E). Returns the final outcome across all attempts.
    pub async fn execute(&self, schedule: &Schedule) -> Result<ExecutionOutcome, ExecuteError> {
        let method_path = resolve_method_path(&schedule.experiment_path, &self.method_base_path);
        if !method_path.exists() {
            return Err(ExecuteError::PathNotFound(method_path.display().to_string()));
        }

        let max_attempts = schedule.retry_config.max_retries.min(5).max(1);
        let mut last_outcome = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let wait = backoff_duration(&schedule.retry_config, attempt);
                tracing::info!(schedule_id = %schedule.schedule_id, attempt, wait_secs = wait.as_secs(), "retrying after backoff");
                tokio::time::sleep(wait).await;
            }

            if self.process_monitor.is_vendor_running() {
                tracing::info!(schedule_id = %schedule.schedule_id, "vendor busy, deferring attempt");
                last_outcome = Some(self.classify(None, "vendor busy".into(), false));
                continue;
            }

            tracing::info!(schedule_id = %schedule.schedule_id, path = %method_path.display(), attempt, "spawning vendor binary");
            let result = self.runner.run(&method_path, self.execution_timeout).await;
            let outcome = self.classify(result.exit_code, result.stderr, result.timed_out);

            if outcome.success {
                return Ok(self.reclassify_on_abort(schedule, outcome).await);
            }
            last_outcome = Some(outcome);
        }

        Ok(last_outcome.unwrap_or(ExecutionOutcome { success: false, exit_code: None, error_message: Some("no attempts made".into()) }))
    }

    fn classify(&self, exit_code: Option<i32>, stderr: String, timed_out: bool) -> ExecutionOutcome {
        if timed_out {
            return ExecutionOutcome { success: false, exit_code: None, error_message: Some("Execution timeout".into()) };
        }
        match exit_code {
            Some(0) => ExecutionOutcome { success: true, exit_code: Some(0), error_message: None },
            Some(code) => ExecutionOutcome {
                success: false,
                exit_code: Some(code),
                error_message: Some(format!("return code {code}: {stderr}")),
            },
            None => ExecutionOutcome { success: false, exit_code: None, error_message: Some(stderr) },
        }
    }

    async fn reclassify_on_abort(&self, schedule: &Schedule, outcome: ExecutionOutcome) -> ExecutionOutcome {
        let Some(state) = self.vendor_db.get_latest_run_state(&schedule.experiment_name, Some(&schedule.experiment_path)).await else {
            return outcome;
        };
        if state.is_abort() {
            return ExecutionOutcome {
                success: false,
                exit_code: outcome.exit_code,
                error_message: Some(format!("Hamilton reported last run as {state}")),
            };
        }
        outcome
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::{CommandOutcome, CommandRunner};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    pub struct FakeCommandRunner {
        next: Arc<Mutex<Vec<CommandOutcome>>>,
        calls: Arc<Mutex<u32>>,
    }

    impl FakeCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue outcomes to return on successive calls, last-in served last.
        pub fn push_outcome(&self, outcome: CommandOutcome) {
            self.next.lock().insert(0, outcome);
        }

        pub fn call_count(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl CommandRunner for FakeCommandRunner {
        async fn run(&self, _method_path: &Path, _timeout: Duration) -> CommandOutcome {
            *self.calls.lock() += 1;
            self.next.lock().pop().unwrap_or(CommandOutcome { exit_code: Some(0), stderr: String::new(), timed_out: false })
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
