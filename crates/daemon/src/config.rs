// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration assembled from environment variables (spec §4.K,
//! §6.6). Every field has a compiled-in default; only out-of-range values
//! raise `ConfigError` at startup, matching `fourthplaces-mntogether`'s
//! `Config::from_env` pattern — env vars, no remote config service.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), message: message.into() }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| invalid(key, format!("must be a non-negative integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(invalid(key, format!("must be a boolean, got {other:?}"))),
        },
        Err(_) => Ok(default),
    }
}

/// `scheduler.*` (spec §6.6).
#[derive(Debug, Clone)]
pub struct SchedulerSection {
    pub check_interval: Duration,
    pub startup_delay: Duration,
    pub max_concurrent_jobs: usize,
    /// `None` means autostart is disabled (`ROBOSCHED_SCHEDULER_AUTOSTART_DELAY_SECONDS=disable`).
    pub autostart_delay: Option<Duration>,
}

impl SchedulerSection {
    fn from_env() -> Result<Self, ConfigError> {
        let max_concurrent_jobs = env_u64("ROBOSCHED_SCHEDULER_MAX_CONCURRENT_JOBS", 1)?;
        if max_concurrent_jobs == 0 {
            return Err(invalid("ROBOSCHED_SCHEDULER_MAX_CONCURRENT_JOBS", "must be at least 1"));
        }
        let autostart_delay = match std::env::var("ROBOSCHED_SCHEDULER_AUTOSTART_DELAY_SECONDS") {
            Ok(raw) if raw.trim().eq_ignore_ascii_case("disable") => None,
            Ok(raw) => Some(Duration::from_secs(
                raw.parse().map_err(|_| invalid("ROBOSCHED_SCHEDULER_AUTOSTART_DELAY_SECONDS", format!("must be a non-negative integer or \"disable\", got {raw:?}")))?,
            )),
            Err(_) => Some(Duration::from_secs(60)),
        };
        Ok(Self {
            check_interval: Duration::from_secs(env_u64("ROBOSCHED_SCHEDULER_CHECK_INTERVAL_SECONDS", 30)?),
            startup_delay: Duration::from_secs(env_u64("ROBOSCHED_SCHEDULER_STARTUP_DELAY_SECONDS", 10)?),
            max_concurrent_jobs: max_concurrent_jobs as usize,
            autostart_delay,
        })
    }
}

/// `executor.*` (spec §6.6).
#[derive(Debug, Clone)]
pub struct ExecutorSection {
    pub vendor_bin_path: PathBuf,
    pub method_base_path: PathBuf,
    pub execution_timeout: Duration,
    pub retry_delay_base_seconds: u64,
    pub max_retry_attempts: u32,
}

impl ExecutorSection {
    fn from_env(data_dir: &std::path::Path) -> Result<Self, ConfigError> {
        let method_base_path = env_opt_string("ROBOSCHED_EXECUTOR_METHOD_BASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("methods"));
        let max_retry_attempts = env_u64("ROBOSCHED_EXECUTOR_MAX_RETRY_ATTEMPTS", 5)?;
        if max_retry_attempts == 0 {
            return Err(invalid("ROBOSCHED_EXECUTOR_MAX_RETRY_ATTEMPTS", "must be at least 1"));
        }
        Ok(Self {
            vendor_bin_path: PathBuf::from(env_string("ROBOSCHED_EXECUTOR_VENDOR_BIN_PATH", "C:/Program Files/Vendor/vendor.exe")),
            method_base_path,
            execution_timeout: Duration::from_secs(60 * env_u64("ROBOSCHED_EXECUTOR_EXECUTION_TIMEOUT_MINUTES", 120)?),
            retry_delay_base_seconds: env_u64("ROBOSCHED_EXECUTOR_RETRY_DELAY_BASE_SECONDS", 120)?,
            max_retry_attempts: max_retry_attempts as u32,
        })
    }
}

/// `vendor_db.*` — connection settings for the instrument's own SQL
/// Server database (spec §4.I, §6.3). §6.6's enumerated option list names
/// only `executor.vendor_bin_path`; it is silent on how the `tiberius`
/// adapter itself connects, so this section fills that gap under the same
/// `ROBOSCHED_<SECTION>_<FIELD>` convention (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct VendorDbSection {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl VendorDbSection {
    fn from_env() -> Result<Self, ConfigError> {
        let port = env_u64("ROBOSCHED_VENDOR_DB_PORT", 1433)?;
        Ok(Self {
            host: env_string("ROBOSCHED_VENDOR_DB_HOST", "localhost"),
            port: u16::try_from(port).map_err(|_| invalid("ROBOSCHED_VENDOR_DB_PORT", "must fit in a u16"))?,
            database: env_string("ROBOSCHED_VENDOR_DB_DATABASE", "Instrument"),
            username: env_string("ROBOSCHED_VENDOR_DB_USERNAME", ""),
            password: env_string("ROBOSCHED_VENDOR_DB_PASSWORD", ""),
        })
    }

    pub fn to_tiberius_config(&self) -> tiberius::Config {
        let mut config = tiberius::Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.database(&self.database);
        config.authentication(tiberius::AuthMethod::sql_server(&self.username, &self.password));
        config.trust_cert();
        config
    }
}

/// `process_monitor.*` (spec §6.6).
#[derive(Debug, Clone)]
pub struct ProcessMonitorSection {
    pub check_interval: Duration,
}

impl ProcessMonitorSection {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self { check_interval: Duration::from_secs(env_u64("ROBOSCHED_PROCESS_MONITOR_CHECK_INTERVAL_SECONDS", 5)?) })
    }
}

/// `store.*` (spec §6.6).
#[derive(Debug, Clone)]
pub struct StoreSection {
    pub path: PathBuf,
}

impl StoreSection {
    fn from_env(data_dir: &std::path::Path) -> Self {
        let path = env_opt_string("ROBOSCHED_STORE_PATH").map(PathBuf::from).unwrap_or_else(|| data_dir.join("robosched.sqlite3"));
        Self { path }
    }
}

/// `smtp.*` (spec §6.6, §4.G). The password is taken plaintext from the
/// environment and encrypted at rest via the machine-scoped cipher before
/// it is ever written to the store.
#[derive(Debug, Clone)]
pub struct SmtpSection {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_address: String,
    pub use_tls: bool,
    pub use_ssl: bool,
    pub manual_recovery_recipients: Vec<String>,
}

impl SmtpSection {
    fn from_env() -> Result<Self, ConfigError> {
        let use_tls = env_bool("ROBOSCHED_SMTP_USE_TLS", true)?;
        let use_ssl = env_bool("ROBOSCHED_SMTP_USE_SSL", false)?;
        if use_tls && use_ssl {
            return Err(invalid("ROBOSCHED_SMTP_USE_TLS/ROBOSCHED_SMTP_USE_SSL", "mutually exclusive: choose STARTTLS or implicit TLS, not both"));
        }
        let port = env_u64("ROBOSCHED_SMTP_PORT", 587)?;
        let recipients = env_opt_string("ROBOSCHED_SMTP_MANUAL_RECOVERY_RECIPIENTS")
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        Ok(Self {
            host: env_string("ROBOSCHED_SMTP_HOST", "localhost"),
            port: u16::try_from(port).map_err(|_| invalid("ROBOSCHED_SMTP_PORT", "must fit in a u16"))?,
            username: env_string("ROBOSCHED_SMTP_USERNAME", ""),
            password: env_string("ROBOSCHED_SMTP_PASSWORD", ""),
            sender_address: env_string("ROBOSCHED_SMTP_SENDER", "scheduler@example.com"),
            use_tls,
            use_ssl,
            manual_recovery_recipients: recipients,
        })
    }
}

/// The complete daemon configuration, assembled once at startup (spec §4.K).
#[derive(Debug, Clone)]
pub struct Config {
    pub scheduler: SchedulerSection,
    pub executor: ExecutorSection,
    pub process_monitor: ProcessMonitorSection,
    pub store: StoreSection,
    pub smtp: SmtpSection,
    pub vendor_db: VendorDbSection,
    pub log_dir: PathBuf,
}

impl Config {
    /// Load `.env` (development convenience, matching the teacher pack's
    /// `dotenvy` usage) then assemble the typed config from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("robosched");
        let log_dir = env_opt_string("ROBOSCHED_LOG_DIR").map(PathBuf::from).unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            scheduler: SchedulerSection::from_env()?,
            executor: ExecutorSection::from_env(&data_dir)?,
            process_monitor: ProcessMonitorSection::from_env()?,
            store: StoreSection::from_env(&data_dir),
            smtp: SmtpSection::from_env()?,
            vendor_db: VendorDbSection::from_env()?,
            log_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
