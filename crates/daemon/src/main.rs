// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! robosched-daemon: the single binary owning process lifetime for the
//! scheduler (spec §4.J). Loads configuration, wires the store/adapters/
//! engine behind narrow traits, starts the engine as a background task
//! unless autostart is disabled, and drains the current tick on shutdown.

mod config;
mod logging;
mod shutdown;

use config::Config;
use robosched_adapters::{SmtpNotifyAdapter, SysinfoProcessMonitor, TiberiusVendorDbAdapter};
use robosched_core::{NotificationSettings, SystemClock};
use robosched_engine::{EngineConfig, ExperimentExecutor, NotificationDispatcher, SchedulerEngine, VendorBinaryRunner};
use robosched_storage::SqliteStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_dir)?;
    tracing::info!("robosched-daemon starting");

    let store = Arc::new(SqliteStore::open(&config.store.path)?);
    ensure_notification_settings(&store, &config)?;

    let process_name = config
        .executor
        .vendor_bin_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vendor")
        .to_string();
    let process_monitor = SysinfoProcessMonitor::spawn(process_name, config.process_monitor.check_interval);
    let vendor_db = TiberiusVendorDbAdapter::new(config.vendor_db.to_tiberius_config());
    let runner = VendorBinaryRunner::new(config.executor.vendor_bin_path.clone());

    let executor = Arc::new(ExperimentExecutor::new(
        runner,
        process_monitor.clone(),
        vendor_db.clone(),
        config.executor.method_base_path.clone(),
        config.executor.execution_timeout,
    ));
    let notifier = Arc::new(NotificationDispatcher::new(Arc::clone(&store), SmtpNotifyAdapter::new(), SystemClock));

    let engine_config = EngineConfig {
        check_interval: config.scheduler.check_interval,
        startup_delay: config.scheduler.startup_delay,
        max_concurrent_jobs: config.scheduler.max_concurrent_jobs,
    };
    let engine = Arc::new(SchedulerEngine::new(
        Arc::clone(&store),
        executor,
        vendor_db,
        process_monitor,
        notifier,
        SystemClock,
        engine_config,
    ));

    match config.scheduler.autostart_delay {
        Some(delay) => {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                engine.run().await;
            });
        }
        None => {
            tracing::warn!("scheduler autostart disabled, engine loop will not run until started explicitly");
        }
    }

    shutdown::wait_for_signal().await;
    tracing::info!("shutdown signal received, cancelling scheduler engine");
    engine.cancel();
    // Give the in-flight tick a moment to observe the cancellation flag and
    // return before the process exits (spec §4.J, §5 Cancellation).
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    tracing::info!("robosched-daemon stopped");
    Ok(())
}

fn ensure_notification_settings(store: &SqliteStore, config: &Config) -> anyhow::Result<()> {
    if store.get_notification_settings().is_ok() {
        return Ok(());
    }
    let password_encrypted = robosched_adapters::encrypt(&config.smtp.password)?;
    let now = chrono::Local::now().naive_local();
    let settings = NotificationSettings {
        smtp_host: config.smtp.host.clone(),
        smtp_port: config.smtp.port,
        smtp_username: config.smtp.username.clone(),
        smtp_password_encrypted: password_encrypted,
        sender_address: config.smtp.sender_address.clone(),
        use_tls: config.smtp.use_tls,
        use_ssl: config.smtp.use_ssl,
        manual_recovery_recipients: config.smtp.manual_recovery_recipients.clone(),
        created_at: now,
        updated_at: now,
    };
    settings.validate()?;
    store.update_notification_settings(&settings)?;
    Ok(())
}
