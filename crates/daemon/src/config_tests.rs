// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("ROBOSCHED_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn defaults_apply_with_no_env_set() {
    clear_env();
    let config = Config::from_env().unwrap();
    assert_eq!(config.scheduler.check_interval, Duration::from_secs(30));
    assert_eq!(config.scheduler.max_concurrent_jobs, 1);
    assert_eq!(config.scheduler.autostart_delay, Some(Duration::from_secs(60)));
    assert_eq!(config.executor.max_retry_attempts, 5);
}

#[test]
#[serial]
fn autostart_disable_keyword_turns_off_autostart() {
    clear_env();
    std::env::set_var("ROBOSCHED_SCHEDULER_AUTOSTART_DELAY_SECONDS", "disable");
    let config = Config::from_env().unwrap();
    assert_eq!(config.scheduler.autostart_delay, None);
    std::env::remove_var("ROBOSCHED_SCHEDULER_AUTOSTART_DELAY_SECONDS");
}

#[test]
#[serial]
fn zero_max_concurrent_jobs_is_rejected() {
    clear_env();
    std::env::set_var("ROBOSCHED_SCHEDULER_MAX_CONCURRENT_JOBS", "0");
    let result = Config::from_env();
    assert!(result.is_err());
    std::env::remove_var("ROBOSCHED_SCHEDULER_MAX_CONCURRENT_JOBS");
}

#[test]
#[serial]
fn conflicting_tls_and_ssl_is_rejected() {
    clear_env();
    std::env::set_var("ROBOSCHED_SMTP_USE_TLS", "true");
    std::env::set_var("ROBOSCHED_SMTP_USE_SSL", "true");
    let result = Config::from_env();
    assert!(result.is_err());
    std::env::remove_var("ROBOSCHED_SMTP_USE_TLS");
    std::env::remove_var("ROBOSCHED_SMTP_USE_SSL");
}

#[test]
#[serial]
fn manual_recovery_recipients_are_split_and_trimmed() {
    clear_env();
    std::env::set_var("ROBOSCHED_SMTP_MANUAL_RECOVERY_RECIPIENTS", "a@example.com, b@example.com ,");
    let config = Config::from_env().unwrap();
    assert_eq!(config.smtp.manual_recovery_recipients, vec!["a@example.com".to_string(), "b@example.com".to_string()]);
    std::env::remove_var("ROBOSCHED_SMTP_MANUAL_RECOVERY_RECIPIENTS");
}
