// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule: the durable specification of a recurring or one-shot run
//! (spec §3).

use crate::error::ApiError;
use crate::ids::{ContactId, ScheduleId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a schedule recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    Once,
    Interval,
    /// Accepted at validation time; the engine does not dispatch a due
    /// `Cron` schedule until a cron parser exists (spec §9 Open Questions).
    Cron,
}

crate::simple_display! {
    ScheduleType {
        Once => "once",
        Interval => "interval",
        Cron => "cron",
    }
}

/// Backoff strategy for [`RetryConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Linear,
    Exponential,
}

crate::simple_display! {
    BackoffStrategy {
        Linear => "linear",
        Exponential => "exponential",
    }
}

/// Default `max_retries` when a schedule carries no retry config at all
/// (spec §9 Open Questions, resolved explicitly rather than left implicit).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Retry behaviour embedded in a [`Schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay_minutes: u32,
    pub backoff_strategy: BackoffStrategy,
    pub abort_after_hours: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_minutes: 2,
            backoff_strategy: BackoffStrategy::Linear,
            abort_after_hours: None,
        }
    }
}

/// A single pre-execution pipeline step token, e.g. `"ResetHamiltonTables:Experiments,Queue"`.
///
/// Name comparison is case- and separator-insensitive (spec §4.D):
/// `"ScheduledToRun"` normalises the same as `"scheduled_to_run"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteStep {
    pub name: String,
    pub args: Vec<String>,
}

impl PrerequisiteStep {
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, rest)) => Self {
                name: normalize_step_name(name),
                args: rest.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            },
            None => Self { name: normalize_step_name(token), args: Vec::new() },
        }
    }
}

/// Normalise a step name for case/separator-insensitive comparison:
/// lowercase, strip `_` and `-`.
pub fn normalize_step_name(name: &str) -> String {
    name.chars().filter(|c| *c != '_' && *c != '-').collect::<String>().to_lowercase()
}

/// The durable specification of a recurring or one-shot run (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: ScheduleId,
    pub experiment_name: String,
    pub experiment_path: String,
    pub schedule_type: ScheduleType,
    pub interval_hours: Option<f64>,
    pub start_time: Option<NaiveDateTime>,
    pub estimated_duration_minutes: u32,
    pub is_active: bool,
    pub retry_config: RetryConfig,
    pub prerequisites: Vec<PrerequisiteStep>,
    pub notification_contact_ids: HashSet<ContactId>,
    pub failed_execution_count: u32,
    pub recovery_required: bool,
    pub recovery_note: Option<String>,
    pub recovery_marked_at: Option<NaiveDateTime>,
    pub recovery_marked_by: Option<String>,
    pub recovery_resolved_at: Option<NaiveDateTime>,
    pub recovery_resolved_by: Option<String>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Schedule {
    /// Validate invariant (a): `interval` schedules must carry a positive
    /// `interval_hours`; validate the `.med` suffix and duration > 0.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.schedule_type == ScheduleType::Interval {
            match self.interval_hours {
                Some(h) if h > 0.0 => {}
                _ => {
                    return Err(ApiError::validation(
                        "interval_hours",
                        "required and must be > 0 when schedule_type=interval",
                    ))
                }
            }
        }
        if !self.experiment_path.ends_with(".med") {
            return Err(ApiError::validation("experiment_path", "must end with .med"));
        }
        if self.estimated_duration_minutes == 0 {
            return Err(ApiError::validation(
                "estimated_duration_minutes",
                "must be greater than 0",
            ));
        }
        if self.schedule_type != ScheduleType::Cron && self.start_time.is_none() {
            return Err(ApiError::validation(
                "start_time",
                "required unless schedule_type=cron",
            ));
        }
        Ok(())
    }

    /// Invariant (b): a schedule flagged for manual recovery must never be
    /// dispatched.
    pub fn is_dispatchable(&self) -> bool {
        self.is_active && !self.recovery_required
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ScheduleBuilder => Schedule {
        into {
            experiment_name: String = "DemoRun",
            experiment_path: String = "C:/Methods/Demo.med",
            created_by: String = "system",
        }
        set {
            schedule_type: ScheduleType = ScheduleType::Once,
            interval_hours: Option<f64> = None,
            estimated_duration_minutes: u32 = 30,
            is_active: bool = true,
            retry_config: RetryConfig = RetryConfig::default(),
            prerequisites: Vec<PrerequisiteStep> = Vec::new(),
            notification_contact_ids: HashSet<ContactId> = HashSet::new(),
            failed_execution_count: u32 = 0,
            recovery_required: bool = false,
        }
        option {
            start_time: NaiveDateTime = None,
            recovery_note: String = None,
            recovery_marked_at: NaiveDateTime = None,
            recovery_marked_by: String = None,
            recovery_resolved_at: NaiveDateTime = None,
            recovery_resolved_by: String = None,
        }
        computed {
            schedule_id: ScheduleId = ScheduleId::new(),
            created_at: NaiveDateTime = crate::test_support::test_now(),
            updated_at: NaiveDateTime = crate::test_support::test_now(),
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
