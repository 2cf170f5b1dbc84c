// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! robosched-core: domain types for the experiment scheduler.

pub mod macros;

pub mod abort;
pub mod clock;
pub mod conflict;
pub mod contact;
pub mod datetime;
pub mod error;
pub mod execution;
pub mod ids;
pub mod notification;
pub mod recovery;
pub mod schedule;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use abort::{AbortTaxonomy, RunState};
pub use clock::{Clock, FakeClock, SystemClock};
pub use conflict::{ConflictInfo, ConflictKind, Priority};
#[cfg(any(test, feature = "test-support"))]
pub use contact::NotificationContactBuilder;
pub use contact::NotificationContact;
pub use datetime::{ensure_local_naive, format_local, parse_iso_to_local};
pub use error::ApiError;
#[cfg(any(test, feature = "test-support"))]
pub use execution::JobExecutionBuilder;
pub use execution::{ExecutionStatus, JobExecution};
pub use ids::{ContactId, ExecutionId, LogId, ScheduleId};
#[cfg(any(test, feature = "test-support"))]
pub use notification::{NotificationLogEntryBuilder, NotificationSettingsBuilder};
pub use notification::{EventType, LogStatus, NotificationLogEntry, NotificationSettings};
#[cfg(any(test, feature = "test-support"))]
pub use recovery::ManualRecoveryStateBuilder;
pub use recovery::ManualRecoveryState;
#[cfg(any(test, feature = "test-support"))]
pub use schedule::ScheduleBuilder;
pub use schedule::{
    normalize_step_name, BackoffStrategy, PrerequisiteStep, RetryConfig, Schedule, ScheduleType,
    DEFAULT_MAX_RETRIES,
};
