// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JobExecution: the record of a single dispatch of a [`Schedule`]
//! (spec §3, §4.E).

use crate::ids::{ExecutionId, ScheduleId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single execution attempt (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Missed,
    Blocked,
    Retrying,
    Cancelled,
}

crate::simple_display! {
    ExecutionStatus {
        Pending => "pending",
        Queued => "queued",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Missed => "missed",
        Blocked => "blocked",
        Retrying => "retrying",
        Cancelled => "cancelled",
    }
}

impl ExecutionStatus {
    /// Whether this status is a terminal state that no longer accepts
    /// further transitions (spec §4.E lifecycle).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Missed | ExecutionStatus::Cancelled
        )
    }
}

/// A single dispatch of a [`Schedule`](crate::schedule::Schedule) (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    pub execution_id: ExecutionId,
    pub schedule_id: ScheduleId,
    pub status: ExecutionStatus,
    pub attempt: u32,
    pub scheduled_time: NaiveDateTime,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub exit_code: Option<i64>,
    pub error_message: Option<String>,
    pub was_abort: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JobExecution {
    /// Invariant (c): an execution that has started never reverts to
    /// `Pending`/`Queued` (spec §8).
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        match (self.status, next) {
            (ExecutionStatus::Running, ExecutionStatus::Pending | ExecutionStatus::Queued) => false,
            (ExecutionStatus::Retrying, ExecutionStatus::Pending | ExecutionStatus::Queued) => false,
            _ => true,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobExecutionBuilder => JobExecution {
        set {
            schedule_id: ScheduleId = ScheduleId::new(),
            status: ExecutionStatus = ExecutionStatus::Pending,
            attempt: u32 = 1,
            scheduled_time: NaiveDateTime = crate::test_support::test_now(),
            exit_code: Option<i64> = None,
            was_abort: bool = false,
        }
        option {
            started_at: NaiveDateTime = None,
            completed_at: NaiveDateTime = None,
            error_message: String = None,
        }
        computed {
            execution_id: ExecutionId = ExecutionId::new(),
            created_at: NaiveDateTime = crate::test_support::test_now(),
            updated_at: NaiveDateTime = crate::test_support::test_now(),
        }
    }
}
