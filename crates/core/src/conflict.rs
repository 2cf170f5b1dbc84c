// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict classification and queue priority (spec §4.F).

use crate::ids::ScheduleId;
use serde::{Deserialize, Serialize};

/// Queue priority, ordinal from lowest to highest (spec §4.F). Derives
/// `Ord` so a `BinaryHeap<PriorityJob>` naturally sorts `CRITICAL` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

crate::simple_display! {
    Priority {
        Low => "LOW",
        Normal => "NORMAL",
        High => "HIGH",
        Critical => "CRITICAL",
    }
}

impl Priority {
    /// Whether this priority counts as "high severity" for the enqueue
    /// rejection rule (spec §4.F: reject unless the job itself is CRITICAL).
    pub fn is_high_severity(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

/// The kind of scheduling conflict detected between two candidate or
/// running jobs (spec §4.F). `resource_conflict`/`dependency_conflict` are
/// enumerated for completeness; this system never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    TimeOverlap,
    HamiltonBusy,
    ResourceConflict,
    DependencyConflict,
}

crate::simple_display! {
    ConflictKind {
        TimeOverlap => "time_overlap",
        HamiltonBusy => "hamilton_busy",
        ResourceConflict => "resource_conflict",
        DependencyConflict => "dependency_conflict",
    }
}

impl ConflictKind {
    /// Whether this conflict kind is "high" severity for the enqueue
    /// rejection rule (spec §4.F). Both concrete kinds this system produces
    /// are high severity; the unused enumerants are conservatively high too.
    pub fn is_high_severity(&self) -> bool {
        true
    }
}

/// A single detected conflict against a candidate schedule (spec §4.F,
/// §6.5 `check_conflicts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictInfo {
    pub kind: ConflictKind,
    pub conflicting_schedule_id: Option<ScheduleId>,
    pub description: String,
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ConflictInfoBuilder => ConflictInfo {
        into {
            description: String = "overlaps a running execution window",
        }
        set {
            kind: ConflictKind = ConflictKind::TimeOverlap,
        }
        option {
            conflicting_schedule_id: ScheduleId = None,
        }
    }
}
