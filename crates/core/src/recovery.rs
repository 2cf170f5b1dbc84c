// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ManualRecoveryState: the global manual-recovery flag (spec §3, §4.H).
//!
//! When `active`, the scheduler engine is globally paused for dispatch —
//! this is the coarse, system-wide gate; [`crate::schedule::Schedule::recovery_required`]
//! is the per-schedule equivalent.

use crate::ids::ScheduleId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Singleton global manual-recovery flag (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualRecoveryState {
    pub active: bool,
    pub note: Option<String>,
    pub schedule_id: Option<ScheduleId>,
    pub experiment_name: Option<String>,
    pub triggered_by: Option<String>,
    pub triggered_at: Option<NaiveDateTime>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<NaiveDateTime>,
}

impl ManualRecoveryState {
    /// The cleared baseline state (spec §4.H startup sequence refreshes
    /// into this shape when no recovery row exists yet).
    pub fn cleared() -> Self {
        Self {
            active: false,
            note: None,
            schedule_id: None,
            experiment_name: None,
            triggered_by: None,
            triggered_at: None,
            resolved_by: None,
            resolved_at: None,
        }
    }
}

impl Default for ManualRecoveryState {
    fn default() -> Self {
        Self::cleared()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct ManualRecoveryStateBuilder => ManualRecoveryState {
        set {
            active: bool = false,
        }
        option {
            note: String = None,
            schedule_id: ScheduleId = None,
            experiment_name: String = None,
            triggered_by: String = None,
            triggered_at: NaiveDateTime = None,
            resolved_by: String = None,
            resolved_at: NaiveDateTime = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_state_is_inactive_with_no_actor() {
        let state = ManualRecoveryState::cleared();
        assert!(!state.active);
        assert!(state.schedule_id.is_none());
        assert!(state.triggered_at.is_none());
    }

    #[test]
    fn default_matches_cleared() {
        let default = ManualRecoveryState::default();
        assert!(!default.active);
        assert!(default.note.is_none());
    }
}
