// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global manual-recovery flag (spec §4.B, §6.3) and per-schedule recovery
//! bookkeeping.

use crate::row::{bool_to_int, format_timestamp_opt, int_to_bool, parse_timestamp};
use crate::{SqliteStore, StoreError};
use chrono::NaiveDateTime;
use robosched_core::{Clock, ManualRecoveryState, Schedule, ScheduleId};
use rusqlite::{params, Row};

impl<C: Clock> SqliteStore<C> {
    pub fn get_manual_recovery_state(&self) -> Result<ManualRecoveryState, StoreError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT * FROM scheduler_state WHERE id = 1", [], row_to_recovery)?
    }

    pub fn set_global_recovery(&self, state: &ManualRecoveryState) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE scheduler_state SET
                recovery_active=?1, recovery_note=?2, recovery_schedule_id=?3,
                recovery_experiment_name=?4, recovery_triggered_by=?5, recovery_triggered_at=?6,
                recovery_resolved_by=?7, recovery_resolved_at=?8
             WHERE id = 1",
            params![
                bool_to_int(state.active),
                state.note,
                state.schedule_id.map(|id| id.to_string()),
                state.experiment_name,
                state.triggered_by,
                format_timestamp_opt(state.triggered_at),
                state.resolved_by,
                format_timestamp_opt(state.resolved_at),
            ],
        )?;
        Ok(())
    }

    pub fn clear_global_recovery(&self) -> Result<(), StoreError> {
        self.set_global_recovery(&ManualRecoveryState::cleared())
    }

    /// Flag a schedule for manual recovery and mirror it into the global
    /// state (spec §6.5 `mark_recovery_required`).
    pub fn mark_recovery_required(
        &self,
        mut schedule: Schedule,
        note: Option<String>,
        actor: String,
        marked_at: NaiveDateTime,
    ) -> Result<Schedule, StoreError> {
        schedule.recovery_required = true;
        schedule.recovery_note = note.clone();
        schedule.recovery_marked_by = Some(actor.clone());
        schedule.recovery_marked_at = Some(marked_at);
        self.update_schedule(&schedule)?;

        let mut global = self.get_manual_recovery_state()?;
        global.active = true;
        global.note = note;
        global.schedule_id = Some(schedule.schedule_id);
        global.experiment_name = Some(schedule.experiment_name.clone());
        global.triggered_by = Some(actor);
        global.triggered_at = schedule.recovery_marked_at;
        self.set_global_recovery(&global)?;

        Ok(schedule)
    }

    /// Resolve recovery on a schedule and, if it was the schedule driving
    /// the global flag, clear that flag too (spec §6.5
    /// `resolve_recovery_required`).
    pub fn resolve_recovery_required(&self, mut schedule: Schedule, actor: String) -> Result<Schedule, StoreError> {
        schedule.recovery_required = false;
        schedule.recovery_resolved_by = Some(actor.clone());
        self.update_schedule(&schedule)?;

        let mut global = self.get_manual_recovery_state()?;
        if global.schedule_id == Some(schedule.schedule_id) {
            global.active = false;
            global.resolved_by = Some(actor);
            self.set_global_recovery(&global)?;
        }
        Ok(schedule)
    }
}

fn row_to_recovery(row: &Row<'_>) -> rusqlite::Result<Result<ManualRecoveryState, StoreError>> {
    Ok(try_row_to_recovery(row))
}

fn try_row_to_recovery(row: &Row<'_>) -> Result<ManualRecoveryState, StoreError> {
    let schedule_id: Option<String> = row.get("recovery_schedule_id")?;
    Ok(ManualRecoveryState {
        active: int_to_bool(row.get("recovery_active")?),
        note: row.get("recovery_note")?,
        schedule_id: schedule_id.and_then(|s| s.parse::<ScheduleId>().ok()),
        experiment_name: row.get("recovery_experiment_name")?,
        triggered_by: row.get("recovery_triggered_by")?,
        triggered_at: parse_timestamp(row.get("recovery_triggered_at")?),
        resolved_by: row.get("recovery_resolved_by")?,
        resolved_at: parse_timestamp(row.get("recovery_resolved_at")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use robosched_core::test_support::test_now;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn initial_state_is_cleared() {
        let store = store();
        let state = store.get_manual_recovery_state().unwrap();
        assert!(!state.active);
    }

    #[test]
    fn mark_and_resolve_round_trip() {
        let store = store();
        let schedule = Schedule::builder().start_time(test_now()).build();
        store.create_schedule(&schedule).unwrap();

        let marked = store
            .mark_recovery_required(schedule.clone(), Some("stuck".into()), "operator".into(), test_now())
            .unwrap();
        assert!(marked.recovery_required);
        let global = store.get_manual_recovery_state().unwrap();
        assert!(global.active);
        assert_eq!(global.schedule_id, Some(schedule.schedule_id));

        let resolved = store.resolve_recovery_required(marked, "operator".into()).unwrap();
        assert!(!resolved.recovery_required);
        let global = store.get_manual_recovery_state().unwrap();
        assert!(!global.active);
    }

    #[test]
    fn clear_global_recovery_resets_to_cleared() {
        let store = store();
        let mut state = ManualRecoveryState::cleared();
        state.active = true;
        state.note = Some("manual test".into());
        store.set_global_recovery(&state).unwrap();
        assert!(store.get_manual_recovery_state().unwrap().active);

        store.clear_global_recovery().unwrap();
        assert!(!store.get_manual_recovery_state().unwrap().active);
    }
}
