// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ExecutionWatch` (spec §4.H): bookkeeping for an in-flight execution,
//! used by the watchdog to detect long-running jobs. Sources its timestamp
//! from the injected [`Clock`] rather than the system clock directly (spec
//! §4.A: no component may call a system time function directly, watchdogs
//! named explicitly), so tests can drive it with a [`robosched_core::FakeClock`].

use robosched_core::{Clock, ContactId, ExecutionId, ScheduleId};
use std::time::Instant;

/// Tracks one in-flight execution between dispatch and completion.
pub struct ExecutionWatch<C> {
    pub execution_id: ExecutionId,
    pub schedule_id: ScheduleId,
    pub started_at: Instant,
    pub expected_minutes: u32,
    pub contact_ids: Vec<ContactId>,
    pub notified_long_running: bool,
    clock: C,
}

impl<C: Clock> ExecutionWatch<C> {
    pub fn new(
        execution_id: ExecutionId,
        schedule_id: ScheduleId,
        estimated_duration_minutes: u32,
        contact_ids: Vec<ContactId>,
        clock: C,
    ) -> Self {
        let started_at = clock.now();
        Self {
            execution_id,
            schedule_id,
            started_at,
            expected_minutes: estimated_duration_minutes.max(1),
            contact_ids,
            notified_long_running: false,
            clock,
        }
    }

    /// Whether this watch has exceeded the watchdog threshold of
    /// `2 * expected_minutes` without having fired the `long_running`
    /// notification yet (spec §4.H).
    pub fn is_overdue_for_watchdog(&self) -> bool {
        !self.notified_long_running
            && self.clock.now().duration_since(self.started_at).as_secs() >= u64::from(self.expected_minutes) * 2 * 60
    }

    pub fn elapsed_minutes(&self) -> u64 {
        self.clock.now().duration_since(self.started_at).as_secs() / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robosched_core::FakeClock;

    #[test]
    fn fresh_watch_is_not_overdue() {
        let watch = ExecutionWatch::new(ExecutionId::new(), ScheduleId::new(), 10, vec![], FakeClock::new());
        assert!(!watch.is_overdue_for_watchdog());
    }

    #[test]
    fn already_notified_watch_is_never_overdue_again() {
        let clock = FakeClock::new();
        let mut watch = ExecutionWatch::new(ExecutionId::new(), ScheduleId::new(), 0, vec![], clock.clone());
        watch.notified_long_running = true;
        clock.advance(std::time::Duration::from_secs(120));
        assert!(!watch.is_overdue_for_watchdog());
    }

    #[test]
    fn watch_becomes_overdue_once_clock_advances_past_threshold() {
        let clock = FakeClock::new();
        let watch = ExecutionWatch::new(ExecutionId::new(), ScheduleId::new(), 10, vec![], clock.clone());
        assert!(!watch.is_overdue_for_watchdog());
        clock.advance(std::time::Duration::from_secs(20 * 60));
        assert!(watch.is_overdue_for_watchdog());
        assert_eq!(watch.elapsed_minutes(), 20);
    }
}
