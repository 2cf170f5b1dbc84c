// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Missed-job policy and next-execution-time arithmetic (spec §4.H).

use chrono::{Duration as ChronoDuration, NaiveDateTime, Timelike};
use robosched_core::{Schedule, ScheduleType};

/// What the engine should do with a due schedule on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueOutcome {
    Dispatch,
    /// Overdue past the grace window: record `missed`, and for `interval`
    /// schedules advance `start_time` to the next slot.
    Missed,
}

/// Grace window beyond which a due `once` schedule is recorded as missed
/// rather than dispatched (spec §4.H missed-job policy).
const ONCE_MISSED_GRACE: ChronoDuration = ChronoDuration::minutes(30);

/// Decide whether `schedule` should dispatch or be recorded as missed,
/// given it is already known to be due at `now`.
pub fn classify_due(schedule: &Schedule, now: NaiveDateTime) -> DueOutcome {
    let Some(start_time) = schedule.start_time else {
        return DueOutcome::Dispatch;
    };
    let overdue = now - start_time;
    if overdue <= ChronoDuration::zero() {
        return DueOutcome::Dispatch;
    }

    let grace = match schedule.schedule_type {
        ScheduleType::Once => ONCE_MISSED_GRACE,
        ScheduleType::Interval => {
            let hours = schedule.interval_hours.unwrap_or(0.0).max(0.0);
            ChronoDuration::minutes((hours * 30.0).round() as i64)
        }
        ScheduleType::Cron => return DueOutcome::Dispatch,
    };

    if overdue > grace {
        DueOutcome::Missed
    } else {
        DueOutcome::Dispatch
    }
}

/// Next `start_time` after a successful (or missed, for `interval`)
/// execution (spec §4.H "Next-time arithmetic").
pub fn calculate_next_execution_time(schedule: &Schedule, now: NaiveDateTime) -> NaiveDateTime {
    match schedule.schedule_type {
        ScheduleType::Once => schedule.start_time.unwrap_or(now),
        ScheduleType::Cron => schedule.start_time.unwrap_or(now),
        ScheduleType::Interval => {
            let hours = schedule.interval_hours.unwrap_or(0.0);
            let original = schedule.start_time.unwrap_or(now);
            if original > now {
                original
            } else {
                round_to_minute(original + ChronoDuration::minutes((hours * 60.0).round() as i64))
            }
        }
    }
}

fn round_to_minute(when: NaiveDateTime) -> NaiveDateTime {
    when - ChronoDuration::seconds(i64::from(when.second())) - ChronoDuration::nanoseconds(i64::from(when.nanosecond()))
}

#[cfg(test)]
#[path = "next_time_tests.rs"]
mod tests;
