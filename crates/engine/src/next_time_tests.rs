// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::NaiveDate;
use robosched_core::Schedule;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn once_not_yet_due_is_not_missed() {
    let schedule = Schedule::builder().schedule_type(ScheduleType::Once).start_time(at(9, 0)).build();
    assert_eq!(classify_due(&schedule, at(8, 0)), DueOutcome::Dispatch);
}

#[test]
fn once_overdue_within_grace_still_dispatches() {
    let schedule = Schedule::builder().schedule_type(ScheduleType::Once).start_time(at(9, 0)).build();
    assert_eq!(classify_due(&schedule, at(9, 10)), DueOutcome::Dispatch);
}

#[test]
fn once_overdue_past_grace_is_missed() {
    let schedule = Schedule::builder().schedule_type(ScheduleType::Once).start_time(at(9, 0)).build();
    assert_eq!(classify_due(&schedule, at(9, 31)), DueOutcome::Missed);
}

#[test]
fn interval_miss_advances_to_next_aligned_slot() {
    let schedule = Schedule::builder()
        .schedule_type(ScheduleType::Interval)
        .interval_hours(6.0)
        .start_time(at(6, 0))
        .build();
    let now = at(9, 15);
    assert_eq!(classify_due(&schedule, now), DueOutcome::Missed);
    assert_eq!(calculate_next_execution_time(&schedule, now), at(12, 0));
}

#[test]
fn interval_within_half_interval_grace_still_dispatches() {
    let schedule = Schedule::builder()
        .schedule_type(ScheduleType::Interval)
        .interval_hours(6.0)
        .start_time(at(6, 0))
        .build();
    assert_eq!(classify_due(&schedule, at(8, 0)), DueOutcome::Dispatch);
}

#[test]
fn cron_schedule_is_always_dispatch_eligible_for_classification() {
    let schedule = Schedule::builder().schedule_type(ScheduleType::Cron).build();
    assert_eq!(classify_due(&schedule, at(9, 0)), DueOutcome::Dispatch);
}

#[test]
fn once_next_time_is_the_original_start_time() {
    let schedule = Schedule::builder().schedule_type(ScheduleType::Once).start_time(at(9, 0)).build();
    assert_eq!(calculate_next_execution_time(&schedule, at(9, 5)), at(9, 0));
}
