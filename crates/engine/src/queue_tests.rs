// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::NaiveDate;
use robosched_core::ScheduleId;

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

fn window(scheduled_time: NaiveDateTime, duration_minutes: u32, priority: Priority) -> JobWindow {
    JobWindow {
        schedule_id: ScheduleId::new(),
        priority,
        scheduled_time,
        created_at: at(0, 0),
        estimated_duration_minutes: duration_minutes,
    }
}

#[test]
fn heap_pops_critical_before_lower_priority() {
    let mut heap = BinaryHeap::new();
    heap.push(window(at(10, 0), 30, Priority::Normal));
    heap.push(window(at(9, 0), 30, Priority::Critical));
    heap.push(window(at(11, 0), 30, Priority::Low));
    assert_eq!(heap.pop().unwrap().priority, Priority::Critical);
}

#[test]
fn heap_breaks_priority_ties_by_earlier_scheduled_time() {
    let mut heap = BinaryHeap::new();
    heap.push(window(at(10, 0), 30, Priority::Normal));
    heap.push(window(at(9, 0), 30, Priority::Normal));
    assert_eq!(heap.pop().unwrap().scheduled_time, at(9, 0));
}

#[test]
fn overlapping_windows_with_buffer_are_detected() {
    let a = window(at(9, 0), 30, Priority::Normal);
    let b = window(at(9, 40), 30, Priority::Normal);
    assert!(a.overlaps(&b));
}

#[test]
fn non_overlapping_windows_outside_buffer_are_not_detected() {
    let a = window(at(9, 0), 30, Priority::Normal);
    let b = window(at(10, 0), 30, Priority::Normal);
    assert!(!a.overlaps(&b));
}

#[test]
fn enqueue_rejects_high_severity_conflict_unless_critical() {
    let mut queue = JobQueue::new();
    let running = vec![window(at(9, 0), 60, Priority::Normal)];
    let candidate = window(at(9, 10), 30, Priority::Normal);
    assert!(queue.enqueue(candidate, &running, false).is_err());
}

#[test]
fn enqueue_allows_critical_job_despite_conflict() {
    let mut queue = JobQueue::new();
    let running = vec![window(at(9, 0), 60, Priority::Normal)];
    let candidate = window(at(9, 10), 30, Priority::Critical);
    assert!(queue.enqueue(candidate, &running, false).is_ok());
}

#[test]
fn get_next_job_returns_none_when_vendor_running() {
    let mut queue = JobQueue::new();
    queue.enqueue(window(at(9, 0), 30, Priority::Normal), &[], false).unwrap();
    assert!(queue.get_next_job(&[], false, true).is_none());
}

#[test]
fn get_next_job_requeues_blocked_head() {
    let mut queue = JobQueue::new();
    let candidate = window(at(9, 10), 30, Priority::Normal);
    queue.enqueue(candidate, &[], false).unwrap();
    let running = vec![window(at(9, 0), 60, Priority::Normal)];
    assert!(queue.get_next_job(&running, false, false).is_none());
    assert_eq!(queue.len(), 1);
}

#[test]
fn suggest_alternatives_returns_up_to_five_open_windows() {
    let candidate = window(at(9, 0), 30, Priority::Normal);
    let alternatives = suggest_alternatives(&candidate, &[], false);
    assert_eq!(alternatives.len(), 5);
    assert_eq!(alternatives[0], at(9, 30));
}

#[test]
fn detect_scheduling_conflicts_reports_only_conflicting_pairs() {
    let a = window(at(9, 0), 30, Priority::Normal);
    let b = window(at(9, 10), 30, Priority::Normal);
    let c = window(at(14, 0), 30, Priority::Normal);
    let conflicts = detect_scheduling_conflicts(&[a, b, c], false);
    assert_eq!(conflicts.len(), 2);
}
