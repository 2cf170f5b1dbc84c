// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue and conflict detector (spec §4.F). Only exercised when
//! `max_concurrent_jobs > 1`; with the default of 1 the engine dispatches
//! straight from the due-schedule cache and this module sits idle.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use robosched_core::{ConflictInfo, ConflictKind, Priority, ScheduleId};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

const TIME_OVERLAP_BUFFER_MINUTES: i64 = 15;
const ALTERNATIVE_STEP_MINUTES: i64 = 30;
const ALTERNATIVE_SEARCH_HOURS: i64 = 48;
const MAX_ALTERNATIVES: usize = 5;

/// A candidate or running job window, keyed for priority-queue ordering by
/// `(priority, scheduled_time, created_at)` (spec §4.F).
#[derive(Debug, Clone)]
pub struct JobWindow {
    pub schedule_id: ScheduleId,
    pub priority: Priority,
    pub scheduled_time: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub estimated_duration_minutes: u32,
}

impl JobWindow {
    fn end_time(&self) -> NaiveDateTime {
        self.scheduled_time + ChronoDuration::minutes(i64::from(self.estimated_duration_minutes))
    }

    fn overlaps(&self, other: &JobWindow) -> bool {
        let buffer = ChronoDuration::minutes(TIME_OVERLAP_BUFFER_MINUTES);
        let self_start = self.scheduled_time - buffer;
        let self_end = self.end_time() + buffer;
        self_start < other.end_time() && other.scheduled_time < self_end
    }
}

impl PartialEq for JobWindow {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.scheduled_time == other.scheduled_time && self.created_at == other.created_at
    }
}
impl Eq for JobWindow {}

impl Ord for JobWindow {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; higher priority, then earlier
        // scheduled_time, then earlier created_at should sort first, so
        // invert the time comparisons.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.scheduled_time.cmp(&self.scheduled_time))
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

impl PartialOrd for JobWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A priority queue of pending jobs, used when `max_concurrent_jobs > 1`
/// (spec §4.F).
#[derive(Default)]
pub struct JobQueue {
    heap: BinaryHeap<JobWindow>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Enqueue `job`, rejecting it if it conflicts at high severity with
    /// `running` unless the job itself is `CRITICAL` (spec §4.F).
    pub fn enqueue(&mut self, job: JobWindow, running: &[JobWindow], vendor_running: bool) -> Result<(), Vec<ConflictInfo>> {
        let conflicts = detect_conflicts_against(&job, running, vendor_running);
        let blocking = conflicts.iter().any(|c| c.kind.is_high_severity());
        if blocking && job.priority != Priority::Critical {
            return Err(conflicts);
        }
        self.heap.push(job);
        Ok(())
    }

    /// Pop the next job to dispatch, or `None` when at capacity, the
    /// process monitor reports busy, or the head conflicts and is
    /// re-queued (spec §4.F `get_next_job`).
    pub fn get_next_job(&mut self, running: &[JobWindow], at_capacity: bool, vendor_running: bool) -> Option<JobWindow> {
        if at_capacity || vendor_running {
            return None;
        }
        let head = self.heap.pop()?;
        let conflicts = detect_conflicts_against(&head, running, vendor_running);
        if conflicts.iter().any(|c| c.kind.is_high_severity()) {
            self.heap.push(head);
            return None;
        }
        Some(head)
    }
}

fn detect_conflicts_against(candidate: &JobWindow, others: &[JobWindow], vendor_running: bool) -> Vec<ConflictInfo> {
    let mut conflicts = Vec::new();
    if vendor_running {
        conflicts.push(ConflictInfo {
            kind: ConflictKind::HamiltonBusy,
            conflicting_schedule_id: None,
            description: "instrument is currently running".into(),
        });
    }
    for other in others {
        if other.schedule_id == candidate.schedule_id {
            continue;
        }
        if candidate.overlaps(other) {
            conflicts.push(ConflictInfo {
                kind: ConflictKind::TimeOverlap,
                conflicting_schedule_id: Some(other.schedule_id),
                description: format!("overlaps scheduled window for {}", other.schedule_id),
            });
        }
    }
    conflicts
}

/// `detect_scheduling_conflicts` (spec §4.F, §6.5 `check_conflicts`):
/// conflicts for every job in `candidates` against the full candidate set.
pub fn detect_scheduling_conflicts(candidates: &[JobWindow], vendor_running: bool) -> HashMap<ScheduleId, Vec<ConflictInfo>> {
    let mut result = HashMap::new();
    for candidate in candidates {
        let others: Vec<JobWindow> = candidates.iter().filter(|j| j.schedule_id != candidate.schedule_id).cloned().collect();
        let conflicts = detect_conflicts_against(candidate, &others, vendor_running);
        if !conflicts.is_empty() {
            result.insert(candidate.schedule_id, conflicts);
        }
    }
    result
}

/// `suggest_alternatives` (spec §4.F): walk forward in 30-minute steps up
/// to 48 hours and return up to five open windows for `candidate`.
pub fn suggest_alternatives(candidate: &JobWindow, others: &[JobWindow], vendor_running: bool) -> Vec<NaiveDateTime> {
    let mut alternatives = Vec::new();
    let mut probe_time = candidate.scheduled_time;
    let horizon = candidate.scheduled_time + ChronoDuration::hours(ALTERNATIVE_SEARCH_HOURS);

    while probe_time < horizon && alternatives.len() < MAX_ALTERNATIVES {
        probe_time += ChronoDuration::minutes(ALTERNATIVE_STEP_MINUTES);
        let probe = JobWindow { scheduled_time: probe_time, ..candidate.clone() };
        let conflicts = detect_conflicts_against(&probe, others, vendor_running);
        if !conflicts.iter().any(|c| c.kind.is_high_severity()) {
            alternatives.push(probe_time);
        }
    }
    alternatives
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
