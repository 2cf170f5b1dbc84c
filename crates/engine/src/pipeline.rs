// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-execution pipeline (spec §4.D): a registry of named steps, run in
//! order, with cleanup invoked in reverse for already-succeeded steps on
//! the first failure.

use crate::error::ExecuteError;
use robosched_adapters::VendorDbAdapter;
use robosched_core::{normalize_step_name, PrerequisiteStep, Schedule};

struct StepOutcome {
    success: bool,
    message: String,
}

impl StepOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

/// Runs `schedule.prerequisites` in order, invoking cleanup for
/// already-succeeded steps in reverse on the first failure (spec §4.D).
pub async fn run_pipeline<V: VendorDbAdapter>(vendor_db: &V, schedule: &Schedule) -> Result<(), ExecuteError> {
    let mut succeeded = Vec::new();

    for step in &schedule.prerequisites {
        let outcome = run_step(vendor_db, schedule, step).await;
        if outcome.success {
            tracing::debug!(step = %step.name, "prerequisite step succeeded");
            succeeded.push(step.clone());
            continue;
        }

        tracing::warn!(step = %step.name, message = %outcome.message, "prerequisite step failed, running cleanup");
        for done in succeeded.iter().rev() {
            cleanup_step(vendor_db, schedule, done).await;
        }
        return Err(ExecuteError::Pipeline(outcome.message));
    }

    Ok(())
}

async fn run_step<V: VendorDbAdapter>(vendor_db: &V, schedule: &Schedule, step: &PrerequisiteStep) -> StepOutcome {
    match normalize_step_name(&step.name).as_str() {
        "scheduledtorun" => {
            if vendor_db.set_scheduled_to_run(&schedule.experiment_name, true).await {
                StepOutcome::ok("ScheduledToRun flag set")
            } else {
                StepOutcome::fail("failed to set ScheduledToRun flag")
            }
        }
        "resethamiltontables" => {
            let tables = if step.args.is_empty() { None } else { Some(step.args.as_slice()) };
            if vendor_db.reset_hamilton_tables(&schedule.experiment_name, tables).await {
                StepOutcome::ok("Hamilton tables reset")
            } else {
                StepOutcome::fail("failed to reset Hamilton tables")
            }
        }
        "evoyeastexperiment" => {
            let Some(first) = step.args.first() else {
                return StepOutcome::fail("EvoYeastExperiment requires an id|action argument");
            };
            let (id, action) = match first.split_once('|') {
                Some((id, action)) => (id, action),
                None => (first.as_str(), "none"),
            };
            match action {
                "none" => StepOutcome::ok("EvoYeastExperiment no-op"),
                "set" => {
                    if vendor_db.set_exclusive_evoyeast_experiment(id).await {
                        StepOutcome::ok("EvoYeastExperiment set")
                    } else {
                        StepOutcome::fail("failed to set EvoYeastExperiment")
                    }
                }
                other => StepOutcome::fail(format!("unknown EvoYeastExperiment action: {other}")),
            }
        }
        other => StepOutcome::fail(format!("unknown prerequisite step: {other}")),
    }
}

async fn cleanup_step<V: VendorDbAdapter>(vendor_db: &V, schedule: &Schedule, step: &PrerequisiteStep) {
    if normalize_step_name(&step.name) == "scheduledtorun" {
        let _ = vendor_db.set_scheduled_to_run(&schedule.experiment_name, false).await;
        tracing::debug!(step = %step.name, "cleared ScheduledToRun flag on pipeline cleanup");
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
