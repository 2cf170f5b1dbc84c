// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched recovery` - mark/resolve/status (spec §6.5, §4.H).

use crate::output::{print_error, print_json, OutputFormat};
use clap::{Args, Subcommand};
use robosched_core::ScheduleId;
use robosched_engine::Api;
use std::str::FromStr;

#[derive(Args)]
pub struct RecoveryArgs {
    #[command(subcommand)]
    pub command: RecoveryCommand,
}

#[derive(Subcommand)]
pub enum RecoveryCommand {
    /// Flag a schedule as requiring manual recovery and raise the global flag
    Mark {
        schedule_id: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        actor: String,
    },
    /// Clear manual recovery on a schedule and the global flag
    Resolve {
        schedule_id: String,
        #[arg(long)]
        actor: String,
    },
    /// Show the global manual-recovery state
    Status,
}

pub async fn run(api: &impl Api, args: RecoveryArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        RecoveryCommand::Mark { schedule_id, note, actor } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            match api.mark_recovery_required(id, note, actor).await {
                Ok((schedule, state)) => print_pair(&schedule, &state, format),
                Err(err) => print_error(&err),
            }
        }
        RecoveryCommand::Resolve { schedule_id, actor } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            match api.resolve_recovery_required(id, actor).await {
                Ok((schedule, state)) => print_pair(&schedule, &state, format),
                Err(err) => print_error(&err),
            }
        }
        RecoveryCommand::Status => match api.get_manual_recovery_state().await {
            Ok(state) => match format {
                OutputFormat::Json => {
                    let _ = print_json(&state);
                }
                OutputFormat::Text => println!(
                    "active={}  schedule={:?}  note={:?}",
                    state.active, state.schedule_id, state.note
                ),
            },
            Err(err) => print_error(&err),
        },
    }
    Ok(())
}

fn print_pair(schedule: &robosched_core::Schedule, state: &robosched_core::ManualRecoveryState, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let _ = print_json(&serde_json::json!({ "schedule": schedule, "manual_recovery_state": state }));
        }
        OutputFormat::Text => println!(
            "{}  recovery_required={}  global_active={}",
            schedule.schedule_id, schedule.recovery_required, state.active
        ),
    }
}
