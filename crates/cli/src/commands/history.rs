// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched history` - per-schedule execution summary (spec §6.5, §4.E).

use crate::output::{print_error, print_json, OutputFormat};
use clap::{Args, Subcommand};
use robosched_core::ScheduleId;
use robosched_engine::Api;
use std::str::FromStr;

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// Show execution counts, success rate, and last run for a schedule
    Summary { schedule_id: String },
}

pub async fn run(api: &impl Api, args: HistoryArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        HistoryCommand::Summary { schedule_id } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            match api.get_schedule_execution_summary(id).await {
                Ok(summary) => match format {
                    OutputFormat::Json => {
                        let _ = print_json(&summary);
                    }
                    OutputFormat::Text => println!(
                        "total={}  success={}  failed={}  success_rate={:?}  avg_duration_minutes={:?}",
                        summary.total, summary.success, summary.failed, summary.success_rate, summary.avg_duration_minutes
                    ),
                },
                Err(err) => print_error(&err),
            }
        }
    }
    Ok(())
}
