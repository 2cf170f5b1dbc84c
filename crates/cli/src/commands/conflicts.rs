// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched conflicts` - check a set of existing schedules against each
//! other for scheduling conflicts (spec §6.5, §4.F).

use crate::output::{print_error, print_json, OutputFormat};
use clap::Args;
use robosched_core::ScheduleId;
use robosched_engine::Api;
use std::str::FromStr;

#[derive(Args)]
pub struct ConflictsArgs {
    /// Schedule id to include as a draft in the conflict check; repeatable
    #[arg(long = "schedule-id", required = true)]
    pub schedule_ids: Vec<String>,
}

pub async fn run(api: &impl Api, args: ConflictsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut drafts = Vec::with_capacity(args.schedule_ids.len());
    for raw in &args.schedule_ids {
        let id = ScheduleId::from_str(raw)?;
        drafts.push(api.get_schedule(id).await?);
    }
    match api.check_conflicts(drafts).await {
        Ok(conflicts) => match format {
            OutputFormat::Json => {
                let _ = print_json(&conflicts);
            }
            OutputFormat::Text => {
                if conflicts.is_empty() {
                    println!("no conflicts");
                }
                for (schedule_id, infos) in &conflicts {
                    for info in infos {
                        println!("{schedule_id}: {} - {}", info.kind, info.description);
                    }
                }
            }
        },
        Err(err) => print_error(&err),
    }
    Ok(())
}
