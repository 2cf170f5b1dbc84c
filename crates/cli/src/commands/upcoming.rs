// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched upcoming` - schedules due within a horizon (spec §6.5).

use crate::output::{print_error, print_json, OutputFormat};
use clap::Args;
use robosched_engine::Api;

#[derive(Args)]
pub struct UpcomingArgs {
    /// Horizon in hours, must be in [1,168]
    #[arg(long, default_value_t = 24)]
    pub hours_ahead: u32,
}

pub async fn run(api: &impl Api, args: UpcomingArgs, format: OutputFormat) -> anyhow::Result<()> {
    match api.list_upcoming(args.hours_ahead).await {
        Ok(schedules) => match format {
            OutputFormat::Json => {
                let _ = print_json(&schedules);
            }
            OutputFormat::Text => {
                for schedule in &schedules {
                    println!(
                        "{}  {}  start={:?}",
                        schedule.schedule_id, schedule.experiment_name, schedule.start_time
                    );
                }
            }
        },
        Err(err) => print_error(&err),
    }
    Ok(())
}
