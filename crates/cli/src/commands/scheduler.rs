// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched scheduler` - start/stop/status (spec §6.5).
//!
//! The CLI runs in its own process from the daemon, so these only reflect
//! the detached handle's local state, not the daemon's live engine loop
//! (see DESIGN.md for the cross-process limitation).

use crate::output::print_error;
use clap::{Args, Subcommand};
use robosched_engine::{Api, SchedulerStatus};

#[derive(Args)]
pub struct SchedulerArgs {
    #[command(subcommand)]
    pub command: SchedulerCommand,
}

#[derive(Subcommand)]
pub enum SchedulerCommand {
    Start,
    Stop,
    Status,
}

pub async fn run(api: &impl Api, args: SchedulerArgs) -> anyhow::Result<()> {
    match args.command {
        SchedulerCommand::Start => {
            if let Err(err) = api.start_scheduler() {
                print_error(&err);
            }
        }
        SchedulerCommand::Stop => {
            if let Err(err) = api.stop_scheduler() {
                print_error(&err);
            }
        }
        SchedulerCommand::Status => {
            let status = match api.get_scheduler_status() {
                SchedulerStatus::Running => "running",
                SchedulerStatus::Stopped => "stopped",
            };
            println!("{status}");
        }
    }
    Ok(())
}
