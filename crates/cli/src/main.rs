// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! robosched: the admin CLI realizing the §6.5 in-process API as "any
//! caller" (spec §4.M). Talks to the same SQLite store the daemon uses.

mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand};
use commands::{conflicts, contact, history, notifications, recovery, scheduler, schedule, upcoming};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "robosched", about = "Laboratory experiment scheduler admin CLI", version)]
struct Cli {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, list, inspect, update, and delete schedules
    Schedule(schedule::ScheduleArgs),
    /// Manual-recovery workflow: mark, resolve, status
    Recovery(recovery::RecoveryArgs),
    /// List schedules due within a horizon
    Upcoming(upcoming::UpcomingArgs),
    /// Check a set of schedules against each other for conflicts
    Conflicts(conflicts::ConflictsArgs),
    /// Control the scheduler background loop
    Scheduler(scheduler::SchedulerArgs),
    /// Notification contact CRUD
    Contact(contact::ContactArgs),
    /// Notification log, settings, and test send
    Notifications(notifications::NotificationsArgs),
    /// Execution history for a schedule
    History(history::HistoryArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = context::build_api()?;

    match cli.command {
        Commands::Schedule(args) => schedule::run(&api, args, cli.format).await,
        Commands::Recovery(args) => recovery::run(&api, args, cli.format).await,
        Commands::Upcoming(args) => upcoming::run(&api, args, cli.format).await,
        Commands::Conflicts(args) => conflicts::run(&api, args, cli.format).await,
        Commands::Scheduler(args) => scheduler::run(&api, args).await,
        Commands::Contact(args) => contact::run(&api, args, cli.format).await,
        Commands::Notifications(args) => notifications::run(&api, args, cli.format).await,
        Commands::History(args) => history::run(&api, args, cli.format).await,
    }
}
