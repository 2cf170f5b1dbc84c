// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched schedule` - create/list/get/update/delete (spec §6.5).

use crate::output::{print_error, print_json, OutputFormat};
use clap::{Args, Subcommand, ValueEnum};
use robosched_core::{
    BackoffStrategy, ContactId, PrerequisiteStep, RetryConfig, Schedule, ScheduleId, ScheduleType,
    DEFAULT_MAX_RETRIES,
};
use robosched_engine::Api;
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScheduleTypeArg {
    Once,
    Interval,
    Cron,
}

impl From<ScheduleTypeArg> for ScheduleType {
    fn from(v: ScheduleTypeArg) -> Self {
        match v {
            ScheduleTypeArg::Once => ScheduleType::Once,
            ScheduleTypeArg::Interval => ScheduleType::Interval,
            ScheduleTypeArg::Cron => ScheduleType::Cron,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackoffArg {
    Linear,
    Exponential,
}

impl From<BackoffArg> for BackoffStrategy {
    fn from(v: BackoffArg) -> Self {
        match v {
            BackoffArg::Linear => BackoffStrategy::Linear,
            BackoffArg::Exponential => BackoffStrategy::Exponential,
        }
    }
}

impl std::fmt::Display for BackoffArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BackoffArg::Linear => "linear",
            BackoffArg::Exponential => "exponential",
        })
    }
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Create a new schedule
    Create {
        #[arg(long)]
        experiment_name: String,
        /// Absolute vendor method path, must end `.med`
        #[arg(long)]
        experiment_path: String,
        #[arg(long, value_enum)]
        schedule_type: ScheduleTypeArg,
        /// Required, must be > 0, iff schedule-type=interval
        #[arg(long)]
        interval_hours: Option<f64>,
        /// ISO-8601 instant, required unless schedule-type=cron
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        estimated_duration_minutes: u32,
        #[arg(long, default_value_t = false)]
        inactive: bool,
        /// Pre-execution step token, e.g. `ResetHamiltonTables:Experiments,Queue`.
        /// Repeatable; order is preserved.
        #[arg(long = "prerequisite")]
        prerequisites: Vec<String>,
        /// Notification contact id (UUID); repeatable
        #[arg(long = "contact")]
        contacts: Vec<String>,
        #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
        max_retries: u32,
        #[arg(long, default_value_t = 2)]
        retry_delay_minutes: u32,
        #[arg(long, value_enum, default_value_t = BackoffArg::Linear)]
        backoff: BackoffArg,
        #[arg(long)]
        abort_after_hours: Option<u32>,
        #[arg(long)]
        created_by: String,
    },
    /// List schedules
    List {
        #[arg(long)]
        active_only: bool,
    },
    /// Show a single schedule
    Get { schedule_id: String },
    /// Update an existing schedule (only the provided fields change)
    Update {
        schedule_id: String,
        #[arg(long)]
        experiment_name: Option<String>,
        #[arg(long)]
        experiment_path: Option<String>,
        #[arg(long)]
        estimated_duration_minutes: Option<u32>,
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        interval_hours: Option<f64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a schedule
    Delete { schedule_id: String },
}

pub async fn run(api: &impl Api, args: ScheduleArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        ScheduleCommand::Create {
            experiment_name,
            experiment_path,
            schedule_type,
            interval_hours,
            start_time,
            estimated_duration_minutes,
            inactive,
            prerequisites,
            contacts,
            max_retries,
            retry_delay_minutes,
            backoff,
            abort_after_hours,
            created_by,
        } => {
            let now = chrono::Local::now().naive_local();
            let contact_ids: HashSet<ContactId> = contacts
                .iter()
                .map(|s| ContactId::from_str(s))
                .collect::<Result<_, _>>()?;
            let schedule = Schedule {
                schedule_id: ScheduleId::new(),
                experiment_name,
                experiment_path,
                schedule_type: schedule_type.into(),
                interval_hours,
                start_time: robosched_core::parse_iso_to_local(start_time.as_deref()),
                estimated_duration_minutes,
                is_active: !inactive,
                retry_config: RetryConfig {
                    max_retries,
                    retry_delay_minutes,
                    backoff_strategy: backoff.into(),
                    abort_after_hours,
                },
                prerequisites: prerequisites.iter().map(|t| PrerequisiteStep::parse(t)).collect(),
                notification_contact_ids: contact_ids,
                failed_execution_count: 0,
                recovery_required: false,
                recovery_note: None,
                recovery_marked_at: None,
                recovery_marked_by: None,
                recovery_resolved_at: None,
                recovery_resolved_by: None,
                created_by,
                created_at: now,
                updated_at: now,
            };
            match api.create_schedule(schedule).await {
                Ok(created) => print_created(&created, format),
                Err(err) => print_error(&err),
            }
        }
        ScheduleCommand::List { active_only } => match api.list_schedules(active_only).await {
            Ok(schedules) => print_list(&schedules, format),
            Err(err) => print_error(&err),
        },
        ScheduleCommand::Get { schedule_id } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            match api.get_schedule(id).await {
                Ok(schedule) => print_created(&schedule, format),
                Err(err) => print_error(&err),
            }
        }
        ScheduleCommand::Update {
            schedule_id,
            experiment_name,
            experiment_path,
            estimated_duration_minutes,
            start_time,
            interval_hours,
            active,
        } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            let mut schedule = api.get_schedule(id).await?;
            if let Some(v) = experiment_name {
                schedule.experiment_name = v;
            }
            if let Some(v) = experiment_path {
                schedule.experiment_path = v;
            }
            if let Some(v) = estimated_duration_minutes {
                schedule.estimated_duration_minutes = v;
            }
            if let Some(v) = start_time {
                schedule.start_time = robosched_core::parse_iso_to_local(Some(&v));
            }
            if let Some(v) = interval_hours {
                schedule.interval_hours = Some(v);
            }
            if let Some(v) = active {
                schedule.is_active = v;
            }
            match api.update_schedule(schedule).await {
                Ok(updated) => print_created(&updated, format),
                Err(err) => print_error(&err),
            }
        }
        ScheduleCommand::Delete { schedule_id } => {
            let id = ScheduleId::from_str(&schedule_id)?;
            match api.delete_schedule(id).await {
                Ok(()) => println!("deleted {id}"),
                Err(err) => print_error(&err),
            }
        }
    }
    Ok(())
}

fn print_created(schedule: &Schedule, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let _ = print_json(schedule);
        }
        OutputFormat::Text => println!(
            "{}  {}  {}  active={}  recovery_required={}",
            schedule.schedule_id, schedule.experiment_name, schedule.schedule_type, schedule.is_active, schedule.recovery_required
        ),
    }
}

fn print_list(schedules: &[Schedule], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let _ = print_json(schedules);
        }
        OutputFormat::Text => {
            for schedule in schedules {
                print_created(schedule, OutputFormat::Text);
            }
        }
    }
}
