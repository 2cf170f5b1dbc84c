// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched notifications` - log listing, settings get/update, send-test
//! (spec §6.5, §4.G).

use crate::output::{print_error, print_json, OutputFormat};
use clap::{Args, Subcommand, ValueEnum};
use robosched_core::{ContactId, EventType, LogStatus, NotificationSettings};
use robosched_engine::Api;
use robosched_storage::NotificationLogFilter;
use std::str::FromStr;

#[derive(Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EventTypeArg {
    Aborted,
    LongRunning,
    ManualRecoveryRequired,
    ManualRecoveryCleared,
    Test,
}

impl From<EventTypeArg> for EventType {
    fn from(v: EventTypeArg) -> Self {
        match v {
            EventTypeArg::Aborted => EventType::Aborted,
            EventTypeArg::LongRunning => EventType::LongRunning,
            EventTypeArg::ManualRecoveryRequired => EventType::ManualRecoveryRequired,
            EventTypeArg::ManualRecoveryCleared => EventType::ManualRecoveryCleared,
            EventTypeArg::Test => EventType::Test,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogStatusArg {
    Pending,
    Sent,
    Error,
}

impl From<LogStatusArg> for LogStatus {
    fn from(v: LogStatusArg) -> Self {
        match v {
            LogStatusArg::Pending => LogStatus::Pending,
            LogStatusArg::Sent => LogStatus::Sent,
            LogStatusArg::Error => LogStatus::Error,
        }
    }
}

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// List notification log entries
    Log {
        #[arg(long)]
        schedule_id: Option<String>,
        #[arg(long, value_enum)]
        event_type: Option<EventTypeArg>,
        #[arg(long, value_enum)]
        status: Option<LogStatusArg>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show current SMTP/notification settings (password redacted)
    SettingsGet,
    /// Update SMTP/notification settings
    SettingsUpdate {
        #[arg(long)]
        smtp_host: String,
        #[arg(long)]
        smtp_port: u16,
        #[arg(long)]
        smtp_username: String,
        /// Plaintext password, encrypted before storage
        #[arg(long)]
        smtp_password: String,
        #[arg(long)]
        sender_address: String,
        #[arg(long, default_value_t = true)]
        use_tls: bool,
        #[arg(long, default_value_t = false)]
        use_ssl: bool,
        /// Email recipient for manual-recovery notifications; repeatable
        #[arg(long = "recipient")]
        recipients: Vec<String>,
    },
    /// Send a test notification to one or more contacts
    SendTest {
        #[arg(long = "contact", required = true)]
        contacts: Vec<String>,
    },
}

pub async fn run(api: &impl Api, args: NotificationsArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        NotificationsCommand::Log { schedule_id, event_type, status, limit } => {
            let filter = NotificationLogFilter {
                schedule_id: schedule_id.as_deref().map(robosched_core::ScheduleId::from_str).transpose()?,
                event_type: event_type.map(Into::into),
                status: status.map(Into::into),
                limit,
            };
            match api.list_notification_logs(filter).await {
                Ok(entries) => match format {
                    OutputFormat::Json => {
                        let _ = print_json(&entries);
                    }
                    OutputFormat::Text => {
                        for entry in &entries {
                            println!(
                                "{}  {}  {}  recipients={}",
                                entry.log_id,
                                entry.event_type,
                                entry.status,
                                entry.recipients.join(",")
                            );
                        }
                    }
                },
                Err(err) => print_error(&err),
            }
        }
        NotificationsCommand::SettingsGet => match api.get_notification_settings().await {
            Ok(settings) => {
                let _ = print_json(&settings);
            }
            Err(err) => print_error(&err),
        },
        NotificationsCommand::SettingsUpdate {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            sender_address,
            use_tls,
            use_ssl,
            recipients,
        } => {
            let now = chrono::Local::now().naive_local();
            let settings = NotificationSettings {
                smtp_host,
                smtp_port,
                smtp_username,
                smtp_password_encrypted: robosched_adapters::encrypt(&smtp_password)?,
                sender_address,
                use_tls,
                use_ssl,
                manual_recovery_recipients: recipients,
                created_at: now,
                updated_at: now,
            };
            match api.update_notification_settings(settings).await {
                Ok(()) => println!("notification settings updated"),
                Err(err) => print_error(&err),
            }
        }
        NotificationsCommand::SendTest { contacts } => {
            let contact_ids: Vec<ContactId> = contacts.iter().map(|s| ContactId::from_str(s)).collect::<Result<_, _>>()?;
            match api.send_test_notification(contact_ids).await {
                Ok(()) => println!("test notification dispatched"),
                Err(err) => print_error(&err),
            }
        }
    }
    Ok(())
}
