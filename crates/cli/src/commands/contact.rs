// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `robosched contact` - CRUD on notification contacts (spec §6.5).

use crate::output::{print_error, print_json, OutputFormat};
use clap::{Args, Subcommand};
use robosched_core::{ContactId, NotificationContact};
use robosched_engine::Api;
use std::str::FromStr;

#[derive(Args)]
pub struct ContactArgs {
    #[command(subcommand)]
    pub command: ContactCommand,
}

#[derive(Subcommand)]
pub enum ContactCommand {
    Create {
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        email_address: String,
        #[arg(long, default_value_t = true)]
        active: bool,
    },
    List,
    Update {
        contact_id: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        email_address: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        contact_id: String,
    },
}

pub async fn run(api: &impl Api, args: ContactArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.command {
        ContactCommand::Create { display_name, email_address, active } => {
            let now = chrono::Local::now().naive_local();
            let contact = NotificationContact {
                contact_id: ContactId::new(),
                display_name,
                email_address,
                is_active: active,
                created_at: now,
                updated_at: now,
            };
            match api.create_contact(contact).await {
                Ok(created) => print_contact(&created, format),
                Err(err) => print_error(&err),
            }
        }
        ContactCommand::List => match api.list_contacts().await {
            Ok(contacts) => match format {
                OutputFormat::Json => {
                    let _ = print_json(&contacts);
                }
                OutputFormat::Text => {
                    for contact in &contacts {
                        print_contact(contact, OutputFormat::Text);
                    }
                }
            },
            Err(err) => print_error(&err),
        },
        ContactCommand::Update { contact_id, display_name, email_address, active } => {
            let id = ContactId::from_str(&contact_id)?;
            let contacts = api.list_contacts().await?;
            let Some(mut contact) = contacts.into_iter().find(|c| c.contact_id == id) else {
                print_error(&robosched_core::ApiError::NotFound(contact_id));
                return Ok(());
            };
            if let Some(v) = display_name {
                contact.display_name = v;
            }
            if let Some(v) = email_address {
                contact.email_address = v;
            }
            if let Some(v) = active {
                contact.is_active = v;
            }
            match api.update_contact(contact).await {
                Ok(updated) => print_contact(&updated, format),
                Err(err) => print_error(&err),
            }
        }
        ContactCommand::Delete { contact_id } => {
            let id = ContactId::from_str(&contact_id)?;
            match api.delete_contact(id).await {
                Ok(()) => println!("deleted {id}"),
                Err(err) => print_error(&err),
            }
        }
    }
    Ok(())
}

fn print_contact(contact: &NotificationContact, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let _ = print_json(contact);
        }
        OutputFormat::Text => println!(
            "{}  {}  <{}>  active={}",
            contact.contact_id, contact.display_name, contact.email_address, contact.is_active
        ),
    }
}
