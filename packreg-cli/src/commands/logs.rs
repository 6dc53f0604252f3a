//! Logs command - browse the event log by command, course or user

use anyhow::Result;
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_data_dir;
use packreg_core::services::logging::now_ms;
use packreg_core::services::{EntryPoint, LogEntry, LogFilter, LoggingService};

use crate::output::{self, create_table, format_size};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        /// Show only failures, with their details
        #[arg(long)]
        errors: bool,
        /// Only this command, e.g. "enroll" or "catalog"
        #[arg(long)]
        command: Option<String>,
        /// Only events about this course or user (prefix, e.g. CSC216 or jdoe)
        #[arg(long)]
        subject: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove events older than a number of days
    Clear {
        #[arg(long, default_value_t = 30)]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Runs and failures per command, and where the log lives
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    LoggingService::new(&get_data_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn local_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn print_entries(entries: &[LogEntry], details: bool) {
    let mut table = create_table();
    table.set_header(vec!["Time", "Command", "Event", "Subject", "Error"]);
    for entry in entries {
        table.add_row(vec![
            local_time(entry.timestamp),
            entry.command.clone().unwrap_or_default(),
            entry.event.clone(),
            entry.subject.clone().unwrap_or_default(),
            entry.error_message.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    if !details {
        return;
    }
    for entry in entries {
        if let Some(d) = &entry.error_details {
            println!("{} {}", local_time(entry.timestamp).dimmed(), d);
        }
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List { limit, errors, command, subject, json } => {
            let filter = LogFilter {
                errors_only: errors,
                command,
                subject,
            };
            let entries = open_log()?.find(&filter, limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{}", "No matching log entries".dimmed());
            } else {
                print_entries(&entries, errors);
            }
        }
        LogsCommands::Clear { older_than_days, force, json } => {
            let service = open_log()?;

            if !force
                && !json
                && !Confirm::new()
                    .with_prompt(format!("Remove events older than {} days?", older_than_days))
                    .default(false)
                    .interact()?
            {
                println!("{}\n", "Cancelled".dimmed());
                return Ok(());
            }

            let cutoff_ms = now_ms() - older_than_days as i64 * DAY_MS;
            let deleted = service.delete_before(cutoff_ms)?;

            if json {
                println!("{}", serde_json::json!({"deleted": deleted}));
            } else {
                output::success(&format!("Removed {} event(s)", deleted));
            }
        }
        LogsCommands::Stats { json } => {
            let service = open_log()?;
            let total = service.count()?;
            let by_command = service.command_stats()?;
            let size_bytes = std::fs::metadata(service.path()).map(|m| m.len()).unwrap_or(0);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "entries": total,
                        "commands": by_command,
                        "path": service.path(),
                        "sizeBytes": size_bytes,
                    }))?
                );
                return Ok(());
            }

            if by_command.is_empty() {
                println!("{}", "No commands logged yet".dimmed());
            } else {
                let mut table = create_table();
                table.set_header(vec!["Command", "Runs", "Failed"]);
                for (name, stats) in &by_command {
                    let failed = if stats.failures > 0 {
                        stats.failures.to_string().red().to_string()
                    } else {
                        "0".to_string()
                    };
                    table.add_row(vec![name.clone(), stats.runs.to_string(), failed]);
                }
                println!("{}", table);
            }
            println!("{} entries, {} in {}", total, format_size(size_bytes), service.path().display());
        }
    }

    Ok(())
}
