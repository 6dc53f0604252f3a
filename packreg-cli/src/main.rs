//! PackReg CLI - course registration in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{catalog, faculty, logs, registration, student};
use packreg_core::services::LogEvent;

/// PackReg - course registration in your terminal
#[derive(Parser)]
#[command(name = "packreg", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the student directory
    Student {
        #[command(subcommand)]
        command: student::StudentCommands,
    },

    /// Manage the faculty directory
    Faculty {
        #[command(subcommand)]
        command: faculty::FacultyCommands,
    },

    /// Manage the course catalog
    Catalog {
        #[command(subcommand)]
        command: catalog::CatalogCommands,
    },

    /// Enroll in a course, or join its waitlist when full
    Enroll {
        /// Course name, e.g. CSC216
        name: String,
        /// Section, e.g. 001
        section: String,
        /// Student id to log in as
        #[arg(long, short)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop a course or leave its waitlist
    Drop {
        /// Course name, e.g. CSC216
        name: String,
        /// Section, e.g. 001
        section: String,
        /// Student id to log in as
        #[arg(long, short)]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop every course and waitlist
    Reset {
        /// Student id to log in as
        #[arg(long, short)]
        user: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a student's schedule
    Schedule {
        /// Student id to log in as
        #[arg(long, short)]
        user: String,
        /// Include credits and instructor
        #[arg(long)]
        full: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Student { .. } => "student",
            Commands::Faculty { .. } => "faculty",
            Commands::Catalog { .. } => "catalog",
            Commands::Enroll { .. } => "enroll",
            Commands::Drop { .. } => "drop",
            Commands::Reset { .. } => "reset",
            Commands::Schedule { .. } => "schedule",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();
    let logger = commands::get_logger();
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string())
                    .with_error_details(format!("{:#}", e)),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Student { command } => student::run(command),
        Commands::Faculty { command } => faculty::run(command),
        Commands::Catalog { command } => catalog::run(command),
        Commands::Enroll { name, section, user, json } => registration::run_enroll(&user, name, section, json),
        Commands::Drop { name, section, user, json } => registration::run_drop(&user, name, section, json),
        Commands::Reset { user, force, json } => registration::run_reset(&user, force, json),
        Commands::Schedule { user, full, json } => registration::run_schedule(&user, full, json),
        Commands::Logs { command } => logs::run(command),
    }
}
