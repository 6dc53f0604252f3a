//! Faculty command - manage the faculty directory

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use packreg_core::services::LogEvent;

use super::{get_context, get_logger, log_event, login_registrar, Secrets};
use crate::output;

#[derive(Subcommand)]
pub enum FacultyCommands {
    /// List faculty in directory order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a faculty member (registrar only)
    Add {
        first_name: String,
        last_name: String,
        id: String,
        email: String,
        /// Maximum courses taught per semester (1-3)
        #[arg(long, default_value_t = 3)]
        max_courses: u8,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a faculty member and unassign their courses (registrar only)
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: FacultyCommands) -> Result<()> {
    let logger = get_logger();

    match command {
        FacultyCommands::List { json } => {
            let ctx = get_context()?;
            let faculty = ctx.manager.faculty_directory();

            if json {
                let list: Vec<_> = faculty.iter().collect();
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }
            output::print_view(&faculty.table(), "No faculty in the directory");
        }
        FacultyCommands::Add { first_name, last_name, id, email, max_courses, json } => {
            let mut ctx = get_context()?;
            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;

            let (password, repeat) = secrets.new_password()?;
            let added = ctx
                .manager
                .faculty_directory_mut()
                .add_faculty(&first_name, &last_name, &id, &email, &password, &repeat, max_courses)
                .inspect_err(|e| {
                    log_event(&logger, LogEvent::new("faculty_add_failed")
                        .with_command("faculty add")
                        .with_subject(&id)
                        .with_error(e.to_string()));
                })?;

            if added {
                ctx.save()?;
                log_event(&logger, LogEvent::new("faculty_added").with_command("faculty add").with_subject(&id));
            }

            if json {
                println!("{}", serde_json::json!({"id": id, "added": added}));
            } else if added {
                output::success(&format!("Added faculty {}", id));
            } else {
                output::warning(&format!("A faculty member with id {} already exists", id));
            }
        }
        FacultyCommands::Remove { id, force, json } => {
            let mut ctx = get_context()?;
            if !ctx.manager.faculty_directory().contains(&id) {
                bail!("Faculty '{}' not found", id);
            }

            if !force && !json {
                let teaching = ctx.manager.catalog().courses_taught_by(&id).count();
                if teaching > 0 {
                    println!("\n{}", format!("{} teaches {} course(s); they will be unassigned.", id, teaching).yellow());
                }
                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;
            let removed = ctx.manager.remove_faculty(&id)?;
            ctx.save()?;
            log_event(&logger, LogEvent::new("faculty_removed").with_command("faculty remove").with_subject(&id));

            if json {
                println!("{}", serde_json::json!({"id": id, "removed": removed}));
            } else {
                output::success(&format!("Removed faculty {}", id));
            }
        }
    }

    Ok(())
}
