//! Student command - manage the student directory

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use packreg_core::domain::MAX_STUDENT_CREDITS;
use packreg_core::services::LogEvent;
use packreg_core::Person;

use super::{get_context, get_logger, log_event, login_registrar, Secrets};
use crate::output;

#[derive(Subcommand)]
pub enum StudentCommands {
    /// List students in directory order
    List {
        /// Sort by last name, first name, id
        #[arg(long)]
        sorted: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a student (registrar only)
    Add {
        first_name: String,
        last_name: String,
        id: String,
        email: String,
        /// Maximum credit hours (3-18)
        #[arg(long, default_value_t = MAX_STUDENT_CREDITS)]
        max_credits: u8,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a student (registrar only)
    Remove {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a student's details and schedule
    Show {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: StudentCommands) -> Result<()> {
    let logger = get_logger();

    match command {
        StudentCommands::List { sorted, json } => {
            let ctx = get_context()?;
            let students = ctx.manager.student_directory();

            if json {
                let list: Vec<_> = if sorted {
                    students.sorted()
                } else {
                    students.iter().collect()
                };
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }

            let view = if sorted { students.sorted_table() } else { students.table() };
            output::print_view(&view, "No students in the directory");
        }
        StudentCommands::Add { first_name, last_name, id, email, max_credits, json } => {
            let mut ctx = get_context()?;
            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;

            let (password, repeat) = secrets.new_password()?;
            let added = ctx
                .manager
                .student_directory_mut()
                .add_student(&first_name, &last_name, &id, &email, &password, &repeat, max_credits)
                .inspect_err(|e| {
                    log_event(&logger, LogEvent::new("student_add_failed")
                        .with_command("student add")
                        .with_subject(&id)
                        .with_error(e.to_string()));
                })?;

            if added {
                ctx.save()?;
                log_event(&logger, LogEvent::new("student_added").with_command("student add").with_subject(&id));
            }

            if json {
                println!("{}", serde_json::json!({"id": id, "added": added}));
            } else if added {
                output::success(&format!("Added student {}", id));
            } else {
                output::warning(&format!("A student with id {} already exists", id));
            }
        }
        StudentCommands::Remove { id, force, json } => {
            let mut ctx = get_context()?;
            if !ctx.manager.student_directory().contains(&id) {
                bail!("Student '{}' not found", id);
            }

            if !force && !json {
                println!("\n{}", format!("This will remove {} and drop them from every course.", id).yellow());
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
            let removed = ctx.manager.remove_student(&id)?;
            ctx.save()?;
            log_event(&logger, LogEvent::new("student_removed").with_command("student remove").with_subject(&id));

            if json {
                println!("{}", serde_json::json!({"id": id, "removed": removed}));
            } else {
                output::success(&format!("Removed student {}", id));
            }
        }
        StudentCommands::Show { id, json } => {
            let ctx = get_context()?;
            let Some(student) = ctx.manager.student_directory().get(&id) else {
                bail!("Student '{}' not found", id);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(student)?);
                return Ok(());
            }

            let user = student.user();
            println!("{}", format!("{} {} ({})", user.first_name(), user.last_name(), user.id()).bold());
            println!("  Email: {}", user.email());
            println!(
                "  Credits: {} of {}",
                student.schedule().scheduled_credits(),
                student.max_credits()
            );
            println!();
            println!("{}", student.schedule().title().bold());
            output::print_view(&student.schedule().full_scheduled_courses(), "No courses scheduled");
        }
    }

    Ok(())
}
