//! Catalog command - list, add and remove course offerings, assign instructors

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use packreg_core::services::{LogEvent, LoggingService};
use packreg_core::{Course, CourseKey, Meeting, Outcome, PackContext};
use serde::Serialize;

use super::{get_context, get_logger, log_event, login_registrar, Secrets};
use crate::output;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List every course with its meeting time and open seats
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a course (registrar only)
    Add {
        /// Course name, e.g. CSC216
        name: String,
        title: String,
        /// Three-digit section, e.g. 001
        section: String,
        #[arg(long)]
        credits: u8,
        #[arg(long)]
        cap: usize,
        /// Meeting days from MTWHF, or A for arranged
        #[arg(long)]
        days: String,
        /// Start time in military format (e.g. 1330)
        #[arg(long, default_value_t = 0)]
        start: u16,
        /// End time in military format (e.g. 1445)
        #[arg(long, default_value_t = 0)]
        end: u16,
        /// Faculty id of the instructor, subject to their course limit
        #[arg(long)]
        instructor: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a course and its roll (registrar only)
    Remove {
        name: String,
        section: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assign a faculty member to teach a course (registrar only)
    Assign {
        name: String,
        section: String,
        faculty_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear a course's instructor (registrar only)
    Unassign {
        name: String,
        section: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    name: &'a str,
    section: &'a str,
    title: &'a str,
    credits: u8,
    instructor_id: Option<&'a str>,
    meeting: String,
    enrollment_cap: usize,
    open_seats: usize,
    waitlisted: usize,
}

pub fn run(command: CatalogCommands) -> Result<()> {
    let logger = get_logger();

    match command {
        CatalogCommands::List { json } => {
            let ctx = get_context()?;
            let catalog = ctx.manager.catalog();

            if json {
                let entries: Vec<CatalogEntry> = catalog
                    .iter()
                    .map(|course| {
                        let roll = catalog.roll(&course.key());
                        CatalogEntry {
                            name: course.name(),
                            section: course.section(),
                            title: course.title(),
                            credits: course.credits(),
                            instructor_id: course.instructor_id(),
                            meeting: course.meeting_string(),
                            enrollment_cap: course.enrollment_cap(),
                            open_seats: roll.map(|r| r.open_seats()).unwrap_or_default(),
                            waitlisted: roll.map(|r| r.waitlist_len()).unwrap_or_default(),
                        }
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            output::print_view(&catalog.course_catalog(), "The catalog is empty");
        }
        CatalogCommands::Add { name, title, section, credits, cap, days, start, end, instructor, json } => {
            let mut ctx = get_context()?;
            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;

            let key = CourseKey::new(name.as_str(), section.as_str());
            let added = Meeting::new(&days, start, end)
                .and_then(|meeting| Course::new(&name, &title, &section, credits, instructor, cap, meeting))
                .and_then(|course| ctx.manager.add_course(course))
                .inspect_err(|e| {
                    log_event(&logger, LogEvent::new("course_add_failed")
                        .with_command("catalog add")
                        .with_subject(key.to_string())
                        .with_error(e.to_string()));
                })?;

            if added {
                ctx.save()?;
                log_event(&logger, LogEvent::new("course_added").with_command("catalog add").with_subject(key.to_string()));
            }

            if json {
                println!("{}", serde_json::json!({"course": key.to_string(), "added": added}));
            } else if added {
                output::success(&format!("Added {}", key));
            } else {
                output::warning(&format!("{} is already in the catalog", key));
            }
        }
        CatalogCommands::Remove { name, section, force, json } => {
            let mut ctx = get_context()?;
            let key = CourseKey::new(name, section);
            let Some(roll) = ctx.manager.catalog().roll(&key) else {
                bail!("{} is not in the catalog", key);
            };

            if !force && !json {
                let enrolled = roll.enrolled().len() + roll.waitlist_len();
                if enrolled > 0 {
                    println!("\n{}", format!("{} student(s) will lose {}.", enrolled, key).yellow());
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
            let removed = ctx.manager.remove_course(&key)?;
            ctx.save()?;
            log_event(&logger, LogEvent::new("course_removed").with_command("catalog remove").with_subject(key.to_string()));

            if json {
                println!("{}", serde_json::json!({"course": key.to_string(), "removed": removed}));
            } else {
                output::success(&format!("Removed {}", key));
            }
        }
        CatalogCommands::Assign { name, section, faculty_id, json } => {
            let mut ctx = get_context()?;
            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;

            let key = CourseKey::new(name, section);
            let outcome = ctx.manager.assign_instructor(&key, &faculty_id)?;
            finish_assignment(&ctx, &logger, "catalog assign", &key, &outcome, json,
                &format!("{} now teaches {}", faculty_id, key))?;
        }
        CatalogCommands::Unassign { name, section, json } => {
            let mut ctx = get_context()?;
            let mut secrets = Secrets::new();
            login_registrar(&mut ctx, &mut secrets)?;

            let key = CourseKey::new(name, section);
            let outcome = ctx.manager.unassign_instructor(&key)?;
            finish_assignment(&ctx, &logger, "catalog unassign", &key, &outcome, json,
                &format!("{} has no instructor", key))?;
        }
    }

    Ok(())
}

/// Save and report an instructor change
fn finish_assignment(
    ctx: &PackContext,
    logger: &Option<LoggingService>,
    command: &str,
    key: &CourseKey,
    outcome: &Outcome<()>,
    json: bool,
    applied: &str,
) -> Result<()> {
    let mut event = LogEvent::new("instructor_changed").with_command(command).with_subject(key.to_string());
    if let Some(reason) = outcome.reason() {
        event = event.with_error(reason);
    }
    log_event(logger, event);

    if outcome.is_applied() {
        ctx.save()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        output::print_outcome(outcome, applied);
    }
    Ok(())
}
