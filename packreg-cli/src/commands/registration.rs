//! Registration commands - enroll, drop, reset and view a student's schedule

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use packreg_core::services::LogEvent;
use packreg_core::{CourseKey, EnrollStatus, Outcome};

use super::{get_context, get_logger, log_event, login_student, Secrets};
use crate::output;

pub fn run_enroll(user: &str, name: String, section: String, json: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;
    let mut secrets = Secrets::new();
    login_student(&mut ctx, &mut secrets, user)?;

    let key = CourseKey::new(name, section);
    let outcome = ctx.manager.enroll_student_in_course(&key)?;

    let mut event = LogEvent::new("enroll").with_command("enroll").with_subject(key.to_string());
    if let Some(reason) = outcome.reason() {
        event = event.with_error(reason);
    }
    log_event(&logger, event);

    if outcome.is_applied() {
        ctx.save()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let applied = match &outcome {
        Outcome::Applied(EnrollStatus::Waitlisted) => {
            let position = ctx
                .manager
                .catalog()
                .roll(&key)
                .map(|r| r.waitlist_len())
                .unwrap_or_default();
            format!("Added to the waitlist for {} (position {})", key, position)
        }
        _ => format!("Enrolled in {}", key),
    };
    output::print_outcome(&outcome, &applied);
    Ok(())
}

pub fn run_drop(user: &str, name: String, section: String, json: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;
    let mut secrets = Secrets::new();
    login_student(&mut ctx, &mut secrets, user)?;

    let key = CourseKey::new(name, section);
    let outcome = ctx.manager.drop_student_from_course(&key)?;

    let mut event = LogEvent::new("drop").with_command("drop").with_subject(key.to_string());
    if let Some(reason) = outcome.reason() {
        event = event.with_error(reason);
    }
    log_event(&logger, event);

    if outcome.is_applied() {
        ctx.save()?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        output::print_outcome(&outcome, &format!("Dropped {}", key));
    }
    Ok(())
}

pub fn run_reset(user: &str, force: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let mut ctx = get_context()?;

    if !force
        && !json
        && !Confirm::new()
            .with_prompt(format!("Drop {} from every course?", user))
            .default(false)
            .interact()?
    {
        println!("{}\n", "Cancelled".dimmed());
        return Ok(());
    }

    let mut secrets = Secrets::new();
    login_student(&mut ctx, &mut secrets, user)?;
    let summary = ctx.manager.reset_schedule()?;
    ctx.save()?;

    let mut event = LogEvent::new("schedule_reset").with_command("reset").with_subject(user);
    if !summary.skipped.is_empty() {
        event = event
            .with_error(format!("{} course(s) could not be dropped", summary.skipped.len()))
            .with_error_details(summary.skipped.join("; "));
    }
    log_event(&logger, event);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::success(&format!("Schedule reset for {}", user));
    for key in &summary.dropped {
        println!("  {} {}", "dropped".dimmed(), key);
    }
    for key in &summary.waitlists_left {
        println!("  {} {}", "left waitlist".dimmed(), key);
    }
    for skipped in &summary.skipped {
        output::warning(&format!("  skipped {}", skipped));
    }
    Ok(())
}

pub fn run_schedule(user: &str, full: bool, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let mut secrets = Secrets::new();
    login_student(&mut ctx, &mut secrets, user)?;

    if !full {
        let view = ctx.manager.scheduled_courses()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            output::print_view(&view, "No courses scheduled");
        }
        return Ok(());
    }

    let Some(student) = ctx.manager.student_directory().get(user) else {
        anyhow::bail!("Student '{}' not found", user);
    };
    let schedule = student.schedule();
    if json {
        println!("{}", serde_json::to_string_pretty(&schedule.full_scheduled_courses())?);
        return Ok(());
    }

    println!("{}", schedule.title().bold());
    output::print_view(&schedule.full_scheduled_courses(), "No courses scheduled");
    output::info(&format!(
        "{} of {} credit hours",
        schedule.scheduled_credits(),
        student.max_credits()
    ));
    Ok(())
}
