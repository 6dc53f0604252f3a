//! CLI command implementations

pub mod catalog;
pub mod faculty;
pub mod logs;
pub mod registration;
pub mod student;

use std::collections::VecDeque;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use dialoguer::Password;
use packreg_core::services::{EntryPoint, LogEvent, LoggingService};
use packreg_core::PackContext;

/// Password of the user a command logs in as
pub const PASSWORD_ENV: &str = "PACKREG_PASSWORD";
/// Password for a user being added
pub const NEW_PASSWORD_ENV: &str = "PACKREG_NEW_PASSWORD";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("PACKREG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".packreg"))
        .ok_or_else(|| anyhow!("Could not find home directory"))
}

/// Load the registration context from the data directory
pub fn get_context() -> Result<PackContext> {
    let data_dir = get_data_dir()?;

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    let ctx = PackContext::new(&data_dir).context("Failed to load registration data")?;

    let skipped = ctx.loaded.skipped();
    if skipped > 0 {
        eprintln!(
            "{}",
            format!("Skipped {} invalid record line(s) while loading", skipped).yellow()
        );
    }
    for reason in &ctx.loaded.unassigned {
        eprintln!("{}", reason.yellow());
    }
    Ok(ctx)
}

/// Passwords from the environment, piped stdin (one per line) or a prompt
#[derive(Default)]
pub struct Secrets {
    piped: Option<VecDeque<String>>,
}

impl Secrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines of piped stdin, read on first use. None when stdin is a terminal.
    fn piped(&mut self) -> Result<Option<&mut VecDeque<String>>> {
        if self.piped.is_none() && atty::isnt(atty::Stream::Stdin) {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            self.piped = Some(buffer.lines().map(|l| l.trim_end_matches('\r').to_string()).collect());
        }
        Ok(self.piped.as_mut())
    }

    fn next(&mut self, env_var: &str, prompt: &str) -> Result<String> {
        if let Ok(p) = env::var(env_var) {
            return Ok(p);
        }
        if let Some(lines) = self.piped()? {
            return lines
                .pop_front()
                .ok_or_else(|| anyhow!("Expected a password on stdin for: {}", prompt));
        }
        Ok(Password::new().with_prompt(prompt).interact()?)
    }

    /// Password for logging in
    pub fn login_password(&mut self, prompt: &str) -> Result<String> {
        self.next(PASSWORD_ENV, prompt)
    }

    /// Password and confirmation for a new account. The environment variable
    /// supplies both.
    pub fn new_password(&mut self) -> Result<(String, String)> {
        if let Ok(p) = env::var(NEW_PASSWORD_ENV) {
            return Ok((p.clone(), p));
        }
        let password = self.next(NEW_PASSWORD_ENV, "New user password")?;
        let repeat = self.next(NEW_PASSWORD_ENV, "Repeat password")?;
        Ok((password, repeat))
    }
}

/// Log in as the configured registrar
pub fn login_registrar(ctx: &mut PackContext, secrets: &mut Secrets) -> Result<()> {
    let id = ctx.manager.registrar().id.clone();
    let password = secrets.login_password("Registrar password")?;
    if !ctx.manager.login(&id, &password)? {
        bail!("Invalid registrar password");
    }
    Ok(())
}

/// Log in as a student
pub fn login_student(ctx: &mut PackContext, secrets: &mut Secrets, id: &str) -> Result<()> {
    let password = secrets.login_password(&format!("Password for {}", id))?;
    if !ctx.manager.login(id, &password)? {
        bail!("Invalid password for {}", id);
    }
    Ok(())
}
