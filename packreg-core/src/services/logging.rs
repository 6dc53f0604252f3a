//! Logging service - structured event logging to a JSON-lines file
//!
//! Events are appended to `logs.jsonl` in the data directory, one JSON
//! object per line. Passwords and digests are never logged; events carry
//! only the command, an optional subject (a course key or user id) and
//! error text.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

const LOG_FILE: &str = "logs.jsonl";

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Current unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    // Lower 16 bits hold the counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((now_ms() as u64) << 16) | counter
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            subject: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set what the event was about (course key, user id)
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set error details (source chain, additional context)
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the log file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// Which log entries a query returns
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Only entries with an error message
    pub errors_only: bool,
    /// First word of the command, e.g. "catalog" matches "catalog add"
    pub command: Option<String>,
    /// Case-insensitive prefix of the subject, e.g. "CSC216" or "jdoe"
    pub subject: Option<String>,
}

impl LogFilter {
    pub fn errors() -> Self {
        Self {
            errors_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if self.errors_only && entry.error_message.is_none() {
            return false;
        }
        if let Some(command) = &self.command {
            let top = entry
                .command
                .as_deref()
                .and_then(|c| c.split_whitespace().next());
            if top != Some(command.as_str()) {
                return false;
            }
        }
        if let Some(subject) = &self.subject {
            let matched = entry
                .subject
                .as_deref()
                .is_some_and(|s| s.to_lowercase().starts_with(&subject.to_lowercase()));
            if !matched {
                return false;
            }
        }
        true
    }
}

/// How often a command ran and failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandStats {
    pub runs: u64,
    pub failures: u64,
}

/// Service for structured event logging
pub struct LoggingService {
    lock: Mutex<()>,
    path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Create a new logging service writing to `logs.jsonl` in `data_dir`
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOG_FILE);
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            lock: Mutex::new(()),
            path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    /// Log an event
    ///
    /// The entry point, app version and platform are added from the service
    /// configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            command: event.command,
            subject: event.subject,
            error_message: event.error_message,
            error_details: event.error_details,
        };
        let line = serde_json::to_string(&entry)?;

        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Log a simple event with just a name
    pub fn log_event(&self, event: &str) -> Result<()> {
        self.log(LogEvent::new(event))
    }

    /// Log a CLI command execution
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Log an error
    pub fn log_error(&self, event: &str, message: &str, details: Option<&str>) -> Result<()> {
        let mut log_event = LogEvent::new(event).with_error(message);
        if let Some(d) = details {
            log_event = log_event.with_error_details(d);
        }
        self.log(log_event)
    }

    /// Every readable entry in file order. Unparseable lines are ignored.
    /// Callers hold the lock.
    fn read_entries(&self) -> Result<Vec<LogEntry>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let entries = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();
        Ok(entries)
    }

    fn read_all(&self) -> Result<Vec<LogEntry>> {
        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        self.read_entries()
    }

    /// Most recent entries first, up to `limit`
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.find(&LogFilter::default(), limit)
    }

    /// Most recent entries that carry an error, up to `limit`
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.find(&LogFilter::errors(), limit)
    }

    /// Most recent entries matching `filter`, up to `limit`
    pub fn find(&self, filter: &LogFilter, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = self.read_all()?;
        entries.retain(|e| filter.matches(e));
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Get the total number of log entries
    pub fn count(&self) -> Result<u64> {
        Ok(self.read_all()?.len() as u64)
    }

    /// Runs and failures of each top-level command, from the
    /// `command_executed` and `command_failed` events
    pub fn command_stats(&self) -> Result<BTreeMap<String, CommandStats>> {
        let mut stats: BTreeMap<String, CommandStats> = BTreeMap::new();
        for entry in self.read_all()? {
            let Some(command) = entry.command else { continue };
            match entry.event.as_str() {
                "command_executed" => stats.entry(command).or_default().runs += 1,
                "command_failed" => stats.entry(command).or_default().failures += 1,
                _ => {}
            }
        }
        Ok(stats)
    }

    /// Delete logs older than the specified timestamp (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let _guard = self.lock.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let (kept, deleted): (Vec<_>, Vec<_>) = self
            .read_entries()?
            .into_iter()
            .partition(|e| e.timestamp >= timestamp_ms);

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        for entry in &kept {
            writeln!(temp, "{}", serde_json::to_string(entry)?)?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(deleted.len() as u64)
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logging_service_creation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        assert!(service.path().exists());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_log_event() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_event("test_event").unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "test_event");
        assert_eq!(entries[0].entry_point, "cli");
        assert_eq!(entries[0].app_version, "1.0.0");
    }

    #[test]
    fn test_log_with_context() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Library, "2.0.0").unwrap();

        service
            .log(
                LogEvent::new("enrolled")
                    .with_subject("CSC216-001")
                    .with_command("enroll"),
            )
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "enrolled");
        assert_eq!(entries[0].subject, Some("CSC216-001".to_string()));
        assert_eq!(entries[0].command, Some("enroll".to_string()));
        assert_eq!(entries[0].entry_point, "library");
    }

    #[test]
    fn test_log_error() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_command("catalog list").unwrap();
        service
            .log_error("load_failed", "Unable to read file", Some("course_records.txt"))
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "load_failed");
        assert_eq!(errors[0].error_message, Some("Unable to read file".to_string()));
        assert_eq!(errors[0].error_details, Some("course_records.txt".to_string()));
    }

    #[test]
    fn test_recent_order_and_limit() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        for name in ["first", "second", "third"] {
            service.log_event(name).unwrap();
        }

        let entries = service.get_recent(2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, "third");
        assert_eq!(entries[1].event, "second");
    }

    #[test]
    fn test_count_and_delete() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_event("event1").unwrap();
        service.log_event("event2").unwrap();
        service.log_event("event3").unwrap();

        assert_eq!(service.count().unwrap(), 3);
        assert_eq!(service.delete_before(0).unwrap(), 0);

        // Delete all logs (using future timestamp)
        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_ignores_corrupt_lines() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
        service.log_event("good").unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(service.path()).unwrap();
            writeln!(file, "not json").unwrap();
        }
        service.log_event("also_good").unwrap();
        assert_eq!(service.count().unwrap(), 2);
    }

    #[test]
    fn test_find_by_command_and_subject() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log(LogEvent::new("enroll").with_command("enroll").with_subject("CSC216-001")).unwrap();
        service.log(LogEvent::new("enroll").with_command("enroll").with_subject("CSC116-002")).unwrap();
        service
            .log(LogEvent::new("course_added").with_command("catalog add").with_subject("csc216-002"))
            .unwrap();
        service
            .log(LogEvent::new("drop").with_command("drop").with_subject("CSC216-001").with_error("not enrolled"))
            .unwrap();

        let by_subject = LogFilter {
            subject: Some("CSC216".to_string()),
            ..LogFilter::default()
        };
        assert_eq!(service.find(&by_subject, 10).unwrap().len(), 3);

        let by_command = LogFilter {
            command: Some("catalog".to_string()),
            ..LogFilter::default()
        };
        let found = service.find(&by_command, 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event, "course_added");

        let failed_drops = LogFilter {
            errors_only: true,
            subject: Some("CSC216".to_string()),
            ..LogFilter::default()
        };
        let found = service.find(&failed_drops, 10).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event, "drop");
    }

    #[test]
    fn test_command_stats() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();

        service.log_command("enroll").unwrap();
        service.log_command("enroll").unwrap();
        service.log(LogEvent::new("command_failed").with_command("enroll").with_error("bad")).unwrap();
        service.log_command("catalog").unwrap();
        service.log(LogEvent::new("enroll").with_command("enroll")).unwrap();

        let stats = service.command_stats().unwrap();
        assert_eq!(stats["enroll"], CommandStats { runs: 2, failures: 1 });
        assert_eq!(stats["catalog"], CommandStats { runs: 1, failures: 0 });
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn test_delete_keeps_entries_logged_during_clear() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempdir().unwrap();
        let service = Arc::new(LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap());
        for i in 0..50 {
            service.log_event(&format!("old{}", i)).unwrap();
        }
        let cutoff = now_ms() + 1000;

        let writer = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..50 {
                    service
                        .log(LogEvent::new(format!("new{}", i)).with_command("enroll"))
                        .unwrap();
                }
            })
        };
        let deleted = service.delete_before(cutoff).unwrap();
        writer.join().unwrap();

        // Every entry is older than the cutoff; whatever the clear did not
        // see must still be in the file.
        assert_eq!(deleted + service.count().unwrap(), 100);
    }
}
