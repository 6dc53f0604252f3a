//! Course domain model

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::result::{Error, Result};

pub const MIN_CREDITS: u8 = 1;
pub const MAX_CREDITS: u8 = 5;
pub const MIN_ENROLLMENT_CAP: usize = 10;
pub const MAX_ENROLLMENT_CAP: usize = 250;

/// Days a course may meet on, in display order
const MEETING_DAYS: &str = "MTWHF";
const ARRANGED: &str = "A";

fn course_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // 1-4 letters, 3 digits, optional one-letter suffix (e.g. CSC216, E115, HESF101L)
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z]{1,4}[0-9]{3}[A-Za-z]?$").expect("valid pattern"))
}

/// Catalog key for a course offering: name plus section
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CourseKey {
    pub name: String,
    pub section: String,
}

impl CourseKey {
    pub fn new(name: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
        }
    }
}

impl fmt::Display for CourseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.section)
    }
}

/// When a course meets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Meeting {
    /// No fixed meeting time (online, independent study)
    Arranged,
    /// Meets on the given days between two military times (inclusive)
    Scheduled { days: String, start: u16, end: u16 },
}

impl Meeting {
    /// Build a meeting from record fields. Arranged meetings carry no times.
    pub fn new(days: &str, start: u16, end: u16) -> Result<Self> {
        let days = days.trim();
        if days.is_empty() {
            return Err(Error::invalid_argument("Invalid meeting days and times."));
        }
        if days == ARRANGED {
            if start != 0 || end != 0 {
                return Err(Error::invalid_argument("Invalid meeting days and times."));
            }
            return Ok(Meeting::Arranged);
        }

        let mut seen = String::new();
        for c in days.chars() {
            if !MEETING_DAYS.contains(c) || seen.contains(c) {
                return Err(Error::invalid_argument("Invalid meeting days and times."));
            }
            seen.push(c);
        }

        if !valid_military_time(start) || !valid_military_time(end) || start > end {
            return Err(Error::invalid_argument("Invalid meeting days and times."));
        }

        Ok(Meeting::Scheduled {
            days: days.to_string(),
            start,
            end,
        })
    }

    /// Meeting days as stored in record files
    pub fn days(&self) -> &str {
        match self {
            Meeting::Arranged => ARRANGED,
            Meeting::Scheduled { days, .. } => days,
        }
    }

    /// Two meetings conflict if they share a day and their time ranges
    /// overlap, endpoints included. Arranged meetings never conflict.
    pub fn conflicts_with(&self, other: &Meeting) -> bool {
        match (self, other) {
            (
                Meeting::Scheduled { days, start, end },
                Meeting::Scheduled {
                    days: other_days,
                    start: other_start,
                    end: other_end,
                },
            ) => {
                let shares_day = days.chars().any(|d| other_days.contains(d));
                shares_day && start <= other_end && other_start <= end
            }
            _ => false,
        }
    }

    /// Human-readable form, e.g. "MW 1:30PM-2:45PM" or "Arranged"
    pub fn display_string(&self) -> String {
        match self {
            Meeting::Arranged => "Arranged".to_string(),
            Meeting::Scheduled { days, start, end } => {
                format!("{} {}-{}", days, standard_time(*start), standard_time(*end))
            }
        }
    }
}

fn valid_military_time(time: u16) -> bool {
    time / 100 <= 23 && time % 100 <= 59
}

fn standard_time(time: u16) -> String {
    let hour = time / 100;
    let minute = time % 100;
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02}{}", display_hour, minute, suffix)
}

/// A course offering in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    name: String,
    title: String,
    section: String,
    credits: u8,
    instructor_id: Option<String>,
    enrollment_cap: usize,
    meeting: Meeting,
}

impl Course {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        section: impl Into<String>,
        credits: u8,
        instructor_id: Option<String>,
        enrollment_cap: usize,
        meeting: Meeting,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if !course_name_pattern().is_match(&name) {
            return Err(Error::invalid_argument(format!("Invalid course name {:?}", name)));
        }

        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(Error::invalid_argument("Invalid title."));
        }

        let section = section.into().trim().to_string();
        if section.len() != 3 || !section.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::invalid_argument("Invalid section."));
        }

        if !(MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
            return Err(Error::invalid_argument("Invalid credits."));
        }

        if !(MIN_ENROLLMENT_CAP..=MAX_ENROLLMENT_CAP).contains(&enrollment_cap) {
            return Err(Error::invalid_argument("Invalid enrollment capacity."));
        }

        let mut course = Self {
            name,
            title,
            section,
            credits,
            instructor_id: None,
            enrollment_cap,
            meeting,
        };
        course.set_instructor_id(instructor_id);
        Ok(course)
    }

    pub fn key(&self) -> CourseKey {
        CourseKey::new(&self.name, &self.section)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn credits(&self) -> u8 {
        self.credits
    }

    pub fn instructor_id(&self) -> Option<&str> {
        self.instructor_id.as_deref()
    }

    pub fn enrollment_cap(&self) -> usize {
        self.enrollment_cap
    }

    pub fn meeting(&self) -> &Meeting {
        &self.meeting
    }

    pub fn meeting_string(&self) -> String {
        self.meeting.display_string()
    }

    /// Blank ids clear the assignment
    pub fn set_instructor_id(&mut self, instructor_id: Option<String>) {
        self.instructor_id = instructor_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
    }

    /// Fail if this course's meeting overlaps another course's meeting
    pub fn check_conflict(&self, other: &Course) -> Result<()> {
        if self.meeting.conflicts_with(&other.meeting) {
            return Err(Error::validation("The course cannot be added due to a conflict."));
        }
        Ok(())
    }
}
