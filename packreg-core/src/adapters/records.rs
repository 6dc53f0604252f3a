//! Comma-delimited record files
//!
//! One record per line, no header row. Readers skip lines that fail
//! validation or repeat an earlier key and report them; writers replace the
//! target file atomically (temp file in the same directory, then rename).
//!
//! Formats:
//! - students: `first,last,id,email,passwordHash,maxCredits`
//! - faculty: `first,last,id,email,passwordHash,maxCourses`
//! - courses: `name,title,section,credits,instructorId,cap,days[,start,end]`
//! - enrollments: `name,section,studentId,status`

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Course, CourseKey, EnrollStatus, Faculty, Meeting, PasswordHash, Person, Student, User,
};
use crate::ports::RecordFormat;

/// A line that was not loaded, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
}

/// Records parsed from a file plus the lines that were rejected
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    /// Line number of each entry in `records`
    pub lines: Vec<u64>,
    pub skipped: Vec<SkippedLine>,
}

impl<T> LoadReport<T> {
    /// Same report with the records taken out
    pub fn split(self) -> (Vec<T>, LoadSummary) {
        let summary = LoadSummary {
            loaded: self.records.len(),
            skipped: self.skipped,
        };
        (self.records, summary)
    }
}

/// What a directory or catalog load did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: Vec<SkippedLine>,
}

/// Read every record of type `T` from `path`
pub fn read_records<T: RecordFormat>(path: &Path) -> Result<LoadReport<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|_| Error::invalid_argument(format!("Unable to read file {}", path.display())))?;

    let mut records = Vec::new();
    let mut lines = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        let fallback_line = index as u64 + 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                skipped.push(SkippedLine { line, reason: e.to_string() });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);
        let fields: Vec<&str> = row.iter().collect();

        match T::decode(&fields) {
            Ok(record) => {
                let key = record.record_key();
                if seen.contains(&key) {
                    skipped.push(SkippedLine {
                        line,
                        reason: format!("duplicate {} {}", T::KIND, key),
                    });
                    continue;
                }
                seen.insert(key);
                records.push(record);
                lines.push(line);
            }
            Err(e) => skipped.push(SkippedLine { line, reason: e.to_string() }),
        }
    }

    Ok(LoadReport { records, lines, skipped })
}

/// Write `records` to `path`, replacing any existing file
pub fn write_records<'a, T, I>(path: &Path, records: I) -> Result<()>
where
    T: RecordFormat + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let write_error = || Error::invalid_argument(format!("Unable to write to file {}", path.display()));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|_| write_error())?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(&mut temp);
        for record in records {
            writer.write_record(record.encode()).map_err(|_| write_error())?;
        }
        writer.flush().map_err(|_| write_error())?;
    }

    temp.persist(path).map_err(|_| write_error())?;
    Ok(())
}

fn field<'a>(fields: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| Error::invalid_argument(format!("missing {}", name)))
}

fn parse_field<T: FromStr>(fields: &[&str], index: usize, name: &str) -> Result<T> {
    field(fields, index, name)?
        .parse()
        .map_err(|_| Error::invalid_argument(format!("invalid {}", name)))
}

fn expect_len(fields: &[&str], allowed: &[usize]) -> Result<()> {
    if !allowed.contains(&fields.len()) {
        return Err(Error::invalid_argument(format!(
            "expected {:?} fields, found {}",
            allowed,
            fields.len()
        )));
    }
    Ok(())
}

fn decode_user(fields: &[&str]) -> Result<User> {
    User::new(
        field(fields, 0, "first name")?,
        field(fields, 1, "last name")?,
        field(fields, 2, "id")?,
        field(fields, 3, "email")?,
        PasswordHash::from_stored(field(fields, 4, "password")?)?,
    )
}

fn encode_user(user: &User) -> Vec<String> {
    vec![
        user.first_name().to_string(),
        user.last_name().to_string(),
        user.id().to_string(),
        user.email().to_string(),
        user.password().as_str().to_string(),
    ]
}

impl RecordFormat for Student {
    type Key = String;
    const KIND: &'static str = "student";

    fn record_key(&self) -> String {
        self.id().to_string()
    }

    fn decode(fields: &[&str]) -> Result<Self> {
        expect_len(fields, &[6])?;
        let user = decode_user(fields)?;
        Student::new(user, parse_field(fields, 5, "max credits")?)
    }

    fn encode(&self) -> Vec<String> {
        let mut fields = encode_user(self.user());
        fields.push(self.max_credits().to_string());
        fields
    }
}

impl RecordFormat for Faculty {
    type Key = String;
    const KIND: &'static str = "faculty";

    fn record_key(&self) -> String {
        self.id().to_string()
    }

    fn decode(fields: &[&str]) -> Result<Self> {
        expect_len(fields, &[6])?;
        let user = decode_user(fields)?;
        Faculty::new(user, parse_field(fields, 5, "max courses")?)
    }

    fn encode(&self) -> Vec<String> {
        let mut fields = encode_user(self.user());
        fields.push(self.max_courses().to_string());
        fields
    }
}

impl RecordFormat for Course {
    type Key = CourseKey;
    const KIND: &'static str = "course";

    fn record_key(&self) -> CourseKey {
        self.key()
    }

    fn decode(fields: &[&str]) -> Result<Self> {
        expect_len(fields, &[7, 9])?;
        let days = field(fields, 6, "meeting days")?;
        let meeting = if fields.len() == 9 {
            Meeting::new(
                days,
                parse_field(fields, 7, "start time")?,
                parse_field(fields, 8, "end time")?,
            )?
        } else {
            Meeting::new(days, 0, 0)?
        };

        Course::new(
            field(fields, 0, "name")?,
            field(fields, 1, "title")?,
            field(fields, 2, "section")?,
            parse_field(fields, 3, "credits")?,
            Some(field(fields, 4, "instructor id")?.to_string()),
            parse_field(fields, 5, "enrollment cap")?,
            meeting,
        )
    }

    fn encode(&self) -> Vec<String> {
        let mut fields = vec![
            self.name().to_string(),
            self.title().to_string(),
            self.section().to_string(),
            self.credits().to_string(),
            self.instructor_id().unwrap_or_default().to_string(),
            self.enrollment_cap().to_string(),
            self.meeting().days().to_string(),
        ];
        if let Meeting::Scheduled { start, end, .. } = self.meeting() {
            fields.push(start.to_string());
            fields.push(end.to_string());
        }
        fields
    }
}

/// One student's place on one course roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentRecord {
    pub course: CourseKey,
    pub student_id: String,
    pub status: EnrollStatus,
}

/// Key for enrollment lines: a student appears once per course
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnrollmentKey(CourseKey, String);

impl fmt::Display for EnrollmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.1)
    }
}

impl RecordFormat for EnrollmentRecord {
    type Key = EnrollmentKey;
    const KIND: &'static str = "enrollment";

    fn record_key(&self) -> EnrollmentKey {
        EnrollmentKey(self.course.clone(), self.student_id.clone())
    }

    fn decode(fields: &[&str]) -> Result<Self> {
        expect_len(fields, &[4])?;
        let status = match field(fields, 3, "status")? {
            "enrolled" => EnrollStatus::Enrolled,
            "waitlisted" => EnrollStatus::Waitlisted,
            other => return Err(Error::invalid_argument(format!("invalid status {:?}", other))),
        };
        let student_id = field(fields, 2, "student id")?;
        if student_id.is_empty() {
            return Err(Error::invalid_argument("missing student id"));
        }
        Ok(Self {
            course: CourseKey::new(field(fields, 0, "name")?, field(fields, 1, "section")?),
            student_id: student_id.to_string(),
            status,
        })
    }

    fn encode(&self) -> Vec<String> {
        let status = match self.status {
            EnrollStatus::Enrolled => "enrolled",
            EnrollStatus::Waitlisted => "waitlisted",
        };
        vec![
            self.course.name.clone(),
            self.course.section.clone(),
            self.student_id.clone(),
            status.to_string(),
        ]
    }
}
