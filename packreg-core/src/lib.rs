//! PackReg Core - Business logic for university course registration
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core registration entities (Course, Student, Schedule, CourseRoll, etc.)
//! - **ports**: Trait definitions for external dependencies (RecordFormat)
//! - **services**: Business logic orchestration (Catalog, Directory, RegistrationManager)
//! - **adapters**: Concrete implementations (comma-separated record files)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::{Path, PathBuf};

use serde::Serialize;

use adapters::{read_records, EnrollmentRecord, LoadSummary};
use config::Config;
use services::RegistrationManager;

// Re-export commonly used types at crate root
pub use domain::{
    Course, CourseKey, CourseRoll, EnrollStatus, Faculty, HashAlgorithm, Meeting, Person,
    Schedule, Student, TableView, User,
};
pub use domain::result::{Error, Outcome, Result};
pub use services::{CurrentUser, Registrar, ResetSummary};

/// What loading each record file produced. `None` means the file did not
/// exist yet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReports {
    pub courses: Option<LoadSummary>,
    pub students: Option<LoadSummary>,
    pub faculty: Option<LoadSummary>,
    pub enrollments: Option<LoadSummary>,
    /// Course instructor ids cleared because they did not resolve to a
    /// faculty member who can teach the course
    pub unassigned: Vec<String>,
}

impl LoadReports {
    /// Total number of skipped lines across all files
    pub fn skipped(&self) -> usize {
        [&self.courses, &self.students, &self.faculty, &self.enrollments]
            .iter()
            .filter_map(|s| s.as_ref())
            .map(|s| s.skipped.len())
            .sum()
    }
}

/// Main context for registration operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration and the registration manager populated from the data
/// directory.
pub struct PackContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub manager: RegistrationManager,
    pub loaded: LoadReports,
}

impl PackContext {
    /// Create a context, loading every record file that exists.
    ///
    /// Course instructors are checked against the faculty directory, then
    /// enrollments are restored last since they need the catalog and the
    /// student directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let algorithm = config.algorithm()?;
        let mut manager = RegistrationManager::new(config.registrar()?, algorithm);
        let mut loaded = LoadReports::default();

        let courses = config.courses_path(data_dir);
        if courses.exists() {
            loaded.courses = Some(manager.catalog_mut().load(&courses)?);
        }
        let students = config.students_path(data_dir);
        if students.exists() {
            loaded.students = Some(manager.student_directory_mut().load(&students)?);
        }
        let faculty = config.faculty_path(data_dir);
        if faculty.exists() {
            loaded.faculty = Some(manager.faculty_directory_mut().load(&faculty)?);
        }
        loaded.unassigned = manager.check_instructors();
        let enrollments = config.enrollments_path(data_dir);
        if enrollments.exists() {
            let report = read_records::<EnrollmentRecord>(&enrollments)?;
            loaded.enrollments = Some(manager.restore_enrollments(report));
        }

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            manager,
            loaded,
        })
    }

    /// Write every record file back to the data directory
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let dir = &self.data_dir;

        self.manager.catalog().save(&self.config.courses_path(dir))?;
        self.manager.student_directory().save(&self.config.students_path(dir))?;
        self.manager.faculty_directory().save(&self.config.faculty_path(dir))?;
        adapters::write_records(
            &self.config.enrollments_path(dir),
            &self.manager.enrollment_records(),
        )?;
        Ok(())
    }
}
