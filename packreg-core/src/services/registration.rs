//! Registration service - login sessions, enrollment and schedule resets
//!
//! The manager owns the catalog and both directories and tracks at most one
//! logged-in user. It is constructed by the caller and passed around
//! explicitly; there is no global instance.

use serde::Serialize;

use crate::adapters::{EnrollmentRecord, LoadReport, LoadSummary, SkippedLine};
use crate::domain::result::{Error, Outcome, Result};
use crate::domain::{
    Course, CourseKey, EnrollStatus, HashAlgorithm, PasswordHash, Person, Student, TableView,
};
use super::catalog::Catalog;
use super::directory::{FacultyDirectory, StudentDirectory};

const ILLEGAL_ACTION: &str = "Illegal Action";

/// The single registrar identity. It is never stored in a directory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrar {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip)]
    pub password: Option<PasswordHash>,
}

/// Who is logged in
#[derive(Debug, Clone, PartialEq, Eq)]
enum Session {
    Registrar,
    Student(String),
}

/// Borrowed view of the logged-in user
#[derive(Debug, Clone, Copy)]
pub enum CurrentUser<'a> {
    Registrar(&'a Registrar),
    Student(&'a Student),
}

impl CurrentUser<'_> {
    pub fn id(&self) -> &str {
        match self {
            CurrentUser::Registrar(r) => &r.id,
            CurrentUser::Student(s) => s.id(),
        }
    }
}

/// What a schedule reset did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    /// Courses the student was dropped from
    pub dropped: Vec<CourseKey>,
    /// Waitlists the student was removed from
    pub waitlists_left: Vec<CourseKey>,
    /// Scheduled courses whose roll could not be updated, with the reason
    pub skipped: Vec<String>,
}

/// Coordinates login, enrollment and schedule resets
#[derive(Debug, Clone)]
pub struct RegistrationManager {
    algorithm: HashAlgorithm,
    catalog: Catalog,
    students: StudentDirectory,
    faculty: FacultyDirectory,
    registrar: Registrar,
    session: Option<Session>,
}

impl RegistrationManager {
    pub fn new(registrar: Registrar, algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            catalog: Catalog::new(),
            students: StudentDirectory::new(algorithm),
            faculty: FacultyDirectory::new(algorithm),
            registrar,
            session: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn student_directory(&self) -> &StudentDirectory {
        &self.students
    }

    pub fn student_directory_mut(&mut self) -> &mut StudentDirectory {
        &mut self.students
    }

    pub fn faculty_directory(&self) -> &FacultyDirectory {
        &self.faculty
    }

    pub fn faculty_directory_mut(&mut self) -> &mut FacultyDirectory {
        &mut self.faculty
    }

    pub fn registrar(&self) -> &Registrar {
        &self.registrar
    }

    /// Log in as the registrar or a student.
    ///
    /// Returns `Ok(false)` if someone is already logged in or the password
    /// does not match. A registrar id that fails the registrar check is
    /// tried against the student directory. Fails if the id is unknown, or
    /// names only the registrar and no credential is configured.
    pub fn login(&mut self, id: &str, password: &str) -> Result<bool> {
        if self.session.is_some() {
            return Ok(false);
        }

        let is_registrar = self.registrar.id == id;
        if is_registrar {
            if let Some(stored) = &self.registrar.password {
                if stored.verify(self.algorithm, password) {
                    self.session = Some(Session::Registrar);
                    return Ok(true);
                }
            }
        }

        let Some(student) = self.students.get(id) else {
            return match (is_registrar, &self.registrar.password) {
                (true, Some(_)) => Ok(false),
                (true, None) => Err(Error::config("registrar credential is not configured")),
                (false, _) => Err(Error::not_found("User doesn't exist.")),
            };
        };
        if student.user().password().verify(self.algorithm, password) {
            self.session = Some(Session::Student(id.to_string()));
            return Ok(true);
        }
        Ok(false)
    }

    pub fn logout(&mut self) {
        self.session = None;
    }

    pub fn current_user(&self) -> Option<CurrentUser<'_>> {
        match self.session.as_ref()? {
            Session::Registrar => Some(CurrentUser::Registrar(&self.registrar)),
            Session::Student(id) => self.students.get(id).map(CurrentUser::Student),
        }
    }

    pub fn is_registrar_session(&self) -> bool {
        matches!(self.session, Some(Session::Registrar))
    }

    /// Empty the catalog and both directories. Unsaved records are lost.
    pub fn clear_data(&mut self) {
        self.catalog.new_catalog();
        self.students.new_directory();
        self.faculty.new_directory();
    }

    /// Id of the logged-in student, or an illegal action failure
    fn require_student(&self) -> Result<String> {
        match &self.session {
            Some(Session::Student(id)) if self.students.contains(id) => Ok(id.clone()),
            _ => Err(Error::illegal_action(ILLEGAL_ACTION)),
        }
    }

    fn require_registrar(&self) -> Result<()> {
        if self.is_registrar_session() {
            Ok(())
        } else {
            Err(Error::illegal_action(ILLEGAL_ACTION))
        }
    }

    /// Enroll the logged-in student in a course.
    ///
    /// The student is seated if there is room, otherwise waitlisted. A
    /// seated course is added to the student's schedule; a waitlisted one
    /// is added when a seat opens.
    pub fn enroll_student_in_course(&mut self, key: &CourseKey) -> Result<Outcome<EnrollStatus>> {
        let student_id = self.require_student()?;
        Ok(self.place_student(&student_id, key).into())
    }

    /// Drop the logged-in student from a course roll or waitlist
    pub fn drop_student_from_course(&mut self, key: &CourseKey) -> Result<Outcome<()>> {
        let student_id = self.require_student()?;
        Ok(self.unseat_student(&student_id, key).into())
    }

    /// Drop the logged-in student from every scheduled course and waitlist,
    /// then clear their schedule
    pub fn reset_schedule(&mut self) -> Result<ResetSummary> {
        let student_id = self.require_student()?;
        let mut summary = ResetSummary::default();

        let scheduled: Vec<CourseKey> = self
            .students
            .get(&student_id)
            .map(|s| s.schedule().courses().iter().map(|c| c.key()).collect())
            .unwrap_or_default();

        for key in scheduled {
            let dropped = match self.catalog.roll_mut(&key) {
                Some(roll) => roll.drop_student(&student_id).map_err(|e| e.to_string()),
                None => Err("not in catalog".to_string()),
            };
            match dropped {
                Ok(()) => {
                    self.fill_open_seat(&key);
                    summary.dropped.push(key);
                }
                Err(reason) => summary.skipped.push(format!("{}: {}", key, reason)),
            }
        }

        let waitlisted: Vec<CourseKey> = self
            .catalog
            .iter()
            .map(|c| c.key())
            .filter(|k| {
                self.catalog
                    .roll(k)
                    .is_some_and(|r| r.is_waitlisted(&student_id))
            })
            .collect();
        for key in waitlisted {
            if let Some(roll) = self.catalog.roll_mut(&key) {
                if roll.drop_student(&student_id).is_ok() {
                    summary.waitlists_left.push(key);
                }
            }
        }

        if let Some(student) = self.students.get_mut(&student_id) {
            student.schedule_mut().reset();
        }
        Ok(summary)
    }

    /// The logged-in student's schedule
    pub fn scheduled_courses(&self) -> Result<TableView> {
        let student_id = self.require_student()?;
        self.students
            .get(&student_id)
            .map(|s| s.schedule().scheduled_courses())
            .ok_or_else(|| Error::illegal_action(ILLEGAL_ACTION))
    }

    /// Assign a faculty member to teach a course (registrar only).
    ///
    /// Rejected if the faculty member is at their course limit or the
    /// course conflicts with one they already teach.
    pub fn assign_instructor(&mut self, key: &CourseKey, faculty_id: &str) -> Result<Outcome<()>> {
        self.require_registrar()?;
        Ok(self.try_assign_instructor(key, faculty_id).into())
    }

    /// Clear a course's instructor (registrar only)
    pub fn unassign_instructor(&mut self, key: &CourseKey) -> Result<Outcome<()>> {
        self.require_registrar()?;
        let course = match self.catalog.get(key) {
            Some(course) => course,
            None => return Ok(Outcome::invalid(format!("{} is not in the catalog", key))),
        };
        if course.instructor_id().is_none() {
            return Ok(Outcome::rejected(format!("{} has no instructor", key)));
        }
        self.set_course_instructor(key, None);
        Ok(Outcome::Applied(()))
    }

    /// Add a course to the catalog (registrar only).
    ///
    /// An instructor on `course` must name a faculty member and pass the
    /// same limit and conflict checks as [`Self::assign_instructor`];
    /// otherwise nothing is added. Returns `Ok(false)` if the name and
    /// section are already in the catalog.
    pub fn add_course(&mut self, mut course: Course) -> Result<bool> {
        self.require_registrar()?;
        let key = course.key();
        if self.catalog.get(&key).is_some() {
            return Ok(false);
        }
        let instructor = course.instructor_id().map(str::to_string);
        course.set_instructor_id(None);
        if let Some(faculty_id) = &instructor {
            self.check_instructor(&course, faculty_id)?;
        }
        let added = self.catalog.insert(course)?;
        if added && instructor.is_some() {
            self.catalog.set_instructor(&key, instructor);
        }
        Ok(added)
    }

    /// Clear instructor ids that name no faculty member, exceed the faculty
    /// member's course limit or conflict with a course they already teach.
    /// Courses are checked in catalog order. Returns one reason per cleared
    /// course.
    pub fn check_instructors(&mut self) -> Vec<String> {
        let assigned: Vec<(CourseKey, String)> = self
            .catalog
            .iter()
            .filter_map(|c| c.instructor_id().map(|id| (c.key(), id.to_string())))
            .collect();
        for (key, _) in &assigned {
            self.set_course_instructor(key, None);
        }

        let mut cleared = Vec::new();
        for (key, faculty_id) in assigned {
            let checked = match self.catalog.get(&key) {
                Some(course) => self.check_instructor(course, &faculty_id),
                None => continue,
            };
            match checked {
                Ok(()) => self.set_course_instructor(&key, Some(faculty_id)),
                Err(e) => cleared.push(format!("{}: instructor {} cleared, {}", key, faculty_id, e)),
            }
        }
        cleared
    }

    /// Remove a student from the directory (registrar only), dropping them
    /// from every roll and waitlist first. Returns `Ok(false)` if the id is
    /// unknown.
    pub fn remove_student(&mut self, student_id: &str) -> Result<bool> {
        self.require_registrar()?;
        if !self.students.contains(student_id) {
            return Ok(false);
        }
        let keys: Vec<CourseKey> = self
            .catalog
            .iter()
            .map(|c| c.key())
            .filter(|k| {
                self.catalog
                    .roll(k)
                    .is_some_and(|r| r.is_enrolled(student_id) || r.is_waitlisted(student_id))
            })
            .collect();
        for key in keys {
            self.unseat_student(student_id, &key)?;
        }
        Ok(self.students.remove(student_id))
    }

    /// Remove a faculty member (registrar only), clearing them as the
    /// instructor of every course they teach
    pub fn remove_faculty(&mut self, faculty_id: &str) -> Result<bool> {
        self.require_registrar()?;
        if !self.faculty.contains(faculty_id) {
            return Ok(false);
        }
        let keys: Vec<CourseKey> = self
            .catalog
            .courses_taught_by(faculty_id)
            .map(|c| c.key())
            .collect();
        for key in &keys {
            self.set_course_instructor(key, None);
        }
        Ok(self.faculty.remove(faculty_id))
    }

    /// Remove a course (registrar only). It is taken off every schedule and
    /// its roll and waitlist are discarded.
    pub fn remove_course(&mut self, key: &CourseKey) -> Result<bool> {
        self.require_registrar()?;
        if self.catalog.get(key).is_none() {
            return Ok(false);
        }
        let ids: Vec<String> = self.students.iter().map(|s| s.id().to_string()).collect();
        for id in ids {
            if let Some(student) = self.students.get_mut(&id) {
                student.schedule_mut().remove_course(key);
            }
        }
        Ok(self.catalog.remove_course(key))
    }

    /// Every roll and waitlist entry, seated students first
    pub fn enrollment_records(&self) -> Vec<EnrollmentRecord> {
        let mut records = Vec::new();
        for course in self.catalog.iter() {
            let key = course.key();
            let Some(roll) = self.catalog.roll(&key) else { continue };
            for id in roll.enrolled() {
                records.push(EnrollmentRecord {
                    course: key.clone(),
                    student_id: id.clone(),
                    status: EnrollStatus::Enrolled,
                });
            }
            for id in roll.waitlist() {
                records.push(EnrollmentRecord {
                    course: key.clone(),
                    student_id: id.to_string(),
                    status: EnrollStatus::Waitlisted,
                });
            }
        }
        records
    }

    /// Rebuild rolls and schedules from saved enrollment records.
    ///
    /// Each record goes through the normal enrollment rules; records that
    /// no longer apply are reported as skipped.
    pub fn restore_enrollments(&mut self, report: LoadReport<EnrollmentRecord>) -> LoadSummary {
        let mut summary = LoadSummary {
            loaded: 0,
            skipped: report.skipped,
        };
        for (record, line) in report.records.into_iter().zip(report.lines) {
            match self.place_student(&record.student_id, &record.course) {
                Ok(status) if status == record.status => summary.loaded += 1,
                Ok(status) => {
                    summary.loaded += 1;
                    summary.skipped.push(SkippedLine {
                        line,
                        reason: format!(
                            "{} for {} restored as {:?}",
                            record.student_id, record.course, status
                        ),
                    });
                }
                Err(e) => summary.skipped.push(SkippedLine {
                    line,
                    reason: e.to_string(),
                }),
            }
        }
        summary
    }

    /// Put a student on a course roll and, when seated, their schedule
    fn place_student(&mut self, student_id: &str, key: &CourseKey) -> Result<EnrollStatus> {
        let course = self
            .catalog
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} is not in the catalog", key)))?;
        let student = self
            .students
            .get_mut(student_id)
            .ok_or_else(|| Error::not_found(format!("student {}", student_id)))?;
        let roll = self
            .catalog
            .roll_mut(key)
            .ok_or_else(|| Error::not_found(format!("{} has no roll", key)))?;

        student.check_add(&course)?;
        roll.check_enroll(student_id)?;

        let status = roll.enroll(student_id)?;
        if status == EnrollStatus::Enrolled {
            student.schedule_mut().add_course(course)?;
        }
        Ok(status)
    }

    fn unseat_student(&mut self, student_id: &str, key: &CourseKey) -> Result<()> {
        let roll = self
            .catalog
            .roll_mut(key)
            .ok_or_else(|| Error::not_found(format!("{} is not in the catalog", key)))?;
        let was_seated = roll.is_enrolled(student_id);
        roll.drop_student(student_id)?;

        if let Some(student) = self.students.get_mut(student_id) {
            student.schedule_mut().remove_course(key);
        }
        if was_seated {
            self.fill_open_seat(key);
        }
        Ok(())
    }

    /// Promote waitlisted students into an open seat. Students who can no
    /// longer take the course are dropped from the roll.
    fn fill_open_seat(&mut self, key: &CourseKey) {
        let Some(course) = self.catalog.get(key).cloned() else { return };
        let Some(roll) = self.catalog.roll_mut(key) else { return };

        while let Some(next) = roll.promote_next() {
            match self.students.get_mut(&next) {
                Some(student) if student.check_add(&course).is_ok() => {
                    if student.schedule_mut().add_course(course.clone()).is_ok() {
                        return;
                    }
                    let _ = roll.drop_student(&next);
                }
                _ => {
                    let _ = roll.drop_student(&next);
                }
            }
        }
    }

    fn try_assign_instructor(&mut self, key: &CourseKey, faculty_id: &str) -> Result<()> {
        let course = self
            .catalog
            .get(key)
            .ok_or_else(|| Error::not_found(format!("{} is not in the catalog", key)))?;
        if course.instructor_id() == Some(faculty_id) {
            return Err(Error::validation(format!("{} already teaches {}", faculty_id, key)));
        }
        self.check_instructor(course, faculty_id)?;

        self.set_course_instructor(key, Some(faculty_id.to_string()));
        Ok(())
    }

    /// Whether `faculty_id` may take on `course` on top of what they teach
    fn check_instructor(&self, course: &Course, faculty_id: &str) -> Result<()> {
        let faculty = self
            .faculty
            .get(faculty_id)
            .ok_or_else(|| Error::not_found(format!("faculty {}", faculty_id)))?;

        let teaching: Vec<_> = self
            .catalog
            .courses_taught_by(faculty_id)
            .filter(|c| c.key() != course.key())
            .collect();
        if teaching.len() >= usize::from(faculty.max_courses()) {
            return Err(Error::validation(format!(
                "{} already teaches {} courses",
                faculty_id,
                faculty.max_courses()
            )));
        }
        for other in teaching {
            other.check_conflict(course)?;
        }
        Ok(())
    }

    /// Change a course's instructor in the catalog and on every schedule
    /// holding a copy of it
    fn set_course_instructor(&mut self, key: &CourseKey, instructor_id: Option<String>) {
        for student in self.students.iter_mut() {
            student.schedule_mut().set_instructor(key, instructor_id.clone());
        }
        self.catalog.set_instructor(key, instructor_id);
    }
}
