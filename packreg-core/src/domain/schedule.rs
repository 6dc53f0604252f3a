//! Student schedule

use serde::Serialize;

use super::course::{Course, CourseKey};
use super::result::{Error, Result};
use super::table::TableView;

pub const DEFAULT_TITLE: &str = "My Schedule";

/// Ordered list of the courses one student is enrolled in.
///
/// A course name appears at most once and no two courses conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    title: String,
    courses: Vec<Course>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            courses: Vec::new(),
        }
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::invalid_argument("Title cannot be empty."));
        }
        self.title = title.trim().to_string();
        Ok(())
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn contains(&self, key: &CourseKey) -> bool {
        self.courses.iter().any(|c| c.key() == *key)
    }

    pub fn scheduled_credits(&self) -> u32 {
        self.courses.iter().map(|c| u32::from(c.credits())).sum()
    }

    /// Fail with the reason the course could not be added, if any
    pub fn check_add(&self, course: &Course) -> Result<()> {
        for existing in &self.courses {
            if existing.name() == course.name() {
                return Err(Error::validation(format!(
                    "You are already enrolled in {}",
                    course.name()
                )));
            }
            existing.check_conflict(course)?;
        }
        Ok(())
    }

    pub fn can_add(&self, course: &Course) -> bool {
        self.check_add(course).is_ok()
    }

    pub fn add_course(&mut self, course: Course) -> Result<()> {
        self.check_add(&course)?;
        self.courses.push(course);
        Ok(())
    }

    /// Returns true if the course was on the schedule
    pub fn remove_course(&mut self, key: &CourseKey) -> bool {
        match self.courses.iter().position(|c| c.key() == *key) {
            Some(index) => {
                self.courses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Mirror a catalog instructor change on the scheduled copy. Returns
    /// false if the course is not on the schedule.
    pub fn set_instructor(&mut self, key: &CourseKey, instructor_id: Option<String>) -> bool {
        match self.courses.iter_mut().find(|c| c.key() == *key) {
            Some(course) => {
                course.set_instructor_id(instructor_id);
                true
            }
            None => false,
        }
    }

    /// Empty the schedule and restore the default title
    pub fn reset(&mut self) {
        self.courses.clear();
        self.title = DEFAULT_TITLE.to_string();
    }

    pub fn scheduled_courses(&self) -> TableView {
        let mut table = TableView::new(&["Name", "Section", "Title", "Meeting"]);
        for course in &self.courses {
            table.push_row(vec![
                course.name().to_string(),
                course.section().to_string(),
                course.title().to_string(),
                course.meeting_string(),
            ]);
        }
        table
    }

    pub fn full_scheduled_courses(&self) -> TableView {
        let mut table =
            TableView::new(&["Name", "Section", "Title", "Credits", "Instructor", "Meeting"]);
        for course in &self.courses {
            table.push_row(vec![
                course.name().to_string(),
                course.section().to_string(),
                course.title().to_string(),
                course.credits().to_string(),
                course.instructor_id().unwrap_or_default().to_string(),
                course.meeting_string(),
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Meeting;

    fn course(name: &str, section: &str, days: &str, start: u16, end: u16) -> Course {
        Course::new(name, "Title", section, 3, None, 10, Meeting::new(days, start, end).unwrap()).unwrap()
    }

    #[test]
    fn test_add_and_remove() {
        let mut schedule = Schedule::new();
        schedule.add_course(course("CSC216", "001", "MW", 1330, 1445)).unwrap();
        schedule.add_course(course("CSC226", "001", "TH", 1330, 1445)).unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.scheduled_credits(), 6);

        assert!(schedule.remove_course(&CourseKey::new("CSC216", "001")));
        assert!(!schedule.remove_course(&CourseKey::new("CSC216", "001")));
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_rejects_second_section_of_same_course() {
        let mut schedule = Schedule::new();
        schedule.add_course(course("CSC216", "001", "MW", 1330, 1445)).unwrap();
        let err = schedule.add_course(course("CSC216", "002", "TH", 800, 900)).unwrap_err();
        assert!(err.to_string().contains("already enrolled in CSC216"));
    }

    #[test]
    fn test_rejects_conflict() {
        let mut schedule = Schedule::new();
        schedule.add_course(course("CSC216", "001", "MW", 1330, 1445)).unwrap();
        assert!(!schedule.can_add(&course("MA241", "001", "W", 1400, 1500)));
        assert!(schedule.add_course(course("MA241", "001", "W", 1400, 1500)).is_err());
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn test_reset_restores_title() {
        let mut schedule = Schedule::new();
        schedule.set_title("Fall").unwrap();
        schedule.add_course(course("CSC216", "001", "A", 0, 0)).unwrap();
        schedule.reset();
        assert!(schedule.is_empty());
        assert_eq!(schedule.title(), DEFAULT_TITLE);
        assert!(schedule.set_title("  ").is_err());
    }

    #[test]
    fn test_tables() {
        let mut schedule = Schedule::new();
        schedule.add_course(course("CSC216", "001", "MW", 1330, 1445)).unwrap();

        let table = schedule.scheduled_courses();
        assert_eq!(table.row(0).unwrap(), &["CSC216", "001", "Title", "MW 1:30PM-2:45PM"]);

        let full = schedule.full_scheduled_courses();
        assert_eq!(full.columns().len(), 6);
        assert_eq!(full.row(0).unwrap()[3], "3");
    }

    #[test]
    fn test_set_instructor_on_scheduled_course() {
        let mut schedule = Schedule::new();
        schedule.add_course(course("CSC216", "001", "MW", 1330, 1445)).unwrap();

        assert!(schedule.set_instructor(&CourseKey::new("CSC216", "001"), Some("sesmith5".into())));
        assert_eq!(schedule.full_scheduled_courses().row(0).unwrap()[4], "sesmith5");
        assert!(!schedule.set_instructor(&CourseKey::new("CSC216", "002"), None));

        schedule.set_instructor(&CourseKey::new("CSC216", "001"), None);
        assert_eq!(schedule.full_scheduled_courses().row(0).unwrap()[4], "");
    }
}
