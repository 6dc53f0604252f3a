//! Catalog service - course catalog and course rolls

use std::collections::HashMap;
use std::path::Path;

use crate::adapters::{read_records, write_records, LoadSummary};
use crate::domain::result::Result;
use crate::domain::{Course, CourseKey, CourseRoll, Meeting, TableView};

/// Ordered list of course offerings, unique by name and section.
///
/// The catalog owns each offering's roll so enrollment state lives in one
/// place; schedules hold copies of the course records only. Instructor ids
/// are stored as given; checking them against the faculty directory is the
/// registration manager's job.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
    rolls: HashMap<CourseKey, CourseRoll>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every course and roll
    pub fn new_catalog(&mut self) {
        self.courses = Vec::new();
        self.rolls = HashMap::new();
    }

    /// Replace the catalog with the courses in `path`. Rolls start empty.
    pub fn load(&mut self, path: &Path) -> Result<LoadSummary> {
        let (courses, summary) = read_records::<Course>(path)?.split();
        let mut rolls = HashMap::with_capacity(courses.len());
        for course in &courses {
            rolls.insert(course.key(), CourseRoll::new(course.enrollment_cap())?);
        }
        self.courses = courses;
        self.rolls = rolls;
        Ok(summary)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_records(path, &self.courses)
    }

    /// Add a course with no instructor. Returns `Ok(false)` if the name and
    /// section are taken.
    pub fn add_course(
        &mut self,
        name: &str,
        title: &str,
        section: &str,
        credits: u8,
        enrollment_cap: usize,
        meeting: Meeting,
    ) -> Result<bool> {
        let course = Course::new(name, title, section, credits, None, enrollment_cap, meeting)?;
        self.insert(course)
    }

    pub(crate) fn insert(&mut self, course: Course) -> Result<bool> {
        let key = course.key();
        if self.rolls.contains_key(&key) {
            return Ok(false);
        }
        self.rolls.insert(key, CourseRoll::new(course.enrollment_cap())?);
        self.courses.push(course);
        Ok(true)
    }

    /// Remove a course and its roll. Returns false if there was none.
    pub fn remove_course(&mut self, key: &CourseKey) -> bool {
        match self.courses.iter().position(|c| c.key() == *key) {
            Some(index) => {
                self.courses.remove(index);
                self.rolls.remove(key);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &CourseKey) -> Option<&Course> {
        self.courses.iter().find(|c| c.key() == *key)
    }

    pub fn get_course(&self, name: &str, section: &str) -> Option<&Course> {
        self.get(&CourseKey::new(name, section))
    }

    pub fn roll(&self, key: &CourseKey) -> Option<&CourseRoll> {
        self.rolls.get(key)
    }

    pub fn roll_mut(&mut self, key: &CourseKey) -> Option<&mut CourseRoll> {
        self.rolls.get_mut(key)
    }

    /// Set or clear the instructor. Returns false if the course is unknown.
    pub fn set_instructor(&mut self, key: &CourseKey, instructor_id: Option<String>) -> bool {
        match self.courses.iter_mut().find(|c| c.key() == *key) {
            Some(course) => {
                course.set_instructor_id(instructor_id);
                true
            }
            None => false,
        }
    }

    /// Courses taught by `instructor_id`, in catalog order
    pub fn courses_taught_by<'a>(&'a self, instructor_id: &'a str) -> impl Iterator<Item = &'a Course> + 'a {
        self.courses
            .iter()
            .filter(move |c| c.instructor_id() == Some(instructor_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Course> + '_ {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Name, section, title, meeting and open seats of every course
    pub fn course_catalog(&self) -> TableView {
        let mut table = TableView::new(&["Name", "Section", "Title", "Meeting", "Open Seats"]);
        for course in &self.courses {
            let open = self
                .rolls
                .get(&course.key())
                .map(|r| r.open_seats())
                .unwrap_or_default();
            table.push_row(vec![
                course.name().to_string(),
                course.section().to_string(),
                course.title().to_string(),
                course.meeting_string(),
                open.to_string(),
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .add_course("CSC216", "Software Development Fundamentals", "001", 3, 10, Meeting::new("MW", 1330, 1445).unwrap())
            .unwrap();
        catalog
            .add_course("CSC116", "Intro to Programming - Java", "002", 3, 20, Meeting::Arranged)
            .unwrap();
        catalog.set_instructor(&CourseKey::new("CSC216", "001"), Some("sesmith5".into()));
        catalog
    }

    #[test]
    fn test_add_duplicate_and_remove() {
        let mut catalog = catalog();
        assert!(!catalog.add_course("CSC216", "Other", "001", 4, 10, Meeting::Arranged).unwrap());
        assert!(catalog.add_course("CSC216", "Other", "002", 4, 10, Meeting::Arranged).unwrap());
        assert_eq!(catalog.len(), 3);

        let key = CourseKey::new("CSC216", "001");
        assert!(catalog.remove_course(&key));
        assert!(catalog.roll(&key).is_none());
        assert!(!catalog.remove_course(&key));
    }

    #[test]
    fn test_invalid_course_is_error() {
        let mut catalog = Catalog::new();
        assert!(catalog.add_course("CSC216", "", "001", 3, 10, Meeting::Arranged).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_catalog_table_shows_open_seats() {
        let mut catalog = catalog();
        catalog.roll_mut(&CourseKey::new("CSC116", "002")).unwrap().enroll("jdoe").unwrap();

        let table = catalog.course_catalog();
        assert_eq!(table.row(0).unwrap(), &["CSC216", "001", "Software Development Fundamentals", "MW 1:30PM-2:45PM", "10"]);
        assert_eq!(table.row(1).unwrap()[4], "19");
    }

    #[test]
    fn test_instructor_assignment() {
        let mut catalog = catalog();
        assert_eq!(catalog.courses_taught_by("sesmith5").count(), 1);
        assert!(catalog.set_instructor(&CourseKey::new("CSC116", "002"), Some("sesmith5".into())));
        assert_eq!(catalog.courses_taught_by("sesmith5").count(), 2);
        assert!(!catalog.set_instructor(&CourseKey::new("CSC999", "001"), None));
    }

    #[test]
    fn test_save_and_load_resets_rolls() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("courses.txt");
        let mut catalog = catalog();
        catalog.roll_mut(&CourseKey::new("CSC116", "002")).unwrap().enroll("jdoe").unwrap();
        catalog.save(&path).unwrap();

        let mut loaded = Catalog::new();
        let summary = loaded.load(&path).unwrap();
        assert_eq!(summary.loaded, 2);
        assert!(summary.skipped.is_empty());
        assert_eq!(loaded.get_course("CSC216", "001"), catalog.get_course("CSC216", "001"));
        assert_eq!(loaded.roll(&CourseKey::new("CSC116", "002")).unwrap().open_seats(), 20);
    }
}
