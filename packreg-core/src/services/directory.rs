//! Directory service - student and faculty directories
//!
//! A directory is an ordered list of people with unique ids. Insertion
//! order is preserved; loading a file replaces the whole list.

use std::path::Path;

use crate::adapters::{read_records, write_records, LoadSummary};
use crate::domain::result::Result;
use crate::domain::{Faculty, HashAlgorithm, Person, Student, TableView, User};
use crate::ports::RecordFormat;

pub type StudentDirectory = Directory<Student>;
pub type FacultyDirectory = Directory<Faculty>;

/// Ordered collection of people, unique by id
#[derive(Debug, Clone)]
pub struct Directory<T> {
    entries: Vec<T>,
    algorithm: HashAlgorithm,
}

impl<T> Directory<T>
where
    T: Person + RecordFormat,
{
    /// Create an empty directory hashing new passwords with `algorithm`
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            entries: Vec::new(),
            algorithm,
        }
    }

    /// Discard every entry. Unsaved records are lost.
    pub fn new_directory(&mut self) {
        self.entries = Vec::new();
    }

    /// Replace the directory with the records in `path`
    pub fn load(&mut self, path: &Path) -> Result<LoadSummary> {
        let (records, summary) = read_records::<T>(path)?.split();
        self.entries = records;
        Ok(summary)
    }

    /// Write every entry to `path` in the format `load` reads
    pub fn save(&self, path: &Path) -> Result<()> {
        write_records(path, &self.entries)
    }

    /// Append `entry` unless its id is taken. Returns false on a duplicate.
    pub fn insert(&mut self, entry: T) -> bool {
        if self.contains(entry.id()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove the entry with `id`. Returns false if there was none.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.entries.iter().position(|e| e.id() == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// First name, last name and id of every entry, in directory order
    pub fn table(&self) -> TableView {
        people_table(self.entries.iter())
    }

    /// Hash and confirm the password, then build the shared user fields
    fn new_user(
        &self,
        first_name: &str,
        last_name: &str,
        id: &str,
        email: &str,
        password: &str,
        repeat_password: &str,
    ) -> Result<User> {
        let hashed = self.algorithm.hash_confirmed(password, repeat_password)?;
        User::new(first_name, last_name, id, email, hashed)
    }
}

impl Directory<Student> {
    /// Add a student.
    ///
    /// Fails if the passwords are empty or differ, or if any field is
    /// invalid. Returns `Ok(false)` if the id is already in the directory.
    #[allow(clippy::too_many_arguments)]
    pub fn add_student(
        &mut self,
        first_name: &str,
        last_name: &str,
        id: &str,
        email: &str,
        password: &str,
        repeat_password: &str,
        max_credits: u8,
    ) -> Result<bool> {
        let user = self.new_user(first_name, last_name, id, email, password, repeat_password)?;
        let student = Student::new(user, max_credits)?;
        Ok(self.insert(student))
    }

    /// Students in last name, first name, id order
    pub fn sorted(&self) -> Vec<&Student> {
        let mut students: Vec<&Student> = self.entries.iter().collect();
        students.sort();
        students
    }

    /// Same columns as [`Directory::table`], in sorted order
    pub fn sorted_table(&self) -> TableView {
        people_table(self.sorted().into_iter())
    }
}

impl Directory<Faculty> {
    /// Add a faculty member. Same rules as [`Directory::add_student`].
    #[allow(clippy::too_many_arguments)]
    pub fn add_faculty(
        &mut self,
        first_name: &str,
        last_name: &str,
        id: &str,
        email: &str,
        password: &str,
        repeat_password: &str,
        max_courses: u8,
    ) -> Result<bool> {
        let user = self.new_user(first_name, last_name, id, email, password, repeat_password)?;
        let faculty = Faculty::new(user, max_courses)?;
        Ok(self.insert(faculty))
    }
}

fn people_table<'a, P>(people: impl Iterator<Item = &'a P>) -> TableView
where
    P: Person + 'a,
{
    let mut table = TableView::new(&["First Name", "Last Name", "Id"]);
    for person in people {
        let user = person.user();
        table.push_row(vec![
            user.first_name().to_string(),
            user.last_name().to_string(),
            user.id().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::Error;
    use tempfile::tempdir;

    fn directory() -> StudentDirectory {
        StudentDirectory::new(HashAlgorithm::Sha256)
    }

    #[test]
    fn test_add_and_duplicate() {
        let mut dir = directory();
        assert!(dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap());
        assert!(!dir.add_student("John", "Doe", "jdoe", "john@ncsu.edu", "pw", "pw", 12).unwrap());
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.get("jdoe").unwrap().user().first_name(), "Jane");
    }

    #[test]
    fn test_add_stores_digest() {
        let mut dir = directory();
        dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap();
        let student = dir.get("jdoe").unwrap();
        assert_eq!(*student.user().password(), HashAlgorithm::Sha256.hash("pw"));
    }

    #[test]
    fn test_add_password_failures() {
        let mut dir = directory();
        let err = dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "", "pw", 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "", 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "px", 3).unwrap_err();
        assert!(err.to_string().contains("Passwords do not match"));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_add_invalid_fields() {
        let mut dir = directory();
        assert!(dir.add_student("Jane", "Doe", "jdoe", "bad-email", "pw", "pw", 3).is_err());
        assert!(dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 19).is_err());
        assert!(dir.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut dir = directory();
        dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap();
        assert!(dir.remove("jdoe"));
        assert!(!dir.remove("jdoe"));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_table_in_insertion_order() {
        let mut dir = directory();
        dir.add_student("Zed", "Zulu", "zz", "zz@ncsu.edu", "pw", "pw", 18).unwrap();
        dir.add_student("Amy", "Alpha", "aa", "aa@ncsu.edu", "pw", "pw", 18).unwrap();

        let table = dir.table();
        assert_eq!(table.columns(), &["First Name", "Last Name", "Id"]);
        assert_eq!(table.row(0).unwrap(), &["Zed", "Zulu", "zz"]);
        assert_eq!(table.row(1).unwrap(), &["Amy", "Alpha", "aa"]);

        let sorted: Vec<_> = dir.sorted().iter().map(|s| s.id()).collect();
        assert_eq!(sorted, vec!["aa", "zz"]);
        assert_eq!(dir.sorted_table().row(0).unwrap(), &["Amy", "Alpha", "aa"]);
    }

    #[test]
    fn test_table_is_snapshot() {
        let mut dir = directory();
        dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap();
        let table = dir.table();
        dir.remove("jdoe");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("students.txt");

        let mut dir = directory();
        dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap();
        dir.add_student("Ann", "Lee", "alee", "alee@ncsu.edu", "pw2", "pw2", 15).unwrap();
        dir.save(&path).unwrap();

        let mut loaded = directory();
        loaded.add_student("Old", "Entry", "old", "old@ncsu.edu", "pw", "pw", 3).unwrap();
        let summary = loaded.load(&path).unwrap();
        assert_eq!(summary.loaded, 2);
        assert!(!loaded.contains("old"));
        assert_eq!(loaded.get("alee").unwrap().max_credits(), 15);
        assert_eq!(*loaded.get("alee").unwrap().user().password(), HashAlgorithm::Sha256.hash("pw2"));
    }

    #[test]
    fn test_load_missing_file_keeps_entries() {
        let tmp = tempdir().unwrap();
        let mut dir = directory();
        dir.add_student("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", "pw", "pw", 3).unwrap();
        assert!(dir.load(&tmp.path().join("missing.txt")).is_err());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_faculty_directory() {
        let mut dir = FacultyDirectory::new(HashAlgorithm::Sha256);
        assert!(dir.add_faculty("Sarah", "Heckman", "sesmith5", "sesmith5@ncsu.edu", "pw", "pw", 3).unwrap());
        assert!(!dir.add_faculty("Sarah", "Heckman", "sesmith5", "sesmith5@ncsu.edu", "pw", "pw", 2).unwrap());
        assert!(dir.add_faculty("Bad", "Max", "bmax", "bmax@ncsu.edu", "pw", "pw", 4).is_err());
        dir.new_directory();
        assert!(dir.is_empty());
    }
}
