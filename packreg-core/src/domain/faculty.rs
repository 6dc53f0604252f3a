//! Faculty domain model

use serde::Serialize;

use super::result::{Error, Result};
use super::user::{Person, User};

pub const MIN_FACULTY_COURSES: u8 = 1;
pub const MAX_FACULTY_COURSES: u8 = 3;

/// A faculty member: a user who may teach up to `max_courses` sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    #[serde(flatten)]
    user: User,
    max_courses: u8,
}

impl Faculty {
    pub fn new(user: User, max_courses: u8) -> Result<Self> {
        let mut faculty = Self {
            user,
            max_courses: MIN_FACULTY_COURSES,
        };
        faculty.set_max_courses(max_courses)?;
        Ok(faculty)
    }

    pub fn max_courses(&self) -> u8 {
        self.max_courses
    }

    pub fn set_max_courses(&mut self, max_courses: u8) -> Result<()> {
        if !(MIN_FACULTY_COURSES..=MAX_FACULTY_COURSES).contains(&max_courses) {
            return Err(Error::invalid_argument("Invalid max courses"));
        }
        self.max_courses = max_courses;
        Ok(())
    }
}

impl Person for Faculty {
    fn user(&self) -> &User {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HashAlgorithm;

    #[test]
    fn test_max_courses_range() {
        let user = User::new("Sarah", "Heckman", "sesmith5", "sesmith5@ncsu.edu", HashAlgorithm::Sha256.hash("pw")).unwrap();
        assert!(Faculty::new(user.clone(), 0).is_err());
        assert!(Faculty::new(user.clone(), 4).is_err());
        let faculty = Faculty::new(user, 2).unwrap();
        assert_eq!(faculty.max_courses(), 2);
        assert_eq!(faculty.id(), "sesmith5");
    }
}
