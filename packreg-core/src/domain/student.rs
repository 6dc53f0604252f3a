//! Student domain model

use std::cmp::Ordering;

use serde::Serialize;

use super::course::Course;
use super::result::{Error, Result};
use super::schedule::Schedule;
use super::user::{Person, User};

pub const MIN_STUDENT_CREDITS: u8 = 3;
pub const MAX_STUDENT_CREDITS: u8 = 18;

/// A student: a user with a credit limit and a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(flatten)]
    user: User,
    max_credits: u8,
    schedule: Schedule,
}

impl Student {
    pub fn new(user: User, max_credits: u8) -> Result<Self> {
        let mut student = Self {
            user,
            max_credits: MAX_STUDENT_CREDITS,
            schedule: Schedule::new(),
        };
        student.set_max_credits(max_credits)?;
        Ok(student)
    }

    pub fn max_credits(&self) -> u8 {
        self.max_credits
    }

    pub fn set_max_credits(&mut self, max_credits: u8) -> Result<()> {
        if !(MIN_STUDENT_CREDITS..=MAX_STUDENT_CREDITS).contains(&max_credits) {
            return Err(Error::invalid_argument("Invalid max credits"));
        }
        self.max_credits = max_credits;
        Ok(())
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    /// Fail with the reason this student may not take the course
    pub fn check_add(&self, course: &Course) -> Result<()> {
        self.schedule.check_add(course)?;
        let total = self.schedule.scheduled_credits() + u32::from(course.credits());
        if total > u32::from(self.max_credits) {
            return Err(Error::validation(format!(
                "Adding {} would exceed the maximum of {} credits",
                course.name(),
                self.max_credits
            )));
        }
        Ok(())
    }

    pub fn can_add(&self, course: &Course) -> bool {
        self.check_add(course).is_ok()
    }
}

impl Person for Student {
    fn user(&self) -> &User {
        &self.user
    }
}

/// Students sort by last name, then first name, then id
impl Ord for Student {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.user.last_name(), self.user.first_name(), self.user.id()).cmp(&(
            other.user.last_name(),
            other.user.first_name(),
            other.user.id(),
        ))
    }
}

impl PartialOrd for Student {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
