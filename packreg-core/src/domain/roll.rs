//! Course roll - per-course enrollment and waitlist

use std::collections::VecDeque;

use serde::Serialize;

use super::course::{MAX_ENROLLMENT_CAP, MIN_ENROLLMENT_CAP};
use super::result::{Error, Result};

pub const WAITLIST_SIZE: usize = 10;

/// Where a student landed after enrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollStatus {
    Enrolled,
    Waitlisted,
}

/// Capacity-bounded list of student ids enrolled in one course, with a
/// FIFO waitlist that fills seats as they open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRoll {
    enrollment_cap: usize,
    roll: Vec<String>,
    waitlist: VecDeque<String>,
}

impl CourseRoll {
    pub fn new(enrollment_cap: usize) -> Result<Self> {
        let mut roll = Self {
            enrollment_cap: MIN_ENROLLMENT_CAP,
            roll: Vec::new(),
            waitlist: VecDeque::new(),
        };
        roll.set_enrollment_cap(enrollment_cap)?;
        Ok(roll)
    }

    pub fn enrollment_cap(&self) -> usize {
        self.enrollment_cap
    }

    /// The cap may not drop below the number already enrolled
    pub fn set_enrollment_cap(&mut self, enrollment_cap: usize) -> Result<()> {
        if !(MIN_ENROLLMENT_CAP..=MAX_ENROLLMENT_CAP).contains(&enrollment_cap)
            || enrollment_cap < self.roll.len()
        {
            return Err(Error::invalid_argument("Invalid enrollment capacity."));
        }
        self.enrollment_cap = enrollment_cap;
        Ok(())
    }

    pub fn open_seats(&self) -> usize {
        self.enrollment_cap - self.roll.len()
    }

    pub fn enrolled(&self) -> &[String] {
        &self.roll
    }

    pub fn waitlist(&self) -> impl Iterator<Item = &str> + '_ {
        self.waitlist.iter().map(String::as_str)
    }

    pub fn waitlist_len(&self) -> usize {
        self.waitlist.len()
    }

    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.roll.iter().any(|id| id == student_id)
    }

    pub fn is_waitlisted(&self, student_id: &str) -> bool {
        self.waitlist.iter().any(|id| id == student_id)
    }

    /// Fail with the reason the student may not join this roll
    pub fn check_enroll(&self, student_id: &str) -> Result<()> {
        if self.is_enrolled(student_id) || self.is_waitlisted(student_id) {
            return Err(Error::validation(format!(
                "{} is already on this course roll",
                student_id
            )));
        }
        if self.open_seats() == 0 && self.waitlist.len() >= WAITLIST_SIZE {
            return Err(Error::validation("Course and waitlist are full"));
        }
        Ok(())
    }

    pub fn can_enroll(&self, student_id: &str) -> bool {
        self.check_enroll(student_id).is_ok()
    }

    /// Seat the student, or waitlist them when the roll is full
    pub fn enroll(&mut self, student_id: &str) -> Result<EnrollStatus> {
        self.check_enroll(student_id)?;
        if self.open_seats() > 0 {
            self.roll.push(student_id.to_string());
            Ok(EnrollStatus::Enrolled)
        } else {
            self.waitlist.push_back(student_id.to_string());
            Ok(EnrollStatus::Waitlisted)
        }
    }

    /// Remove the student from the roll or waitlist.
    ///
    /// Dropping a seated student does not promote anyone; callers fill the
    /// seat with [`CourseRoll::promote_next`] so they can update the
    /// promoted student's schedule.
    pub fn drop_student(&mut self, student_id: &str) -> Result<()> {
        if let Some(index) = self.roll.iter().position(|id| id == student_id) {
            self.roll.remove(index);
            return Ok(());
        }
        if let Some(index) = self.waitlist.iter().position(|id| id == student_id) {
            self.waitlist.remove(index);
            return Ok(());
        }
        Err(Error::validation(format!(
            "{} is not on this course roll",
            student_id
        )))
    }

    /// Move the head of the waitlist into an open seat
    pub fn promote_next(&mut self) -> Option<String> {
        if self.open_seats() == 0 {
            return None;
        }
        let next = self.waitlist.pop_front()?;
        self.roll.push(next.clone());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_roll() -> CourseRoll {
        let mut roll = CourseRoll::new(10).unwrap();
        for i in 0..10 {
            assert_eq!(roll.enroll(&format!("s{}", i)).unwrap(), EnrollStatus::Enrolled);
        }
        roll
    }

    #[test]
    fn test_cap_validation() {
        assert!(CourseRoll::new(9).is_err());
        assert!(CourseRoll::new(251).is_err());

        let mut roll = full_roll();
        roll.set_enrollment_cap(20).unwrap();
        roll.enroll("extra").unwrap();
        assert!(roll.set_enrollment_cap(10).is_err());
    }

    #[test]
    fn test_enroll_and_drop() {
        let mut roll = CourseRoll::new(10).unwrap();
        assert_eq!(roll.open_seats(), 10);
        roll.enroll("jdoe").unwrap();
        assert_eq!(roll.open_seats(), 9);
        assert!(!roll.can_enroll("jdoe"));

        roll.drop_student("jdoe").unwrap();
        assert_eq!(roll.open_seats(), 10);
        assert!(roll.drop_student("jdoe").is_err());
    }

    #[test]
    fn test_waitlist_when_full() {
        let mut roll = full_roll();
        assert_eq!(roll.enroll("w0").unwrap(), EnrollStatus::Waitlisted);
        assert!(roll.is_waitlisted("w0"));
        assert!(!roll.can_enroll("w0"));

        for i in 1..WAITLIST_SIZE {
            roll.enroll(&format!("w{}", i)).unwrap();
        }
        assert!(!roll.can_enroll("late"));
        assert!(roll.enroll("late").is_err());
    }

    #[test]
    fn test_promote_in_order() {
        let mut roll = full_roll();
        roll.enroll("w0").unwrap();
        roll.enroll("w1").unwrap();

        assert_eq!(roll.promote_next(), None);
        roll.drop_student("s3").unwrap();
        assert_eq!(roll.promote_next(), Some("w0".to_string()));
        assert!(roll.is_enrolled("w0"));
        assert_eq!(roll.waitlist().collect::<Vec<_>>(), vec!["w1"]);
    }

    #[test]
    fn test_drop_from_waitlist() {
        let mut roll = full_roll();
        roll.enroll("w0").unwrap();
        roll.drop_student("w0").unwrap();
        assert_eq!(roll.waitlist_len(), 0);
        assert_eq!(roll.open_seats(), 0);
    }
}
