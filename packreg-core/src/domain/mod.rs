//! Core domain entities
//!
//! All registration entities are defined here. These are pure data
//! structures with validation logic - no I/O or external dependencies.

mod course;
mod faculty;
mod password;
mod roll;
mod schedule;
mod student;
mod table;
mod user;
pub mod result;

pub use course::{Course, CourseKey, Meeting};
pub use faculty::Faculty;
pub use password::{HashAlgorithm, PasswordHash};
pub use roll::{CourseRoll, EnrollStatus, WAITLIST_SIZE};
pub use schedule::Schedule;
pub use student::{Student, MAX_STUDENT_CREDITS};
pub use table::TableView;
pub use user::{Person, User};
