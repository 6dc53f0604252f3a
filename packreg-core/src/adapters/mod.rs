//! Adapter implementations
//!
//! Concrete implementations of the port traits.

pub mod records;

pub use records::{read_records, write_records, EnrollmentRecord, LoadReport, LoadSummary, SkippedLine};
