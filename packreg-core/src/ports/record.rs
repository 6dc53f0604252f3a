//! Record port - flat-file record abstraction

use std::fmt::Display;
use std::hash::Hash;

use crate::domain::result::Result;

/// A value that is stored as one delimited line in a record file.
///
/// Adapters decide the delimiter and quoting; implementors only map
/// between ordered string fields and the domain value.
pub trait RecordFormat: Sized {
    /// Uniqueness key within one file
    type Key: Eq + Hash + Display;

    /// Human-readable kind used in load reports ("student", "course")
    const KIND: &'static str;

    fn record_key(&self) -> Self::Key;

    /// Parse the fields of one line, validating as the domain constructors do
    fn decode(fields: &[&str]) -> Result<Self>;

    /// Fields in the same order `decode` consumes them
    fn encode(&self) -> Vec<String>;
}
