//! Result and error types for the core library

use serde::Serialize;
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an illegal action error
    pub fn illegal_action(msg: impl Into<String>) -> Self {
        Self::IllegalAction(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a registration action that may legitimately not apply.
///
/// `Rejected` means a business rule said no (roll full, credit limit,
/// time conflict). `Invalid` means the request itself was malformed
/// (course not in the catalog, bad record data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum Outcome<T> {
    Applied(T),
    Rejected(String),
    Invalid(String),
}

impl<T> Outcome<T> {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Collapse to the plain "did it happen" boolean
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Reason the action did not apply, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Applied(_) => None,
            Self::Rejected(r) | Self::Invalid(r) => Some(r),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Applied(data),
            Err(Error::Validation(msg)) => Self::Rejected(msg),
            Err(e) => Self::Invalid(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_applied() {
        let outcome: Outcome<i32> = Outcome::Applied(42);
        assert!(outcome.is_applied());
        assert!(outcome.reason().is_none());
    }

    #[test]
    fn test_from_result() {
        let ok: Result<i32> = Ok(42);
        let outcome: Outcome<i32> = ok.into();
        assert_eq!(outcome, Outcome::Applied(42));

        let rule: Result<i32> = Err(Error::validation("schedule conflict"));
        let outcome: Outcome<i32> = rule.into();
        assert_eq!(outcome, Outcome::Rejected("schedule conflict".to_string()));

        let bad: Result<i32> = Err(Error::not_found("CSC116-001"));
        let outcome: Outcome<i32> = bad.into();
        assert!(!outcome.is_applied());
        assert!(outcome.reason().unwrap().contains("Not found"));
    }
}
