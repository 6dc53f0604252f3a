//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and record files. Each service
//! focuses on a specific use case or feature area.

mod catalog;
mod directory;
pub mod logging;
mod registration;

pub use catalog::Catalog;
pub use directory::{Directory, FacultyDirectory, StudentDirectory};
pub use logging::{CommandStats, EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};
pub use registration::{CurrentUser, Registrar, RegistrationManager, ResetSummary};
