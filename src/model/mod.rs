pub mod id;
pub mod project;
pub mod state;
pub mod task;

pub use project::*;
pub use state::*;
pub use task::*;

/// Raised by entity constructors and mutators on malformed input. Each
/// variant names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("project name cannot be empty")]
    EmptyProjectName,
    #[error("checklist item text cannot be empty")]
    EmptyChecklistText,
    #[error("due date must be YYYY-MM-DD: {0:?}")]
    InvalidDueDate(String),
    #[error("due time must be HH:mm: {0:?}")]
    InvalidDueTime(String),
    #[error("priority must be between 1 and 4: {0}")]
    InvalidPriority(u8),
    #[error("unknown recurrence frequency: {0:?}")]
    UnknownFrequency(String),
    #[error("recurrence interval must be at least 1: {0}")]
    InvalidInterval(u32),
}
