use chrono::{DateTime, Utc};

use super::id::make_id;
use super::ValidationError;

/// The reserved id of the permanent Inbox project.
pub const INBOX_PROJECT_ID: &str = "p_inbox";

/// A named, ordered container of task ids. Order is display order; the id
/// list never contains duplicates, and a task id belongs to at most one
/// project at a time (the reducer's move transition is the only operation
/// that crosses projects).
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub task_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project; the name is trimmed and must be non-empty.
    pub fn new(name: &str) -> Result<Project, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        let now = Utc::now();
        Ok(Project {
            id: make_id("p"),
            name: trimmed.to_string(),
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The permanent Inbox project.
    pub fn inbox() -> Project {
        let now = Utc::now();
        Project {
            id: INBOX_PROJECT_ID.to_string(),
            name: "Inbox".to_string(),
            task_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touched(&self) -> Project {
        let mut next = self.clone();
        next.updated_at = Utc::now();
        next
    }

    pub fn rename(&self, name: &str) -> Result<Project, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        let mut next = self.touched();
        next.name = trimmed.to_string();
        Ok(next)
    }

    /// Append a task id; already-present ids are not duplicated.
    pub(crate) fn with_task_id(&self, task_id: &str) -> Project {
        let mut next = self.touched();
        if !next.task_ids.iter().any(|id| id == task_id) {
            next.task_ids.push(task_id.to_string());
        }
        next
    }

    pub(crate) fn without_task_id(&self, task_id: &str) -> Project {
        let mut next = self.touched();
        next.task_ids.retain(|id| id != task_id);
        next
    }

    /// Replace the id order wholesale. Duplicates in the input collapse to
    /// their first occurrence.
    pub(crate) fn with_task_order(&self, order: Vec<String>) -> Project {
        let mut next = self.touched();
        let mut seen = std::collections::HashSet::new();
        next.task_ids = order
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        next
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.task_ids.iter().any(|id| id == task_id)
    }
}
