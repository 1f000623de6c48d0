use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::project::Project;
use super::task::Task;

/// Schema version written by this build; persisted documents at older
/// versions are migrated forward before rehydration.
pub const SCHEMA_VERSION: u32 = 1;

/// The UI-selected slice of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActiveView {
    Inbox,
    Project {
        #[serde(rename = "projectId")]
        project_id: String,
    },
    Today,
    Upcoming,
    Completed,
    Tag {
        tag: String,
    },
    Search {
        q: String,
    },
}

/// Display sort for the task list, independent of the active view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Project order as the user arranged it
    #[default]
    Manual,
    DueDate,
    Priority,
    Title,
    CreatedAt,
}

/// The whole application state. Created once at startup, then only ever
/// replaced wholesale by the reducer.
///
/// Entities are held behind `Arc`, so cloning a state is shallow: untouched
/// tasks and projects are shared between snapshots and subscribers can
/// detect change with `Arc::ptr_eq`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub schema_version: u32,
    pub active_view: ActiveView,
    /// Sidebar order
    pub projects: Vec<Arc<Project>>,
    /// Unordered; display ordering lives in `Project::task_ids`
    pub tasks: IndexMap<String, Arc<Task>>,
    /// UI focus; not persisted
    pub selected_task_id: Option<String>,
    /// Display sort; not persisted
    pub filter: SortMode,
}

impl AppState {
    /// The well-defined fallback state: current schema version, one Inbox
    /// project, empty task map.
    pub fn default_state() -> AppState {
        AppState {
            schema_version: SCHEMA_VERSION,
            active_view: ActiveView::Inbox,
            projects: vec![Arc::new(Project::inbox())],
            tasks: IndexMap::new(),
            selected_task_id: None,
            filter: SortMode::default(),
        }
    }

    pub fn project(&self, project_id: &str) -> Option<&Arc<Project>> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Arc<Task>> {
        self.tasks.get(task_id)
    }

    /// The project whose `task_ids` contains the given task id, if any.
    pub fn owning_project(&self, task_id: &str) -> Option<&Arc<Project>> {
        self.projects.iter().find(|p| p.contains_task(task_id))
    }
}
