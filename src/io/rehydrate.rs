use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::io::migrate::migrate;
use crate::io::record::{ProjectRecord, TaskRecord};
use crate::io::storage::StorageBackend;
use crate::model::{ActiveView, AppState, Project, Task, INBOX_PROJECT_ID, SCHEMA_VERSION};

/// Reconstruct validated entities from a migrated raw document.
///
/// Damage is contained per entity: a record that fails to decode or
/// validate is dropped with a warning and the rest of the state survives.
/// The result is normalized — the inbox project always exists, project
/// `taskIds` only reference tasks that made it through, and a task id
/// claimed by several projects stays with the first. Transient UI fields
/// start at their defaults, and the state is stamped with the current
/// schema version (the entity form is by definition current).
pub fn rehydrate(raw: Value) -> AppState {
    let Value::Object(mut doc) = raw else {
        warn!("persisted state is not an object; starting from defaults");
        return AppState::default_state();
    };

    let active_view = match doc.remove("activeView") {
        Some(v) => serde_json::from_value::<ActiveView>(v).unwrap_or_else(|e| {
            warn!(error = %e, "unreadable active view; falling back to inbox");
            ActiveView::Inbox
        }),
        None => ActiveView::Inbox,
    };

    let mut projects: Vec<Project> = Vec::new();
    if let Some(Value::Array(raw_projects)) = doc.remove("projects") {
        for value in raw_projects {
            match serde_json::from_value::<ProjectRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|r| Project::from_record(r).map_err(|e| e.to_string()))
            {
                Ok(project) => projects.push(project),
                Err(error) => warn!(%error, "dropping invalid project record"),
            }
        }
    }

    let mut tasks: Vec<Task> = Vec::new();
    if let Some(Value::Object(raw_tasks)) = doc.remove("tasks") {
        for (id, value) in raw_tasks {
            match serde_json::from_value::<TaskRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|r| Task::from_record(r).map_err(|e| e.to_string()))
            {
                Ok(task) => tasks.push(task),
                Err(error) => warn!(task_id = %id, %error, "dropping invalid task record"),
            }
        }
    }

    let mut state = AppState::default_state();
    state.active_view = active_view;
    state.schema_version = SCHEMA_VERSION;
    state.tasks = tasks
        .into_iter()
        .map(|t| (t.id.clone(), Arc::new(t)))
        .collect();

    if !projects.iter().any(|p| p.id == INBOX_PROJECT_ID) {
        projects.insert(0, Project::inbox());
    }

    // membership normalization: ids must resolve, and each task id belongs
    // to its first-claiming project only
    let mut claimed: HashSet<String> = HashSet::new();
    state.projects = projects
        .into_iter()
        .map(|mut project| {
            project.task_ids.retain(|id| {
                state.tasks.contains_key(id) && claimed.insert(id.clone())
            });
            Arc::new(project)
        })
        .collect();

    state
}

/// Load, migrate, and rehydrate the persisted state. No persisted data, a
/// read failure, or an unparsable payload all degrade to the default state;
/// loading never fails the caller.
pub fn load_initial_state(backend: &dyn StorageBackend) -> AppState {
    let payload = match backend.load() {
        Ok(Some(payload)) => payload,
        Ok(None) => return AppState::default_state(),
        Err(error) => {
            warn!(%error, "failed to read persisted state; starting from defaults");
            return AppState::default_state();
        }
    };
    match serde_json::from_str::<Value>(&payload) {
        Ok(raw) => rehydrate(migrate(raw)),
        Err(error) => {
            warn!(%error, "persisted state is not valid JSON; starting from defaults");
            AppState::default_state()
        }
    }
}
