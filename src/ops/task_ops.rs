use tracing::warn;

use crate::action::{Action, TaskPatch};
use crate::model::{Task, TaskDraft, ValidationError, INBOX_PROJECT_ID};
use crate::recur::next_task;
use crate::store::Store;

/// What `delete_task` removed, kept so an undo can restore it.
#[derive(Debug, Clone)]
pub struct DeletedTask {
    pub task: Task,
    /// The project that owned the task at deletion time, if any.
    pub project_id: Option<String>,
}

/// Create a task in the given project (inbox when absent).
pub fn create_task(
    store: &Store,
    draft: TaskDraft,
    project_id: Option<&str>,
) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskCreated {
        draft,
        project_id: project_id.map(str::to_string),
    })
}

pub fn update_task(
    store: &Store,
    task_id: &str,
    patch: Vec<TaskPatch>,
) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskUpdated {
        id: task_id.to_string(),
        patch,
    })
}

/// Toggle a task's done flag and schedule the follow-up occurrence when a
/// recurring task just completed.
///
/// The spawn is a second dispatch after the toggle, so listeners observe
/// the toggled-but-not-yet-recurred state in between; the two-step shape
/// keeps the reducer pure (producing the follow-up command needs the
/// post-toggle state).
pub fn toggle_task(store: &Store, task_id: &str) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskToggled {
        id: task_id.to_string(),
    })?;

    let state = store.get_state();
    let Some(task) = state.task(task_id) else {
        return Ok(());
    };
    if !(task.done && task.recurrence.is_some()) {
        return Ok(());
    }

    match next_task(task) {
        Some(draft) => {
            let project_id = state
                .owning_project(task_id)
                .map(|p| p.id.clone())
                .unwrap_or_else(|| INBOX_PROJECT_ID.to_string());
            store.dispatch(Action::TaskCreated {
                draft,
                project_id: Some(project_id),
            })
        }
        None => {
            warn!(task_id, "could not compute next occurrence for recurring task");
            Ok(())
        }
    }
}

/// Atomically move a task between projects; same source and destination is
/// a no-op.
pub fn move_task(
    store: &Store,
    task_id: &str,
    from_project_id: &str,
    to_project_id: &str,
) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskMoved {
        task_id: task_id.to_string(),
        from: from_project_id.to_string(),
        to: to_project_id.to_string(),
    })
}

pub fn reorder_tasks(
    store: &Store,
    project_id: &str,
    task_ids: Vec<String>,
) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskReordered {
        project_id: project_id.to_string(),
        task_ids,
    })
}

/// Delete a task, returning what was removed for undo. Deleting an unknown
/// id returns `None` and changes nothing.
pub fn delete_task(store: &Store, task_id: &str) -> Result<Option<DeletedTask>, ValidationError> {
    let state = store.get_state();
    let Some(task) = state.task(task_id) else {
        return Ok(None);
    };
    let removed = DeletedTask {
        task: (**task).clone(),
        project_id: state.owning_project(task_id).map(|p| p.id.clone()),
    };
    store.dispatch(Action::TaskDeleted {
        id: task_id.to_string(),
    })?;
    Ok(Some(removed))
}

/// Re-insert a previously deleted task. It returns to its old project when
/// that still exists, else the inbox.
pub fn restore_task(store: &Store, deleted: DeletedTask) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskRestored {
        task: deleted.task,
        project_id: deleted.project_id,
    })
}

pub fn select_task(store: &Store, task_id: &str) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskSelected {
        id: task_id.to_string(),
    })
}

pub fn deselect_task(store: &Store) -> Result<(), ValidationError> {
    store.dispatch(Action::TaskDeselected)
}
