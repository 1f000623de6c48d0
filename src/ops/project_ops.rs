use crate::action::Action;
use crate::model::{ActiveView, Project, Task, ValidationError, INBOX_PROJECT_ID};
use crate::store::Store;

/// Error type for project operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectOpError {
    #[error("the inbox project cannot be deleted")]
    CannotDeleteInbox,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// What `delete_project` removed, kept so an undo can restore it.
#[derive(Debug, Clone)]
pub struct DeletedProject {
    pub project: Project,
    /// The tasks the project owned, in display order.
    pub tasks: Vec<Task>,
}

/// Create a project and return its id; optionally switch the active view to
/// it.
pub fn create_project(
    store: &Store,
    name: &str,
    set_active: bool,
) -> Result<String, ProjectOpError> {
    store.dispatch(Action::ProjectCreated {
        name: name.to_string(),
    })?;

    let state = store.get_state();
    let project = state
        .projects
        .last()
        .expect("a project was just appended");
    let id = project.id.clone();

    if set_active {
        store.dispatch(Action::SetActiveView(ActiveView::Project {
            project_id: id.clone(),
        }))?;
    }
    Ok(id)
}

pub fn rename_project(store: &Store, project_id: &str, name: &str) -> Result<(), ProjectOpError> {
    store.dispatch(Action::ProjectRenamed {
        id: project_id.to_string(),
        name: name.to_string(),
    })?;
    Ok(())
}

/// Delete a project and every task it owned, returning the removed pieces
/// for undo. The inbox is rejected here, before anything is dispatched.
/// When the active view was showing the deleted project it returns to the
/// inbox. Deleting an unknown id returns `None` and changes nothing.
pub fn delete_project(
    store: &Store,
    project_id: &str,
) -> Result<Option<DeletedProject>, ProjectOpError> {
    if project_id == INBOX_PROJECT_ID {
        return Err(ProjectOpError::CannotDeleteInbox);
    }

    let state = store.get_state();
    let Some(project) = state.project(project_id) else {
        return Ok(None);
    };
    let removed = DeletedProject {
        project: (**project).clone(),
        tasks: project
            .task_ids
            .iter()
            .filter_map(|id| state.task(id).map(|t| (**t).clone()))
            .collect(),
    };

    store.dispatch(Action::ProjectDeleted {
        id: project_id.to_string(),
    })?;

    let viewing_deleted = matches!(
        &store.get_state().active_view,
        ActiveView::Project { project_id: viewed } if viewed == project_id
    );
    if viewing_deleted {
        store.dispatch(Action::SetActiveView(ActiveView::Inbox))?;
    }

    Ok(Some(removed))
}

/// Re-insert a deleted project with its tasks; a no-op when a project with
/// that id exists again.
pub fn restore_project(store: &Store, deleted: DeletedProject) -> Result<(), ProjectOpError> {
    store.dispatch(Action::ProjectRestored {
        project: deleted.project,
        tasks: deleted.tasks,
    })?;
    Ok(())
}
