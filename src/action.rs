use crate::model::{ActiveView, AppState, Project, RecurrenceRule, SortMode, Task, TaskDraft};

/// One field-level change to a task. An explicit closed union: the reducer
/// maps each variant to a named entity operation, so there is no dynamic
/// field-name dispatch anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPatch {
    Title(String),
    Description(String),
    Notes(String),
    /// `YYYY-MM-DD` or `None` to clear
    DueDate(Option<String>),
    /// `HH:mm` or `None` to clear
    DueTime(Option<String>),
    Priority(u8),
    Recurrence(Option<RecurrenceRule>),
    AddTag(String),
    RemoveTag(String),
    AddChecklistItem(String),
    ToggleChecklistItem(String),
    RemoveChecklistItem(String),
}

/// The closed command set consumed by the reducer.
///
/// Payloads carry raw caller input (drafts, patches); business validation
/// happens in the entity constructors the reducer invokes, so invalid
/// commands fail at that single boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the entire state; the payload must already be validated or
    /// rehydrated (persistence load, import).
    Init(AppState),
    /// Create a task and attach it to the target project (inbox if absent
    /// or unknown).
    TaskCreated {
        draft: TaskDraft,
        project_id: Option<String>,
    },
    TaskUpdated {
        id: String,
        patch: Vec<TaskPatch>,
    },
    TaskToggled {
        id: String,
    },
    TaskReordered {
        project_id: String,
        task_ids: Vec<String>,
    },
    TaskMoved {
        task_id: String,
        from: String,
        to: String,
    },
    TaskDeleted {
        id: String,
    },
    /// Re-insert a previously removed task under its original id, attached
    /// to the named project if it still exists, else the inbox.
    TaskRestored {
        task: Task,
        project_id: Option<String>,
    },
    ProjectCreated {
        name: String,
    },
    ProjectRenamed {
        id: String,
        name: String,
    },
    /// Remove a project and every task it owned. The inbox guard lives in
    /// the service layer, not here.
    ProjectDeleted {
        id: String,
    },
    ProjectRestored {
        project: Project,
        tasks: Vec<Task>,
    },
    TaskSelected {
        id: String,
    },
    TaskDeselected,
    SetActiveView(ActiveView),
    SetFilter(SortMode),
}
