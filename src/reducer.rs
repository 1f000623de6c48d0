use std::sync::Arc;

use crate::action::{Action, TaskPatch};
use crate::model::{AppState, Project, Task, ValidationError, INBOX_PROJECT_ID};

/// Compute the next state for an action. Pure: the input state is never
/// mutated, and the same `(state, action)` always yields equal results.
///
/// Only the sub-trees an action touches are re-allocated; every other task
/// and project is carried over as a cheap `Arc` clone, so subscribers can
/// skip unchanged entities by pointer comparison.
///
/// A `ValidationError` from an entity operation rejects the single action:
/// the caller gets the error and the previous state stays in place. The
/// action enum is closed, so there is no unrecognized-type branch to handle.
pub fn reduce(state: &AppState, action: &Action) -> Result<AppState, ValidationError> {
    match action {
        Action::Init(next) => Ok(next.clone()),

        Action::TaskCreated { draft, project_id } => {
            let task = Task::from_draft(draft.clone())?;
            let target = resolve_target_project(state, project_id.as_deref());

            let mut next = state.clone();
            next.projects = attach_to_project(&state.projects, &target, &task.id);
            next.tasks.insert(task.id.clone(), Arc::new(task));
            Ok(next)
        }

        Action::TaskUpdated { id, patch } => {
            let Some(existing) = state.tasks.get(id) else {
                return Ok(state.clone());
            };
            let mut task = (**existing).clone();
            for p in patch {
                task = apply_patch(&task, p)?;
            }
            let mut next = state.clone();
            next.tasks.insert(id.clone(), Arc::new(task));
            Ok(next)
        }

        Action::TaskToggled { id } => {
            let Some(existing) = state.tasks.get(id) else {
                return Ok(state.clone());
            };
            let toggled = existing.toggle_done();
            let mut next = state.clone();
            next.tasks.insert(id.clone(), Arc::new(toggled));
            Ok(next)
        }

        Action::TaskReordered {
            project_id,
            task_ids,
        } => {
            let mut next = state.clone();
            next.projects = map_project(&state.projects, project_id, |p| {
                p.with_task_order(task_ids.clone())
            });
            Ok(next)
        }

        Action::TaskMoved { task_id, from, to } => {
            if from == to {
                return Ok(state.clone());
            }
            let mut next = state.clone();
            next.projects = state
                .projects
                .iter()
                .map(|p| {
                    if p.id == *from {
                        Arc::new(p.without_task_id(task_id))
                    } else if p.id == *to {
                        Arc::new(p.with_task_id(task_id))
                    } else {
                        Arc::clone(p)
                    }
                })
                .collect();
            Ok(next)
        }

        Action::TaskDeleted { id } => {
            if !state.tasks.contains_key(id) {
                return Ok(state.clone());
            }
            let mut next = state.clone();
            next.tasks.shift_remove(id);
            next.projects = state
                .projects
                .iter()
                .map(|p| {
                    if p.contains_task(id) {
                        Arc::new(p.without_task_id(id))
                    } else {
                        Arc::clone(p)
                    }
                })
                .collect();
            Ok(next)
        }

        Action::TaskRestored { task, project_id } => {
            let target = resolve_target_project(state, project_id.as_deref());
            let mut next = state.clone();
            next.projects = attach_to_project(&state.projects, &target, &task.id);
            next.tasks.insert(task.id.clone(), Arc::new(task.clone()));
            Ok(next)
        }

        Action::ProjectCreated { name } => {
            let project = Project::new(name)?;
            let mut next = state.clone();
            next.projects.push(Arc::new(project));
            Ok(next)
        }

        Action::ProjectRenamed { id, name } => {
            // Validate even when the project is unknown so a bad name is
            // rejected rather than silently no-opped.
            let mut renamed: Result<(), ValidationError> = Ok(());
            let projects = map_project(&state.projects, id, |p| match p.rename(name) {
                Ok(next) => next,
                Err(e) => {
                    renamed = Err(e);
                    p.clone()
                }
            });
            renamed?;
            let mut next = state.clone();
            next.projects = projects;
            Ok(next)
        }

        Action::ProjectDeleted { id } => {
            let Some(doomed) = state.project(id) else {
                return Ok(state.clone());
            };
            let owned: Vec<String> = doomed.task_ids.clone();
            let mut next = state.clone();
            next.projects = state
                .projects
                .iter()
                .filter(|p| p.id != *id)
                .map(Arc::clone)
                .collect();
            for task_id in &owned {
                next.tasks.shift_remove(task_id);
            }
            Ok(next)
        }

        Action::ProjectRestored { project, tasks } => {
            if state.project(&project.id).is_some() {
                return Ok(state.clone());
            }
            let mut next = state.clone();
            next.projects.push(Arc::new(project.clone()));
            for task in tasks {
                next.tasks.insert(task.id.clone(), Arc::new(task.clone()));
            }
            Ok(next)
        }

        Action::TaskSelected { id } => {
            let mut next = state.clone();
            next.selected_task_id = Some(id.clone());
            Ok(next)
        }

        Action::TaskDeselected => {
            let mut next = state.clone();
            next.selected_task_id = None;
            Ok(next)
        }

        Action::SetActiveView(view) => {
            let mut next = state.clone();
            next.active_view = view.clone();
            Ok(next)
        }

        Action::SetFilter(mode) => {
            let mut next = state.clone();
            next.filter = *mode;
            Ok(next)
        }
    }
}

/// Map each `TaskPatch` variant onto its named entity operation.
fn apply_patch(task: &Task, patch: &TaskPatch) -> Result<Task, ValidationError> {
    match patch {
        TaskPatch::Title(title) => task.rename(title),
        TaskPatch::Description(text) => Ok(task.set_description(text)),
        TaskPatch::Notes(text) => Ok(task.set_notes(text)),
        TaskPatch::DueDate(date) => task.set_due_date(date.as_deref()),
        TaskPatch::DueTime(time) => task.set_due_time(time.as_deref()),
        TaskPatch::Priority(p) => task.set_priority(*p),
        TaskPatch::Recurrence(rule) => Ok(task.set_recurrence(rule.clone())),
        TaskPatch::AddTag(tag) => Ok(task.add_tag(tag)),
        TaskPatch::RemoveTag(tag) => Ok(task.remove_tag(tag)),
        TaskPatch::AddChecklistItem(text) => task.add_checklist_item(text),
        TaskPatch::ToggleChecklistItem(item_id) => Ok(task.toggle_checklist_item(item_id)),
        TaskPatch::RemoveChecklistItem(item_id) => Ok(task.remove_checklist_item(item_id)),
    }
}

/// The project an incoming task lands in: the requested one when it exists,
/// otherwise the inbox.
fn resolve_target_project(state: &AppState, requested: Option<&str>) -> String {
    match requested {
        Some(id) if state.project(id).is_some() => id.to_string(),
        _ => INBOX_PROJECT_ID.to_string(),
    }
}

/// Replace one project via `f`, sharing every other project by pointer.
fn map_project<F>(projects: &[Arc<Project>], id: &str, mut f: F) -> Vec<Arc<Project>>
where
    F: FnMut(&Project) -> Project,
{
    projects
        .iter()
        .map(|p| {
            if p.id == id {
                Arc::new(f(p))
            } else {
                Arc::clone(p)
            }
        })
        .collect()
}

fn attach_to_project(
    projects: &[Arc<Project>],
    project_id: &str,
    task_id: &str,
) -> Vec<Arc<Project>> {
    map_project(projects, project_id, |p| p.with_task_id(task_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActiveView, SortMode, TaskDraft};

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            ..TaskDraft::default()
        }
    }

    fn state_with_task(title: &str) -> (AppState, String) {
        let state = AppState::default_state();
        let next = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft(title),
                project_id: None,
            },
        )
        .unwrap();
        let id = next.tasks.keys().next().unwrap().clone();
        (next, id)
    }

    #[test]
    fn create_lands_in_inbox() {
        let state = AppState::default_state();
        let next = reduce(
            &state,
            &Action::TaskCreated {
                draft: TaskDraft {
                    title: "Buy milk".into(),
                    due_date: Some("2024-06-01".into()),
                    priority: Some(2),
                    ..TaskDraft::default()
                },
                project_id: None,
            },
        )
        .unwrap();

        assert_eq!(next.tasks.len(), 1);
        let task = next.tasks.values().next().unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, 2);
        assert_eq!(next.projects[0].task_ids, vec![task.id.clone()]);
        // input untouched
        assert!(state.tasks.is_empty());
        assert!(state.projects[0].task_ids.is_empty());
    }

    #[test]
    fn create_with_unknown_project_falls_back_to_inbox() {
        let state = AppState::default_state();
        let next = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("x"),
                project_id: Some("p_gone".into()),
            },
        )
        .unwrap();
        assert_eq!(next.projects[0].task_ids.len(), 1);
    }

    #[test]
    fn create_rejects_invalid_draft() {
        let state = AppState::default_state();
        let err = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("  "),
                project_id: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn update_applies_patches_in_order() {
        let (state, id) = state_with_task("before");
        let next = reduce(
            &state,
            &Action::TaskUpdated {
                id: id.clone(),
                patch: vec![
                    TaskPatch::Title("after".into()),
                    TaskPatch::Priority(1),
                    TaskPatch::AddTag("urgent".into()),
                    TaskPatch::DueDate(Some("2024-06-02".into())),
                ],
            },
        )
        .unwrap();
        let task = next.tasks.get(&id).unwrap();
        assert_eq!(task.title, "after");
        assert_eq!(task.priority, 1);
        assert!(task.tags.contains("urgent"));
        assert_eq!(
            task.due_date,
            Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 2).unwrap())
        );
    }

    #[test]
    fn update_unknown_task_is_noop() {
        let (state, _) = state_with_task("x");
        let next = reduce(
            &state,
            &Action::TaskUpdated {
                id: "t_missing".into(),
                patch: vec![TaskPatch::Priority(1)],
            },
        )
        .unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn update_with_bad_patch_rejects_whole_action() {
        let (state, id) = state_with_task("x");
        let err = reduce(
            &state,
            &Action::TaskUpdated {
                id: id.clone(),
                patch: vec![
                    TaskPatch::Title("renamed".into()),
                    TaskPatch::Priority(9),
                ],
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidPriority(9));
        // earlier patches in the same action must not leak
        assert_eq!(state.tasks.get(&id).unwrap().title, "x");
    }

    #[test]
    fn toggle_flips_and_absent_is_noop() {
        let (state, id) = state_with_task("x");
        let next = reduce(&state, &Action::TaskToggled { id: id.clone() }).unwrap();
        assert!(next.tasks.get(&id).unwrap().done);

        let same = reduce(&state, &Action::TaskToggled { id: "t_nope".into() }).unwrap();
        assert_eq!(same, state);
    }

    #[test]
    fn reorder_changes_order_only() {
        let state = AppState::default_state();
        let state = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("a"),
                project_id: None,
            },
        )
        .unwrap();
        let state = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("b"),
                project_id: None,
            },
        )
        .unwrap();
        let ids: Vec<String> = state.projects[0].task_ids.clone();
        let reversed: Vec<String> = ids.iter().rev().cloned().collect();

        let next = reduce(
            &state,
            &Action::TaskReordered {
                project_id: INBOX_PROJECT_ID.into(),
                task_ids: reversed.clone(),
            },
        )
        .unwrap();

        assert_eq!(next.projects[0].task_ids, reversed);
        let mut before = ids.clone();
        let mut after = next.projects[0].task_ids.clone();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn move_is_atomic_and_exclusive() {
        let mut state = AppState::default_state();
        let chores = Project::new("Chores").unwrap();
        let chores_id = chores.id.clone();
        state.projects.push(Arc::new(chores));

        let state = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("x"),
                project_id: None,
            },
        )
        .unwrap();
        let task_id = state.tasks.keys().next().unwrap().clone();

        let next = reduce(
            &state,
            &Action::TaskMoved {
                task_id: task_id.clone(),
                from: INBOX_PROJECT_ID.into(),
                to: chores_id.clone(),
            },
        )
        .unwrap();

        let member_count = next
            .projects
            .iter()
            .filter(|p| p.contains_task(&task_id))
            .count();
        assert_eq!(member_count, 1);
        assert!(next.project(&chores_id).unwrap().contains_task(&task_id));
        assert!(!next.projects[0].contains_task(&task_id));
    }

    #[test]
    fn move_to_same_project_is_noop() {
        let (state, id) = state_with_task("x");
        let next = reduce(
            &state,
            &Action::TaskMoved {
                task_id: id,
                from: INBOX_PROJECT_ID.into(),
                to: INBOX_PROJECT_ID.into(),
            },
        )
        .unwrap();
        assert_eq!(next, state);
        assert!(Arc::ptr_eq(&next.projects[0], &state.projects[0]));
    }

    #[test]
    fn delete_removes_everywhere_and_is_idempotent() {
        let (state, id) = state_with_task("x");
        let next = reduce(&state, &Action::TaskDeleted { id: id.clone() }).unwrap();
        assert!(next.tasks.is_empty());
        assert!(next.projects[0].task_ids.is_empty());

        let again = reduce(&next, &Action::TaskDeleted { id: id.clone() }).unwrap();
        assert_eq!(again, next);
    }

    #[test]
    fn delete_unknown_id_shares_subtrees() {
        let (state, _) = state_with_task("x");
        let next = reduce(&state, &Action::TaskDeleted { id: "t_ghost".into() }).unwrap();
        for (a, b) in state.projects.iter().zip(next.projects.iter()) {
            assert!(Arc::ptr_eq(a, b));
        }
        for (id, task) in &state.tasks {
            assert!(Arc::ptr_eq(task, next.tasks.get(id).unwrap()));
        }
    }

    #[test]
    fn untouched_entities_are_shared_on_unrelated_change() {
        let (state, id) = state_with_task("x");
        let next = reduce(&state, &Action::TaskSelected { id: id.clone() }).unwrap();
        assert!(Arc::ptr_eq(&state.projects[0], &next.projects[0]));
        assert!(Arc::ptr_eq(
            state.tasks.get(&id).unwrap(),
            next.tasks.get(&id).unwrap()
        ));
        assert_eq!(next.selected_task_id, Some(id));
    }

    #[test]
    fn restore_task_prefers_original_project_then_inbox() {
        let (state, id) = state_with_task("x");
        let task = (**state.tasks.get(&id).unwrap()).clone();
        let deleted = reduce(&state, &Action::TaskDeleted { id: id.clone() }).unwrap();

        let restored = reduce(
            &deleted,
            &Action::TaskRestored {
                task: task.clone(),
                project_id: Some("p_gone".into()),
            },
        )
        .unwrap();
        assert!(restored.tasks.contains_key(&id));
        assert!(restored.projects[0].contains_task(&id));
    }

    #[test]
    fn project_lifecycle() {
        let state = AppState::default_state();
        let state = reduce(
            &state,
            &Action::ProjectCreated {
                name: "Chores".into(),
            },
        )
        .unwrap();
        assert_eq!(state.projects.len(), 2);
        let pid = state.projects[1].id.clone();

        let state = reduce(
            &state,
            &Action::ProjectRenamed {
                id: pid.clone(),
                name: "Housework".into(),
            },
        )
        .unwrap();
        assert_eq!(state.projects[1].name, "Housework");

        let err = reduce(
            &state,
            &Action::ProjectRenamed {
                id: pid.clone(),
                name: "  ".into(),
            },
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptyProjectName);
    }

    #[test]
    fn project_delete_cascades_owned_tasks() {
        let state = AppState::default_state();
        let state = reduce(
            &state,
            &Action::ProjectCreated {
                name: "Chores".into(),
            },
        )
        .unwrap();
        let pid = state.projects[1].id.clone();
        let state = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("owned"),
                project_id: Some(pid.clone()),
            },
        )
        .unwrap();
        let state = reduce(
            &state,
            &Action::TaskCreated {
                draft: draft("inboxed"),
                project_id: None,
            },
        )
        .unwrap();
        assert_eq!(state.tasks.len(), 2);

        let next = reduce(&state, &Action::ProjectDeleted { id: pid.clone() }).unwrap();
        assert_eq!(next.projects.len(), 1);
        assert_eq!(next.tasks.len(), 1);
        assert_eq!(next.tasks.values().next().unwrap().title, "inboxed");
    }

    #[test]
    fn project_restore_noop_on_collision() {
        let state = AppState::default_state();
        let inbox = (*state.projects[0]).clone();
        let next = reduce(
            &state,
            &Action::ProjectRestored {
                project: inbox,
                tasks: vec![],
            },
        )
        .unwrap();
        assert_eq!(next.projects.len(), 1);
    }

    #[test]
    fn ui_fields_replace() {
        let state = AppState::default_state();
        let next = reduce(
            &state,
            &Action::SetActiveView(ActiveView::Search { q: "milk".into() }),
        )
        .unwrap();
        assert_eq!(next.active_view, ActiveView::Search { q: "milk".into() });

        let next = reduce(&next, &Action::SetFilter(SortMode::Priority)).unwrap();
        assert_eq!(next.filter, SortMode::Priority);

        let next = reduce(&next, &Action::TaskDeselected).unwrap();
        assert_eq!(next.selected_task_id, None);
    }

    #[test]
    fn reduce_is_repeatable() {
        let (state, id) = state_with_task("x");
        let action = Action::TaskToggled { id };
        let a = reduce(&state, &action).unwrap();
        let b = reduce(&state, &action).unwrap();
        // toggling refreshes updated_at, so compare the fields that matter
        assert_eq!(
            a.tasks.values().map(|t| t.done).collect::<Vec<_>>(),
            b.tasks.values().map(|t| t.done).collect::<Vec<_>>()
        );
        assert_eq!(a.projects, b.projects);
    }

    #[test]
    fn init_replaces_wholesale() {
        let (state, _) = state_with_task("x");
        let fresh = AppState::default_state();
        let next = reduce(&state, &Action::Init(fresh.clone())).unwrap();
        assert_eq!(next, fresh);
    }
}
