use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};

use crate::model::{ActiveView, AppState, Project, SortMode, Task, INBOX_PROJECT_ID};

// All selectors are pure functions over the state: no caching, fresh
// vectors per call. The `Arc` clones they return share the underlying
// entities with the state snapshot.

pub fn projects(state: &AppState) -> &[Arc<Project>] {
    &state.projects
}

pub fn project_by_id<'a>(state: &'a AppState, project_id: &str) -> Option<&'a Arc<Project>> {
    state.project(project_id)
}

pub fn task_by_id<'a>(state: &'a AppState, task_id: &str) -> Option<&'a Arc<Task>> {
    state.task(task_id)
}

pub fn all_tasks(state: &AppState) -> Vec<Arc<Task>> {
    state.tasks.values().map(Arc::clone).collect()
}

/// Tasks of one project in the project's display order. Ids without a
/// matching task are skipped.
pub fn tasks_for_project(state: &AppState, project_id: &str) -> Vec<Arc<Task>> {
    let Some(project) = state.project(project_id) else {
        return Vec::new();
    };
    project
        .task_ids
        .iter()
        .filter_map(|id| state.tasks.get(id).map(Arc::clone))
        .collect()
}

pub fn completed_tasks(state: &AppState) -> Vec<Arc<Task>> {
    state
        .tasks
        .values()
        .filter(|t| t.done)
        .map(Arc::clone)
        .collect()
}

/// Open tasks due exactly on `date`.
pub fn tasks_due_on(state: &AppState, date: NaiveDate) -> Vec<Arc<Task>> {
    state
        .tasks
        .values()
        .filter(|t| !t.done && t.due_date == Some(date))
        .map(Arc::clone)
        .collect()
}

/// Open tasks due calendar-today (local time).
pub fn today_tasks(state: &AppState) -> Vec<Arc<Task>> {
    tasks_due_on(state, Local::now().date_naive())
}

/// Open tasks due strictly after `today` and strictly before
/// `today + window` days.
pub fn tasks_upcoming_from(state: &AppState, today: NaiveDate, window: u64) -> Vec<Arc<Task>> {
    let Some(end) = today.checked_add_days(Days::new(window)) else {
        return Vec::new();
    };
    state
        .tasks
        .values()
        .filter(|t| {
            if t.done {
                return false;
            }
            match t.due_date {
                Some(due) => due > today && due < end,
                None => false,
            }
        })
        .map(Arc::clone)
        .collect()
}

pub fn upcoming_tasks(state: &AppState, window: u64) -> Vec<Arc<Task>> {
    tasks_upcoming_from(state, Local::now().date_naive(), window)
}

/// Exact, case-sensitive tag membership. A blank tag matches nothing.
pub fn tasks_by_tag(state: &AppState, tag: &str) -> Vec<Arc<Task>> {
    let needle = tag.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    state
        .tasks
        .values()
        .filter(|t| t.tags.contains(needle))
        .map(Arc::clone)
        .collect()
}

/// Case-insensitive substring match over title, description, and notes.
/// A blank query matches nothing.
pub fn search_tasks(state: &AppState, query: &str) -> Vec<Arc<Task>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    state
        .tasks
        .values()
        .filter(|t| {
            let haystack =
                format!("{} {} {}", t.title, t.description, t.notes).to_lowercase();
            haystack.contains(&needle)
        })
        .map(Arc::clone)
        .collect()
}

/// Default window for the upcoming view, in days.
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

/// The task slice for the current active view.
pub fn tasks_for_active_view(state: &AppState) -> Vec<Arc<Task>> {
    match &state.active_view {
        ActiveView::Inbox => tasks_for_project(state, INBOX_PROJECT_ID),
        ActiveView::Project { project_id } => tasks_for_project(state, project_id),
        ActiveView::Today => today_tasks(state),
        ActiveView::Upcoming => upcoming_tasks(state, UPCOMING_WINDOW_DAYS),
        ActiveView::Completed => completed_tasks(state),
        ActiveView::Tag { tag } => tasks_by_tag(state, tag),
        ActiveView::Search { q } => search_tasks(state, q),
    }
}

/// Count of open tasks in a project (sidebar badges).
pub fn incomplete_count_for_project(state: &AppState, project_id: &str) -> usize {
    tasks_for_project(state, project_id)
        .iter()
        .filter(|t| !t.done)
        .count()
}

/// The project backing the active view, when the view is a project.
pub fn active_project(state: &AppState) -> Option<&Arc<Project>> {
    match &state.active_view {
        ActiveView::Inbox => state.project(INBOX_PROJECT_ID),
        ActiveView::Project { project_id } => state.project(project_id),
        _ => None,
    }
}

/// Apply a display sort to a task slice. `Manual` keeps the given order.
pub fn sort_tasks(mut tasks: Vec<Arc<Task>>, mode: SortMode) -> Vec<Arc<Task>> {
    match mode {
        SortMode::Manual => {}
        // tasks without a due date sort last
        SortMode::DueDate => tasks.sort_by_key(|t| (t.due_date.is_none(), t.due_date)),
        SortMode::Priority => tasks.sort_by_key(|t| t.priority),
        SortMode::Title => tasks.sort_by_key(|t| t.title.to_lowercase()),
        SortMode::CreatedAt => tasks.sort_by_key(|t| t.created_at),
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::model::TaskDraft;
    use crate::reducer::reduce;

    fn add_task(state: &AppState, draft: TaskDraft) -> AppState {
        reduce(
            state,
            &Action::TaskCreated {
                draft,
                project_id: None,
            },
        )
        .unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            ..TaskDraft::default()
        }
    }

    fn dated(title: &str, due: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            due_date: Some(due.to_string()),
            ..TaskDraft::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn project_order_drives_listing() {
        let state = AppState::default_state();
        let state = add_task(&state, draft("first"));
        let state = add_task(&state, draft("second"));

        let listed = tasks_for_project(&state, INBOX_PROJECT_ID);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "first");
        assert_eq!(listed[1].title, "second");

        // reorder flips the listing without touching the task map
        let ids: Vec<String> = state.projects[0].task_ids.iter().rev().cloned().collect();
        let state = reduce(
            &state,
            &Action::TaskReordered {
                project_id: INBOX_PROJECT_ID.into(),
                task_ids: ids,
            },
        )
        .unwrap();
        let listed = tasks_for_project(&state, INBOX_PROJECT_ID);
        assert_eq!(listed[0].title, "second");
    }

    #[test]
    fn missing_ids_are_skipped() {
        let state = AppState::default_state();
        let state = add_task(&state, draft("kept"));
        let mut state = state;
        let inbox = state.projects[0].with_task_id("t_dangling");
        state.projects = vec![Arc::new(inbox)];

        let listed = tasks_for_project(&state, INBOX_PROJECT_ID);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "kept");
    }

    #[test]
    fn due_on_excludes_done_and_other_days() {
        let state = AppState::default_state();
        let state = add_task(&state, dated("today", "2024-06-01"));
        let state = add_task(&state, dated("tomorrow", "2024-06-02"));
        let state = add_task(&state, draft("undated"));

        let due = tasks_due_on(&state, date("2024-06-01"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "today");

        // completing it removes it from the slice
        let id = due[0].id.clone();
        let state = reduce(&state, &Action::TaskToggled { id }).unwrap();
        assert!(tasks_due_on(&state, date("2024-06-01")).is_empty());
    }

    #[test]
    fn upcoming_bounds_are_strict() {
        let state = AppState::default_state();
        let state = add_task(&state, dated("on today", "2024-06-01"));
        let state = add_task(&state, dated("inside", "2024-06-04"));
        let state = add_task(&state, dated("on boundary", "2024-06-08"));
        let state = add_task(&state, dated("past boundary", "2024-06-09"));

        let upcoming = tasks_upcoming_from(&state, date("2024-06-01"), 7);
        let titles: Vec<&str> = upcoming.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["inside"]);
    }

    #[test]
    fn tag_match_is_exact_and_case_sensitive() {
        let state = AppState::default_state();
        let state = add_task(
            &state,
            TaskDraft {
                title: "tagged".into(),
                tags: vec!["Home".into()],
                ..TaskDraft::default()
            },
        );

        assert_eq!(tasks_by_tag(&state, "Home").len(), 1);
        assert!(tasks_by_tag(&state, "home").is_empty());
        assert!(tasks_by_tag(&state, "Hom").is_empty());
        assert!(tasks_by_tag(&state, "  ").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let state = AppState::default_state();
        let state = add_task(
            &state,
            TaskDraft {
                title: "Call plumber".into(),
                description: "about the KITCHEN sink".into(),
                notes: "ask for an invoice".into(),
                ..TaskDraft::default()
            },
        );

        assert_eq!(search_tasks(&state, "kitchen").len(), 1);
        assert_eq!(search_tasks(&state, "PLUMBER").len(), 1);
        assert_eq!(search_tasks(&state, "invoice").len(), 1);
        assert!(search_tasks(&state, "garden").is_empty());
        assert!(search_tasks(&state, "").is_empty());
    }

    #[test]
    fn completed_spans_all_projects() {
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
                draft: draft("in chores"),
                project_id: Some(pid),
            },
        )
        .unwrap();
        let state = add_task(&state, draft("in inbox"));

        let ids: Vec<String> = state.tasks.keys().cloned().collect();
        let mut state = state;
        for id in ids {
            state = reduce(&state, &Action::TaskToggled { id }).unwrap();
        }
        assert_eq!(completed_tasks(&state).len(), 2);
    }

    #[test]
    fn active_view_dispatch() {
        let state = AppState::default_state();
        let state = add_task(
            &state,
            TaskDraft {
                title: "Find me".into(),
                tags: vec!["x".into()],
                ..TaskDraft::default()
            },
        );

        let mut by_view = state.clone();
        by_view.active_view = ActiveView::Tag { tag: "x".into() };
        assert_eq!(tasks_for_active_view(&by_view).len(), 1);

        by_view.active_view = ActiveView::Search { q: "find".into() };
        assert_eq!(tasks_for_active_view(&by_view).len(), 1);

        by_view.active_view = ActiveView::Completed;
        assert!(tasks_for_active_view(&by_view).is_empty());

        by_view.active_view = ActiveView::Inbox;
        assert_eq!(tasks_for_active_view(&by_view).len(), 1);
    }

    #[test]
    fn incomplete_count_ignores_done() {
        let state = AppState::default_state();
        let state = add_task(&state, draft("a"));
        let state = add_task(&state, draft("b"));
        let id = state.tasks.keys().next().unwrap().clone();
        let state = reduce(&state, &Action::TaskToggled { id }).unwrap();
        assert_eq!(incomplete_count_for_project(&state, INBOX_PROJECT_ID), 1);
    }

    #[test]
    fn sort_modes() {
        let state = AppState::default_state();
        let state = add_task(
            &state,
            TaskDraft {
                title: "beta".into(),
                priority: Some(1),
                ..TaskDraft::default()
            },
        );
        let state = add_task(
            &state,
            TaskDraft {
                title: "Alpha".into(),
                due_date: Some("2024-06-01".into()),
                priority: Some(4),
                ..TaskDraft::default()
            },
        );

        let tasks = all_tasks(&state);

        let by_title = sort_tasks(tasks.clone(), SortMode::Title);
        assert_eq!(by_title[0].title, "Alpha");

        let by_priority = sort_tasks(tasks.clone(), SortMode::Priority);
        assert_eq!(by_priority[0].title, "beta");

        // undated tasks sort after dated ones
        let by_due = sort_tasks(tasks.clone(), SortMode::DueDate);
        assert_eq!(by_due[0].title, "Alpha");

        let manual = sort_tasks(tasks.clone(), SortMode::Manual);
        assert_eq!(manual[0].title, tasks[0].title);
    }
}
