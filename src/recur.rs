use chrono::{Days, Months, NaiveDate};

use crate::model::{Frequency, RecurrenceRule, Task, TaskDraft};

/// The due date of the occurrence after `due` under `rule`.
///
/// Daily and weekly rules add exact day counts. Monthly rules follow
/// calendar months with chrono's end-of-month clamping: when the target
/// month is shorter, the day clamps to its last day, so
/// 2024-01-31 + 1 month = 2024-02-29 and 2023-01-31 + 1 month = 2023-02-28.
/// Returns `None` only when the arithmetic overflows the supported range.
pub fn next_occurrence(due: NaiveDate, rule: &RecurrenceRule) -> Option<NaiveDate> {
    match rule.freq {
        Frequency::Daily => due.checked_add_days(Days::new(u64::from(rule.interval))),
        Frequency::Weekly => due.checked_add_days(Days::new(7 * u64::from(rule.interval))),
        Frequency::Monthly => due.checked_add_months(Months::new(rule.interval)),
    }
}

/// The draft for the follow-up occurrence of a completed recurring task, or
/// `None` when the task has no rule, no due date, or the date arithmetic
/// overflows.
///
/// Carried over: title, description, notes, priority, tags, due time, and
/// the rule itself. The due date advances, `done` resets, and the checklist
/// keeps its texts and order with every item reset to not-done.
pub fn next_task(task: &Task) -> Option<TaskDraft> {
    let rule = task.recurrence.as_ref()?;
    let due = task.due_date?;
    let next = next_occurrence(due, rule)?;

    Some(TaskDraft {
        title: task.title.clone(),
        description: task.description.clone(),
        notes: task.notes.clone(),
        due_date: Some(next.format("%Y-%m-%d").to_string()),
        due_time: task.due_time.map(|t| t.format("%H:%M").to_string()),
        priority: Some(task.priority),
        tags: task.tags.iter().cloned().collect(),
        checklist: task.checklist.iter().map(|i| i.text.clone()).collect(),
        done: false,
        recurrence: Some(rule.clone()),
    })
}
