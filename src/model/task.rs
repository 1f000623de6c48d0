use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::id::make_id;
use super::ValidationError;

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// The wire-format name of this frequency
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ValidationError::UnknownFrequency(other.to_string())),
        }
    }
}

/// How a completed task spawns its next occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
}

impl RecurrenceRule {
    /// Build a rule; the interval must be at least 1.
    pub fn new(freq: Frequency, interval: u32) -> Result<Self, ValidationError> {
        if interval < 1 {
            return Err(ValidationError::InvalidInterval(interval));
        }
        Ok(RecurrenceRule { freq, interval })
    }
}

/// A single checklist entry on a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

impl ChecklistItem {
    /// Create an item with a fresh id; text is trimmed and must be non-empty.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyChecklistText);
        }
        Ok(ChecklistItem {
            id: make_id("c"),
            text: trimmed.to_string(),
            done: false,
        })
    }
}

/// Raw, unvalidated input for creating a task.
///
/// Dates and times arrive as the strings a caller (UI, import) would hold;
/// `Task::from_draft` is the single validation boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub notes: String,
    /// `YYYY-MM-DD` or absent
    pub due_date: Option<String>,
    /// `HH:mm` (24h) or absent
    pub due_time: Option<String>,
    /// 1..=4, 1 = highest; absent means the default of 3
    pub priority: Option<u8>,
    pub tags: Vec<String>,
    /// Checklist item texts, in order
    pub checklist: Vec<String>,
    pub done: bool,
    pub recurrence: Option<RecurrenceRule>,
}

/// A single to-do item with scheduling, classification, and checklist
/// metadata. Immutable: every operation returns an updated copy with
/// `updated_at` refreshed and leaves the receiver untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    /// 1..=4, 1 = highest
    pub priority: u8,
    /// Insertion order preserved, duplicates collapsed
    pub tags: IndexSet<String>,
    pub checklist: Vec<ChecklistItem>,
    pub done: bool,
    pub recurrence: Option<RecurrenceRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

static DATE_SHAPE: OnceLock<Regex> = OnceLock::new();
static TIME_SHAPE: OnceLock<Regex> = OnceLock::new();

fn date_shape() -> &'static Regex {
    DATE_SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid pattern"))
}

fn time_shape() -> &'static Regex {
    TIME_SHAPE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid pattern"))
}

/// Parse a strict `YYYY-MM-DD` date. The shape check rejects unpadded
/// components that chrono would otherwise accept.
pub fn parse_due_date(s: &str) -> Result<NaiveDate, ValidationError> {
    if !date_shape().is_match(s) {
        return Err(ValidationError::InvalidDueDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(s.to_string()))
}

/// Parse a strict `HH:mm` 24-hour time.
pub fn parse_due_time(s: &str) -> Result<NaiveTime, ValidationError> {
    if !time_shape().is_match(s) {
        return Err(ValidationError::InvalidDueTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| ValidationError::InvalidDueTime(s.to_string()))
}

pub(crate) fn validate_priority(p: u8) -> Result<u8, ValidationError> {
    if (1..=4).contains(&p) {
        Ok(p)
    } else {
        Err(ValidationError::InvalidPriority(p))
    }
}

/// Trim, drop empties, collapse duplicates; first occurrence wins the slot.
pub(crate) fn normalize_tags<I: IntoIterator<Item = String>>(tags: I) -> IndexSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Task {
    /// Validate a draft into a task. Fails with a `ValidationError` naming
    /// the first offending field.
    pub fn from_draft(draft: TaskDraft) -> Result<Task, ValidationError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let priority = validate_priority(draft.priority.unwrap_or(3))?;
        let due_date = draft.due_date.as_deref().map(parse_due_date).transpose()?;
        let due_time = draft.due_time.as_deref().map(parse_due_time).transpose()?;
        let checklist = draft
            .checklist
            .iter()
            .map(|text| ChecklistItem::new(text))
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        Ok(Task {
            id: make_id("t"),
            title,
            description: draft.description.trim().to_string(),
            notes: draft.notes.trim().to_string(),
            due_date,
            due_time,
            priority,
            tags: normalize_tags(draft.tags),
            checklist,
            done: draft.done,
            recurrence: draft.recurrence,
            created_at: now,
            updated_at: now,
        })
    }

    fn touched(&self) -> Task {
        let mut next = self.clone();
        next.updated_at = Utc::now();
        next
    }

    pub fn rename(&self, title: &str) -> Result<Task, ValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let mut next = self.touched();
        next.title = trimmed.to_string();
        Ok(next)
    }

    pub fn set_description(&self, description: &str) -> Task {
        let mut next = self.touched();
        next.description = description.trim().to_string();
        next
    }

    pub fn set_notes(&self, notes: &str) -> Task {
        let mut next = self.touched();
        next.notes = notes.trim().to_string();
        next
    }

    pub fn set_due_date(&self, date: Option<&str>) -> Result<Task, ValidationError> {
        let parsed = date.map(parse_due_date).transpose()?;
        let mut next = self.touched();
        next.due_date = parsed;
        Ok(next)
    }

    pub fn set_due_time(&self, time: Option<&str>) -> Result<Task, ValidationError> {
        let parsed = time.map(parse_due_time).transpose()?;
        let mut next = self.touched();
        next.due_time = parsed;
        Ok(next)
    }

    pub fn set_priority(&self, priority: u8) -> Result<Task, ValidationError> {
        let p = validate_priority(priority)?;
        let mut next = self.touched();
        next.priority = p;
        Ok(next)
    }

    pub fn toggle_done(&self) -> Task {
        let mut next = self.touched();
        next.done = !self.done;
        next
    }

    /// Add a tag. Whitespace-only tags are ignored without refreshing
    /// `updated_at`; an already-present tag is a no-op that still touches.
    pub fn add_tag(&self, tag: &str) -> Task {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return self.clone();
        }
        let mut next = self.touched();
        next.tags.insert(trimmed.to_string());
        next
    }

    pub fn remove_tag(&self, tag: &str) -> Task {
        let mut next = self.touched();
        next.tags.shift_remove(tag);
        next
    }

    pub fn add_checklist_item(&self, text: &str) -> Result<Task, ValidationError> {
        let item = ChecklistItem::new(text)?;
        let mut next = self.touched();
        next.checklist.push(item);
        Ok(next)
    }

    /// Flip one checklist item; an unknown item id is a no-op.
    pub fn toggle_checklist_item(&self, item_id: &str) -> Task {
        let mut next = self.touched();
        if let Some(item) = next.checklist.iter_mut().find(|i| i.id == item_id) {
            item.done = !item.done;
        }
        next
    }

    pub fn remove_checklist_item(&self, item_id: &str) -> Task {
        let mut next = self.touched();
        next.checklist.retain(|i| i.id != item_id);
        next
    }

    pub fn set_recurrence(&self, rule: Option<RecurrenceRule>) -> Task {
        let mut next = self.touched();
        next.recurrence = rule;
        next
    }
}
