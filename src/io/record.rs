use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::task::{normalize_tags, validate_priority};
use crate::model::{
    ActiveView, AppState, ChecklistItem, Project, RecurrenceRule, Task, ValidationError,
};

/// The persisted/exported document shape. Field names are the wire format;
/// transient UI fields (`selected_task_id`, the sort mode) are not part of
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub schema_version: u32,
    pub active_view: ActiveView,
    pub projects: Vec<ProjectRecord>,
    pub tasks: IndexMap<String, TaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, with = "hhmm")]
    pub due_time: Option<chrono::NaiveTime>,
    pub priority: u8,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItemRecord>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub recurrence_rule: Option<RecurrenceRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItemRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// The frequency stays a plain string on the wire so an unrecognized value
/// degrades that one task at rehydration instead of failing the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    pub freq: String,
    pub interval: u32,
}

/// `HH:mm` wire format for optional due times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

impl Task {
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            due_time: self.due_time,
            priority: self.priority,
            notes: self.notes.clone(),
            tags: self.tags.iter().cloned().collect(),
            checklist: self
                .checklist
                .iter()
                .map(|i| ChecklistItemRecord {
                    id: i.id.clone(),
                    text: i.text.clone(),
                    done: i.done,
                })
                .collect(),
            done: self.done,
            recurrence_rule: self.recurrence.as_ref().map(|r| RecurrenceRecord {
                freq: r.freq.as_str().to_string(),
                interval: r.interval,
            }),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Reconstruct a validated task from its plain record. Ids and
    /// timestamps are preserved, so `to_record` round-trips losslessly.
    pub fn from_record(record: TaskRecord) -> Result<Task, ValidationError> {
        let title = record.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let priority = validate_priority(record.priority)?;
        let recurrence = record
            .recurrence_rule
            .map(|r| RecurrenceRule::new(r.freq.parse()?, r.interval))
            .transpose()?;
        let checklist = record
            .checklist
            .into_iter()
            .map(|i| {
                let text = i.text.trim().to_string();
                if text.is_empty() {
                    return Err(ValidationError::EmptyChecklistText);
                }
                Ok(ChecklistItem {
                    id: i.id,
                    text,
                    done: i.done,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Task {
            id: record.id,
            title,
            description: record.description.trim().to_string(),
            notes: record.notes.trim().to_string(),
            due_date: record.due_date,
            due_time: record.due_time,
            priority,
            tags: normalize_tags(record.tags),
            checklist,
            done: record.done,
            recurrence,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl Project {
    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            task_ids: self.task_ids.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_record(record: ProjectRecord) -> Result<Project, ValidationError> {
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        // collapse duplicate ids, first occurrence wins
        let mut seen = std::collections::HashSet::new();
        let task_ids = record
            .task_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Ok(Project {
            id: record.id,
            name,
            task_ids,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// The storable form of a state: entities flattened to records, transient
/// UI fields dropped.
pub fn serialize(state: &AppState) -> StateRecord {
    StateRecord {
        schema_version: state.schema_version,
        active_view: state.active_view.clone(),
        projects: state.projects.iter().map(|p| p.to_record()).collect(),
        tasks: state
            .tasks
            .iter()
            .map(|(id, t)| (id.clone(), t.to_record()))
            .collect(),
    }
}
