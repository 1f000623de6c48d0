//! docket — a normalized task/project state engine.
//!
//! State lives in a single [`model::AppState`] tree of immutable entities.
//! Callers build [`action::Action`] values and run them through a
//! [`store::Store`]; the pure [`reducer`] is the only place mutation
//! semantics are defined. Pure selectors in [`query`] derive views,
//! [`recur`] schedules follow-up occurrences of recurring tasks, and the
//! [`io`] layer persists state as JSON with forward schema migration and a
//! debounced writer. [`app::App::init`] wires the pieces together.

pub mod action;
pub mod app;
pub mod io;
pub mod model;
pub mod ops;
pub mod query;
pub mod recur;
pub mod reducer;
pub mod store;

pub use action::{Action, TaskPatch};
pub use app::{App, AppConfig};
pub use model::{
    ActiveView, AppState, ChecklistItem, Frequency, Project, RecurrenceRule, SortMode, Task,
    TaskDraft, ValidationError, INBOX_PROJECT_ID, SCHEMA_VERSION,
};
pub use reducer::reduce;
pub use store::{Store, Subscription};
