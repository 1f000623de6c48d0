use serde_json::Value;

use crate::action::Action;
use crate::io::migrate::migrate;
use crate::io::record::serialize;
use crate::io::rehydrate::rehydrate;
use crate::model::{AppState, ValidationError};
use crate::store::Store;

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid JSON document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

/// Export the state as pretty-printed JSON in the persisted document shape.
pub fn export_json(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serialize(state))
}

/// Import a JSON document, replacing the current state wholesale.
///
/// Any prior schema version is accepted: the document is migrated, then
/// rehydrated (invalid entities dropped, defaults filled in), then
/// installed via `Init`. Only a document that is not JSON at all is an
/// error.
pub fn import_json(store: &Store, json: &str) -> Result<(), ImportError> {
    let raw: Value = serde_json::from_str(json)?;
    let next = rehydrate(migrate(raw));
    store.dispatch(Action::Init(next))?;
    Ok(())
}
