use serde_json::Value;
use tracing::warn;

use crate::model::SCHEMA_VERSION;

/// The schema version a raw document claims; documents from before
/// versioning carry none and count as 0.
fn version_of(raw: &Value) -> u32 {
    raw.get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

/// One forward migration step, version N to N+1.
fn step_for(version: u32) -> Option<fn(Value) -> Value> {
    match version {
        0 => Some(migrate_v0_to_v1),
        _ => None,
    }
}

/// Upgrade a raw persisted document to the current schema version by
/// applying forward migration steps in sequence.
///
/// An unrecognized version is passed through unchanged with a warning —
/// never an error, because failing to load must never prevent startup.
pub fn migrate(mut raw: Value) -> Value {
    loop {
        let version = version_of(&raw);
        if version == SCHEMA_VERSION {
            return raw;
        }
        match step_for(version) {
            Some(step) => {
                raw = step(raw);
                if version_of(&raw) <= version {
                    // a malformed document the step could not stamp
                    warn!(version, "migration made no progress; passing data through");
                    return raw;
                }
            }
            None => {
                warn!(version, "unknown schema version; passing data through unchanged");
                return raw;
            }
        }
    }
}

/// v0 documents predate the version field; the shape is otherwise current.
fn migrate_v0_to_v1(mut raw: Value) -> Value {
    if let Some(obj) = raw.as_object_mut() {
        obj.insert("schemaVersion".to_string(), Value::from(1));
    }
    raw
}
