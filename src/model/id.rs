use uuid::Uuid;

/// Generate a prefixed entity id, e.g. `t_1c0a…` for tasks.
///
/// The prefix keeps ids self-describing in persisted documents and log
/// output; uniqueness comes from the UUID.
pub fn make_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
