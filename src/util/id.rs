use uuid::Uuid;

/// Generate an opaque task identifier: unique within this run and across
/// reloads. The store only relies on the uniqueness contract, not the shape.
pub fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}
