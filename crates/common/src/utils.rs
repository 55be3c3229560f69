//! Small helpers shared by the platform crates.

use uuid::Uuid;

/// Generate a random UUID string, used for all entity ids.
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}
