//! Shared vocabulary for the Agora platform crates: money amounts, user
//! roles, timestamps, and id helpers.

pub mod amount;
pub mod types;
pub mod utils;

pub use amount::Amount;
pub use types::{Role, Timestamp};
