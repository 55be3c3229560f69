//! User accounts and balance mutation for the Agora platform.
//!
//! The ledger owns the [`User`] record and its two fungible balances
//! (reputation-points and stake-token). It deliberately does **not** enforce
//! non-negative balances: every caller runs its sufficiency check before
//! debiting, so validation failures surface before any mutation and the
//! observable error ordering stays stable. The only failure a delta can hit
//! is an unknown user.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agora_common::{Amount, Role, Timestamp};
use agora_storage::StorageError;

pub mod manager;

pub use manager::LedgerManager;

/// Error types for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Unknown user id
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Registration with a username that already exists
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Error with storage
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A registered platform user with its two balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Reputation-points: burned to create proposals, never refunded.
    pub reputation: Amount,
    /// Stake-token: locked or burned for funding, votes, and support.
    pub stake: Amount,
    pub created_at: Timestamp,
}

/// Fixed registration balances, distinct from the admin-mutable system
/// params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub starting_reputation: Amount,
    pub starting_stake: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_reputation: Amount::from(1_000_000),
            starting_stake: Amount::from(10_000),
        }
    }
}

/// The balance-mutation seam consumed by the governance engines.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Register a user with the fixed starting balances. Fails if the
    /// username is taken.
    async fn register_user(&self, username: &str, role: Role) -> LedgerResult<User>;

    /// Fetch a user by id.
    async fn get_user(&self, id: &str) -> LedgerResult<User>;

    /// Look up a user by unique username.
    async fn find_user_by_username(&self, username: &str) -> LedgerResult<Option<User>>;

    /// Apply signed deltas to both balances as one atomic read-modify-write.
    /// Does not reject resulting negative balances; see the crate docs.
    async fn apply_delta(
        &self,
        user_id: &str,
        reputation_delta: Amount,
        stake_delta: Amount,
    ) -> LedgerResult<User>;
}
