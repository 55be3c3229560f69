//! Storage-backed implementation of the [`Ledger`] trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use agora_common::utils::generate_uuid;
use agora_common::{Amount, Role};
use agora_storage::{from_bytes, to_bytes, Storage};

use crate::{Ledger, LedgerConfig, LedgerError, LedgerResult, User};

const USERS_NAMESPACE: &str = "users";

/// Ledger manager: in-memory user cache with write-through persistence.
pub struct LedgerManager {
    storage: Arc<dyn Storage>,
    config: LedgerConfig,
    users: RwLock<HashMap<String, User>>,
}

impl LedgerManager {
    /// Create a manager and load existing users from storage.
    pub async fn new(storage: Arc<dyn Storage>, config: LedgerConfig) -> LedgerResult<Self> {
        let manager = Self {
            storage,
            config,
            users: RwLock::new(HashMap::new()),
        };
        manager.load_users().await?;
        Ok(manager)
    }

    async fn load_users(&self) -> LedgerResult<()> {
        let keys = self.storage.list_keys(USERS_NAMESPACE).await?;
        let mut users = self.users.write().await;
        for key in &keys {
            let bytes = self.storage.get(USERS_NAMESPACE, key).await?;
            let user: User = from_bytes(&bytes)?;
            users.insert(user.id.clone(), user);
        }
        debug!(count = users.len(), "loaded users from storage");
        Ok(())
    }

    async fn save_user(&self, user: &User) -> LedgerResult<()> {
        let bytes = to_bytes(user)?;
        self.storage.put(USERS_NAMESPACE, &user.id, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl Ledger for LedgerManager {
    async fn register_user(&self, username: &str, role: Role) -> LedgerResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(LedgerError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: generate_uuid(),
            username: username.to_string(),
            role,
            reputation: self.config.starting_reputation,
            stake: self.config.starting_stake,
            created_at: Utc::now(),
        };
        self.save_user(&user).await?;
        users.insert(user.id.clone(), user.clone());

        info!(
            user_id = %user.id,
            username = %user.username,
            role = %user.role,
            "registered user"
        );
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> LedgerResult<User> {
        let users = self.users.read().await;
        users
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::UserNotFound(id.to_string()))
    }

    async fn find_user_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn apply_delta(
        &self,
        user_id: &str,
        reputation_delta: Amount,
        stake_delta: Amount,
    ) -> LedgerResult<User> {
        // The whole read-add-write sits inside one write-lock scope, and the
        // cache is only updated after the persist succeeds.
        let mut users = self.users.write().await;
        let current = users
            .get(user_id)
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;

        let mut updated = current.clone();
        updated.reputation += reputation_delta;
        updated.stake += stake_delta;

        self.save_user(&updated).await?;
        users.insert(updated.id.clone(), updated.clone());

        debug!(
            user_id = %updated.id,
            reputation = %updated.reputation,
            stake = %updated.stake,
            "applied balance delta"
        );
        Ok(updated)
    }
}
