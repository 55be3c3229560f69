//! System parameter store for the Agora platform.
//!
//! Admin-tunable key-value configuration (burn cost, funding multipliers,
//! durations) with hardcoded defaults. Engines never read keys ad hoc:
//! every request loads one [`GovernanceParams`] snapshot up front so a
//! single operation cannot observe two different values of a parameter.
//! Missing keys resolve to the defaults, and so do malformed values -- a
//! bad admin write degrades reads, never breaks them.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use agora_common::{Amount, Timestamp};
use agora_storage::{from_bytes, to_bytes, Storage, StorageError};

const PARAMS_NAMESPACE: &str = "params";

/// Recognized parameter keys.
pub const KEY_REPUTATION_BURN_COST: &str = "reputationBurnCost";
pub const KEY_LOCK_MULTIPLIER: &str = "lockMultiplier";
pub const KEY_BURN_MULTIPLIER: &str = "burnMultiplier";
pub const KEY_VOTING_DURATION_DAYS: &str = "votingDurationDays";
pub const KEY_LOCK_DURATION_MONTHS: &str = "lockDurationMonths";

/// Errors from parameter operations
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for parameter operations
pub type ParamResult<T> = Result<T, ParamError>;

/// A stored system parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemParam {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub updated_at: Timestamp,
}

/// Per-request snapshot of the recognized parameters.
///
/// `lock_duration_months` has no consumer in the core engines; it is kept
/// for operator dashboards.
#[derive(Debug, Clone, PartialEq)]
pub struct GovernanceParams {
    /// Reputation burned on proposal creation (admins exempt).
    pub reputation_burn_cost: Amount,
    /// Funding multiplier for locked stakes.
    pub lock_multiplier: Decimal,
    /// Funding multiplier for burned stakes.
    pub burn_multiplier: Decimal,
    /// Length of the voting window opened on activation.
    pub voting_duration_days: i64,
    pub lock_duration_months: u32,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            reputation_burn_cost: Amount::from(110_000),
            lock_multiplier: Decimal::from(10),
            burn_multiplier: Decimal::from(50),
            voting_duration_days: 14,
            lock_duration_months: 12,
        }
    }
}

/// Built-in default value and description for a recognized key.
fn default_for(key: &str) -> Option<(&'static str, &'static str)> {
    match key {
        KEY_REPUTATION_BURN_COST => {
            Some(("110000", "Reputation cost to create a proposal"))
        }
        KEY_LOCK_MULTIPLIER => Some(("10", "Funding multiplier for locked stake")),
        KEY_BURN_MULTIPLIER => Some(("50", "Funding multiplier for burned stake")),
        KEY_VOTING_DURATION_DAYS => Some(("14", "Voting period length in days")),
        KEY_LOCK_DURATION_MONTHS => Some(("12", "Stake lock duration in months")),
        _ => None,
    }
}

fn parse_or<T: FromStr>(stored: Option<&SystemParam>, key: &str, default: T) -> T {
    match stored {
        Some(param) => match param.value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %param.value, "malformed param value, using default");
                default
            }
        },
        None => default,
    }
}

/// Storage-backed parameter store with an in-memory cache.
pub struct ParamStore {
    storage: Arc<dyn Storage>,
    params: RwLock<HashMap<String, SystemParam>>,
}

impl ParamStore {
    /// Create a store and load existing params from storage.
    pub async fn new(storage: Arc<dyn Storage>) -> ParamResult<Self> {
        let store = Self {
            storage,
            params: RwLock::new(HashMap::new()),
        };
        store.load_params().await?;
        Ok(store)
    }

    async fn load_params(&self) -> ParamResult<()> {
        let keys = self.storage.list_keys(PARAMS_NAMESPACE).await?;
        let mut params = self.params.write().await;
        for key in &keys {
            let bytes = self.storage.get(PARAMS_NAMESPACE, key).await?;
            let param: SystemParam = from_bytes(&bytes)?;
            params.insert(param.key.clone(), param);
        }
        debug!(count = params.len(), "loaded system params from storage");
        Ok(())
    }

    /// The stored param for `key`, if any admin ever set it.
    pub async fn get(&self, key: &str) -> Option<SystemParam> {
        let params = self.params.read().await;
        params.get(key).cloned()
    }

    /// The effective value for `key`: stored, else the built-in default for
    /// recognized keys, else `None`.
    pub async fn get_value(&self, key: &str) -> Option<String> {
        if let Some(param) = self.get(key).await {
            return Some(param.value);
        }
        default_for(key).map(|(value, _)| value.to_string())
    }

    /// Upsert a param. Unknown keys are legal but have no built-in consumer.
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> ParamResult<SystemParam> {
        let param = SystemParam {
            key: key.to_string(),
            value: value.to_string(),
            description: description
                .map(str::to_string)
                .or_else(|| default_for(key).map(|(_, d)| d.to_string())),
            updated_at: Utc::now(),
        };

        let bytes = to_bytes(&param)?;
        self.storage.put(PARAMS_NAMESPACE, key, &bytes).await?;

        let mut params = self.params.write().await;
        params.insert(key.to_string(), param.clone());

        info!(key, value, "system param updated");
        Ok(param)
    }

    /// Every recognized param with its stored-or-default value, plus any
    /// unrecognized stored keys.
    pub async fn list(&self) -> Vec<SystemParam> {
        let params = self.params.read().await;
        let mut out = Vec::new();

        for key in [
            KEY_REPUTATION_BURN_COST,
            KEY_LOCK_MULTIPLIER,
            KEY_BURN_MULTIPLIER,
            KEY_VOTING_DURATION_DAYS,
            KEY_LOCK_DURATION_MONTHS,
        ] {
            if let Some(param) = params.get(key) {
                out.push(param.clone());
            } else if let Some((value, description)) = default_for(key) {
                out.push(SystemParam {
                    key: key.to_string(),
                    value: value.to_string(),
                    description: Some(description.to_string()),
                    updated_at: Utc::now(),
                });
            }
        }

        let mut extras: Vec<SystemParam> = params
            .values()
            .filter(|p| default_for(&p.key).is_none())
            .cloned()
            .collect();
        extras.sort_by(|a, b| a.key.cmp(&b.key));
        out.extend(extras);
        out
    }

    /// One consistent snapshot of the recognized params, defaults filling
    /// anything missing or malformed.
    pub async fn snapshot(&self) -> GovernanceParams {
        let params = self.params.read().await;
        let defaults = GovernanceParams::default();
        GovernanceParams {
            reputation_burn_cost: parse_or(
                params.get(KEY_REPUTATION_BURN_COST),
                KEY_REPUTATION_BURN_COST,
                defaults.reputation_burn_cost,
            ),
            lock_multiplier: parse_or(
                params.get(KEY_LOCK_MULTIPLIER),
                KEY_LOCK_MULTIPLIER,
                defaults.lock_multiplier,
            ),
            burn_multiplier: parse_or(
                params.get(KEY_BURN_MULTIPLIER),
                KEY_BURN_MULTIPLIER,
                defaults.burn_multiplier,
            ),
            voting_duration_days: parse_or(
                params.get(KEY_VOTING_DURATION_DAYS),
                KEY_VOTING_DURATION_DAYS,
                defaults.voting_duration_days,
            ),
            lock_duration_months: parse_or(
                params.get(KEY_LOCK_DURATION_MONTHS),
                KEY_LOCK_DURATION_MONTHS,
                defaults.lock_duration_months,
            ),
        }
    }
}
