//! Identity-adjacent vocabulary shared across the platform crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamp used for ordering platform events.
pub type Timestamp = DateTime<Utc>;

/// What a registered user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular participant: creates proposals and casts votes.
    Voter,
    /// Co-funding actor: may additionally support publicized proposals.
    Partner,
    /// Operator: approves, rejects, publicizes, resolves, edits params.
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Partners and admins may co-fund proposals.
    pub fn can_support(&self) -> bool {
        matches!(self, Role::Partner | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Voter => write!(f, "voter"),
            Role::Partner => write!(f, "partner"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_capabilities() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Partner.is_admin());
        assert!(Role::Partner.can_support());
        assert!(Role::Admin.can_support());
        assert!(!Role::Voter.can_support());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Partner).unwrap(), "\"partner\"");
        let r: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(r, Role::Admin);
    }
}
