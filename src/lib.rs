//! Agora
//!
//! A governance platform where proposals are backed by committed stake,
//! funded by partners, decided by weighted votes, and settled through
//! stake-return claims.

/// Module version information
pub mod version {
    /// The current version of the Agora library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Re-export foundation components for easy access
pub mod core {
    pub use agora_common as common;
    pub use agora_storage as storage;
}

/// Re-export platform services
pub mod services {
    pub use agora_governance as governance;
    pub use agora_ledger as ledger;
    pub use agora_params as params;
}
