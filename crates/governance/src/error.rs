//! Error types for governance operations.

use agora_common::{Amount, Timestamp};
use agora_ledger::LedgerError;
use agora_params::ParamError;
use agora_storage::StorageError;
use thiserror::Error;

use crate::types::{ParticipationRole, ProposalStatus};

/// Errors produced by governance operations.
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// At least one contact channel must be supplied when creating or
    /// supporting a proposal.
    #[error("at least one contact channel is required")]
    MissingContact,

    /// Funding proposals must carry a requested amount, a stake amount
    /// and a stake kind.
    #[error("funding proposals require requested amount, stake amount and stake kind")]
    MissingFundingFields,

    /// Stake and funding amounts must be strictly positive.
    #[error("amount must be positive")]
    InvalidAmount,

    /// The operation is restricted to admins.
    #[error("admin role required")]
    NotAdmin,

    /// Supporting a proposal requires the partner (or admin) role.
    #[error("partner role required")]
    PartnerRoleRequired,

    /// Creators cannot act as partners on their own proposal.
    #[error("creators cannot support their own proposal")]
    SelfSupport,

    /// A repeated support must use the same stake kind as the existing
    /// record for that partner.
    #[error("existing support for this proposal uses a different stake kind")]
    SupportKindMismatch,

    /// The actor's reputation balance cannot cover the burn cost.
    #[error("insufficient reputation: required {required}, available {available}")]
    InsufficientReputation { required: Amount, available: Amount },

    /// The actor's stake balance cannot cover the debit.
    #[error("insufficient stake: required {required}, available {available}")]
    InsufficientStake { required: Amount, available: Amount },

    /// The proposal is not in the status the operation requires.
    #[error("proposal in wrong status: expected {expected}, found {found}")]
    InvalidStatus {
        expected: ProposalStatus,
        found: ProposalStatus,
    },

    /// The operation only applies to funding proposals.
    #[error("not a funding proposal")]
    NotFunding,

    /// The creator's own stake already covers the requested amount, so
    /// there is nothing for partners to fund.
    #[error("base funding already covers the requested amount")]
    AlreadyFunded,

    /// One vote per voter per proposal.
    #[error("voter has already voted on this proposal")]
    AlreadyVoted,

    /// The voting window is still open; resolution must wait.
    #[error("voting is open until {ends_at}")]
    VotingNotEnded { ends_at: Timestamp },

    /// Claims only exist against proposals resolved by vote.
    #[error("proposal is not resolved by vote")]
    NotResolved,

    /// A claim was already applied for this (proposal, user, role).
    #[error("claim already applied for role {role}")]
    AlreadyApplied { role: ParticipationRole },

    /// No claim has been applied for this (proposal, user, role).
    #[error("no claim applied for role {role}")]
    NoClaim { role: ParticipationRole },

    /// The claim was already executed; stake is returned once.
    #[error("claim already executed")]
    AlreadyClaimed,

    /// The claim has not matured yet.
    #[error("claim matures in {days_remaining} day(s)")]
    NotYetMature { days_remaining: i64 },

    /// The actor has no qualifying participation for the claimed role.
    #[error("no {role} participation in this proposal")]
    NoParticipation { role: ParticipationRole },

    /// No proposal with this id.
    #[error("proposal not found: {0}")]
    ProposalNotFound(String),

    /// No user with this id.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The requested username is already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<LedgerError> for GovernanceError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound(id) => GovernanceError::UserNotFound(id),
            LedgerError::UsernameTaken(name) => GovernanceError::UsernameTaken(name),
            LedgerError::Storage(e) => GovernanceError::Storage(e),
        }
    }
}

impl From<ParamError> for GovernanceError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::Storage(e) => GovernanceError::Storage(e),
        }
    }
}

/// Result type for governance operations.
pub type GovernanceResult<T> = Result<T, GovernanceError>;
