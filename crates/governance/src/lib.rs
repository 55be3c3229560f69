//! Proposal lifecycle, funding, voting and claims for the Agora platform.
//!
//! Proposals move through a small state machine: `pending` proposals are
//! reviewed by admins, who approve them straight into voting, reject them,
//! or publicize funding proposals so partners can stake toward the
//! requested amount. Stake committed anywhere in the pipeline is debited
//! immediately and returned either through two-phase claims (vote-resolved
//! proposals) or directly (administrative rejection, unfunded closure).
//!
//! Every mutating operation snapshots the system parameters once and runs
//! under a single write gate, so funding arithmetic and status guards are
//! evaluated against a consistent world.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use agora_common::{Amount, Role};
use agora_ledger::User;
use agora_params::SystemParam;

pub mod claims;
pub mod error;
pub mod funding;
pub mod lifecycle;
pub mod types;
pub mod voting;

pub use error::{GovernanceError, GovernanceResult};
pub use lifecycle::GovernanceManager;
pub use types::{
    Claim, ClaimStatus, ContactInfo, FundingStatus, NewProposal, ParticipationRole,
    PartnerSupport, Proposal, ProposalKind, ProposalStatus, ProposalSummary, Resolution,
    StakeKind, SupportOutcome, Vote, VoteLockKind,
};

/// Static timing knobs for the governance engine. These are structural
/// constants, distinct from the admin-tunable system parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Days partners get to fund a publicized proposal.
    pub funding_window_days: i64,
    /// Days between applying for a claim and being able to execute it.
    pub claim_maturity_days: i64,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            funding_window_days: 14,
            claim_maturity_days: 3,
        }
    }
}

/// Interface for the governance service
#[async_trait]
pub trait Governance: Send + Sync {
    /// Register a platform user with seeded balances
    async fn register_user(&self, username: &str, role: Role) -> GovernanceResult<User>;

    /// Create a new proposal in the pending state
    async fn create_proposal(
        &self,
        actor_id: &str,
        input: NewProposal,
    ) -> GovernanceResult<Proposal>;

    /// Get a proposal by id
    async fn get_proposal(&self, proposal_id: &str) -> GovernanceResult<Proposal>;

    /// List all proposals with their funding progress, newest first
    async fn list_proposals(&self) -> GovernanceResult<Vec<ProposalSummary>>;

    /// List proposals awaiting admin review, oldest first
    async fn pending_proposals(&self) -> GovernanceResult<Vec<Proposal>>;

    /// Approve a pending proposal, opening its voting window
    async fn approve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal>;

    /// Reject a pending proposal, returning any creator stake immediately
    async fn reject_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        reason: Option<&str>,
    ) -> GovernanceResult<Proposal>;

    /// Publicize a pending funding proposal for partner funding
    async fn publicize_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal>;

    /// Contribute partner stake toward a publicized proposal
    async fn support_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        amount: Amount,
        action_kind: StakeKind,
        contact: ContactInfo,
    ) -> GovernanceResult<SupportOutcome>;

    /// Funding progress of a proposal; `None` for parameter proposals
    async fn funding_status(&self, proposal_id: &str) -> GovernanceResult<Option<FundingStatus>>;

    /// Cast a weighted vote on an active proposal
    async fn cast_vote(
        &self,
        actor_id: &str,
        proposal_id: &str,
        support: bool,
        amount: Amount,
        lock_kind: VoteLockKind,
    ) -> GovernanceResult<Vote>;

    /// Get the votes cast on a proposal
    async fn votes_for_proposal(&self, proposal_id: &str) -> GovernanceResult<Vec<Vote>>;

    /// Get the partner supports recorded for a proposal
    async fn supports_for_proposal(
        &self,
        proposal_id: &str,
    ) -> GovernanceResult<Vec<PartnerSupport>>;

    /// Get every support a partner has outstanding, across proposals
    async fn supports_by_partner(
        &self,
        partner_id: &str,
    ) -> GovernanceResult<Vec<PartnerSupport>>;

    /// Resolve an active proposal after its voting window has closed
    async fn resolve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal>;

    /// Settle one proposal's funding deadline if it has passed
    async fn sweep(&self, proposal_id: &str) -> GovernanceResult<Option<ProposalStatus>>;

    /// Settle every overdue funding deadline
    async fn sweep_expired(&self) -> GovernanceResult<usize>;

    /// Apply for a stake-return claim on a vote-resolved proposal
    async fn apply_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim>;

    /// Execute a matured claim, returning the stake
    async fn execute_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim>;

    /// Get every claim a user holds
    async fn claims_for_user(&self, user_id: &str) -> GovernanceResult<Vec<Claim>>;

    /// Set a system parameter (admin only)
    async fn set_param(
        &self,
        actor_id: &str,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> GovernanceResult<SystemParam>;

    /// Effective value of a system parameter
    async fn get_param(&self, key: &str) -> GovernanceResult<Option<String>>;

    /// List all system parameters with overrides applied
    async fn list_params(&self) -> GovernanceResult<Vec<SystemParam>>;
}

#[async_trait]
impl Governance for GovernanceManager {
    async fn register_user(&self, username: &str, role: Role) -> GovernanceResult<User> {
        self.register_user(username, role).await
    }

    async fn create_proposal(
        &self,
        actor_id: &str,
        input: NewProposal,
    ) -> GovernanceResult<Proposal> {
        self.create_proposal(actor_id, input).await
    }

    async fn get_proposal(&self, proposal_id: &str) -> GovernanceResult<Proposal> {
        self.get_proposal(proposal_id).await
    }

    async fn list_proposals(&self) -> GovernanceResult<Vec<ProposalSummary>> {
        self.list_proposals().await
    }

    async fn pending_proposals(&self) -> GovernanceResult<Vec<Proposal>> {
        Ok(self.pending_proposals().await)
    }

    async fn approve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        self.approve_proposal(actor_id, proposal_id).await
    }

    async fn reject_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        reason: Option<&str>,
    ) -> GovernanceResult<Proposal> {
        self.reject_proposal(actor_id, proposal_id, reason).await
    }

    async fn publicize_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        self.publicize_proposal(actor_id, proposal_id).await
    }

    async fn support_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        amount: Amount,
        action_kind: StakeKind,
        contact: ContactInfo,
    ) -> GovernanceResult<SupportOutcome> {
        self.support_proposal(actor_id, proposal_id, amount, action_kind, contact)
            .await
    }

    async fn funding_status(&self, proposal_id: &str) -> GovernanceResult<Option<FundingStatus>> {
        self.funding_status(proposal_id).await
    }

    async fn cast_vote(
        &self,
        actor_id: &str,
        proposal_id: &str,
        support: bool,
        amount: Amount,
        lock_kind: VoteLockKind,
    ) -> GovernanceResult<Vote> {
        self.cast_vote(actor_id, proposal_id, support, amount, lock_kind)
            .await
    }

    async fn votes_for_proposal(&self, proposal_id: &str) -> GovernanceResult<Vec<Vote>> {
        Ok(self.votes_for_proposal(proposal_id).await)
    }

    async fn supports_for_proposal(
        &self,
        proposal_id: &str,
    ) -> GovernanceResult<Vec<PartnerSupport>> {
        Ok(self.supports_for_proposal(proposal_id).await)
    }

    async fn supports_by_partner(
        &self,
        partner_id: &str,
    ) -> GovernanceResult<Vec<PartnerSupport>> {
        Ok(self.supports_by_partner(partner_id).await)
    }

    async fn resolve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        self.resolve_proposal(actor_id, proposal_id).await
    }

    async fn sweep(&self, proposal_id: &str) -> GovernanceResult<Option<ProposalStatus>> {
        self.sweep(proposal_id).await
    }

    async fn sweep_expired(&self) -> GovernanceResult<usize> {
        self.sweep_expired().await
    }

    async fn apply_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim> {
        self.apply_claim(actor_id, proposal_id, role).await
    }

    async fn execute_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim> {
        self.execute_claim(actor_id, proposal_id, role).await
    }

    async fn claims_for_user(&self, user_id: &str) -> GovernanceResult<Vec<Claim>> {
        Ok(self.claims_for_user(user_id).await)
    }

    async fn set_param(
        &self,
        actor_id: &str,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> GovernanceResult<SystemParam> {
        self.set_param(actor_id, key, value, description).await
    }

    async fn get_param(&self, key: &str) -> GovernanceResult<Option<String>> {
        Ok(self.get_param(key).await)
    }

    async fn list_params(&self) -> GovernanceResult<Vec<SystemParam>> {
        Ok(self.list_params().await)
    }
}
