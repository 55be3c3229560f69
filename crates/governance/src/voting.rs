//! Weighted vote casting on active proposals.

use agora_common::Amount;
use chrono::Utc;
use tracing::info;

use crate::error::{GovernanceError, GovernanceResult};
use crate::lifecycle::{require_status, GovernanceManager};
use crate::types::{PartnerSupport, ProposalStatus, Vote, VoteLockKind};

impl GovernanceManager {
    /// Cast a vote on an active proposal.
    ///
    /// The chosen stake is debited up front and the vote counts with
    /// `amount * lock-kind multiplier` of voting power. One vote per
    /// voter per proposal; votes are never changed or withdrawn.
    pub async fn cast_vote(
        &self,
        actor_id: &str,
        proposal_id: &str,
        support: bool,
        amount: Amount,
        lock_kind: VoteLockKind,
    ) -> GovernanceResult<Vote> {
        let _gate = self.write_gate.lock().await;
        let actor = self.ledger.get_user(actor_id).await?;
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Active)?;
        if !amount.is_positive() {
            return Err(GovernanceError::InvalidAmount);
        }
        {
            let votes = self.votes.read().await;
            let already = votes
                .get(proposal_id)
                .map_or(false, |list| list.iter().any(|v| v.voter_id == actor.id));
            if already {
                return Err(GovernanceError::AlreadyVoted);
            }
        }
        if actor.stake < amount {
            return Err(GovernanceError::InsufficientStake {
                required: amount,
                available: actor.stake,
            });
        }
        self.ledger
            .apply_delta(&actor.id, Amount::zero(), -amount)
            .await?;

        let vote = Vote::new(proposal_id, &actor.id, support, amount, lock_kind);
        self.persist_vote(&vote).await?;
        self.votes
            .write()
            .await
            .entry(proposal_id.to_string())
            .or_default()
            .push(vote.clone());

        if vote.support {
            proposal.votes_for += vote.voting_power;
        } else {
            proposal.votes_against += vote.voting_power;
        }
        proposal.updated_at = Utc::now();
        let proposal = self.store_proposal(proposal).await?;
        info!(
            proposal_id = %proposal.id,
            voter = %actor.username,
            support = vote.support,
            power = %vote.voting_power,
            "vote cast"
        );
        Ok(vote)
    }

    /// Votes cast on a proposal, in cast order.
    pub async fn votes_for_proposal(&self, proposal_id: &str) -> Vec<Vote> {
        self.votes
            .read()
            .await
            .get(proposal_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Partner supports recorded for a proposal.
    pub async fn supports_for_proposal(&self, proposal_id: &str) -> Vec<PartnerSupport> {
        self.supports_snapshot(proposal_id).await
    }

    /// Every support a partner has outstanding, across proposals.
    pub async fn supports_by_partner(&self, partner_id: &str) -> Vec<PartnerSupport> {
        let supports = self.supports.read().await;
        let mut records: Vec<PartnerSupport> = supports
            .values()
            .flat_map(|list| list.iter().filter(|s| s.partner_id == partner_id).cloned())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        records
    }
}
