//! Two-phase stake-return claims.
//!
//! Claims return the stake a user committed to a proposal that was
//! resolved by vote: the creator's stake, a voter's locked amount, or a
//! partner's contribution. Applying freezes the amount and starts the
//! maturity clock; executing returns the stake once matured. Burned
//! reputation is never returned, and voting power is never paid out.
//!
//! Administrative rejection and unfunded closure bypass claims entirely:
//! those paths return stake directly at transition time.

use agora_common::{utils::generate_uuid, Amount, Timestamp};
use chrono::Utc;
use tracing::info;

use crate::error::{GovernanceError, GovernanceResult};
use crate::lifecycle::GovernanceManager;
use crate::types::{Claim, ClaimStatus, ParticipationRole, Resolution};

impl GovernanceManager {
    /// Apply for a stake-return claim on a vote-resolved proposal.
    ///
    /// The claimable amount is fixed at application time: the creator's
    /// stake, the voter's vote amount, or the partner's accumulated
    /// contribution. One claim per (proposal, user, role).
    pub async fn apply_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim> {
        let _gate = self.write_gate.lock().await;
        let actor = self.ledger.get_user(actor_id).await?;
        let proposal = self.proposal_or_err(proposal_id).await?;
        match proposal.resolution {
            Some(Resolution::VotePassed) | Some(Resolution::VoteFailed) => {}
            _ => return Err(GovernanceError::NotResolved),
        }
        if self.find_claim(proposal_id, &actor.id, role).await.is_some() {
            return Err(GovernanceError::AlreadyApplied { role });
        }

        let claimable = match role {
            ParticipationRole::Creator => {
                if proposal.creator_id != actor.id {
                    return Err(GovernanceError::NoParticipation { role });
                }
                // Only a funding proposal carries creator stake.
                match proposal.funding_fields() {
                    Some((_, stake, _)) => stake,
                    None => return Err(GovernanceError::NoParticipation { role }),
                }
            }
            ParticipationRole::Voter => {
                let votes = self.votes.read().await;
                match votes
                    .get(proposal_id)
                    .and_then(|list| list.iter().find(|v| v.voter_id == actor.id))
                {
                    Some(vote) => vote.amount,
                    None => return Err(GovernanceError::NoParticipation { role }),
                }
            }
            ParticipationRole::Partner => {
                let supports = self.supports.read().await;
                match supports
                    .get(proposal_id)
                    .and_then(|list| list.iter().find(|s| s.partner_id == actor.id))
                {
                    Some(support) => support.amount,
                    None => return Err(GovernanceError::NoParticipation { role }),
                }
            }
        };

        let now = Utc::now();
        let claim = Claim {
            id: generate_uuid(),
            proposal_id: proposal_id.to_string(),
            user_id: actor.id.clone(),
            role,
            claimable_amount: claimable,
            status: ClaimStatus::Applied,
            applied_at: now,
            claimable_at: now + chrono::Duration::days(self.config.claim_maturity_days),
            claimed_at: None,
        };
        self.persist_claim(&claim).await?;
        self.claims
            .write()
            .await
            .entry(proposal_id.to_string())
            .or_default()
            .push(claim.clone());
        info!(
            proposal_id = %claim.proposal_id,
            user = %actor.username,
            role = %claim.role,
            amount = %claim.claimable_amount,
            matures_at = %claim.claimable_at,
            "claim applied"
        );
        Ok(claim)
    }

    /// Execute a matured claim, returning the frozen stake amount.
    pub async fn execute_claim(
        &self,
        actor_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
    ) -> GovernanceResult<Claim> {
        let _gate = self.write_gate.lock().await;
        let actor = self.ledger.get_user(actor_id).await?;
        self.proposal_or_err(proposal_id).await?;
        let mut claim = match self.find_claim(proposal_id, &actor.id, role).await {
            Some(claim) => claim,
            None => return Err(GovernanceError::NoClaim { role }),
        };
        if claim.status == ClaimStatus::Claimed {
            return Err(GovernanceError::AlreadyClaimed);
        }
        let now = Utc::now();
        if now < claim.claimable_at {
            let seconds = (claim.claimable_at - now).num_seconds();
            let days_remaining = (seconds + 86_399) / 86_400;
            return Err(GovernanceError::NotYetMature { days_remaining });
        }

        self.ledger
            .apply_delta(&claim.user_id, Amount::zero(), claim.claimable_amount)
            .await?;
        claim.status = ClaimStatus::Claimed;
        claim.claimed_at = Some(now);
        self.persist_claim(&claim).await?;
        {
            let mut claims = self.claims.write().await;
            if let Some(entry) = claims
                .get_mut(proposal_id)
                .and_then(|list| list.iter_mut().find(|c| c.id == claim.id))
            {
                *entry = claim.clone();
            }
        }
        match role {
            ParticipationRole::Voter => self.mark_vote_processed(proposal_id, &actor.id).await?,
            ParticipationRole::Partner => {
                self.mark_support_processed(proposal_id, &actor.id).await?
            }
            ParticipationRole::Creator => {}
        }
        info!(
            proposal_id = %claim.proposal_id,
            user = %actor.username,
            role = %claim.role,
            amount = %claim.claimable_amount,
            "claim executed, stake returned"
        );
        Ok(claim)
    }

    /// Claims recorded against a proposal.
    pub async fn claims_for_proposal(&self, proposal_id: &str) -> Vec<Claim> {
        self.claims
            .read()
            .await
            .get(proposal_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every claim a user holds, across proposals, oldest first.
    pub async fn claims_for_user(&self, user_id: &str) -> Vec<Claim> {
        let claims = self.claims.read().await;
        let mut records: Vec<Claim> = claims
            .values()
            .flat_map(|list| list.iter().filter(|c| c.user_id == user_id).cloned())
            .collect();
        records.sort_by(|a, b| a.applied_at.cmp(&b.applied_at));
        records
    }

    /// Credit stake straight back to a user, outside the claim flow. Used
    /// by administrative rejection and unfunded closure.
    pub(crate) async fn direct_refund(
        &self,
        user_id: &str,
        amount: Amount,
        context: &str,
    ) -> GovernanceResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ledger
            .apply_delta(user_id, Amount::zero(), amount)
            .await?;
        info!(user_id = %user_id, %amount, context, "stake returned directly");
        Ok(())
    }

    async fn find_claim(
        &self,
        proposal_id: &str,
        user_id: &str,
        role: ParticipationRole,
    ) -> Option<Claim> {
        self.claims.read().await.get(proposal_id).and_then(|list| {
            list.iter()
                .find(|c| c.user_id == user_id && c.role == role)
                .cloned()
        })
    }

    async fn mark_vote_processed(&self, proposal_id: &str, voter_id: &str) -> GovernanceResult<()> {
        let vote = {
            let votes = self.votes.read().await;
            votes
                .get(proposal_id)
                .and_then(|list| list.iter().find(|v| v.voter_id == voter_id).cloned())
        };
        let mut vote = match vote {
            Some(vote) => vote,
            None => return Ok(()),
        };
        vote.processed = true;
        self.persist_vote(&vote).await?;
        let mut votes = self.votes.write().await;
        if let Some(entry) = votes
            .get_mut(proposal_id)
            .and_then(|list| list.iter_mut().find(|v| v.id == vote.id))
        {
            *entry = vote;
        }
        Ok(())
    }

    async fn mark_support_processed(
        &self,
        proposal_id: &str,
        partner_id: &str,
    ) -> GovernanceResult<()> {
        let support = {
            let supports = self.supports.read().await;
            supports
                .get(proposal_id)
                .and_then(|list| list.iter().find(|s| s.partner_id == partner_id).cloned())
        };
        let mut support = match support {
            Some(support) => support,
            None => return Ok(()),
        };
        support.processed = true;
        self.persist_support(&support).await?;
        let mut supports = self.supports.write().await;
        if let Some(entry) = supports
            .get_mut(proposal_id)
            .and_then(|list| list.iter_mut().find(|s| s.id == support.id))
        {
            *entry = support;
        }
        Ok(())
    }

    /// Overwrite a claim's maturity time. Test backdating hook.
    #[doc(hidden)]
    pub async fn test_set_claimable_at(
        &self,
        user_id: &str,
        proposal_id: &str,
        role: ParticipationRole,
        at: Timestamp,
    ) -> GovernanceResult<()> {
        let mut claim = match self.find_claim(proposal_id, user_id, role).await {
            Some(claim) => claim,
            None => return Err(GovernanceError::NoClaim { role }),
        };
        claim.claimable_at = at;
        self.persist_claim(&claim).await?;
        let mut claims = self.claims.write().await;
        if let Some(entry) = claims
            .get_mut(proposal_id)
            .and_then(|list| list.iter_mut().find(|c| c.id == claim.id))
        {
            *entry = claim;
        }
        Ok(())
    }
}
