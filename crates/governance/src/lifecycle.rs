//! The governance manager and the proposal state machine.
//!
//! All mutating operations serialize on a single write gate, so every
//! check-then-act sequence (status guards, balance checks, funding
//! re-evaluation) observes a stable world. Reads take the in-memory
//! caches directly.

use std::collections::HashMap;
use std::sync::Arc;

use agora_common::{Amount, Role, Timestamp};
use agora_ledger::{Ledger, User};
use agora_params::{GovernanceParams, ParamStore, SystemParam};
use agora_storage::{from_bytes, to_bytes, Storage};
use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{GovernanceError, GovernanceResult};
use crate::funding;
use crate::types::{
    Claim, ContactInfo, FundingStatus, NewProposal, PartnerSupport, Proposal, ProposalKind,
    ProposalStatus, ProposalSummary, Resolution, StakeKind, SupportOutcome, Vote,
};
use crate::GovernanceConfig;

pub(crate) const PROPOSALS_NAMESPACE: &str = "proposals";
pub(crate) const VOTES_NAMESPACE: &str = "votes";
pub(crate) const SUPPORTS_NAMESPACE: &str = "supports";
pub(crate) const CLAIMS_NAMESPACE: &str = "claims";

/// Coordinates proposals, votes, partner supports and claims on top of a
/// storage backend and the stake/reputation ledger.
pub struct GovernanceManager {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) ledger: Arc<dyn Ledger>,
    pub(crate) params: Arc<ParamStore>,
    pub(crate) config: GovernanceConfig,
    pub(crate) proposals: RwLock<HashMap<String, Proposal>>,
    /// Votes per proposal, in cast order.
    pub(crate) votes: RwLock<HashMap<String, Vec<Vote>>>,
    /// Partner supports per proposal, in first-contribution order.
    pub(crate) supports: RwLock<HashMap<String, Vec<PartnerSupport>>>,
    /// Claims per proposal.
    pub(crate) claims: RwLock<HashMap<String, Vec<Claim>>>,
    /// Serializes every mutating operation end to end.
    pub(crate) write_gate: Mutex<()>,
}

impl GovernanceManager {
    /// Create a manager and load all governance state from storage.
    pub async fn new(
        storage: Arc<dyn Storage>,
        ledger: Arc<dyn Ledger>,
        params: Arc<ParamStore>,
        config: GovernanceConfig,
    ) -> GovernanceResult<Self> {
        let manager = Self {
            storage,
            ledger,
            params,
            config,
            proposals: RwLock::new(HashMap::new()),
            votes: RwLock::new(HashMap::new()),
            supports: RwLock::new(HashMap::new()),
            claims: RwLock::new(HashMap::new()),
            write_gate: Mutex::new(()),
        };
        manager.load_state().await?;
        Ok(manager)
    }

    async fn load_state(&self) -> GovernanceResult<()> {
        {
            let mut proposals = self.proposals.write().await;
            for key in self.storage.list_keys(PROPOSALS_NAMESPACE).await? {
                let bytes = self.storage.get(PROPOSALS_NAMESPACE, &key).await?;
                let proposal: Proposal = from_bytes(&bytes)?;
                proposals.insert(proposal.id.clone(), proposal);
            }
            debug!(count = proposals.len(), "loaded proposals");
        }
        {
            let mut votes = self.votes.write().await;
            for key in self.storage.list_keys(VOTES_NAMESPACE).await? {
                let bytes = self.storage.get(VOTES_NAMESPACE, &key).await?;
                let vote: Vote = from_bytes(&bytes)?;
                votes.entry(vote.proposal_id.clone()).or_default().push(vote);
            }
            for list in votes.values_mut() {
                list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
            debug!(proposals = votes.len(), "loaded votes");
        }
        {
            let mut supports = self.supports.write().await;
            for key in self.storage.list_keys(SUPPORTS_NAMESPACE).await? {
                let bytes = self.storage.get(SUPPORTS_NAMESPACE, &key).await?;
                let support: PartnerSupport = from_bytes(&bytes)?;
                supports
                    .entry(support.proposal_id.clone())
                    .or_default()
                    .push(support);
            }
            for list in supports.values_mut() {
                list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
            debug!(proposals = supports.len(), "loaded partner supports");
        }
        {
            let mut claims = self.claims.write().await;
            for key in self.storage.list_keys(CLAIMS_NAMESPACE).await? {
                let bytes = self.storage.get(CLAIMS_NAMESPACE, &key).await?;
                let claim: Claim = from_bytes(&bytes)?;
                claims.entry(claim.proposal_id.clone()).or_default().push(claim);
            }
            debug!(proposals = claims.len(), "loaded claims");
        }
        Ok(())
    }

    /// Persist a proposal, then replace the cached copy. The cache is only
    /// touched after the write succeeds.
    pub(crate) async fn store_proposal(&self, proposal: Proposal) -> GovernanceResult<Proposal> {
        let bytes = to_bytes(&proposal)?;
        self.storage
            .put(PROPOSALS_NAMESPACE, &proposal.id, &bytes)
            .await?;
        self.proposals
            .write()
            .await
            .insert(proposal.id.clone(), proposal.clone());
        Ok(proposal)
    }

    pub(crate) async fn persist_vote(&self, vote: &Vote) -> GovernanceResult<()> {
        let bytes = to_bytes(vote)?;
        self.storage.put(VOTES_NAMESPACE, &vote.id, &bytes).await?;
        Ok(())
    }

    pub(crate) async fn persist_support(&self, support: &PartnerSupport) -> GovernanceResult<()> {
        let bytes = to_bytes(support)?;
        self.storage
            .put(SUPPORTS_NAMESPACE, &support.id, &bytes)
            .await?;
        Ok(())
    }

    pub(crate) async fn persist_claim(&self, claim: &Claim) -> GovernanceResult<()> {
        let bytes = to_bytes(claim)?;
        self.storage.put(CLAIMS_NAMESPACE, &claim.id, &bytes).await?;
        Ok(())
    }

    pub(crate) async fn proposal_or_err(&self, proposal_id: &str) -> GovernanceResult<Proposal> {
        self.proposals
            .read()
            .await
            .get(proposal_id)
            .cloned()
            .ok_or_else(|| GovernanceError::ProposalNotFound(proposal_id.to_string()))
    }

    async fn require_admin(&self, actor_id: &str) -> GovernanceResult<User> {
        let actor = self.ledger.get_user(actor_id).await?;
        if !actor.role.is_admin() {
            return Err(GovernanceError::NotAdmin);
        }
        Ok(actor)
    }

    pub(crate) async fn supports_snapshot(&self, proposal_id: &str) -> Vec<PartnerSupport> {
        self.supports
            .read()
            .await
            .get(proposal_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Register a platform user. Balances are seeded by the ledger.
    pub async fn register_user(&self, username: &str, role: Role) -> GovernanceResult<User> {
        Ok(self.ledger.register_user(username, role).await?)
    }

    /// Create a proposal in the pending state.
    ///
    /// Burns the reputation cost (admins exempt) and, for funding
    /// proposals, debits the creator's stake. All checks run before any
    /// debit, so a failed creation leaves balances untouched. Funding
    /// fields are stored only for funding proposals; values supplied on
    /// a parameter proposal are discarded.
    pub async fn create_proposal(
        &self,
        actor_id: &str,
        input: NewProposal,
    ) -> GovernanceResult<Proposal> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        let actor = self.ledger.get_user(actor_id).await?;

        if input.contact.is_empty() {
            return Err(GovernanceError::MissingContact);
        }
        let funding_fields = match input.kind {
            ProposalKind::Funding => {
                let (requested, stake, kind) = match (
                    input.requested_amount,
                    input.stake_amount,
                    input.stake_kind,
                ) {
                    (Some(requested), Some(stake), Some(kind)) => (requested, stake, kind),
                    _ => return Err(GovernanceError::MissingFundingFields),
                };
                if !requested.is_positive() || !stake.is_positive() {
                    return Err(GovernanceError::InvalidAmount);
                }
                Some((requested, stake, kind))
            }
            ProposalKind::Parameter => None,
        };

        let burn_cost = if actor.role.is_admin() {
            Amount::zero()
        } else {
            params.reputation_burn_cost
        };
        if actor.reputation < burn_cost {
            return Err(GovernanceError::InsufficientReputation {
                required: burn_cost,
                available: actor.reputation,
            });
        }
        let stake_debit = funding_fields.map_or(Amount::zero(), |(_, stake, _)| stake);
        if actor.stake < stake_debit {
            return Err(GovernanceError::InsufficientStake {
                required: stake_debit,
                available: actor.stake,
            });
        }
        if !(burn_cost.is_zero() && stake_debit.is_zero()) {
            self.ledger
                .apply_delta(&actor.id, -burn_cost, -stake_debit)
                .await?;
        }

        let now = Utc::now();
        let proposal = Proposal {
            id: agora_common::utils::generate_uuid(),
            title: input.title,
            description: input.description,
            kind: input.kind,
            status: ProposalStatus::Pending,
            creator_id: actor.id.clone(),
            contact: input.contact,
            requested_amount: funding_fields.map(|(requested, _, _)| requested),
            stake_amount: funding_fields.map(|(_, stake, _)| stake),
            stake_kind: funding_fields.map(|(_, _, kind)| kind),
            reputation_burned: burn_cost,
            publicized_at: None,
            funding_deadline: None,
            voting_starts_at: None,
            voting_ends_at: None,
            votes_for: Amount::zero(),
            votes_against: Amount::zero(),
            resolution: None,
            resolved_by: None,
            resolution_reason: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        let proposal = self.store_proposal(proposal).await?;
        info!(
            proposal_id = %proposal.id,
            creator = %actor.username,
            kind = ?proposal.kind,
            burned = %burn_cost,
            staked = %stake_debit,
            "proposal created"
        );
        Ok(proposal)
    }

    /// Admin approval: pending -> active, opening the voting window.
    pub async fn approve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        let admin = self.require_admin(actor_id).await?;
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Pending)?;

        begin_voting(&mut proposal, &params, Utc::now());
        let proposal = self.store_proposal(proposal).await?;
        info!(
            proposal_id = %proposal.id,
            admin = %admin.username,
            ends_at = ?proposal.voting_ends_at,
            "proposal approved, voting opened"
        );
        Ok(proposal)
    }

    /// Admin rejection of a pending proposal. The creator's stake (if any)
    /// is returned immediately; no claim is created and the burned
    /// reputation stays burned.
    pub async fn reject_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        reason: Option<&str>,
    ) -> GovernanceResult<Proposal> {
        let _gate = self.write_gate.lock().await;
        let admin = self.require_admin(actor_id).await?;
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Pending)?;

        let now = Utc::now();
        proposal.status = ProposalStatus::Rejected;
        proposal.resolution = Some(Resolution::AdministrativeReject);
        proposal.resolved_by = Some(admin.id.clone());
        proposal.resolution_reason = reason.map(str::to_string);
        proposal.resolved_at = Some(now);
        proposal.updated_at = now;
        let proposal = self.store_proposal(proposal).await?;

        if let Some((_, stake, _)) = proposal.funding_fields() {
            self.direct_refund(&proposal.creator_id, stake, "administrative reject")
                .await?;
        }
        info!(
            proposal_id = %proposal.id,
            admin = %admin.username,
            reason = ?proposal.resolution_reason,
            "proposal rejected"
        );
        Ok(proposal)
    }

    /// Admin publication: pending -> publicized, opening the partner
    /// funding window. Only funding proposals whose base funding falls
    /// short of the request qualify.
    pub async fn publicize_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        let admin = self.require_admin(actor_id).await?;
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Pending)?;
        let (requested, stake, kind) = proposal
            .funding_fields()
            .ok_or(GovernanceError::NotFunding)?;
        if funding::base_funding(stake, kind, &params) >= requested {
            return Err(GovernanceError::AlreadyFunded);
        }

        let now = Utc::now();
        proposal.status = ProposalStatus::Publicized;
        proposal.publicized_at = Some(now);
        proposal.funding_deadline = Some(now + Duration::days(self.config.funding_window_days));
        proposal.updated_at = now;
        let proposal = self.store_proposal(proposal).await?;
        info!(
            proposal_id = %proposal.id,
            admin = %admin.username,
            deadline = ?proposal.funding_deadline,
            "proposal publicized for partner funding"
        );
        Ok(proposal)
    }

    /// Contribute partner stake to a publicized proposal. The stake is
    /// debited immediately; repeated support accumulates into the
    /// partner's existing record. Crossing the funding target activates
    /// the proposal in the same operation.
    pub async fn support_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
        amount: Amount,
        action_kind: StakeKind,
        contact: ContactInfo,
    ) -> GovernanceResult<SupportOutcome> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        let actor = self.ledger.get_user(actor_id).await?;
        if !actor.role.can_support() {
            return Err(GovernanceError::PartnerRoleRequired);
        }
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Publicized)?;
        let (requested, stake, kind) = proposal
            .funding_fields()
            .ok_or(GovernanceError::NotFunding)?;
        if proposal.creator_id == actor.id {
            return Err(GovernanceError::SelfSupport);
        }
        if !amount.is_positive() {
            return Err(GovernanceError::InvalidAmount);
        }
        if funding::base_funding(stake, kind, &params) >= requested {
            return Err(GovernanceError::AlreadyFunded);
        }

        let existing = {
            let supports = self.supports.read().await;
            supports
                .get(proposal_id)
                .and_then(|list| list.iter().find(|s| s.partner_id == actor.id).cloned())
        };
        // Kind mismatch is checked before the debit so a failed support
        // leaves balances untouched.
        if let Some(record) = &existing {
            if record.action_kind != action_kind {
                return Err(GovernanceError::SupportKindMismatch);
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

        let support = match existing {
            Some(mut record) => {
                record.amount += amount;
                record
            }
            None => PartnerSupport::new(proposal_id, &actor.id, amount, action_kind, contact),
        };
        self.persist_support(&support).await?;
        {
            let mut supports = self.supports.write().await;
            let list = supports.entry(proposal_id.to_string()).or_default();
            match list.iter_mut().find(|s| s.id == support.id) {
                Some(entry) => *entry = support.clone(),
                None => list.push(support.clone()),
            }
        }

        let all_supports = self.supports_snapshot(proposal_id).await;
        let effective = funding::effective_funding(stake, kind, &all_supports, &params);
        let now = Utc::now();
        let mut activated = false;
        if effective >= requested {
            begin_voting(&mut proposal, &params, now);
            activated = true;
        } else {
            proposal.updated_at = now;
        }
        let proposal = self.store_proposal(proposal).await?;
        if activated {
            info!(
                proposal_id = %proposal.id,
                partner = %actor.username,
                %effective,
                "funding target reached, voting opened"
            );
        } else {
            info!(
                proposal_id = %proposal.id,
                partner = %actor.username,
                %amount,
                %effective,
                "partner support recorded"
            );
        }
        Ok(SupportOutcome {
            support,
            proposal_status: proposal.status,
            activated,
        })
    }

    /// Admin resolution of an active proposal after its voting window has
    /// closed. Strictly more power in favor passes; ties fail.
    pub async fn resolve_proposal(
        &self,
        actor_id: &str,
        proposal_id: &str,
    ) -> GovernanceResult<Proposal> {
        let _gate = self.write_gate.lock().await;
        let admin = self.require_admin(actor_id).await?;
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        require_status(&proposal, ProposalStatus::Active)?;

        let now = Utc::now();
        if let Some(ends_at) = proposal.voting_ends_at {
            if now < ends_at {
                return Err(GovernanceError::VotingNotEnded { ends_at });
            }
        }
        let passed = proposal.votes_for > proposal.votes_against;
        proposal.status = if passed {
            ProposalStatus::Passed
        } else {
            ProposalStatus::Rejected
        };
        proposal.resolution = Some(if passed {
            Resolution::VotePassed
        } else {
            Resolution::VoteFailed
        });
        proposal.resolved_by = Some(admin.id.clone());
        proposal.resolved_at = Some(now);
        proposal.updated_at = now;
        let proposal = self.store_proposal(proposal).await?;
        info!(
            proposal_id = %proposal.id,
            admin = %admin.username,
            votes_for = %proposal.votes_for,
            votes_against = %proposal.votes_against,
            resolution = ?proposal.resolution,
            "proposal resolved"
        );
        Ok(proposal)
    }

    /// Settle one proposal's funding deadline if it has passed.
    ///
    /// Idempotent: anything other than an overdue publicized proposal is
    /// left untouched and reported as `None`. Returns the status the
    /// proposal transitioned to otherwise.
    pub async fn sweep(&self, proposal_id: &str) -> GovernanceResult<Option<ProposalStatus>> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        self.sweep_one(proposal_id, &params, Utc::now()).await
    }

    /// Settle every overdue publicized proposal. Returns how many
    /// proposals transitioned. Listings call this before reporting, and a
    /// scheduler can call it directly.
    pub async fn sweep_expired(&self) -> GovernanceResult<usize> {
        let _gate = self.write_gate.lock().await;
        let params = self.params.snapshot().await;
        let now = Utc::now();
        let due: Vec<String> = {
            let proposals = self.proposals.read().await;
            proposals
                .values()
                .filter(|p| {
                    p.status == ProposalStatus::Publicized
                        && p.funding_deadline.map_or(false, |d| d <= now)
                })
                .map(|p| p.id.clone())
                .collect()
        };
        let mut transitioned = 0;
        for id in due {
            if self.sweep_one(&id, &params, now).await?.is_some() {
                transitioned += 1;
            }
        }
        if transitioned > 0 {
            debug!(count = transitioned, "settled overdue funding deadlines");
        }
        Ok(transitioned)
    }

    /// Deadline settlement body. Callers hold the write gate.
    async fn sweep_one(
        &self,
        proposal_id: &str,
        params: &GovernanceParams,
        now: Timestamp,
    ) -> GovernanceResult<Option<ProposalStatus>> {
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        if proposal.status != ProposalStatus::Publicized {
            return Ok(None);
        }
        let deadline = match proposal.funding_deadline {
            Some(deadline) => deadline,
            None => return Ok(None),
        };
        if now < deadline {
            return Ok(None);
        }
        let (requested, stake, kind) = match proposal.funding_fields() {
            Some(fields) => fields,
            None => return Ok(None),
        };

        let supports = self.supports_snapshot(proposal_id).await;
        let effective = funding::effective_funding(stake, kind, &supports, params);
        if effective >= requested {
            begin_voting(&mut proposal, params, now);
            let proposal = self.store_proposal(proposal).await?;
            info!(
                proposal_id = %proposal.id,
                %effective,
                "funding target met at deadline, voting opened"
            );
            Ok(Some(ProposalStatus::Active))
        } else {
            proposal.status = ProposalStatus::Closed;
            proposal.updated_at = now;
            let proposal = self.store_proposal(proposal).await?;
            // The closed status is persisted before refunds run, so a
            // re-entrant sweep finds nothing to do.
            self.refund_support_stakes(&proposal.id).await?;
            self.direct_refund(&proposal.creator_id, stake, "funding deadline expired")
                .await?;
            warn!(
                proposal_id = %proposal.id,
                %effective,
                %requested,
                "funding deadline expired short of target, proposal closed"
            );
            Ok(Some(ProposalStatus::Closed))
        }
    }

    /// Return every unprocessed partner stake on a closing proposal.
    async fn refund_support_stakes(&self, proposal_id: &str) -> GovernanceResult<()> {
        let pending: Vec<PartnerSupport> = {
            let supports = self.supports.read().await;
            supports
                .get(proposal_id)
                .map(|list| list.iter().filter(|s| !s.processed).cloned().collect())
                .unwrap_or_default()
        };
        for mut support in pending {
            self.direct_refund(&support.partner_id, support.amount, "proposal closed unfunded")
                .await?;
            support.processed = true;
            self.persist_support(&support).await?;
            let mut supports = self.supports.write().await;
            if let Some(entry) = supports
                .get_mut(proposal_id)
                .and_then(|list| list.iter_mut().find(|s| s.id == support.id))
            {
                *entry = support.clone();
            }
        }
        Ok(())
    }

    /// Fetch a proposal by id.
    pub async fn get_proposal(&self, proposal_id: &str) -> GovernanceResult<Proposal> {
        self.proposal_or_err(proposal_id).await
    }

    /// All proposals with their funding progress, newest first. Overdue
    /// funding deadlines are settled before the listing is built.
    pub async fn list_proposals(&self) -> GovernanceResult<Vec<ProposalSummary>> {
        self.sweep_expired().await?;
        let params = self.params.snapshot().await;
        let proposals: Vec<Proposal> = self.proposals.read().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let funding = self.funding_for(&proposal, &params).await;
            summaries.push(ProposalSummary { proposal, funding });
        }
        summaries.sort_by(|a, b| b.proposal.created_at.cmp(&a.proposal.created_at));
        Ok(summaries)
    }

    /// Proposals awaiting admin review, oldest first.
    pub async fn pending_proposals(&self) -> Vec<Proposal> {
        let proposals = self.proposals.read().await;
        let mut pending: Vec<Proposal> = proposals
            .values()
            .filter(|p| p.status == ProposalStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        pending
    }

    /// Funding progress for one proposal. `None` for parameter proposals.
    pub async fn funding_status(
        &self,
        proposal_id: &str,
    ) -> GovernanceResult<Option<FundingStatus>> {
        let proposal = self.proposal_or_err(proposal_id).await?;
        let params = self.params.snapshot().await;
        Ok(self.funding_for(&proposal, &params).await)
    }

    async fn funding_for(
        &self,
        proposal: &Proposal,
        params: &GovernanceParams,
    ) -> Option<FundingStatus> {
        let (requested, stake, kind) = proposal.funding_fields()?;
        let supports = self.supports_snapshot(&proposal.id).await;
        Some(funding::funding_status(
            requested, stake, kind, &supports, params,
        ))
    }

    /// Set a system parameter. Admin only; values are stored as strings
    /// and parsed by consumers.
    pub async fn set_param(
        &self,
        actor_id: &str,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> GovernanceResult<SystemParam> {
        let _gate = self.write_gate.lock().await;
        let admin = self.require_admin(actor_id).await?;
        let param = self.params.set(key, value, description).await?;
        info!(admin = %admin.username, key = %param.key, value = %param.value, "parameter updated");
        Ok(param)
    }

    /// Effective value of a parameter: the stored override, or the
    /// built-in default for recognized keys.
    pub async fn get_param(&self, key: &str) -> Option<String> {
        self.params.get_value(key).await
    }

    /// All parameters, stored overrides overlaid on the defaults.
    pub async fn list_params(&self) -> Vec<SystemParam> {
        self.params.list().await
    }

    /// Overwrite a proposal's funding deadline. Test backdating hook.
    #[doc(hidden)]
    pub async fn test_set_funding_deadline(
        &self,
        proposal_id: &str,
        deadline: Timestamp,
    ) -> GovernanceResult<()> {
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        proposal.funding_deadline = Some(deadline);
        self.store_proposal(proposal).await?;
        Ok(())
    }

    /// Overwrite a proposal's voting close. Test backdating hook.
    #[doc(hidden)]
    pub async fn test_set_voting_ends_at(
        &self,
        proposal_id: &str,
        ends_at: Timestamp,
    ) -> GovernanceResult<()> {
        let mut proposal = self.proposal_or_err(proposal_id).await?;
        proposal.voting_ends_at = Some(ends_at);
        self.store_proposal(proposal).await?;
        Ok(())
    }
}

pub(crate) fn require_status(proposal: &Proposal, expected: ProposalStatus) -> GovernanceResult<()> {
    if proposal.status == expected {
        Ok(())
    } else {
        Err(GovernanceError::InvalidStatus {
            expected,
            found: proposal.status,
        })
    }
}

/// Flip a proposal into the active state and open its voting window.
fn begin_voting(proposal: &mut Proposal, params: &GovernanceParams, now: Timestamp) {
    proposal.status = ProposalStatus::Active;
    proposal.voting_starts_at = Some(now);
    proposal.voting_ends_at = Some(now + Duration::days(params.voting_duration_days));
    proposal.updated_at = now;
}
