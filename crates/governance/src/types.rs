//! Domain types for proposals, votes, partner supports and claims.

use std::fmt;

use agora_common::{utils::generate_uuid, Amount, Timestamp};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a proposal asks the platform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    /// Requests a stake payout, backed by creator stake and partner support.
    Funding,
    /// Requests a change to platform behavior; carries no funding fields.
    Parameter,
}

/// How a creator or partner commits stake to a funding proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeKind {
    /// Stake is locked and later returned through a claim.
    Lock,
    /// Stake is burned for a higher funding multiplier.
    Burn,
}

impl fmt::Display for StakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeKind::Lock => write!(f, "lock"),
            StakeKind::Burn => write!(f, "burn"),
        }
    }
}

/// Lifecycle states of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Awaiting admin review.
    Pending,
    /// Admin-approved funding proposal collecting partner support.
    Publicized,
    /// Voting is open.
    Active,
    /// Passed the vote.
    Passed,
    /// Failed the vote, or rejected by an admin while pending.
    Rejected,
    /// Funding deadline passed without reaching the requested amount.
    Closed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Publicized => "publicized",
            ProposalStatus::Active => "active",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

/// How a proposal left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Votes for strictly exceeded votes against.
    VotePassed,
    /// Votes for did not exceed votes against.
    VoteFailed,
    /// An admin rejected the proposal before voting.
    AdministrativeReject,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::VotePassed => "vote_passed",
            Resolution::VoteFailed => "vote_failed",
            Resolution::AdministrativeReject => "administrative_reject",
        };
        write!(f, "{}", s)
    }
}

/// Lock commitment attached to a vote. Longer commitments weigh more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteLockKind {
    /// Locked until the voting window closes.
    #[serde(rename = "until_end")]
    UntilEnd,
    /// Locked for six months.
    #[serde(rename = "6_months")]
    SixMonths,
    /// Locked for twelve months.
    #[serde(rename = "12_months")]
    TwelveMonths,
    /// Burned outright for maximum weight.
    #[serde(rename = "burn")]
    Burn,
}

impl VoteLockKind {
    /// Voting-power multiplier for this lock kind. These are fixed by the
    /// platform and are not admin-tunable parameters.
    pub fn multiplier(&self) -> Decimal {
        match self {
            VoteLockKind::UntilEnd => Decimal::from(1),
            VoteLockKind::SixMonths => Decimal::from(5),
            VoteLockKind::TwelveMonths => Decimal::from(10),
            VoteLockKind::Burn => Decimal::from(25),
        }
    }
}

impl fmt::Display for VoteLockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoteLockKind::UntilEnd => "until_end",
            VoteLockKind::SixMonths => "6_months",
            VoteLockKind::TwelveMonths => "12_months",
            VoteLockKind::Burn => "burn",
        };
        write!(f, "{}", s)
    }
}

/// The capacity in which a user participated in a proposal. Claims are
/// keyed by (proposal, user, role), so one user can hold several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationRole {
    /// Staked to create the proposal.
    Creator,
    /// Locked stake behind a vote.
    Voter,
    /// Contributed stake toward the funding target.
    Partner,
}

impl fmt::Display for ParticipationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParticipationRole::Creator => "creator",
            ParticipationRole::Voter => "voter",
            ParticipationRole::Partner => "partner",
        };
        write!(f, "{}", s)
    }
}

/// Where a claim sits in its two-phase flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Applied and waiting out the maturity window.
    Applied,
    /// Executed; the stake has been returned.
    Claimed,
}

/// Contact channels attached to a proposal or partner support. At least
/// one channel must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
}

impl ContactInfo {
    /// True when no channel is filled in.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.telegram.is_none() && self.discord.is_none()
    }
}

/// A governance proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique identifier.
    pub id: String,
    /// Short human-readable title.
    pub title: String,
    /// Full description of what is proposed.
    pub description: String,
    /// Funding or parameter.
    pub kind: ProposalKind,
    /// Current lifecycle state.
    pub status: ProposalStatus,
    /// User who created the proposal.
    pub creator_id: String,
    /// How to reach the creator.
    pub contact: ContactInfo,
    /// Stake payout requested; present iff kind is funding.
    pub requested_amount: Option<Amount>,
    /// Stake the creator committed; present iff kind is funding.
    pub stake_amount: Option<Amount>,
    /// Lock or burn; present iff kind is funding.
    pub stake_kind: Option<StakeKind>,
    /// Reputation burned at creation. Zero for admin creators.
    pub reputation_burned: Amount,
    /// When the proposal entered the publicized state.
    pub publicized_at: Option<Timestamp>,
    /// Deadline for partner funding while publicized.
    pub funding_deadline: Option<Timestamp>,
    /// When voting opened.
    pub voting_starts_at: Option<Timestamp>,
    /// When voting closes; resolution is blocked before this.
    pub voting_ends_at: Option<Timestamp>,
    /// Accumulated voting power in favor.
    pub votes_for: Amount,
    /// Accumulated voting power against.
    pub votes_against: Amount,
    /// How the proposal left the pipeline, once it has.
    pub resolution: Option<Resolution>,
    /// Admin who resolved or rejected the proposal.
    pub resolved_by: Option<String>,
    /// Free-form reason recorded on administrative rejection.
    pub resolution_reason: Option<String>,
    /// When the proposal was resolved.
    pub resolved_at: Option<Timestamp>,
    /// When the proposal was created.
    pub created_at: Timestamp,
    /// Last mutation time.
    pub updated_at: Timestamp,
}

impl Proposal {
    /// The funding triple (requested, stake, kind), present iff this is a
    /// funding proposal with all fields set.
    pub fn funding_fields(&self) -> Option<(Amount, Amount, StakeKind)> {
        match (
            self.kind,
            self.requested_amount,
            self.stake_amount,
            self.stake_kind,
        ) {
            (ProposalKind::Funding, Some(requested), Some(stake), Some(kind)) => {
                Some((requested, stake, kind))
            }
            _ => None,
        }
    }
}

/// Input for creating a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub kind: ProposalKind,
    pub contact: ContactInfo,
    /// Required when kind is funding.
    pub requested_amount: Option<Amount>,
    /// Required when kind is funding.
    pub stake_amount: Option<Amount>,
    /// Required when kind is funding.
    pub stake_kind: Option<StakeKind>,
}

/// A weighted vote on an active proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    /// Unique identifier.
    pub id: String,
    /// Proposal voted on.
    pub proposal_id: String,
    /// User who cast the vote.
    pub voter_id: String,
    /// True for, false against.
    pub support: bool,
    /// Stake debited when the vote was cast. This is what a voter claim
    /// returns.
    pub amount: Amount,
    /// Lock commitment chosen by the voter.
    pub lock_kind: VoteLockKind,
    /// amount multiplied by the lock-kind weight; what the tally counts.
    pub voting_power: Amount,
    /// True once the stake behind this vote has been returned.
    pub processed: bool,
    /// When the vote was cast.
    pub created_at: Timestamp,
}

/// A partner's stake contribution toward a publicized proposal's funding
/// target. One record per (proposal, partner); repeated support
/// accumulates into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSupport {
    /// Unique identifier.
    pub id: String,
    /// Proposal being funded.
    pub proposal_id: String,
    /// Partner contributing the stake.
    pub partner_id: String,
    /// Total stake contributed so far.
    pub amount: Amount,
    /// Lock or burn; weights the contribution in funding arithmetic.
    pub action_kind: StakeKind,
    /// How to reach the partner.
    pub contact: ContactInfo,
    /// True once the stake behind this support has been returned.
    pub processed: bool,
    /// When the partner first supported the proposal.
    pub created_at: Timestamp,
}

/// A two-phase stake-return claim against a vote-resolved proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier.
    pub id: String,
    /// Proposal the claim is against.
    pub proposal_id: String,
    /// User reclaiming stake.
    pub user_id: String,
    /// Capacity the stake was committed in.
    pub role: ParticipationRole,
    /// Stake to return on execution, frozen at application time.
    pub claimable_amount: Amount,
    /// Applied or claimed.
    pub status: ClaimStatus,
    /// When the claim was applied.
    pub applied_at: Timestamp,
    /// When the claim matures and can be executed.
    pub claimable_at: Timestamp,
    /// When the claim was executed.
    pub claimed_at: Option<Timestamp>,
}

/// Result of a support operation: the updated record plus whether the
/// contribution pushed the proposal over its funding target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportOutcome {
    /// The partner's support record after this contribution.
    pub support: PartnerSupport,
    /// Proposal status after the contribution.
    pub proposal_status: ProposalStatus,
    /// True when this contribution activated the proposal.
    pub activated: bool,
}

/// Funding progress of a funding proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundingStatus {
    /// Stake payout the proposal asks for.
    pub requested_amount: Amount,
    /// Creator stake times its stake-kind multiplier.
    pub base_funding: Amount,
    /// Base funding plus weighted partner contributions.
    pub effective_funding: Amount,
    /// Shortfall still to be covered; zero once the target is met.
    pub remaining: Amount,
    /// Number of distinct supporting partners.
    pub partner_count: usize,
    /// Raw (unweighted) partner stake contributed.
    pub total_contributed: Amount,
}

/// A proposal together with its funding progress, as returned by
/// listings. Parameter proposals carry no funding status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub proposal: Proposal,
    pub funding: Option<FundingStatus>,
}

impl Vote {
    pub(crate) fn new(
        proposal_id: &str,
        voter_id: &str,
        support: bool,
        amount: Amount,
        lock_kind: VoteLockKind,
    ) -> Self {
        Vote {
            id: generate_uuid(),
            proposal_id: proposal_id.to_string(),
            voter_id: voter_id.to_string(),
            support,
            amount,
            lock_kind,
            voting_power: amount.scale(lock_kind.multiplier()),
            processed: false,
            created_at: Utc::now(),
        }
    }
}

impl PartnerSupport {
    pub(crate) fn new(
        proposal_id: &str,
        partner_id: &str,
        amount: Amount,
        action_kind: StakeKind,
        contact: ContactInfo,
    ) -> Self {
        PartnerSupport {
            id: generate_uuid(),
            proposal_id: proposal_id.to_string(),
            partner_id: partner_id.to_string(),
            amount,
            action_kind,
            contact,
            processed: false,
            created_at: Utc::now(),
        }
    }
}
