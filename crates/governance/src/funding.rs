//! Funding arithmetic for funding proposals.
//!
//! All arithmetic takes an explicit [`GovernanceParams`] snapshot so that a
//! single operation computes every figure under one consistent set of
//! multipliers, even if an admin changes a parameter mid-flight.

use agora_common::Amount;
use agora_params::GovernanceParams;
use rust_decimal::Decimal;

use crate::types::{FundingStatus, PartnerSupport, StakeKind};

/// Funding multiplier for a stake kind under the given parameters.
pub fn stake_multiplier(kind: StakeKind, params: &GovernanceParams) -> Decimal {
    match kind {
        StakeKind::Lock => params.lock_multiplier,
        StakeKind::Burn => params.burn_multiplier,
    }
}

/// Funding covered by the creator's own stake, before any partner
/// contributions.
pub fn base_funding(stake_amount: Amount, stake_kind: StakeKind, params: &GovernanceParams) -> Amount {
    stake_amount.scale(stake_multiplier(stake_kind, params))
}

/// Base funding plus every partner contribution, each weighted by that
/// partner's own stake-kind multiplier.
pub fn effective_funding(
    stake_amount: Amount,
    stake_kind: StakeKind,
    supports: &[PartnerSupport],
    params: &GovernanceParams,
) -> Amount {
    let mut total = base_funding(stake_amount, stake_kind, params);
    for support in supports {
        total += support.amount.scale(stake_multiplier(support.action_kind, params));
    }
    total
}

/// Funding progress for a funding proposal with the given fields.
pub fn funding_status(
    requested_amount: Amount,
    stake_amount: Amount,
    stake_kind: StakeKind,
    supports: &[PartnerSupport],
    params: &GovernanceParams,
) -> FundingStatus {
    let base = base_funding(stake_amount, stake_kind, params);
    let effective = effective_funding(stake_amount, stake_kind, supports, params);
    let total_contributed = supports
        .iter()
        .fold(Amount::zero(), |acc, s| acc + s.amount);
    FundingStatus {
        requested_amount,
        base_funding: base,
        effective_funding: effective,
        remaining: requested_amount.saturating_sub(effective),
        partner_count: supports.len(),
        total_contributed,
    }
}
