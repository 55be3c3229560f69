//! End-to-end walk through the governance pipeline, driven entirely
//! through the `Governance` trait object.

use std::sync::Arc;

use agora::core::common::{Amount, Role};
use agora::core::storage::{MemoryStorage, Storage};
use agora::services::governance::{
    ContactInfo, Governance, GovernanceConfig, GovernanceManager, NewProposal, ParticipationRole,
    ProposalKind, ProposalStatus, Resolution, StakeKind, VoteLockKind,
};
use agora::services::ledger::{Ledger, LedgerConfig, LedgerManager};
use agora::services::params::ParamStore;
use chrono::{Duration, Utc};

#[tokio::test]
async fn test_full_governance_pipeline() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let ledger = Arc::new(
        LedgerManager::new(storage.clone(), LedgerConfig::default())
            .await
            .unwrap(),
    );
    let manager = Arc::new(
        GovernanceManager::new(
            storage.clone(),
            ledger.clone(),
            Arc::new(ParamStore::new(storage).await.unwrap()),
            GovernanceConfig::default(),
        )
        .await
        .unwrap(),
    );
    let governance: Arc<dyn Governance> = manager.clone();

    // Register the cast.
    let admin = governance.register_user("root", Role::Admin).await.unwrap();
    let creator = governance
        .register_user("alice", Role::Voter)
        .await
        .unwrap();
    let partner_a = governance
        .register_user("bob", Role::Partner)
        .await
        .unwrap();
    let partner_b = governance
        .register_user("carol", Role::Partner)
        .await
        .unwrap();
    let voter = governance.register_user("vic", Role::Voter).await.unwrap();

    // A burned 500 stake covers a quarter of the 100000 request.
    let proposal = governance
        .create_proposal(
            &creator.id,
            NewProposal {
                title: "Community workshop".to_string(),
                description: "Fund a series of workshops".to_string(),
                kind: ProposalKind::Funding,
                contact: ContactInfo {
                    email: Some("alice@agora.example".to_string()),
                    ..ContactInfo::default()
                },
                requested_amount: Some(Amount::from(100_000)),
                stake_amount: Some(Amount::from(500)),
                stake_kind: Some(StakeKind::Burn),
            },
        )
        .await
        .unwrap();
    assert_eq!(proposal.status, ProposalStatus::Pending);

    // Admin review: publicize for partner funding.
    let proposal = governance
        .publicize_proposal(&admin.id, &proposal.id)
        .await
        .unwrap();
    let status = governance
        .funding_status(&proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.base_funding, Amount::from(25_000));
    assert_eq!(status.remaining, Amount::from(75_000));

    // Partners lock 7500 between them; the second contribution lands
    // exactly on the target and opens voting.
    let outcome = governance
        .support_proposal(
            &partner_a.id,
            &proposal.id,
            Amount::from(5_000),
            StakeKind::Lock,
            ContactInfo {
                telegram: Some("@bob".to_string()),
                ..ContactInfo::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.activated);
    let outcome = governance
        .support_proposal(
            &partner_b.id,
            &proposal.id,
            Amount::from(2_500),
            StakeKind::Lock,
            ContactInfo {
                telegram: Some("@carol".to_string()),
                ..ContactInfo::default()
            },
        )
        .await
        .unwrap();
    assert!(outcome.activated);
    assert_eq!(outcome.proposal_status, ProposalStatus::Active);

    // Weighted voting: 100x1 for, 2x5 against.
    governance
        .cast_vote(
            &voter.id,
            &proposal.id,
            true,
            Amount::from(100),
            VoteLockKind::UntilEnd,
        )
        .await
        .unwrap();
    governance
        .cast_vote(
            &partner_a.id,
            &proposal.id,
            false,
            Amount::from(2),
            VoteLockKind::SixMonths,
        )
        .await
        .unwrap();

    manager
        .test_set_voting_ends_at(&proposal.id, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    let resolved = governance
        .resolve_proposal(&admin.id, &proposal.id)
        .await
        .unwrap();
    assert_eq!(resolved.status, ProposalStatus::Passed);
    assert_eq!(resolved.resolution, Some(Resolution::VotePassed));

    // Everyone reclaims the stake they committed. partner_a holds two
    // roles (funding partner and voter) and claims each separately.
    for (user, role) in [
        (&creator, ParticipationRole::Creator),
        (&partner_a, ParticipationRole::Partner),
        (&partner_a, ParticipationRole::Voter),
        (&partner_b, ParticipationRole::Partner),
        (&voter, ParticipationRole::Voter),
    ] {
        governance
            .apply_claim(&user.id, &proposal.id, role)
            .await
            .unwrap();
        manager
            .test_set_claimable_at(
                &user.id,
                &proposal.id,
                role,
                Utc::now() - Duration::hours(1),
            )
            .await
            .unwrap();
        governance
            .execute_claim(&user.id, &proposal.id, role)
            .await
            .unwrap();
    }

    let creator_after = ledger.get_user(&creator.id).await.unwrap();
    assert_eq!(creator_after.stake, Amount::from(10_000));
    assert_eq!(creator_after.reputation, Amount::from(890_000));
    for id in [&partner_a.id, &partner_b.id, &voter.id] {
        assert_eq!(
            ledger.get_user(id).await.unwrap().stake,
            Amount::from(10_000)
        );
    }

    // The listing reflects the final state.
    let listed = governance.list_proposals().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].proposal.status, ProposalStatus::Passed);
    let funding = listed[0].funding.as_ref().unwrap();
    assert_eq!(funding.effective_funding, Amount::from(100_000));
    assert_eq!(funding.partner_count, 2);
}
