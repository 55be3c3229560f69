//! Tests for partner funding: publication, support, and deadline sweeps.

use std::sync::Arc;

use agora_common::{Amount, Role};
use agora_governance::{
    ContactInfo, GovernanceConfig, GovernanceError, GovernanceManager, NewProposal, Proposal,
    ProposalKind, ProposalStatus, StakeKind,
};
use agora_ledger::{Ledger, LedgerConfig, LedgerManager, User};
use agora_params::ParamStore;
use agora_storage::{MemoryStorage, Storage};
use chrono::{Duration, Utc};

struct TestEnv {
    governance: GovernanceManager,
    ledger: Arc<LedgerManager>,
}

async fn setup() -> TestEnv {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let ledger = Arc::new(
        LedgerManager::new(storage.clone(), LedgerConfig::default())
            .await
            .unwrap(),
    );
    let params = Arc::new(ParamStore::new(storage.clone()).await.unwrap());
    let governance =
        GovernanceManager::new(storage, ledger.clone(), params, GovernanceConfig::default())
            .await
            .unwrap();
    TestEnv { governance, ledger }
}

fn contact() -> ContactInfo {
    ContactInfo {
        email: Some("partners@agora.example".to_string()),
        ..ContactInfo::default()
    }
}

fn funding_input(requested: i64, stake: i64, kind: StakeKind) -> NewProposal {
    NewProposal {
        title: "Fund the project".to_string(),
        description: "A funding request".to_string(),
        kind: ProposalKind::Funding,
        contact: contact(),
        requested_amount: Some(Amount::from(requested)),
        stake_amount: Some(Amount::from(stake)),
        stake_kind: Some(kind),
    }
}

async fn register(env: &TestEnv, username: &str, role: Role) -> User {
    env.governance.register_user(username, role).await.unwrap()
}

async fn stake_of(env: &TestEnv, user_id: &str) -> Amount {
    env.ledger.get_user(user_id).await.unwrap().stake
}

/// Register an admin and a creator, create a funding proposal and
/// publicize it.
async fn publicized(env: &TestEnv, requested: i64, stake: i64, kind: StakeKind) -> (User, Proposal) {
    let admin = register(env, "root", Role::Admin).await;
    let creator = register(env, "alice", Role::Voter).await;
    let proposal = env
        .governance
        .create_proposal(&creator.id, funding_input(requested, stake, kind))
        .await
        .unwrap();
    let proposal = env
        .governance
        .publicize_proposal(&admin.id, &proposal.id)
        .await
        .unwrap();
    (admin, proposal)
}

#[tokio::test]
async fn test_publicize_only_applies_to_underfunded_funding_proposals() {
    let env = setup().await;
    let admin = register(&env, "root", Role::Admin).await;
    let creator = register(&env, "alice", Role::Voter).await;

    // Parameter proposals carry no funding target.
    let parameter = env
        .governance
        .create_proposal(
            &admin.id,
            NewProposal {
                title: "Tune".to_string(),
                description: "Tune".to_string(),
                kind: ProposalKind::Parameter,
                contact: contact(),
                requested_amount: None,
                stake_amount: None,
                stake_kind: None,
            },
        )
        .await
        .unwrap();
    let err = env
        .governance
        .publicize_proposal(&admin.id, &parameter.id)
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NotFunding));

    // A 1000 lock stake covers a 5000 request on its own (x10).
    let covered = env
        .governance
        .create_proposal(&creator.id, funding_input(5_000, 1_000, StakeKind::Lock))
        .await
        .unwrap();
    let err = env
        .governance
        .publicize_proposal(&admin.id, &covered.id)
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::AlreadyFunded));

    let open = env
        .governance
        .create_proposal(&creator.id, funding_input(100_000, 1_000, StakeKind::Lock))
        .await
        .unwrap();
    let open = env
        .governance
        .publicize_proposal(&admin.id, &open.id)
        .await
        .unwrap();
    assert_eq!(open.status, ProposalStatus::Publicized);
    let publicized_at = open.publicized_at.unwrap();
    let deadline = open.funding_deadline.unwrap();
    assert_eq!(deadline - publicized_at, Duration::days(14));
}

#[tokio::test]
async fn test_support_debits_immediately_and_accumulates() {
    let env = setup().await;
    let (_, proposal) = publicized(&env, 100_000, 1_000, StakeKind::Lock).await;
    let partner = register(&env, "bob", Role::Partner).await;

    let outcome = env
        .governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(500),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();
    assert!(!outcome.activated);
    assert_eq!(outcome.proposal_status, ProposalStatus::Publicized);
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(9_500));

    // A second contribution folds into the same record.
    let outcome = env
        .governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(250),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.support.amount, Amount::from(750));
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(9_250));

    let supports = env.governance.supports_for_proposal(&proposal.id).await;
    assert_eq!(supports.len(), 1);
    assert_eq!(supports[0].amount, Amount::from(750));

    let status = env
        .governance
        .funding_status(&proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.base_funding, Amount::from(10_000));
    assert_eq!(status.effective_funding, Amount::from(17_500));
    assert_eq!(status.remaining, Amount::from(82_500));
    assert_eq!(status.partner_count, 1);
    assert_eq!(status.total_contributed, Amount::from(750));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_support_folds_into_one_record() {
    let env = setup().await;
    let (_, proposal) = publicized(&env, 500_000, 1_000, StakeKind::Lock).await;
    let partner = register(&env, "bob", Role::Partner).await;
    let ledger = env.ledger.clone();
    let governance = Arc::new(env.governance);

    // Two racing contributions from the same partner.
    let mut handles = Vec::new();
    for _ in 0..2 {
        let governance = governance.clone();
        let proposal_id = proposal.id.clone();
        let partner_id = partner.id.clone();
        handles.push(tokio::spawn(async move {
            governance
                .support_proposal(
                    &partner_id,
                    &proposal_id,
                    Amount::from(200),
                    StakeKind::Lock,
                    contact(),
                )
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Both land in a single summed record, each debited exactly once.
    let supports = governance.supports_for_proposal(&proposal.id).await;
    assert_eq!(supports.len(), 1);
    assert_eq!(supports[0].amount, Amount::from(400));
    assert_eq!(
        ledger.get_user(&partner.id).await.unwrap().stake,
        Amount::from(9_600)
    );
    let status = governance
        .funding_status(&proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.effective_funding, Amount::from(14_000));
    assert_eq!(status.partner_count, 1);
    assert_eq!(status.total_contributed, Amount::from(400));
}

#[tokio::test]
async fn test_support_guards() {
    let env = setup().await;
    let (_, proposal) = publicized(&env, 100_000, 1_000, StakeKind::Lock).await;
    let partner = register(&env, "bob", Role::Partner).await;
    let voter = register(&env, "carol", Role::Voter).await;

    // Voters cannot act as partners.
    let err = env
        .governance
        .support_proposal(
            &voter.id,
            &proposal.id,
            Amount::from(100),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::PartnerRoleRequired));

    // Zero contributions are rejected.
    let err = env
        .governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::zero(),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidAmount));

    // A partner cannot exceed their stake balance.
    let err = env
        .governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(20_000),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::InsufficientStake { .. }));
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(10_000));

    // An existing lock record cannot be extended with a burn.
    env.governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(100),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();
    let err = env
        .governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(100),
            StakeKind::Burn,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::SupportKindMismatch));
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(9_900));
}

#[tokio::test]
async fn test_creator_cannot_support_own_proposal() {
    let env = setup().await;
    let admin = register(&env, "root", Role::Admin).await;
    let creator = register(&env, "alice", Role::Partner).await;
    let proposal = env
        .governance
        .create_proposal(&creator.id, funding_input(100_000, 1_000, StakeKind::Lock))
        .await
        .unwrap();
    let proposal = env
        .governance
        .publicize_proposal(&admin.id, &proposal.id)
        .await
        .unwrap();

    let err = env
        .governance
        .support_proposal(
            &creator.id,
            &proposal.id,
            Amount::from(100),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceError::SelfSupport));
}

#[tokio::test]
async fn test_burned_stake_with_locked_partners_auto_activates() {
    // A creator burns 500 against a 100000 request: base funding 25000.
    // Partners lock 7500 between them (x10), closing the gap exactly.
    let env = setup().await;
    let (_, proposal) = publicized(&env, 100_000, 500, StakeKind::Burn).await;
    let partner_a = register(&env, "bob", Role::Partner).await;
    let partner_b = register(&env, "carol", Role::Partner).await;

    let status = env
        .governance
        .funding_status(&proposal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.base_funding, Amount::from(25_000));

    let outcome = env
        .governance
        .support_proposal(
            &partner_a.id,
            &proposal.id,
            Amount::from(5_000),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();
    assert!(!outcome.activated);

    let outcome = env
        .governance
        .support_proposal(
            &partner_b.id,
            &proposal.id,
            Amount::from(2_500),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();
    assert!(outcome.activated);
    assert_eq!(outcome.proposal_status, ProposalStatus::Active);

    let proposal = env.governance.get_proposal(&proposal.id).await.unwrap();
    assert_eq!(proposal.status, ProposalStatus::Active);
    assert!(proposal.voting_ends_at.is_some());

    // Activation closes the funding window for further partners.
    let late = register(&env, "dave", Role::Partner).await;
    let err = env
        .governance
        .support_proposal(
            &late.id,
            &proposal.id,
            Amount::from(100),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::InvalidStatus {
            expected: ProposalStatus::Publicized,
            found: ProposalStatus::Active,
        }
    ));
}

#[tokio::test]
async fn test_sweep_closes_unfunded_proposal_and_refunds() {
    let env = setup().await;
    let (_, proposal) = publicized(&env, 100_000, 1_000, StakeKind::Lock).await;
    let partner = register(&env, "bob", Role::Partner).await;
    env.governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(500),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();

    let creator_id = proposal.creator_id.clone();
    assert_eq!(stake_of(&env, &creator_id).await, Amount::from(9_000));
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(9_500));

    // Nothing happens while the deadline is in the future.
    assert_eq!(env.governance.sweep(&proposal.id).await.unwrap(), None);

    env.governance
        .test_set_funding_deadline(&proposal.id, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    let transitioned = env.governance.sweep(&proposal.id).await.unwrap();
    assert_eq!(transitioned, Some(ProposalStatus::Closed));

    // Creator and partner stakes come straight back.
    assert_eq!(stake_of(&env, &creator_id).await, Amount::from(10_000));
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(10_000));
    let supports = env.governance.supports_for_proposal(&proposal.id).await;
    assert!(supports[0].processed);

    // A second sweep is a no-op and refunds nothing twice.
    assert_eq!(env.governance.sweep(&proposal.id).await.unwrap(), None);
    assert_eq!(stake_of(&env, &partner.id).await, Amount::from(10_000));
}

#[tokio::test]
async fn test_sweep_activates_when_target_met_at_deadline() {
    let env = setup().await;
    let (admin, proposal) = publicized(&env, 30_000, 500, StakeKind::Burn).await;
    let partner = register(&env, "bob", Role::Partner).await;

    // 25000 base + 4000 locked leaves the proposal short.
    env.governance
        .support_proposal(
            &partner.id,
            &proposal.id,
            Amount::from(400),
            StakeKind::Lock,
            contact(),
        )
        .await
        .unwrap();

    // Raising the lock multiplier lifts the same stake over the target;
    // the sweep re-evaluates under current parameters.
    env.governance
        .set_param(&admin.id, "lockMultiplier", "20", None)
        .await
        .unwrap();
    env.governance
        .test_set_funding_deadline(&proposal.id, Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let transitioned = env.governance.sweep(&proposal.id).await.unwrap();
    assert_eq!(transitioned, Some(ProposalStatus::Active));
    let proposal = env.governance.get_proposal(&proposal.id).await.unwrap();
    assert!(proposal.voting_ends_at.is_some());
}

#[tokio::test]
async fn test_listing_settles_due_deadlines_first() {
    let env = setup().await;
    let (_, proposal) = publicized(&env, 100_000, 1_000, StakeKind::Lock).await;
    env.governance
        .test_set_funding_deadline(&proposal.id, Utc::now() - Duration::days(2))
        .await
        .unwrap();

    let listed = env.governance.list_proposals().await.unwrap();
    let entry = listed
        .iter()
        .find(|s| s.proposal.id == proposal.id)
        .unwrap();
    assert_eq!(entry.proposal.status, ProposalStatus::Closed);

    let funding = entry.funding.as_ref().unwrap();
    assert_eq!(funding.requested_amount, Amount::from(100_000));
}
