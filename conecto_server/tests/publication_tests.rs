//! Publication engine behavior against a scripted ledger.

mod common;

use common::{LedgerCall, MockLedger};
use conecto_server::publication::{Outcome, PublicationEngine, PublicationError, TierSpec};
use std::sync::Arc;
use tokio::sync::Notify;

const CREATOR: &str = "0x1234567890abcdef1234567890abcdef12345678";

fn base_tier() -> TierSpec {
    TierSpec {
        name: "Base".to_string(),
        price: 9.99,
        description: "Base plan".to_string(),
    }
}

#[tokio::test]
async fn empty_tier_list_short_circuits_with_zero_writes() {
    let ledger = Arc::new(MockLedger::new());
    let engine = PublicationEngine::new(ledger.clone());

    let outcome = engine.publish(CREATOR, "creator", Vec::new()).await.unwrap();

    assert_eq!(outcome, Outcome::NoTiers);
    assert!(ledger.recorded().is_empty());
}

#[tokio::test]
async fn fresh_creator_deploys_and_registers_once_before_minting() {
    let ledger = Arc::new(MockLedger::new());
    let engine = PublicationEngine::new(ledger.clone());

    let outcome = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Published {
            contract: "0xdeployedcontract".to_string(),
            deployed: true,
            resumed: false,
        }
    );

    let calls = ledger.recorded();
    assert_eq!(
        calls,
        vec![
            LedgerCall::Resolve {
                creator: CREATOR.to_string()
            },
            LedgerCall::Deploy {
                slug: "creator".to_string()
            },
            LedgerCall::Register {
                creator: CREATOR.to_string(),
                contract: "0xdeployedcontract".to_string()
            },
            LedgerCall::LazyMint {
                contract: "0xdeployedcontract".to_string(),
                tokens: vec![conecto_server::ledger::TokenDescriptor {
                    name: "Base".to_string(),
                    description: "Base plan".to_string(),
                    image: None,
                }],
            },
            LedgerCall::SetClaimConditions {
                contract: "0xdeployedcontract".to_string(),
                token_id: 0,
                max_claimable_per_wallet: 1,
                price: 9.99,
            },
        ]
    );
}

#[tokio::test]
async fn existing_creator_skips_deploy_and_register() {
    let ledger = Arc::new(MockLedger::with_existing_contract("0xexisting"));
    let engine = PublicationEngine::new(ledger.clone());

    let outcome = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Published {
            contract: "0xexisting".to_string(),
            deployed: false,
            resumed: false,
        }
    );

    let calls = ledger.recorded();
    assert!(!calls
        .iter()
        .any(|call| matches!(call, LedgerCall::Deploy { .. } | LedgerCall::Register { .. })));
    assert!(calls.iter().any(|call| matches!(
        call,
        LedgerCall::LazyMint { contract, .. } if contract == "0xexisting"
    )));
}

#[tokio::test]
async fn tiers_are_priced_in_order_by_token_index() {
    let ledger = Arc::new(MockLedger::with_existing_contract("0xexisting"));
    let engine = PublicationEngine::new(ledger.clone());

    let tiers = vec![
        base_tier(),
        TierSpec {
            name: "Pro".to_string(),
            price: 19.99,
            description: "Pro plan".to_string(),
        },
        TierSpec {
            name: "Patron".to_string(),
            price: 0.0,
            description: "Free tier".to_string(),
        },
    ];
    engine.publish(CREATOR, "creator", tiers).await.unwrap();

    let priced: Vec<(u64, f64)> = ledger
        .recorded()
        .into_iter()
        .filter_map(|call| match call {
            LedgerCall::SetClaimConditions {
                token_id, price, ..
            } => Some((token_id, price)),
            _ => None,
        })
        .collect();

    assert_eq!(priced, vec![(0, 9.99), (1, 19.99), (2, 0.0)]);
}

#[tokio::test]
async fn concurrent_publication_for_one_creator_is_rejected() {
    let ledger = Arc::new(MockLedger::new());
    let gate = Arc::new(Notify::new());
    *ledger.resolve_gate.lock().unwrap() = Some(gate.clone());

    let engine = Arc::new(PublicationEngine::new(ledger.clone()));

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.publish(CREATOR, "creator", vec![base_tier()]).await })
    };

    // let the first request claim its record and park at resolve
    for _ in 0..50 {
        if engine.pending_phase(CREATOR).await.as_deref() == Some("resolve") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    assert_eq!(
        engine.pending_phase(CREATOR).await.as_deref(),
        Some("resolve")
    );

    let second = engine.publish(CREATOR, "creator", vec![base_tier()]).await;
    assert!(matches!(second, Err(PublicationError::InFlight)));

    gate.notify_one();
    *ledger.resolve_gate.lock().unwrap() = None;
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, Outcome::Published { .. }));
}

#[tokio::test]
async fn dropped_request_does_not_wedge_the_creator() {
    let ledger = Arc::new(MockLedger::new());
    let gate = Arc::new(Notify::new());
    *ledger.resolve_gate.lock().unwrap() = Some(gate.clone());

    let engine = Arc::new(PublicationEngine::new(ledger.clone()));

    let request = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.publish(CREATOR, "creator", vec![base_tier()]).await })
    };

    for _ in 0..50 {
        if engine.pending_phase(CREATOR).await.as_deref() == Some("resolve") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    assert_eq!(
        engine.pending_phase(CREATOR).await.as_deref(),
        Some("resolve")
    );

    // client disconnect mid-publish
    request.abort();
    let _ = request.await;

    *ledger.resolve_gate.lock().unwrap() = None;
    gate.notify_one();

    // the detached phase loop finishes without its caller
    for _ in 0..100 {
        if engine.pending_phase(CREATOR).await.is_none() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    assert_eq!(engine.pending_phase(CREATOR).await, None);

    // the creator is not stuck behind the aborted request
    let outcome = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Published { .. }));
}

#[tokio::test]
async fn failed_attempt_resumes_from_recorded_phase() {
    let ledger = Arc::new(MockLedger::new());
    let engine = PublicationEngine::new(ledger.clone());

    ledger.fail_next("lazy_mint");
    let err = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PublicationError::Ledger { phase: "mint", .. }
    ));
    assert_eq!(engine.pending_phase(CREATOR).await.as_deref(), Some("mint"));

    ledger.clear_failure();
    let outcome = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Published {
            contract: "0xdeployedcontract".to_string(),
            deployed: false,
            resumed: true,
        }
    );
    assert_eq!(engine.pending_phase(CREATOR).await, None);

    // the contract was deployed and registered exactly once across both
    // attempts, and the resumed attempt did not resolve again
    let calls = ledger.recorded();
    let deploys = calls
        .iter()
        .filter(|call| matches!(call, LedgerCall::Deploy { .. }))
        .count();
    let registers = calls
        .iter()
        .filter(|call| matches!(call, LedgerCall::Register { .. }))
        .count();
    let resolves = calls
        .iter()
        .filter(|call| matches!(call, LedgerCall::Resolve { .. }))
        .count();
    assert_eq!(deploys, 1);
    assert_eq!(registers, 1);
    assert_eq!(resolves, 1);
}

#[tokio::test]
async fn completed_publication_clears_the_record() {
    let ledger = Arc::new(MockLedger::with_existing_contract("0xexisting"));
    let engine = PublicationEngine::new(ledger.clone());

    engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();
    assert_eq!(engine.pending_phase(CREATOR).await, None);

    // a second publication starts from resolve again
    let outcome = engine
        .publish(CREATOR, "creator", vec![base_tier()])
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Outcome::Published { resumed: false, .. }
    ));
}
