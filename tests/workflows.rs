//! End-to-end workflow tests against the in-memory chain.

use std::time::Duration;

use airdrop::blockchain::{units, BlockchainError, ContractBinding, RpcFailure, TOKEN_ABI};
use airdrop::resilience::RetryPolicy;
use airdrop::workflows::Workflows;
use alloy::primitives::{address, Address, U256};

mod common;
use common::FakeChain;

const AIRDROP: Address = address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512");
const TOKEN: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

fn recipients() -> Vec<Address> {
    vec![
        address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
        address!("90F79bf6EB2c4f870365E785982E1f101E93b906"),
        address!("15d34AAf54267DB7D7c367839AAf71A00a2C6A65"),
    ]
}

#[tokio::test]
async fn test_fund_reports_every_recipient_in_order() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    let treasury = common::treasury();
    chain.fail_send(2);

    let report = workflows
        .fund_sub_accounts(&treasury, &recipients(), units::milli_ether(1))
        .await;

    assert_eq!(report.workflow(), "sendToSub");
    assert_eq!(report.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.all_succeeded());

    let outcomes = report.outcomes();
    for (outcome, expected) in outcomes.iter().zip(recipients()) {
        assert_eq!(outcome.address, expected);
    }
    assert!(outcomes[0].is_success());
    assert!(matches!(
        outcomes[1].error(),
        Some(BlockchainError::Submission(RpcFailure::Transport(_)))
    ));
    assert!(outcomes[2].is_success());

    // The rejected send does not consume a nonce.
    let nonces: Vec<u64> = chain.submitted().iter().map(|s| s.tx.nonce).collect();
    assert_eq!(nonces, vec![0, 1]);
    assert_eq!(chain.nonce_of(treasury.address()), 2);

    let values: Vec<U256> = chain.submitted().iter().map(|s| s.tx.value).collect();
    assert!(values.iter().all(|v| *v == U256::from(1_000_000_000_000_000u64)));
}

#[tokio::test]
async fn test_fund_continues_from_existing_nonce() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    let treasury = common::treasury();
    chain.set_nonce(treasury.address(), 11);

    let report = workflows
        .fund_sub_accounts(&treasury, &recipients(), units::milli_ether(1))
        .await;

    assert!(report.all_succeeded());
    let nonces: Vec<u64> = chain.submitted().iter().map(|s| s.tx.nonce).collect();
    assert_eq!(nonces, vec![11, 12, 13]);
}

#[tokio::test]
async fn test_fund_recovers_when_an_accepted_send_reports_an_error() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    let treasury = common::treasury();
    chain.lose_reply(1);

    let report = workflows
        .fund_sub_accounts(&treasury, &recipients(), units::milli_ether(1))
        .await;

    let outcomes = report.outcomes();
    assert!(matches!(
        outcomes[0].error(),
        Some(BlockchainError::Submission(RpcFailure::Transport(_)))
    ));
    assert!(outcomes[1].is_success());
    assert!(outcomes[2].is_success());
    assert_eq!(report.succeeded(), 2);

    let nonces: Vec<u64> = chain.submitted().iter().map(|s| s.tx.nonce).collect();
    assert_eq!(nonces, vec![0, 1, 2]);
    assert_eq!(chain.nonce_of(treasury.address()), 3);
}

#[tokio::test]
async fn test_fund_resyncs_after_a_late_reply() {
    let chain = FakeChain::new();
    let mut settings = common::test_settings();
    settings.timeout = Duration::from_millis(100);
    let workflows = Workflows::new(common::connect_with(&chain, settings).await);
    let treasury = common::treasury();
    chain.set_nonce(treasury.address(), 4);
    chain.delay_reply(1, Duration::from_millis(500));

    let report = workflows
        .fund_sub_accounts(&treasury, &recipients(), units::milli_ether(1))
        .await;

    let outcomes = report.outcomes();
    assert!(outcomes[0].error().is_some_and(|e| e.is_timeout()));
    assert!(outcomes[1].is_success());
    assert!(outcomes[2].is_success());

    // The timed-out transfer landed with nonce 4, so the next one uses 5.
    let nonces: Vec<u64> = chain.submitted().iter().map(|s| s.tx.nonce).collect();
    assert_eq!(nonces, vec![4, 5, 6]);
}

#[tokio::test]
async fn test_fund_without_starting_nonce_sends_nothing() {
    let chain = FakeChain::new();
    let workflows =
        Workflows::new(common::connect(&chain).await).with_retry_policy(RetryPolicy::none());
    chain.fail_nonce_queries(1);

    let report = workflows
        .fund_sub_accounts(&common::treasury(), &recipients(), units::milli_ether(1))
        .await;

    assert_eq!(report.len(), 3);
    assert_eq!(report.failed(), 3);
    assert!(report
        .outcomes()
        .iter()
        .all(|o| matches!(o.error(), Some(BlockchainError::NonceQuery { .. }))));
    assert_eq!(chain.send_attempts(), 0);
}

#[tokio::test]
async fn test_nonce_query_is_retried() {
    let chain = FakeChain::new();
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };
    let workflows = Workflows::new(common::connect(&chain).await).with_retry_policy(retry);
    chain.fail_nonce_queries(2);

    let report = workflows
        .fund_sub_accounts(&common::treasury(), &recipients()[..1], units::milli_ether(1))
        .await;

    assert!(report.all_succeeded());
    assert_eq!(chain.submitted().len(), 1);
}

#[tokio::test]
async fn test_empty_batch_yields_empty_report() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);

    let report = workflows
        .fund_sub_accounts(&common::treasury(), &[], units::milli_ether(1))
        .await;

    assert!(report.is_empty());
    assert!(report.all_succeeded());
}

#[tokio::test]
async fn test_claims_use_each_senders_own_nonce() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    let treasury = common::treasury();
    let sub = common::sub_account();
    chain.set_nonce(treasury.address(), 5);

    let report = workflows
        .trigger_airdrop_claims(&[treasury.clone(), sub.clone()], AIRDROP)
        .await;

    assert_eq!(report.workflow(), "subToAirDrop");
    assert!(report.all_succeeded());

    let submitted = chain.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!((submitted[0].from, submitted[0].tx.nonce), (treasury.address(), 5));
    assert_eq!((submitted[1].from, submitted[1].tx.nonce), (sub.address(), 0));
    for tx in &submitted {
        assert_eq!(tx.tx.to.to(), Some(&AIRDROP));
        assert_eq!(tx.tx.value, U256::ZERO);
        assert!(tx.tx.input.is_empty());
    }
}

#[tokio::test]
async fn test_claim_failure_does_not_stop_siblings() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    chain.fail_send(1);

    let report = workflows
        .trigger_airdrop_claims(&[common::treasury(), common::sub_account()], AIRDROP)
        .await;

    assert_eq!(report.failed(), 1);
    assert!(!report.outcomes()[0].is_success());
    assert!(report.outcomes()[1].is_success());
}

#[tokio::test]
async fn test_withdraw_transfers_to_treasury() {
    let chain = FakeChain::new();
    let client = common::connect(&chain).await;
    let workflows = Workflows::new(client.clone());
    let token = ContractBinding::bind(client, TOKEN, TOKEN_ABI).unwrap();
    let treasury = common::treasury();
    let sub = common::sub_account();
    chain.set_nonce(sub.address(), 3);

    let amount = U256::from(100_000_000_000u64);
    let report = workflows
        .withdraw_tokens(&token, treasury.address(), &[sub.clone()], amount)
        .await;

    assert_eq!(report.workflow(), "withdrawToken");
    assert!(report.all_succeeded());
    assert_eq!(report.outcomes()[0].address, sub.address());

    let submitted = chain.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].from, sub.address());
    assert_eq!(submitted[0].tx.nonce, 3);
    assert_eq!(submitted[0].tx.to.to(), Some(&TOKEN));
    assert_eq!(submitted[0].tx.gas_limit, 100_000);
    assert_eq!(Some(submitted[0].hash), report.outcomes()[0].tx_hash());
}

#[tokio::test]
async fn test_report_serializes_outcomes() {
    let chain = FakeChain::new();
    let workflows = Workflows::new(common::connect(&chain).await);
    chain.fail_send(1);

    let report = workflows
        .fund_sub_accounts(&common::treasury(), &recipients()[..2], units::milli_ether(1))
        .await;
    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["workflow"], "sendToSub");
    assert_eq!(json["run_id"], report.run_id().to_string());
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 2);
    assert!(json["outcomes"][0]["error"].is_string());
    assert!(json["outcomes"][1]["tx_hash"].is_string());
}
