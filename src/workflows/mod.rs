//! Batch workflows.
//!
//! # Data Flow
//! ```text
//! key file / config keys
//!     → create.rs   (parallel key generation)
//!     → fund.rs     (treasury → every sub-account, one local nonce sequence)
//!     → claim.rs    (every sub-account → airdrop contract, own nonce each)
//!     → withdraw.rs (sub-account → treasury via token transfer)
//!     → report.rs   (one outcome per input item)
//! ```
//!
//! # Design Decisions
//! - An item failure never aborts its siblings
//! - Nonce fetches are retried; submissions are not
//! - Sends from one sender hold that sender's lock for the whole batch

pub mod claim;
pub mod create;
pub mod fund;
pub mod report;
pub mod withdraw;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::nonce::{NonceSequence, SenderLocks};
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::BlockchainResult;
use crate::resilience::RetryPolicy;

pub use create::{create_accounts, create_accounts_bounded};
pub use report::{BatchReport, ItemOutcome};

/// Shared handles for the transaction-sending workflows.
#[derive(Debug, Clone)]
pub struct Workflows {
    builder: TxBuilder,
    locks: SenderLocks,
    retry: RetryPolicy,
    send_interval: Duration,
}

impl Workflows {
    /// Workflows over `client` with no pause between sends and the default
    /// retry policy.
    pub fn new(client: Arc<NetworkClient>) -> Self {
        Self {
            builder: TxBuilder::new(client),
            locks: SenderLocks::new(),
            retry: RetryPolicy::default(),
            send_interval: Duration::ZERO,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pause between consecutive sends of one batch.
    pub fn with_send_interval(mut self, interval: Duration) -> Self {
        self.send_interval = interval;
        self
    }

    /// Share a lock table with other workflow instances.
    pub fn with_sender_locks(mut self, locks: SenderLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn client(&self) -> &Arc<NetworkClient> {
        self.builder.client()
    }

    pub fn builder(&self) -> &TxBuilder {
        &self.builder
    }

    /// Fetch `address`'s pending nonce, retrying transient failures.
    async fn starting_nonce(&self, address: Address) -> BlockchainResult<NonceSequence> {
        let client: &NetworkClient = self.client();
        self.retry
            .retry("nonce_query", move || NonceSequence::fetch(client, address))
            .await
    }

    async fn pause(&self) {
        if !self.send_interval.is_zero() {
            tokio::time::sleep(self.send_interval).await;
        }
    }
}
