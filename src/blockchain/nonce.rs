//! Nonce sequencing.
//!
//! Each workflow fetches a sender's starting nonce from the node (pending
//! block, so unconfirmed sends are counted) and then advances it locally.
//! Re-querying inside a tight send loop can read a pending count that does
//! not yet include the previous submission.

use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::blockchain::client::NetworkClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Current pending-inclusive transaction count of `address`.
///
/// A failed query is an error; it never falls back to zero.
pub async fn current_nonce(client: &NetworkClient, address: Address) -> BlockchainResult<u64> {
    client
        .pending_transaction_count(address)
        .await
        .map_err(|cause| BlockchainError::NonceQuery {
            address: address.to_string(),
            cause,
        })
}

/// Locally advanced nonce counter for one sender within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceSequence {
    address: Address,
    next: u64,
}

impl NonceSequence {
    /// Start at the node's current pending count.
    pub async fn fetch(client: &NetworkClient, address: Address) -> BlockchainResult<Self> {
        let next = current_nonce(client, address).await?;
        tracing::debug!(%address, nonce = next, "Nonce sequence started");
        Ok(Self { address, next })
    }

    /// Start at a known value.
    pub fn starting_at(address: Address, next: u64) -> Self {
        Self { address, next }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Nonce the next transaction will use.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Mark the current nonce as consumed and return it.
    pub fn advance(&mut self) -> u64 {
        let used = self.next;
        self.next += 1;
        used
    }

    /// Re-read the pending count after a submission whose fate is unknown.
    ///
    /// The counter never moves backwards.
    pub async fn resync(&mut self, client: &NetworkClient) -> BlockchainResult<u64> {
        let on_chain = current_nonce(client, self.address).await?;
        if on_chain != self.next {
            tracing::info!(
                address = %self.address,
                local = self.next,
                on_chain,
                "Nonce resynchronized"
            );
        }
        self.next = self.next.max(on_chain);
        Ok(self.next)
    }
}

/// Per-sender mutual exclusion for transaction submission.
///
/// Clones share the same lock table.
#[derive(Debug, Clone, Default)]
pub struct SenderLocks {
    locks: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of `address` as a sender.
    pub async fn lock(&self, address: Address) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await.
        let lock = {
            let entry = self
                .locks
                .entry(address)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        lock.lock_owned().await
    }
}
