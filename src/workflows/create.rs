//! Parallel account generation.

use futures_util::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};

use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Key derivations running at the same time in [`create_accounts`].
pub const GENERATION_CONCURRENCY: usize = 32;

/// Generate `count` independent accounts.
///
/// One 32-byte seed per account is drawn from `rng` in index order, then
/// each account is derived on its own blocking task from a `StdRng` seeded
/// with it. The result has exactly `count` entries in index order, so the
/// same `rng` state always yields the same accounts and one failed task
/// only costs its own slot.
pub async fn create_accounts<R>(count: usize, rng: &mut R) -> Vec<BlockchainResult<AccountIdentity>>
where
    R: RngCore + CryptoRng,
{
    create_accounts_bounded(count, rng, GENERATION_CONCURRENCY).await
}

/// [`create_accounts`] with at most `limit` derivations in flight.
pub async fn create_accounts_bounded<R>(
    count: usize,
    rng: &mut R,
    limit: usize,
) -> Vec<BlockchainResult<AccountIdentity>>
where
    R: RngCore + CryptoRng,
{
    let seeds = draw_seeds(count, rng);

    let results: Vec<_> = stream::iter(seeds)
        .map(|seed| {
            tokio::task::spawn_blocking(move || {
                let mut task_rng = StdRng::from_seed(seed?);
                AccountIdentity::generate(&mut task_rng)
            })
        })
        .buffered(limit.max(1))
        .map(|joined| joined.unwrap_or_else(|e| Err(BlockchainError::KeyGeneration(e.to_string()))))
        .collect()
        .await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    tracing::info!(requested = count, created, limit, "Accounts generated");
    results
}

fn draw_seeds<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<BlockchainResult<[u8; 32]>> {
    (0..count)
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.try_fill_bytes(&mut seed)
                .map(|()| seed)
                .map_err(|e| BlockchainError::Entropy(e.to_string()))
        })
        .collect()
}
