//! Airdrop account and transaction orchestration.
//!
//! Generates sub-accounts, funds them from a treasury, sends each one's
//! zero-value claim to the airdrop contract and withdraws the issued tokens
//! back to the treasury.

pub mod accounts;
pub mod blockchain;
pub mod config;
pub mod observability;
pub mod resilience;
pub mod workflows;

pub use blockchain::{AccountIdentity, BlockchainError, ClientSlot, NetworkClient};
pub use config::schema::AirdropConfig;
pub use workflows::{BatchReport, ItemOutcome, Workflows};
