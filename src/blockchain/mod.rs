//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! hex private key / entropy
//!     → keys.rs (AccountIdentity)
//!     → client.rs (one RPC connection per run, deadlines on every call)
//!     → nonce.rs (pending-inclusive start, local increments)
//!     → transaction.rs (build, sign, broadcast)
//!     → contract.rs (ABI-encoded calls and read-only queries)
//! ```
//!
//! # Security Constraints
//! - Never log private keys
//! - All RPC calls have configurable timeouts
//! - A failed nonce query aborts the send it was meant for

pub mod client;
pub mod contract;
pub mod keys;
pub mod nonce;
pub mod transaction;
pub mod types;
pub mod units;

pub use client::{AlloyBackend, ClientSlot, NetworkClient, NetworkSettings, RpcBackend};
pub use contract::{ContractBinding, TOKEN_ABI};
pub use keys::AccountIdentity;
pub use nonce::{current_nonce, NonceSequence, SenderLocks};
pub use transaction::{SignedTransaction, TxBuilder, UnsignedTransaction};
pub use types::{BlockchainError, BlockchainResult, ChainId, RpcFailure};
