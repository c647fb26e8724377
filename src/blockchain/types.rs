//! Chain-specific types and error definitions.

use std::time::Duration;

use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Why a single RPC round trip failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcFailure {
    /// The call did not complete before its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The transport or the node returned an error.
    #[error("{0}")]
    Transport(String),
}

/// Errors that can occur during blockchain operations.
///
/// Every variant is `Clone` so a setup failure shared by a whole batch
/// (e.g. the treasury nonce fetch) can be attached to each item.
#[derive(Debug, Clone, Error)]
pub enum BlockchainError {
    /// Invalid private key format or out-of-range scalar.
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// The entropy source could not produce key material.
    #[error("Entropy source failed: {0}")]
    Entropy(String),

    /// A key generation task died before returning.
    #[error("Key generation task failed: {0}")]
    KeyGeneration(String),

    /// The RPC endpoint could not be dialed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Chain ID retrieval failed during client initialization.
    #[error("Chain ID query failed: {0}")]
    ChainQuery(RpcFailure),

    /// Transaction count retrieval failed.
    #[error("Nonce query for {address} failed: {cause}")]
    NonceQuery { address: String, cause: RpcFailure },

    /// The transaction could not be signed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// The network rejected the transaction or did not answer in time.
    #[error("Submission failed: {0}")]
    Submission(RpcFailure),

    /// The contract ABI definition is malformed.
    #[error("ABI parse error: {0}")]
    AbiParse(String),

    /// The requested method does not exist in the bound ABI.
    #[error("Unknown contract method: {0}")]
    UnknownMethod(String),

    /// Supplied arguments (or returned data) do not match the ABI types.
    #[error("Argument encoding for '{method}' failed: {reason}")]
    ArgumentEncoding { method: String, reason: String },

    /// A read-only contract call failed.
    #[error("Contract call failed: {0}")]
    Call(RpcFailure),
}

impl BlockchainError {
    /// Whether the underlying RPC call hit its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BlockchainError::ChainQuery(RpcFailure::Timeout(_))
                | BlockchainError::NonceQuery { cause: RpcFailure::Timeout(_), .. }
                | BlockchainError::Submission(RpcFailure::Timeout(_))
                | BlockchainError::Call(RpcFailure::Timeout(_))
        )
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
