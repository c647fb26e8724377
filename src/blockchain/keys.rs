//! Key material and account identities.
//!
//! # Security
//! - Private keys are never logged or printed through `Debug`
//! - Only `private_key_hex` exposes the raw scalar, for the key file

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use k256::ecdsa::VerifyingKey;
use rand::{CryptoRng, RngCore};

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A signer identity: private scalar, public point and the address derived
/// from it.
#[derive(Clone)]
pub struct AccountIdentity {
    signer: PrivateKeySigner,
    address: Address,
}

impl AccountIdentity {
    /// Parse a hex-encoded private key (with or without 0x prefix).
    pub fn derive(private_key_hex: &str) -> BlockchainResult<Self> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = alloy::hex::decode(key_hex)
            .map_err(|e| BlockchainError::InvalidKeyFormat(format!("not valid hex: {}", e)))?;
        if bytes.len() != 32 {
            return Err(BlockchainError::InvalidKeyFormat(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let signer = PrivateKeySigner::from_slice(&bytes).map_err(|e| {
            BlockchainError::InvalidKeyFormat(format!("scalar out of range: {}", e))
        })?;

        Ok(Self::from_signer(signer))
    }

    /// Draw a fresh identity from a cryptographically secure source.
    ///
    /// Draws are repeated until they land inside the curve order, so the
    /// only failure is the entropy source itself.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> BlockchainResult<Self> {
        loop {
            let mut bytes = B256::ZERO;
            rng.try_fill_bytes(bytes.as_mut_slice())
                .map_err(|e| BlockchainError::Entropy(e.to_string()))?;

            if let Ok(signer) = PrivateKeySigner::from_bytes(&bytes) {
                return Ok(Self::from_signer(signer));
            }
        }
    }

    fn from_signer(signer: PrivateKeySigner) -> Self {
        let address = signer.address();
        Self { signer, address }
    }

    /// Address derived from the public key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Public key (private scalar times the curve generator).
    pub fn public_key(&self) -> &VerifyingKey {
        self.signer.credential().verifying_key()
    }

    /// The private key as 64 lowercase hex characters, no prefix.
    pub fn private_key_hex(&self) -> String {
        alloy::hex::encode(self.signer.to_bytes())
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for AccountIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
