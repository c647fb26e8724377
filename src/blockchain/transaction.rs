//! Transaction building, signing, and broadcast.
//!
//! # Responsibilities
//! - Fill gas fields from the client defaults
//! - Sign legacy transactions with EIP-155 replay protection
//! - Broadcast without waiting for inclusion
//!
//! Nothing here retries; a rejected or timed-out submission is returned to
//! the caller as is.

use std::sync::Arc;

use alloy::consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, Signature, TxHash, TxKind, U256};
use alloy::signers::SignerSync;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Transaction fields before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub nonce: u64,
    /// `None` creates a contract.
    pub to: Option<Address>,
    /// Value in wei.
    pub value: U256,
    pub gas_limit: u64,
    /// Gas price in wei.
    pub gas_price: u128,
    pub data: Bytes,
}

impl UnsignedTransaction {
    /// Sign for `chain_id`. The result is bound to these exact fields.
    pub fn sign(self, signer: &AccountIdentity, chain_id: ChainId) -> BlockchainResult<SignedTransaction> {
        let tx = TxLegacy {
            chain_id: Some(chain_id.0),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to.map_or(TxKind::Create, TxKind::Call),
            value: self.value,
            input: self.data,
        };

        let signature = signer
            .signer()
            .sign_hash_sync(&tx.signature_hash())
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        Ok(SignedTransaction {
            from: signer.address(),
            signed: tx.into_signed(signature),
        })
    }
}

/// A signed legacy transaction. Read-only once produced.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    from: Address,
    signed: Signed<TxLegacy>,
}

impl SignedTransaction {
    pub fn hash(&self) -> TxHash {
        *self.signed.hash()
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn tx(&self) -> &TxLegacy {
        self.signed.tx()
    }

    pub fn signature(&self) -> &Signature {
        self.signed.signature()
    }

    /// EIP-2718 encoding for `eth_sendRawTransaction`.
    pub fn encoded(&self) -> Bytes {
        TxEnvelope::Legacy(self.signed.clone()).encoded_2718().into()
    }
}

/// Transaction builder bound to one client.
#[derive(Debug, Clone)]
pub struct TxBuilder {
    client: Arc<NetworkClient>,
}

impl TxBuilder {
    pub fn new(client: Arc<NetworkClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<NetworkClient> {
        &self.client
    }

    /// Fill gas price and gas limit from the client defaults.
    pub fn prepare(&self, to: Option<Address>, value: U256, data: Bytes, nonce: u64) -> UnsignedTransaction {
        UnsignedTransaction {
            nonce,
            to,
            value,
            gas_limit: self.client.gas_limit(),
            gas_price: self.client.gas_price(),
            data,
        }
    }

    /// Prepare, sign and broadcast. Returns once the node accepts the
    /// transaction into its pool.
    pub async fn build_and_send(
        &self,
        signer: &AccountIdentity,
        to: Option<Address>,
        value: U256,
        data: Bytes,
        nonce: u64,
    ) -> BlockchainResult<TxHash> {
        let unsigned = self.prepare(to, value, data, nonce);
        self.sign_and_send(signer, unsigned).await
    }

    /// Sign an already prepared transaction and broadcast it.
    pub async fn sign_and_send(
        &self,
        signer: &AccountIdentity,
        unsigned: UnsignedTransaction,
    ) -> BlockchainResult<TxHash> {
        let signed = unsigned.sign(signer, self.client.chain_id())?;
        self.submit(&signed).await
    }

    /// Broadcast a signed transaction.
    pub async fn submit(&self, signed: &SignedTransaction) -> BlockchainResult<TxHash> {
        let tx = signed.tx();
        let tx_hash = self
            .client
            .send_raw_transaction(signed.encoded())
            .await
            .map_err(BlockchainError::Submission)?;

        if tx_hash != signed.hash() {
            tracing::warn!(
                returned = %tx_hash,
                computed = %signed.hash(),
                "Node returned an unexpected transaction hash"
            );
        }

        tracing::info!(
            from = %signed.from(),
            to = ?tx.to.to(),
            nonce = tx.nonce,
            value = %tx.value,
            tx_hash = %tx_hash,
            "Transaction submitted"
        );

        Ok(tx_hash)
    }
}
