//! Shared utilities for integration testing: an in-memory chain behind the
//! `RpcBackend` seam.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use airdrop::blockchain::{AccountIdentity, ClientSlot, NetworkClient, NetworkSettings, RpcBackend};
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::dyn_abi::DynSolValue;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// Anvil's first two development keys.
pub const TREASURY_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const SUB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const CHAIN_ID: u64 = 31337;

/// A transaction the fake node accepted.
#[derive(Debug, Clone)]
pub struct Submitted {
    pub from: Address,
    pub hash: TxHash,
    pub tx: TxLegacy,
}

#[derive(Default)]
struct ChainState {
    nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    submitted: Vec<Submitted>,
    calls: Vec<TransactionRequest>,
    send_attempts: u32,
    failing_sends: HashSet<u32>,
    lost_replies: HashSet<u32>,
    late_replies: HashMap<u32, Duration>,
    nonce_failures: u32,
    chain_id_failures: u32,
    send_delay: Option<Duration>,
    nonce_delay: Option<Duration>,
}

/// In-memory node: tracks pending nonces per sender, accepts a transaction
/// only when its nonce equals the sender's pending count, and answers
/// `balanceOf` calls from a balance table.
pub struct FakeChain {
    chain_id: u64,
    state: Mutex<ChainState>,
    pub dials: AtomicU32,
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Self::with_chain_id(CHAIN_ID)
    }

    pub fn with_chain_id(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_id,
            state: Mutex::new(ChainState::default()),
            dials: AtomicU32::new(0),
        })
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().unwrap().nonces.insert(address, nonce);
    }

    pub fn nonce_of(&self, address: Address) -> u64 {
        self.state.lock().unwrap().nonces.get(&address).copied().unwrap_or(0)
    }

    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(address, balance);
    }

    /// Reject the `n`th send attempt (1-based, counted across all senders).
    pub fn fail_send(&self, n: u32) {
        self.state.lock().unwrap().failing_sends.insert(n);
    }

    /// Accept the `n`th send attempt, then answer with a transport error.
    pub fn lose_reply(&self, n: u32) {
        self.state.lock().unwrap().lost_replies.insert(n);
    }

    /// Accept the `n`th send attempt, then hold the reply for `delay`.
    pub fn delay_reply(&self, n: u32, delay: Duration) {
        self.state.lock().unwrap().late_replies.insert(n, delay);
    }

    /// Fail the next `count` nonce queries.
    pub fn fail_nonce_queries(&self, count: u32) {
        self.state.lock().unwrap().nonce_failures = count;
    }

    /// Fail the next `count` chain id queries.
    pub fn fail_chain_id(&self, count: u32) {
        self.state.lock().unwrap().chain_id_failures = count;
    }

    pub fn delay_sends(&self, delay: Duration) {
        self.state.lock().unwrap().send_delay = Some(delay);
    }

    pub fn delay_nonce_queries(&self, delay: Duration) {
        self.state.lock().unwrap().nonce_delay = Some(delay);
    }

    pub fn submitted(&self) -> Vec<Submitted> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn send_attempts(&self) -> u32 {
        self.state.lock().unwrap().send_attempts
    }

    pub fn calls(&self) -> Vec<TransactionRequest> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn dial_count(&self) -> u32 {
        self.dials.load(Ordering::SeqCst)
    }

    /// Dialer for `ClientSlot::get_or_init_with` that counts connections.
    pub fn dialer(
        self: &Arc<Self>,
    ) -> impl FnOnce(&str) -> airdrop::blockchain::BlockchainResult<Arc<dyn RpcBackend>> {
        let chain = Arc::clone(self);
        move |_url: &str| {
            chain.dials.fetch_add(1, Ordering::SeqCst);
            Ok(chain as Arc<dyn RpcBackend>)
        }
    }
}

#[async_trait]
impl RpcBackend for FakeChain {
    async fn chain_id(&self) -> Result<u64, String> {
        let mut state = self.state.lock().unwrap();
        if state.chain_id_failures > 0 {
            state.chain_id_failures -= 1;
            return Err("connection refused".into());
        }
        Ok(self.chain_id)
    }

    async fn pending_transaction_count(&self, address: Address) -> Result<u64, String> {
        let delay = self.state.lock().unwrap().nonce_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if state.nonce_failures > 0 {
            state.nonce_failures -= 1;
            return Err("header not found".into());
        }
        Ok(state.nonces.get(&address).copied().unwrap_or(0))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, String> {
        let (attempt, delay) = {
            let mut state = self.state.lock().unwrap();
            state.send_attempts += 1;
            let attempt = state.send_attempts;
            if state.failing_sends.contains(&attempt) {
                return Err("insufficient funds for gas * price + value".into());
            }
            (attempt, state.send_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let envelope = TxEnvelope::decode_2718(&mut &raw[..]).map_err(|e| e.to_string())?;
        let signed = match envelope {
            TxEnvelope::Legacy(signed) => signed,
            other => return Err(format!("unsupported transaction type {:?}", other.tx_type())),
        };
        if signed.tx().chain_id != Some(self.chain_id) {
            return Err("invalid chain id for signer".into());
        }
        let from = signed
            .signature()
            .recover_address_from_prehash(&signed.tx().signature_hash())
            .map_err(|e| e.to_string())?;

        let (hash, late_reply) = {
            let mut state = self.state.lock().unwrap();
            let pending = state.nonces.entry(from).or_insert(0);
            if signed.tx().nonce != *pending {
                return Err(format!("nonce too low: next nonce {}, tx nonce {}", pending, signed.tx().nonce));
            }
            *pending += 1;

            let hash = *signed.hash();
            state.submitted.push(Submitted {
                from,
                hash,
                tx: signed.tx().clone(),
            });

            if state.lost_replies.contains(&attempt) {
                return Err("connection reset by peer".into());
            }
            (hash, state.late_replies.get(&attempt).copied())
        };

        if let Some(delay) = late_reply {
            tokio::time::sleep(delay).await;
        }
        Ok(hash)
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes, String> {
        let mut state = self.state.lock().unwrap();
        let input = request.input.input().cloned().unwrap_or_default();
        state.calls.push(request);

        // selector + one address word
        if input.len() < 36 {
            return Err("execution reverted".into());
        }
        let owner = Address::from_slice(&input[16..36]);
        let balance = state.balances.get(&owner).copied().unwrap_or(U256::ZERO);
        Ok(DynSolValue::Uint(balance, 256).abi_encode().into())
    }
}

pub fn test_settings() -> NetworkSettings {
    NetworkSettings {
        rpc_url: "http://127.0.0.1:8545".to_string(),
        timeout: Duration::from_secs(2),
        gas_price: 20_000_000_000,
        gas_limit: 21_000,
        contract_gas_limit: 100_000,
    }
}

/// A client connected to `chain` with default test settings.
pub async fn connect(chain: &Arc<FakeChain>) -> Arc<NetworkClient> {
    connect_with(chain, test_settings()).await
}

pub async fn connect_with(chain: &Arc<FakeChain>, settings: NetworkSettings) -> Arc<NetworkClient> {
    ClientSlot::new()
        .get_or_init_with(&settings, chain.dialer())
        .await
        .expect("fake chain connects")
}

pub fn treasury() -> AccountIdentity {
    AccountIdentity::derive(TREASURY_KEY).unwrap()
}

pub fn sub_account() -> AccountIdentity {
    AccountIdentity::derive(SUB_KEY).unwrap()
}
