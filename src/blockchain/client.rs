//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint once and reuse the connection
//! - Hold chain identity and gas defaults for transaction building
//! - Put a deadline on every network round trip
//!
//! The transport sits behind [`RpcBackend`] so workflows can run against an
//! in-memory chain in tests.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, RpcFailure};
use crate::observability::metrics;

/// Raw RPC operations the orchestrator needs from a node.
#[async_trait]
pub trait RpcBackend: Send + Sync {
    /// `eth_chainId`.
    async fn chain_id(&self) -> Result<u64, String>;

    /// `eth_getTransactionCount` against the pending block.
    async fn pending_transaction_count(&self, address: Address) -> Result<u64, String>;

    /// `eth_sendRawTransaction` with a 2718-encoded signed transaction.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, String>;

    /// `eth_call`; never broadcasts.
    async fn call(&self, request: TransactionRequest) -> Result<Bytes, String>;
}

/// HTTP JSON-RPC backend built on an alloy provider.
pub struct AlloyBackend {
    provider: Arc<dyn Provider + Send + Sync>,
}

impl AlloyBackend {
    /// Build a provider for `rpc_url`.
    ///
    /// HTTP providers connect lazily; an unparsable URL is the only failure
    /// caught here, an unreachable node surfaces on the first query.
    pub fn dial(rpc_url: &str) -> BlockchainResult<Arc<dyn RpcBackend>> {
        let url: url::Url = rpc_url.parse().map_err(|e| {
            BlockchainError::Connection(format!("Invalid RPC URL '{}': {}", rpc_url, e))
        })?;
        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        Ok(Arc::new(Self { provider }))
    }
}

#[async_trait]
impl RpcBackend for AlloyBackend {
    async fn chain_id(&self) -> Result<u64, String> {
        self.provider.get_chain_id().await.map_err(|e| e.to_string())
    }

    async fn pending_transaction_count(&self, address: Address) -> Result<u64, String> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, String> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| e.to_string())?;
        Ok(*pending.tx_hash())
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes, String> {
        self.provider.call(request).await.map_err(|e| e.to_string())
    }
}

/// Connection parameters resolved from configuration.
#[derive(Debug, Clone)]
pub struct NetworkSettings {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Deadline applied to each RPC call.
    pub timeout: Duration,
    /// Default gas price in wei.
    pub gas_price: u128,
    /// Default gas limit for value transfers.
    pub gas_limit: u64,
    /// Gas limit for contract invocations.
    pub contract_gas_limit: u64,
}

/// Connected client: backend handle plus immutable chain identity and gas
/// defaults.
pub struct NetworkClient {
    backend: Arc<dyn RpcBackend>,
    rpc_url: String,
    chain_id: ChainId,
    gas_price: u128,
    gas_limit: u64,
    contract_gas_limit: u64,
    timeout_duration: Duration,
}

impl NetworkClient {
    /// Query the chain id through `backend` and build the client.
    pub async fn connect(
        settings: &NetworkSettings,
        backend: Arc<dyn RpcBackend>,
    ) -> BlockchainResult<Self> {
        let chain_id = with_deadline(settings.timeout, "chain_id", backend.chain_id())
            .await
            .map_err(BlockchainError::ChainQuery)?;

        tracing::info!(
            rpc_url = %settings.rpc_url,
            chain_id = chain_id,
            gas_price = settings.gas_price,
            gas_limit = settings.gas_limit,
            "Blockchain client initialized"
        );

        Ok(Self {
            backend,
            rpc_url: settings.rpc_url.clone(),
            chain_id: ChainId(chain_id),
            gas_price: settings.gas_price,
            gas_limit: settings.gas_limit,
            contract_gas_limit: settings.contract_gas_limit,
            timeout_duration: settings.timeout,
        })
    }

    /// Pending-inclusive transaction count of `address`.
    pub async fn pending_transaction_count(&self, address: Address) -> Result<u64, RpcFailure> {
        with_deadline(
            self.timeout_duration,
            "transaction_count",
            self.backend.pending_transaction_count(address),
        )
        .await
    }

    /// Broadcast an encoded signed transaction.
    pub async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash, RpcFailure> {
        with_deadline(
            self.timeout_duration,
            "send_raw_transaction",
            self.backend.send_raw_transaction(raw),
        )
        .await
    }

    /// Execute a read-only call.
    pub async fn call(&self, request: TransactionRequest) -> Result<Bytes, RpcFailure> {
        with_deadline(self.timeout_duration, "call", self.backend.call(request)).await
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Default gas price in wei.
    pub fn gas_price(&self) -> u128 {
        self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn contract_gas_limit(&self) -> u64 {
        self.contract_gas_limit
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id.0)
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

async fn with_deadline<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, RpcFailure>
where
    F: Future<Output = Result<T, String>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!(operation, error = %e, "RPC error");
            Err(RpcFailure::Transport(e))
        }
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "RPC timeout");
            metrics::record_rpc_timeout(operation);
            Err(RpcFailure::Timeout(limit))
        }
    }
}

/// Lazily-initialized holder for the single client of a run.
///
/// Initialization happens at most once; concurrent callers wait for the
/// in-flight attempt. A failed attempt is not stored, so the next call
/// dials again.
#[derive(Debug, Default)]
pub struct ClientSlot {
    cell: OnceCell<Arc<NetworkClient>>,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing client or dial `settings.rpc_url` over HTTP.
    pub async fn get_or_init(&self, settings: &NetworkSettings) -> BlockchainResult<Arc<NetworkClient>> {
        self.get_or_init_with(settings, AlloyBackend::dial).await
    }

    /// Same as [`ClientSlot::get_or_init`] with a caller-supplied dialer.
    pub async fn get_or_init_with<F>(
        &self,
        settings: &NetworkSettings,
        dial: F,
    ) -> BlockchainResult<Arc<NetworkClient>>
    where
        F: FnOnce(&str) -> BlockchainResult<Arc<dyn RpcBackend>>,
    {
        let client = self
            .cell
            .get_or_try_init(|| async move {
                let backend = dial(&settings.rpc_url)?;
                NetworkClient::connect(settings, backend).await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(client))
    }

    /// The client, if initialization already succeeded.
    pub fn get(&self) -> Option<Arc<NetworkClient>> {
        self.cell.get().cloned()
    }

    /// Release the held client. Outstanding `Arc`s stay usable.
    pub fn close(&mut self) -> Option<Arc<NetworkClient>> {
        let client = self.cell.take();
        if client.is_some() {
            tracing::debug!("Blockchain client released");
        }
        client
    }
}
