//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from JSON or TOML
//! config files. Every section has defaults so a minimal file only needs
//! the endpoint, keys and contract address.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blockchain::client::NetworkSettings;

/// Root configuration for an airdrop run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AirdropConfig {
    /// RPC endpoint and gas defaults.
    pub network: NetworkConfig,

    /// Treasury / sub-account keys and the key file location.
    pub accounts: AccountsConfig,

    /// Airdrop contract and amounts.
    pub airdrop: AirdropSettings,

    /// Retry policy for read-only queries.
    pub retries: RetryConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// RPC connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Per-call RPC timeout in seconds.
    pub timeout_secs: u64,

    /// Default gas price in gwei.
    pub default_gas_price_gwei: u64,

    /// Default gas limit for value transfers.
    pub default_gas_limit: u64,

    /// Gas limit for contract calls (token transfers need more than 21000).
    pub contract_gas_limit: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            timeout_secs: 10,
            default_gas_price_gwei: 20,
            default_gas_limit: 21_000,
            contract_gas_limit: 100_000,
        }
    }
}

impl NetworkConfig {
    /// Resolve into client settings (gas price scaled to wei).
    pub fn settings(&self) -> NetworkSettings {
        NetworkSettings {
            rpc_url: self.rpc_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            gas_price: u128::from(self.default_gas_price_gwei) * 1_000_000_000,
            gas_limit: self.default_gas_limit,
            contract_gas_limit: self.contract_gas_limit,
        }
    }
}

/// Account key configuration.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AccountsConfig {
    /// Hex private key of the treasury (funding source, withdrawal target).
    pub treasury_private_key: String,

    /// Hex private key of the sub-account tokens are withdrawn from.
    pub sub_private_key: String,

    /// Path of the address/key line-pair file.
    pub addr_path: String,
}

impl std::fmt::Debug for AccountsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountsConfig")
            .field("treasury_private_key", &redact(&self.treasury_private_key))
            .field("sub_private_key", &redact(&self.sub_private_key))
            .field("addr_path", &self.addr_path)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Airdrop contract and amount configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AirdropSettings {
    /// Address sub-accounts send their zero-value claim to.
    pub contract_address: String,

    /// Token contract for withdrawals; the airdrop contract when unset.
    pub token_address: Option<String>,

    /// Amount sent to each sub-account, in milli-ether.
    pub default_amount: u64,

    /// Tokens withdrawn per call, in the token's base units.
    pub withdraw_amount: u64,

    /// Number of accounts generated by `createAccount`.
    pub create_count: usize,

    /// Pause between consecutive sends in milliseconds.
    pub send_interval_ms: u64,
}

impl Default for AirdropSettings {
    fn default() -> Self {
        Self {
            contract_address: String::new(),
            token_address: None,
            default_amount: 1,
            withdraw_amount: 100_000_000_000, // 1000e8
            create_count: 200,
            send_interval_ms: 1000,
        }
    }
}

impl AirdropSettings {
    /// Token contract used by withdrawals and balance queries.
    pub fn token_contract(&self) -> &str {
        self.token_address
            .as_deref()
            .filter(|address| !address.is_empty())
            .unwrap_or(&self.contract_address)
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }
}

/// Retry configuration for read-only queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AirdropConfig::default();
        assert_eq!(config.network.timeout_secs, 10);
        assert_eq!(config.network.default_gas_limit, 21_000);
        assert_eq!(config.airdrop.create_count, 200);
        assert_eq!(config.airdrop.withdraw_amount, 100_000_000_000);
    }

    #[test]
    fn test_gas_price_scaled_to_wei() {
        let network = NetworkConfig {
            default_gas_price_gwei: 20,
            ..NetworkConfig::default()
        };
        let settings = network.settings();
        assert_eq!(settings.gas_price, 20_000_000_000);
        assert_eq!(settings.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_token_contract_falls_back_to_airdrop() {
        let mut airdrop = AirdropSettings {
            contract_address: "0xairdrop".into(),
            ..AirdropSettings::default()
        };
        assert_eq!(airdrop.token_contract(), "0xairdrop");

        airdrop.token_address = Some(String::new());
        assert_eq!(airdrop.token_contract(), "0xairdrop");

        airdrop.token_address = Some("0xtoken".into());
        assert_eq!(airdrop.token_contract(), "0xtoken");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let accounts = AccountsConfig {
            treasury_private_key: "deadbeef".into(),
            ..AccountsConfig::default()
        };
        let debug = format!("{:?}", accounts);
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("<unset>"));
    }
}
