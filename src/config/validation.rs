//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, gas limits cover a transfer)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AirdropConfig → Result<(), Vec<ValidationError>>
//! - Private keys are only checked for presence here; malformed keys are
//!   reported with the key kind when a workflow derives them

use alloy::primitives::Address;

use crate::config::schema::AirdropConfig;

/// Minimum gas for a plain value transfer.
const TRANSFER_GAS: u64 = 21_000;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &AirdropConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.network.rpc_url) {
        errors.push(ValidationError::new(
            "network.rpc_url",
            format!("invalid URL '{}': {}", config.network.rpc_url, e),
        ));
    }

    if config.network.timeout_secs == 0 {
        errors.push(ValidationError::new("network.timeout_secs", "must be greater than 0"));
    }

    if config.network.default_gas_limit < TRANSFER_GAS {
        errors.push(ValidationError::new(
            "network.default_gas_limit",
            format!("must be at least {}", TRANSFER_GAS),
        ));
    }

    if config.network.contract_gas_limit < TRANSFER_GAS {
        errors.push(ValidationError::new(
            "network.contract_gas_limit",
            format!("must be at least {}", TRANSFER_GAS),
        ));
    }

    if !config.airdrop.contract_address.is_empty()
        && config.airdrop.contract_address.parse::<Address>().is_err()
    {
        errors.push(ValidationError::new(
            "airdrop.contract_address",
            format!("'{}' is not an address", config.airdrop.contract_address),
        ));
    }

    if let Some(token) = config.airdrop.token_address.as_deref().filter(|t| !t.is_empty()) {
        if token.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "airdrop.token_address",
                format!("'{}' is not an address", token),
            ));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }

    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
