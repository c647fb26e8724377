//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AirdropConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `accounts.treasury_private_key` when set.
pub const TREASURY_KEY_ENV_VAR: &str = "AIRDROP_TREASURY_PRIVATE_KEY";
/// Overrides `accounts.sub_private_key` when set.
pub const SUB_KEY_ENV_VAR: &str = "AIRDROP_SUB_PRIVATE_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Toml(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Json(e) => write!(f, "Parse error: {}", e),
            ConfigError::Toml(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration. `.toml` files are read as TOML,
/// anything else as JSON.
pub fn load_config(path: &Path) -> Result<AirdropConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let mut config = if is_toml {
        parse_toml(&content)?
    } else {
        parse_json(&content)?
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

pub fn parse_json(content: &str) -> Result<AirdropConfig, ConfigError> {
    serde_json::from_str(content).map_err(ConfigError::Json)
}

pub fn parse_toml(content: &str) -> Result<AirdropConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Toml)
}

/// Replace private keys with values from the environment, if present.
pub fn apply_env_overrides<F>(config: &mut AirdropConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(TREASURY_KEY_ENV_VAR).filter(|k| !k.is_empty()) {
        tracing::debug!(var = TREASURY_KEY_ENV_VAR, "Treasury key taken from environment");
        config.accounts.treasury_private_key = key;
    }
    if let Some(key) = lookup(SUB_KEY_ENV_VAR).filter(|k| !k.is_empty()) {
        tracing::debug!(var = SUB_KEY_ENV_VAR, "Sub-account key taken from environment");
        config.accounts.sub_private_key = key;
    }
}
