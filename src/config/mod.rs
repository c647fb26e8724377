//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse, environment overrides for keys)
//!     → validation.rs (semantic checks)
//!     → AirdropConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; a batch run never reloads it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AirdropConfig;
pub use schema::{AccountsConfig, AirdropSettings, NetworkConfig, RetryConfig};
