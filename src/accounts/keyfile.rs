//! Address / private-key line-pair file.
//!
//! ```text
//! 0xAbC...        ← address
//! 4c0883a6...     ← its private key (hex, optional 0x)
//! 0xDeF...
//! ...
//! ```
//!
//! Entries keep file order. Trailing blank lines are tolerated; any other
//! blank line, an odd line count, or a key that does not derive the listed
//! address rejects the whole file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::types::BlockchainError;

/// One sub-account from the key file.
#[derive(Debug, Clone)]
pub struct KeyFileEntry {
    pub address: Address,
    pub identity: AccountIdentity,
}

/// Errors reading or writing the key file.
#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("cannot access key file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: address has no private key line")]
    MissingKey { line: usize },

    #[error("line {line}: blank line")]
    BlankLine { line: usize },

    #[error("line {line}: invalid address '{value}'")]
    InvalidAddress { line: usize, value: String },

    #[error("line {line}: {source}")]
    InvalidKey {
        line: usize,
        #[source]
        source: BlockchainError,
    },

    #[error("line {line}: key derives {derived}, file lists {listed}")]
    AddressMismatch {
        line: usize,
        listed: Address,
        derived: Address,
    },

    #[error("line {line}: duplicate address {address}")]
    DuplicateAddress { line: usize, address: Address },
}

impl KeyFileError {
    /// True for malformed content, false for I/O failures.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, KeyFileError::Io { .. })
    }
}

/// Read and validate the key file at `path`.
pub fn read_key_file(path: &Path) -> Result<Vec<KeyFileEntry>, KeyFileError> {
    let content = fs::read_to_string(path).map_err(|source| KeyFileError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let entries = parse_key_file(&content)?;
    tracing::info!(path = %path.display(), accounts = entries.len(), "Key file loaded");
    Ok(entries)
}

/// Parse key file content.
pub fn parse_key_file(content: &str) -> Result<Vec<KeyFileEntry>, KeyFileError> {
    let mut lines: Vec<&str> = content.lines().map(str::trim).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    if let Some(index) = lines.iter().position(|line| line.is_empty()) {
        return Err(KeyFileError::BlankLine { line: index + 1 });
    }
    if lines.len() % 2 != 0 {
        return Err(KeyFileError::MissingKey { line: lines.len() });
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(lines.len() / 2);

    for (pair, chunk) in lines.chunks(2).enumerate() {
        let address_line = pair * 2 + 1;
        let key_line = address_line + 1;

        let listed: Address = chunk[0].parse().map_err(|_| KeyFileError::InvalidAddress {
            line: address_line,
            value: chunk[0].to_string(),
        })?;

        let identity = AccountIdentity::derive(chunk[1]).map_err(|source| KeyFileError::InvalidKey {
            line: key_line,
            source,
        })?;

        if identity.address() != listed {
            return Err(KeyFileError::AddressMismatch {
                line: key_line,
                listed,
                derived: identity.address(),
            });
        }

        if !seen.insert(listed) {
            return Err(KeyFileError::DuplicateAddress {
                line: address_line,
                address: listed,
            });
        }

        entries.push(KeyFileEntry {
            address: listed,
            identity,
        });
    }

    Ok(entries)
}

/// Render identities in key file format.
pub fn render_key_file<'a, I>(accounts: I) -> String
where
    I: IntoIterator<Item = &'a AccountIdentity>,
{
    accounts
        .into_iter()
        .map(|identity| format!("{}\n{}\n", identity.address(), identity.private_key_hex()))
        .collect()
}

/// Write identities to `path` in key file format, replacing its content.
pub fn write_key_file<'a, I>(path: &Path, accounts: I) -> Result<(), KeyFileError>
where
    I: IntoIterator<Item = &'a AccountIdentity>,
{
    fs::write(path, render_key_file(accounts)).map_err(|source| KeyFileError::Io {
        path: path.display().to_string(),
        source,
    })
}
