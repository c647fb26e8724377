//! Sub-account storage.
//!
//! Sub-accounts live in a plain text file of address / private-key line
//! pairs. `keyfile.rs` reads it (validating every pair against the key's
//! derived address) and writes it for freshly generated accounts.

pub mod keyfile;

pub use keyfile::{read_key_file, render_key_file, write_key_file, KeyFileEntry, KeyFileError};
