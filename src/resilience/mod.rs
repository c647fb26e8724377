//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read-only query (nonce fetch):
//!     → client.rs deadline expires or node errors
//!     → backoff.rs (retry with exponential backoff and jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Only reads are retried; a transaction submission is never replayed

pub mod backoff;

pub use backoff::RetryPolicy;
