//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per workflow run)
//!     → metrics.rs (submission and timeout counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never formatted key material
//! - A run ID flows through every event of a workflow
//! - Metrics are cheap counters; without an installed recorder they are no-ops

pub mod logging;
pub mod metrics;
