//! Metrics collection.
//!
//! # Metrics
//! - `airdrop_transactions_total` (counter): submissions by workflow, outcome
//! - `airdrop_rpc_timeouts_total` (counter): expired deadlines by operation

/// Record the outcome of one workflow item.
pub fn record_submission(workflow: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "airdrop_transactions_total",
        "workflow" => workflow,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record an RPC call that hit its deadline.
pub fn record_rpc_timeout(operation: &'static str) {
    metrics::counter!("airdrop_rpc_timeouts_total", "operation" => operation).increment(1);
}
