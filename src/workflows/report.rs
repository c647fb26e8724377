//! Per-item outcomes and batch reports.

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use uuid::Uuid;

use crate::blockchain::types::BlockchainError;
use crate::observability::metrics;

/// Result of one workflow item: the transaction hash or why there is none.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub address: Address,
    pub result: Result<TxHash, BlockchainError>,
}

impl ItemOutcome {
    pub fn success(address: Address, tx_hash: TxHash) -> Self {
        Self {
            address,
            result: Ok(tx_hash),
        }
    }

    pub fn failure(address: Address, error: BlockchainError) -> Self {
        Self {
            address,
            result: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.result.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&BlockchainError> {
        self.result.as_ref().err()
    }
}

/// All outcomes of one workflow run, in input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    workflow: &'static str,
    run_id: Uuid,
    outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new(workflow: &'static str) -> Self {
        Self {
            workflow,
            run_id: Uuid::new_v4(),
            outcomes: Vec::new(),
        }
    }

    /// Append an outcome, logging it and counting it.
    pub fn record(&mut self, outcome: ItemOutcome) {
        match &outcome.result {
            Ok(tx_hash) => tracing::info!(
                address = %outcome.address,
                tx_hash = %tx_hash,
                "Item succeeded"
            ),
            Err(e) => tracing::error!(
                address = %outcome.address,
                error = %e,
                "Item failed"
            ),
        }
        metrics::record_submission(self.workflow, outcome.is_success());
        self.outcomes.push(outcome);
    }

    pub fn workflow(&self) -> &'static str {
        self.workflow
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// JSON rendering: one record per item with either `tx_hash` or `error`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let view = ReportView {
            workflow: self.workflow,
            run_id: self.run_id,
            succeeded: self.succeeded(),
            failed: self.failed(),
            outcomes: self
                .outcomes
                .iter()
                .map(|o| OutcomeView {
                    address: o.address,
                    tx_hash: o.tx_hash(),
                    error: o.error().map(|e| e.to_string()),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&view)
    }
}

#[derive(Serialize)]
struct ReportView {
    workflow: &'static str,
    run_id: Uuid,
    succeeded: usize,
    failed: usize,
    outcomes: Vec<OutcomeView>,
}

#[derive(Serialize)]
struct OutcomeView {
    address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
