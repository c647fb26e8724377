//! Sub-account → airdrop contract claims.

use alloy::primitives::{Address, Bytes, U256};
use tracing::Instrument;

use crate::blockchain::keys::AccountIdentity;
use crate::workflows::report::{BatchReport, ItemOutcome};
use crate::workflows::Workflows;

impl Workflows {
    /// Send a zero-value, empty-data transaction from every sub-account to
    /// `airdrop`. Each sub-account is its own sender and uses its own nonce.
    pub async fn trigger_airdrop_claims(&self, accounts: &[AccountIdentity], airdrop: Address) -> BatchReport {
        let mut report = BatchReport::new("subToAirDrop");
        let span = tracing::info_span!(
            "trigger_airdrop_claims",
            run_id = %report.run_id(),
            airdrop = %airdrop
        );

        async {
            tracing::info!(accounts = accounts.len(), "Triggering airdrop claims");

            for (index, account) in accounts.iter().enumerate() {
                if index > 0 {
                    self.pause().await;
                }

                let _sender = self.locks.lock(account.address()).await;
                let result = match self.starting_nonce(account.address()).await {
                    Ok(nonces) => {
                        self.builder
                            .build_and_send(account, Some(airdrop), U256::ZERO, Bytes::new(), nonces.peek())
                            .await
                    }
                    Err(e) => Err(e),
                };

                report.record(ItemOutcome {
                    address: account.address(),
                    result,
                });
            }
        }
        .instrument(span)
        .await;

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Airdrop claims finished"
        );
        report
    }
}
