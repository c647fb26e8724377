//! Treasury → sub-account funding.

use alloy::primitives::{Address, Bytes, U256};
use tracing::Instrument;

use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::types::BlockchainError;
use crate::workflows::report::{BatchReport, ItemOutcome};
use crate::workflows::Workflows;

impl Workflows {
    /// Send `amount` wei from `treasury` to each recipient, in order.
    ///
    /// The treasury nonce is fetched once and advanced locally after every
    /// accepted submission. After any failed submission the pending count is
    /// re-read: an error reply or a timeout does not prove the node dropped
    /// the transaction, and the counter never moves backwards, so a genuine
    /// rejection leaves the nonce for the next recipient. If the starting
    /// nonce cannot be fetched, every recipient is reported with that error.
    pub async fn fund_sub_accounts(
        &self,
        treasury: &AccountIdentity,
        recipients: &[Address],
        amount: U256,
    ) -> BatchReport {
        let mut report = BatchReport::new("sendToSub");
        let span = tracing::info_span!(
            "fund_sub_accounts",
            run_id = %report.run_id(),
            treasury = %treasury.address()
        );

        async {
            tracing::info!(recipients = recipients.len(), amount = %amount, "Funding sub-accounts");
            let _sender = self.locks.lock(treasury.address()).await;

            let mut nonces = match self.starting_nonce(treasury.address()).await {
                Ok(nonces) => nonces,
                Err(e) => {
                    tracing::error!(error = %e, "Cannot fetch treasury nonce, no transfer sent");
                    for recipient in recipients {
                        report.record(ItemOutcome::failure(*recipient, e.clone()));
                    }
                    return;
                }
            };

            for (index, recipient) in recipients.iter().enumerate() {
                if index > 0 {
                    self.pause().await;
                }

                let result = self
                    .builder
                    .build_and_send(treasury, Some(*recipient), amount, Bytes::new(), nonces.peek())
                    .await;

                match &result {
                    Ok(_) => {
                        nonces.advance();
                    }
                    Err(BlockchainError::Submission(_)) => {
                        if let Err(resync) = nonces.resync(self.client()).await {
                            tracing::warn!(error = %resync, "Nonce resync failed, keeping local value");
                        }
                    }
                    Err(_) => {}
                }

                report.record(ItemOutcome {
                    address: *recipient,
                    result,
                });
            }
        }
        .instrument(span)
        .await;

        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Funding finished"
        );
        report
    }
}
