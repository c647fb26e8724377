//! Token withdrawal back to the treasury and balance lookups.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, U256};
use tracing::Instrument;

use crate::blockchain::contract::ContractBinding;
use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::workflows::report::{BatchReport, ItemOutcome};
use crate::workflows::Workflows;

/// Token method moving funds from the caller.
pub const TRANSFER_METHOD: &str = "transfer";
/// Token method reading an account balance.
pub const BALANCE_METHOD: &str = "balanceOf";

impl Workflows {
    /// Call `transfer(treasury, amount)` on `token` from each sub-account.
    pub async fn withdraw_tokens(
        &self,
        token: &ContractBinding,
        treasury: Address,
        sub_accounts: &[AccountIdentity],
        amount: U256,
    ) -> BatchReport {
        let mut report = BatchReport::new("withdrawToken");
        let span = tracing::info_span!(
            "withdraw_tokens",
            run_id = %report.run_id(),
            token = %token.address(),
            treasury = %treasury
        );

        async {
            let args = [DynSolValue::Address(treasury), DynSolValue::Uint(amount, 256)];

            for (index, account) in sub_accounts.iter().enumerate() {
                if index > 0 {
                    self.pause().await;
                }

                let _sender = self.locks.lock(account.address()).await;
                let result = match self.starting_nonce(account.address()).await {
                    Ok(nonces) => token.call(account, TRANSFER_METHOD, &args, nonces.peek()).await,
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

        report
    }
}

/// Read `owner`'s token balance without sending a transaction.
pub async fn query_token_balance(token: &ContractBinding, owner: Address) -> BlockchainResult<U256> {
    let outputs = token
        .query(BALANCE_METHOD, &[DynSolValue::Address(owner)])
        .await?;

    match outputs.first() {
        Some(DynSolValue::Uint(balance, _)) => Ok(*balance),
        other => Err(BlockchainError::ArgumentEncoding {
            method: BALANCE_METHOD.to_string(),
            reason: format!("expected a uint output, got {:?}", other),
        }),
    }
}
