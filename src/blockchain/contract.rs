//! Smart-contract invocation through a JSON ABI.
//!
//! # Responsibilities
//! - Parse the ABI once per binding
//! - Encode selector + arguments for state-mutating calls and sign them
//! - Run read-only calls that never broadcast or consume a nonce

use std::sync::Arc;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::client::NetworkClient;
use crate::blockchain::keys::AccountIdentity;
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Token interface used by the withdrawal and balance workflows.
pub const TOKEN_ABI: &str = r#"[
  {
    "constant": false,
    "inputs": [
      { "name": "_to", "type": "address" },
      { "name": "_amount", "type": "uint256" }
    ],
    "name": "transfer",
    "outputs": [{ "name": "success", "type": "bool" }],
    "payable": false,
    "stateMutability": "nonpayable",
    "type": "function"
  },
  {
    "constant": true,
    "inputs": [{ "name": "_owner", "type": "address" }],
    "name": "balanceOf",
    "outputs": [{ "name": "balance", "type": "uint256" }],
    "payable": false,
    "stateMutability": "view",
    "type": "function"
  }
]"#;

/// A parsed ABI bound to a deployed contract.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: JsonAbi,
    builder: TxBuilder,
}

impl ContractBinding {
    /// Parse `abi_json` and bind it to `address`.
    pub fn bind(client: Arc<NetworkClient>, address: Address, abi_json: &str) -> BlockchainResult<Self> {
        let abi: JsonAbi =
            serde_json::from_str(abi_json).map_err(|e| BlockchainError::AbiParse(e.to_string()))?;

        tracing::debug!(
            contract = %address,
            functions = abi.functions().count(),
            "Contract ABI bound"
        );

        Ok(Self {
            address,
            abi,
            builder: TxBuilder::new(client),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Whether the ABI declares a function called `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.abi.function(method).is_some()
    }

    /// Pick the overload of `method` that takes `arg_count` arguments.
    fn resolve(&self, method: &str, arg_count: usize) -> BlockchainResult<&Function> {
        let overloads = self
            .abi
            .function(method)
            .ok_or_else(|| BlockchainError::UnknownMethod(method.to_string()))?;

        overloads
            .iter()
            .find(|function| function.inputs.len() == arg_count)
            .ok_or_else(|| BlockchainError::ArgumentEncoding {
                method: method.to_string(),
                reason: format!(
                    "no overload takes {} arguments (declared: {})",
                    arg_count,
                    overloads
                        .iter()
                        .map(|f| f.signature())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn encode_call(&self, method: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
        let function = self.resolve(method, args.len())?;
        encode_input(function, method, args)
    }

    /// Signed, zero-value invocation of `method`.
    pub async fn call(
        &self,
        signer: &AccountIdentity,
        method: &str,
        args: &[DynSolValue],
        nonce: u64,
    ) -> BlockchainResult<TxHash> {
        self.call_with_value(signer, method, args, U256::ZERO, nonce).await
    }

    /// Signed invocation of `method` carrying `value` wei.
    pub async fn call_with_value(
        &self,
        signer: &AccountIdentity,
        method: &str,
        args: &[DynSolValue],
        value: U256,
        nonce: u64,
    ) -> BlockchainResult<TxHash> {
        let data = self.encode_call(method, args)?;

        let mut unsigned = self.builder.prepare(Some(self.address), value, data, nonce);
        unsigned.gas_limit = self.builder.client().contract_gas_limit();

        tracing::debug!(
            contract = %self.address,
            method,
            from = %signer.address(),
            nonce,
            "Invoking contract method"
        );

        self.builder.sign_and_send(signer, unsigned).await
    }

    /// Read-only call returning the decoded outputs.
    pub async fn query(&self, method: &str, args: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>> {
        let function = self.resolve(method, args.len())?;
        let data = encode_input(function, method, args)?;

        let request = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data);

        let output = self
            .builder
            .client()
            .call(request)
            .await
            .map_err(BlockchainError::Call)?;

        function
            .abi_decode_output(&output)
            .map_err(|e| BlockchainError::ArgumentEncoding {
                method: method.to_string(),
                reason: format!("undecodable output: {}", e),
            })
    }
}

fn encode_input(function: &Function, method: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
    function
        .abi_encode_input(args)
        .map(Bytes::from)
        .map_err(|e| BlockchainError::ArgumentEncoding {
            method: method.to_string(),
            reason: e.to_string(),
        })
}
