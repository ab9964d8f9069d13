//! Alloy-backed node implementation.
//!
//! Implements [`NodeInterface`] over an HTTP JSON-RPC endpoint using the
//! Alloy provider stack. Broadcast rejections are separated from transport
//! failures by inspecting the RPC error payload: an error response from the
//! node is a [`DeliveryError::Dropped`] with the node's reason verbatim,
//! everything else is a [`DeliveryError::Network`].

use alloy_consensus::TxReceipt;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_transport_http::Http;
use async_trait::async_trait;
use courier_types::{
	ReceiptLog, SignedTransaction, TransactionHash, TransactionReceipt,
};
use std::sync::Arc;

use crate::{DeliveryError, NodeInterface};

/// Node access over HTTP via the Alloy provider.
pub struct AlloyNode {
	/// Underlying JSON-RPC provider.
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
}

impl AlloyNode {
	/// Creates a node client for the given HTTP RPC endpoint.
	pub fn new(rpc_url: &str) -> Result<Self, DeliveryError> {
		let url = rpc_url
			.parse()
			.map_err(|e| DeliveryError::Network(format!("Invalid RPC URL: {}", e)))?;

		let provider = ProviderBuilder::new().on_http(url);

		Ok(Self {
			provider: Arc::new(provider)
				as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
		})
	}
}

#[async_trait]
impl NodeInterface for AlloyNode {
	async fn chain_id(&self) -> Result<u64, DeliveryError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn pending_nonce(&self, address: Address) -> Result<u64, DeliveryError> {
		self.provider
			.get_transaction_count(address)
			.pending()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get nonce: {}", e)))
	}

	async fn suggest_gas_price(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_gas_price()
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get gas price: {}", e)))
	}

	async fn suggest_priority_fee(&self) -> Result<u128, DeliveryError> {
		self.provider
			.get_max_priority_fee_per_gas()
			.await
			.map_err(|e| {
				DeliveryError::Network(format!("Failed to get priority fee: {}", e))
			})
	}

	async fn estimate_gas(
		&self,
		from: Address,
		to: Option<Address>,
		value: U256,
		data: &[u8],
	) -> Result<u64, DeliveryError> {
		let mut request = TransactionRequest::default()
			.from(from)
			.value(value)
			.input(data.to_vec().into());
		if let Some(to) = to {
			request = request.to(to);
		}

		self.provider
			.estimate_gas(&request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to estimate gas: {}", e)))
	}

	async fn broadcast(
		&self,
		tx: &SignedTransaction,
	) -> Result<TransactionHash, DeliveryError> {
		let pending = self
			.provider
			.send_raw_transaction(tx.raw())
			.await
			.map_err(|e| match e.as_error_resp() {
				// An error response is the node refusing the transaction;
				// surface its reason and do not retry.
				Some(payload) => DeliveryError::Dropped(payload.message.to_string()),
				None => {
					DeliveryError::Network(format!("Failed to broadcast transaction: {}", e))
				},
			})?;

		Ok(TransactionHash(pending.tx_hash().0))
	}

	async fn receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let tx_hash = B256::from(hash.0);

		match self.provider.get_transaction_receipt(tx_hash).await {
			Ok(Some(receipt)) => {
				let logs = receipt
					.inner
					.logs()
					.iter()
					.map(|log| ReceiptLog {
						address: log.inner.address,
						topics: log.inner.data.topics().to_vec(),
						data: log.inner.data.data.to_vec(),
					})
					.collect();

				Ok(Some(TransactionReceipt {
					hash: TransactionHash(receipt.transaction_hash.0),
					block_number: receipt.block_number.unwrap_or(0),
					gas_used: receipt.gas_used as u64,
					success: receipt.status(),
					logs,
				}))
			},
			Ok(None) => Ok(None),
			Err(e) => Err(DeliveryError::Network(format!(
				"Failed to get receipt: {}",
				e
			))),
		}
	}

	async fn native_balance(&self, address: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| DeliveryError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, DeliveryError> {
		let request = TransactionRequest::default().to(to).input(data.into());

		let result = self
			.provider
			.call(&request)
			.await
			.map_err(|e| DeliveryError::Network(format!("Call failed: {}", e)))?;

		Ok(result.to_vec())
	}
}
