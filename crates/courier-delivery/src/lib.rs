//! Transaction submission and confirmation for the evm-courier pipeline.
//!
//! This module defines the narrow node surface the pipeline consumes
//! ([`NodeInterface`]), and the [`DeliveryService`] that broadcasts a signed
//! transaction and polls for its receipt. A transaction moves through
//! Built -> Signed -> Submitted -> {Pending, Dropped} -> Confirmed; once the
//! node accepts the broadcast, the only retryable condition is a receipt
//! that has not appeared yet.

use async_trait::async_trait;
use courier_types::{
	Address, SignedTransaction, TransactionHash, TransactionReceipt, U256,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// Error that occurs during network communication with the node.
	///
	/// The request may be retried at the caller's discretion; nothing was
	/// necessarily accepted on chain.
	#[error("Network error: {0}")]
	Network(String),
	/// The node rejected the broadcast outright, carrying its reason
	/// verbatim (nonce too low, insufficient funds, fee cap too low, ...).
	///
	/// Terminal; the transaction never entered the pool.
	#[error("Transaction dropped by node: {0}")]
	Dropped(String),
	/// The configured deadline elapsed while the receipt was still pending.
	///
	/// The transaction's on-chain fate is unresolved: it was broadcast and
	/// may still confirm later. Distinct from [`DeliveryError::Dropped`].
	#[error("Timed out after {waited_secs}s waiting for receipt of {hash}")]
	Timeout {
		/// Hash of the still-pending transaction.
		hash: TransactionHash,
		/// Seconds waited before giving up.
		waited_secs: u64,
	},
	/// The transaction executed on chain but reverted.
	///
	/// Terminal; gas was consumed even though the state changes were rolled
	/// back.
	#[error("Transaction {hash} reverted on chain (gas used: {gas_used})")]
	Reverted {
		/// Hash of the reverted transaction.
		hash: TransactionHash,
		/// Gas consumed by the reverted execution.
		gas_used: u64,
	},
}

/// Trait defining the node operations the pipeline consumes.
///
/// Everything the pipeline needs from an Ethereum-compatible node: ordering
/// and pricing inputs, gas estimation, broadcast, and receipt lookup, plus
/// two read-only queries used by the balance commands. Implementations talk
/// to a single node on a single chain.
#[async_trait]
pub trait NodeInterface: Send + Sync {
	/// Chain id of the connected network.
	async fn chain_id(&self) -> Result<u64, DeliveryError>;

	/// The account's pending-state transaction count, used as the next
	/// nonce.
	async fn pending_nonce(&self, address: Address) -> Result<u64, DeliveryError>;

	/// Suggested legacy gas price in wei.
	async fn suggest_gas_price(&self) -> Result<u128, DeliveryError>;

	/// Suggested EIP-1559 priority fee (tip) in wei.
	async fn suggest_priority_fee(&self) -> Result<u128, DeliveryError>;

	/// Estimates gas for a call against pending state.
	///
	/// `to == None` estimates a contract creation.
	async fn estimate_gas(
		&self,
		from: Address,
		to: Option<Address>,
		value: U256,
		data: &[u8],
	) -> Result<u64, DeliveryError>;

	/// Broadcasts a signed transaction to the network.
	///
	/// A node-level rejection surfaces as [`DeliveryError::Dropped`] with
	/// the node's reason.
	async fn broadcast(&self, tx: &SignedTransaction)
		-> Result<TransactionHash, DeliveryError>;

	/// Looks up the receipt for a transaction hash.
	///
	/// `Ok(None)` means the transaction is not yet included, the only
	/// state the confirmation loop is allowed to retry on.
	async fn receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;

	/// Native currency balance of an account, in wei.
	async fn native_balance(&self, address: Address) -> Result<U256, DeliveryError>;

	/// Executes a read-only call and returns the raw return data.
	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, DeliveryError>;
}

/// Service that submits transactions and waits for their confirmation.
///
/// Owns the polling policy: a fixed sleep interval between receipt lookups
/// and an optional overall deadline.
pub struct DeliveryService {
	/// Node the service talks to.
	node: Arc<dyn NodeInterface>,
	/// Sleep between receipt polls.
	poll_interval: Duration,
	/// Optional deadline for the confirmation wait.
	max_wait: Option<Duration>,
}

impl DeliveryService {
	/// Creates a new DeliveryService with the given polling policy.
	pub fn new(
		node: Arc<dyn NodeInterface>,
		poll_interval: Duration,
		max_wait: Option<Duration>,
	) -> Self {
		Self {
			node,
			poll_interval,
			max_wait,
		}
	}

	/// Broadcasts a signed transaction.
	///
	/// A rejection at broadcast time ([`DeliveryError::Dropped`]) is
	/// terminal and reported immediately; the polling loop is never
	/// entered for it.
	pub async fn submit(
		&self,
		tx: &SignedTransaction,
	) -> Result<TransactionHash, DeliveryError> {
		let hash = self.node.broadcast(tx).await?;
		tracing::info!(tx_hash = %hash, "Submitted transaction");
		Ok(hash)
	}

	/// Polls until a receipt for `hash` is observed.
	///
	/// Sleeps `poll_interval` between lookups; a missing receipt is the
	/// only retryable condition, every node error aborts immediately. When
	/// a deadline is configured, exceeding it yields
	/// [`DeliveryError::Timeout`]; the transaction may still confirm
	/// later.
	///
	/// Dropping this future stops the local poll loop only; it cannot
	/// un-submit the broadcast transaction.
	pub async fn await_receipt(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		let started = tokio::time::Instant::now();

		loop {
			if let Some(max_wait) = self.max_wait {
				if started.elapsed() >= max_wait {
					tracing::warn!(
						tx_hash = %hash,
						waited_secs = started.elapsed().as_secs(),
						"Gave up waiting for receipt; transaction may still confirm"
					);
					return Err(DeliveryError::Timeout {
						hash: *hash,
						waited_secs: started.elapsed().as_secs(),
					});
				}
			}

			match self.node.receipt(hash).await? {
				Some(receipt) => {
					tracing::info!(
						tx_hash = %hash,
						block_number = receipt.block_number,
						success = receipt.success,
						"Transaction confirmed"
					);
					return Ok(receipt);
				},
				None => {
					tracing::debug!(
						tx_hash = %hash,
						elapsed_secs = started.elapsed().as_secs(),
						"Receipt not yet available"
					);
					tokio::time::sleep(self.poll_interval).await;
				},
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::VecDeque;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	/// Scripted receipt responses for the mock node.
	enum ReceiptStep {
		NotFound,
		Found,
		Fail,
	}

	struct MockNode {
		script: Mutex<VecDeque<ReceiptStep>>,
		receipt_calls: AtomicUsize,
		reject_broadcast: Option<String>,
	}

	impl MockNode {
		fn with_script(steps: Vec<ReceiptStep>) -> Self {
			Self {
				script: Mutex::new(steps.into()),
				receipt_calls: AtomicUsize::new(0),
				reject_broadcast: None,
			}
		}

		fn rejecting(reason: &str) -> Self {
			Self {
				script: Mutex::new(VecDeque::new()),
				receipt_calls: AtomicUsize::new(0),
				reject_broadcast: Some(reason.to_string()),
			}
		}

		fn receipt_calls(&self) -> usize {
			self.receipt_calls.load(Ordering::SeqCst)
		}
	}

	fn test_hash() -> TransactionHash {
		TransactionHash([0xab; 32])
	}

	fn test_receipt() -> TransactionReceipt {
		TransactionReceipt {
			hash: test_hash(),
			block_number: 100,
			gas_used: 21_000,
			success: true,
			logs: Vec::new(),
		}
	}

	#[async_trait]
	impl NodeInterface for MockNode {
		async fn chain_id(&self) -> Result<u64, DeliveryError> {
			Ok(31337)
		}

		async fn pending_nonce(&self, _address: Address) -> Result<u64, DeliveryError> {
			Ok(0)
		}

		async fn suggest_gas_price(&self) -> Result<u128, DeliveryError> {
			Ok(1_000_000_000)
		}

		async fn suggest_priority_fee(&self) -> Result<u128, DeliveryError> {
			Ok(1_000_000_000)
		}

		async fn estimate_gas(
			&self,
			_from: Address,
			_to: Option<Address>,
			_value: U256,
			_data: &[u8],
		) -> Result<u64, DeliveryError> {
			Ok(21_000)
		}

		async fn broadcast(
			&self,
			_tx: &SignedTransaction,
		) -> Result<TransactionHash, DeliveryError> {
			match &self.reject_broadcast {
				Some(reason) => Err(DeliveryError::Dropped(reason.clone())),
				None => Ok(test_hash()),
			}
		}

		async fn receipt(
			&self,
			_hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, DeliveryError> {
			self.receipt_calls.fetch_add(1, Ordering::SeqCst);
			let step = self
				.script
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or(ReceiptStep::NotFound);
			match step {
				ReceiptStep::NotFound => Ok(None),
				ReceiptStep::Found => Ok(Some(test_receipt())),
				ReceiptStep::Fail => {
					Err(DeliveryError::Network("node unreachable".to_string()))
				},
			}
		}

		async fn native_balance(&self, _address: Address) -> Result<U256, DeliveryError> {
			Ok(U256::ZERO)
		}

		async fn call(&self, _to: Address, _data: Vec<u8>) -> Result<Vec<u8>, DeliveryError> {
			Ok(Vec::new())
		}
	}

	fn signed_tx() -> SignedTransaction {
		SignedTransaction {
			raw: vec![0x01, 0x02],
			hash: test_hash(),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_receipt_found_after_three_polls() {
		let node = Arc::new(MockNode::with_script(vec![
			ReceiptStep::NotFound,
			ReceiptStep::NotFound,
			ReceiptStep::NotFound,
			ReceiptStep::Found,
		]));
		let interval = Duration::from_secs(3);
		let service = DeliveryService::new(node.clone(), interval, None);

		let started = tokio::time::Instant::now();
		let receipt = service.await_receipt(&test_hash()).await.unwrap();

		assert_eq!(receipt, test_receipt());
		// Three not-found responses cost exactly three sleep intervals.
		assert_eq!(started.elapsed(), interval * 3);
		assert_eq!(node.receipt_calls(), 4);
	}

	#[tokio::test(start_paused = true)]
	async fn test_immediate_receipt_needs_no_sleep() {
		let node = Arc::new(MockNode::with_script(vec![ReceiptStep::Found]));
		let service = DeliveryService::new(node.clone(), Duration::from_secs(3), None);

		let started = tokio::time::Instant::now();
		service.await_receipt(&test_hash()).await.unwrap();

		assert_eq!(started.elapsed(), Duration::ZERO);
		assert_eq!(node.receipt_calls(), 1);
	}

	#[tokio::test]
	async fn test_broadcast_rejection_is_terminal() {
		let node = Arc::new(MockNode::rejecting("nonce too low"));
		let service = DeliveryService::new(node.clone(), Duration::from_secs(3), None);

		let err = service.submit(&signed_tx()).await.unwrap_err();
		match err {
			DeliveryError::Dropped(reason) => assert_eq!(reason, "nonce too low"),
			other => panic!("expected Dropped, got {:?}", other),
		}
		// The polling loop was never entered.
		assert_eq!(node.receipt_calls(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_node_error_aborts_polling() {
		let node = Arc::new(MockNode::with_script(vec![ReceiptStep::Fail]));
		let service = DeliveryService::new(node.clone(), Duration::from_secs(3), None);

		let err = service.await_receipt(&test_hash()).await.unwrap_err();
		assert!(matches!(err, DeliveryError::Network(_)));
		// Errors other than not-found never loop.
		assert_eq!(node.receipt_calls(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_deadline_yields_timeout() {
		// Receipt never appears; the deadline converts the wait into a
		// Timeout distinct from Dropped or Reverted.
		let node = Arc::new(MockNode::with_script(Vec::new()));
		let service = DeliveryService::new(
			node.clone(),
			Duration::from_secs(3),
			Some(Duration::from_secs(10)),
		);

		let err = service.await_receipt(&test_hash()).await.unwrap_err();
		match err {
			DeliveryError::Timeout { hash, waited_secs } => {
				assert_eq!(hash, test_hash());
				assert!(waited_secs >= 10);
			},
			other => panic!("expected Timeout, got {:?}", other),
		}
		// Polled at 0s, 3s, 6s, 9s; the 12s tick is past the deadline.
		assert_eq!(node.receipt_calls(), 4);
	}
}
