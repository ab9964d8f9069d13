//! Core pipeline for the evm-courier system.
//!
//! The [`Courier`] facade turns a logical intent (send native value, send
//! ERC-20 tokens, invoke a contract method) into a confirmed on-chain
//! transaction. Each operation runs the same sequence: read the sender's
//! pending nonce, compute fee parameters, encode calldata, build and sign
//! the transaction, broadcast it, and poll until a receipt appears.
//!
//! Nonce assignment assumes single-writer access per sending account:
//! concurrent transactions from the same account must be serialized by the
//! caller, or they will race for the same pending-count value.

pub mod builder;

use courier_abi::{decode_uint, AbiError, AbiValue, Function};
use courier_account::{AccountError, AccountService};
use courier_delivery::{DeliveryError, DeliveryService, NodeInterface};
use courier_fees::{FeeError, FeeEstimator};
use courier_types::{Address, TransactionReceipt, U256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use builder::{BuildError, TransactionBuilder};

/// Intrinsic gas cost of a plain value transfer; fixed by the protocol, so
/// no estimation round-trip is needed.
pub const VALUE_TRANSFER_GAS: u64 = 21_000;

/// ERC-20 transfer signature used for token transfers.
const ERC20_TRANSFER: &str = "transfer(address,uint256)";

/// ERC-20 balance query signature.
const ERC20_BALANCE_OF: &str = "balanceOf(address)";

/// Errors crossing the pipeline boundary.
///
/// Every variant preserves the underlying kind and message so the caller
/// can decide whether a retry makes sense. The pipeline itself retries only
/// the receipt-not-yet-found condition, nothing else.
#[derive(Debug, Error)]
pub enum CourierError {
	/// Calldata encoding failed; local and non-retryable.
	#[error(transparent)]
	Abi(#[from] AbiError),
	/// Transaction assembly failed validation; local and non-retryable.
	#[error(transparent)]
	Build(#[from] BuildError),
	/// Fee parameters could not be computed.
	#[error(transparent)]
	Fee(#[from] FeeError),
	/// Signing failed; key material or input is malformed.
	#[error(transparent)]
	Account(#[from] AccountError),
	/// Submission or confirmation failed; see [`DeliveryError`] for which
	/// outcomes are terminal.
	#[error(transparent)]
	Delivery(#[from] DeliveryError),
	/// The node reports a different chain than the configuration expects.
	#[error("Chain id mismatch: node reports {actual}, configured {expected}")]
	ChainIdMismatch {
		/// Chain id from configuration.
		expected: u64,
		/// Chain id reported by the node.
		actual: u64,
	},
}

/// The transaction pipeline facade.
///
/// Owns the node handle, the signing account, the fee strategy, and the
/// delivery policy for one chain.
pub struct Courier {
	node: Arc<dyn NodeInterface>,
	delivery: DeliveryService,
	account: AccountService,
	fees: Box<dyn FeeEstimator>,
	chain_id: u64,
}

impl std::fmt::Debug for Courier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Courier")
			.field("chain_id", &self.chain_id)
			.finish_non_exhaustive()
	}
}

impl Courier {
	/// Creates a courier bound to the node's chain.
	///
	/// Fetches the chain id once and embeds it in every transaction. When
	/// `expected_chain_id` is set, a mismatch with the node's report fails
	/// here rather than surfacing later as a confusing signature rejection.
	pub async fn new(
		node: Arc<dyn NodeInterface>,
		account: AccountService,
		fees: Box<dyn FeeEstimator>,
		poll_interval: Duration,
		max_wait: Option<Duration>,
		expected_chain_id: Option<u64>,
	) -> Result<Self, CourierError> {
		let chain_id = node.chain_id().await?;
		if let Some(expected) = expected_chain_id {
			if expected != chain_id {
				return Err(CourierError::ChainIdMismatch {
					expected,
					actual: chain_id,
				});
			}
		}

		let delivery = DeliveryService::new(node.clone(), poll_interval, max_wait);

		Ok(Self {
			node,
			delivery,
			account,
			fees,
			chain_id,
		})
	}

	/// The chain this courier sends on.
	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// Sends native value to `to` and waits for confirmation.
	///
	/// Uses the fixed intrinsic gas cost of a value transfer.
	pub async fn send_value_transfer(
		&self,
		to: Address,
		amount: U256,
	) -> Result<TransactionReceipt, CourierError> {
		tracing::info!(to = %to, amount = %amount, "Sending value transfer");
		self.execute(Some(to), amount, Vec::new(), Some(VALUE_TRANSFER_GAS))
			.await
	}

	/// Sends `amount` token units of the ERC-20 at `token` to `to`.
	///
	/// Builds `transfer(address,uint256)` calldata; the native value is
	/// zero and gas comes from estimation against pending state.
	pub async fn send_token_transfer(
		&self,
		token: Address,
		to: Address,
		amount: U256,
	) -> Result<TransactionReceipt, CourierError> {
		let function = Function::parse(ERC20_TRANSFER)?;
		let data = function.encode_call(&[AbiValue::Address(to), AbiValue::Uint(amount)])?;

		tracing::info!(token = %token, to = %to, amount = %amount, "Sending token transfer");
		self.execute(Some(token), U256::ZERO, data, None).await
	}

	/// Invokes a state-changing contract method and waits for confirmation.
	///
	/// The signature uses canonical ABI text (static argument types only);
	/// `value` is the native value attached to the call.
	pub async fn invoke_contract_method(
		&self,
		contract: Address,
		signature: &str,
		args: &[AbiValue],
		value: U256,
	) -> Result<TransactionReceipt, CourierError> {
		let function = Function::parse(signature)?;
		let data = function.encode_call(args)?;

		tracing::info!(contract = %contract, method = %function.canonical_signature(), "Invoking contract method");
		self.execute(Some(contract), value, data, None).await
	}

	/// Native currency balance of `address`, in wei.
	pub async fn native_balance(&self, address: Address) -> Result<U256, CourierError> {
		Ok(self.node.native_balance(address).await?)
	}

	/// ERC-20 balance of `holder` on the token at `token`.
	pub async fn token_balance(
		&self,
		token: Address,
		holder: Address,
	) -> Result<U256, CourierError> {
		let function = Function::parse(ERC20_BALANCE_OF)?;
		let data = function.encode_call(&[AbiValue::Address(holder)])?;
		let result = self.node.call(token, data).await?;
		Ok(decode_uint(&result)?)
	}

	/// Runs one intent through the full pipeline.
	///
	/// `gas_limit == None` estimates gas against pending state with the
	/// same sender, recipient, value, and calldata the transaction will
	/// carry; the estimate is used as-is.
	async fn execute(
		&self,
		to: Option<Address>,
		value: U256,
		data: Vec<u8>,
		gas_limit: Option<u64>,
	) -> Result<TransactionReceipt, CourierError> {
		let from = self.account.address().await?;
		let nonce = self.node.pending_nonce(from).await?;
		let fees = self.fees.estimate(self.node.as_ref()).await?;
		let gas_limit = match gas_limit {
			Some(gas) => gas,
			None => self.node.estimate_gas(from, to, value, &data).await?,
		};

		let mut builder = TransactionBuilder::new(self.chain_id)
			.nonce(nonce)
			.value(value)
			.gas_limit(gas_limit)
			.fees(fees)
			.data(data);
		if let Some(to) = to {
			builder = builder.to(to);
		}
		let tx = builder.build()?;

		let signed = self.account.sign(&tx).await?;
		tracing::debug!(nonce, gas_limit, tx_hash = %signed.hash, "Signed transaction");

		let hash = self.delivery.submit(&signed).await?;
		let receipt = self.delivery.await_receipt(&hash).await?;

		if !receipt.success {
			return Err(DeliveryError::Reverted {
				hash: receipt.hash,
				gas_used: receipt.gas_used,
			}
			.into());
		}

		Ok(receipt)
	}
}

// Re-exported so callers of the facade can name argument values and hashes
// without depending on every pipeline crate.
pub use courier_abi::AbiValue as CallArgument;
pub use courier_types::TransactionHash as TxHash;

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use courier_account::implementations::local::LocalAccount;
	use courier_types::{SecretString, SignedTransaction, TransactionHash};
	use std::str::FromStr;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;

	const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn recipient() -> Address {
		Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
	}

	fn token() -> Address {
		Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap()
	}

	/// Scripted single-chain node for pipeline tests.
	struct MockNode {
		nonce: u64,
		estimate_calls: AtomicUsize,
		estimated_data: Mutex<Option<Vec<u8>>>,
		broadcasts: Mutex<Vec<SignedTransaction>>,
		tip: u128,
		receipt_success: bool,
		fail_fees: bool,
	}

	impl MockNode {
		fn healthy() -> Self {
			Self {
				nonce: 5,
				estimate_calls: AtomicUsize::new(0),
				estimated_data: Mutex::new(None),
				broadcasts: Mutex::new(Vec::new()),
				tip: 1_500_000_000,
				receipt_success: true,
				fail_fees: false,
			}
		}
	}

	#[async_trait]
	impl NodeInterface for MockNode {
		async fn chain_id(&self) -> Result<u64, DeliveryError> {
			Ok(31337)
		}

		async fn pending_nonce(&self, _address: Address) -> Result<u64, DeliveryError> {
			Ok(self.nonce)
		}

		async fn suggest_gas_price(&self) -> Result<u128, DeliveryError> {
			Ok(100_000_000_000)
		}

		async fn suggest_priority_fee(&self) -> Result<u128, DeliveryError> {
			if self.fail_fees {
				return Err(DeliveryError::Network("fee oracle offline".to_string()));
			}
			Ok(self.tip)
		}

		async fn estimate_gas(
			&self,
			_from: Address,
			_to: Option<Address>,
			_value: U256,
			data: &[u8],
		) -> Result<u64, DeliveryError> {
			self.estimate_calls.fetch_add(1, Ordering::SeqCst);
			*self.estimated_data.lock().unwrap() = Some(data.to_vec());
			Ok(52_000)
		}

		async fn broadcast(
			&self,
			tx: &SignedTransaction,
		) -> Result<TransactionHash, DeliveryError> {
			self.broadcasts.lock().unwrap().push(tx.clone());
			Ok(tx.hash)
		}

		async fn receipt(
			&self,
			hash: &TransactionHash,
		) -> Result<Option<TransactionReceipt>, DeliveryError> {
			Ok(Some(TransactionReceipt {
				hash: *hash,
				block_number: 7,
				gas_used: 21_000,
				success: self.receipt_success,
				logs: Vec::new(),
			}))
		}

		async fn native_balance(&self, _address: Address) -> Result<U256, DeliveryError> {
			Ok(U256::from(42u64))
		}

		async fn call(&self, _to: Address, _data: Vec<u8>) -> Result<Vec<u8>, DeliveryError> {
			// 10 tokens at 18 decimals, as a single return word.
			let mut word = [0u8; 32];
			word[24..].copy_from_slice(&[0x8a, 0xc7, 0x23, 0x04, 0x89, 0xe8, 0x00, 0x00]);
			Ok(word.to_vec())
		}
	}

	async fn courier_with(node: Arc<MockNode>) -> Courier {
		let account = AccountService::new(Box::new(
			LocalAccount::new(&SecretString::from(TEST_KEY)).unwrap(),
		));
		let fees = courier_fees::create_estimator("eip1559", 2).unwrap();
		Courier::new(
			node,
			account,
			fees,
			Duration::from_secs(1),
			None,
			Some(31337),
		)
		.await
		.unwrap()
	}

	#[tokio::test]
	async fn test_value_transfer_uses_fixed_gas() {
		let node = Arc::new(MockNode::healthy());
		let courier = courier_with(node.clone()).await;

		let receipt = courier
			.send_value_transfer(recipient(), U256::from(10u64).pow(U256::from(18u64)))
			.await
			.unwrap();

		assert!(receipt.success);
		// Plain transfers never hit the estimator.
		assert_eq!(node.estimate_calls.load(Ordering::SeqCst), 0);
		assert_eq!(node.broadcasts.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_token_transfer_estimates_with_calldata() {
		let node = Arc::new(MockNode::healthy());
		let courier = courier_with(node.clone()).await;

		let amount = U256::from_str("10000000000000000000").unwrap();
		courier
			.send_token_transfer(token(), recipient(), amount)
			.await
			.unwrap();

		assert_eq!(node.estimate_calls.load(Ordering::SeqCst), 1);
		let data = node.estimated_data.lock().unwrap().clone().unwrap();
		// Estimation must see exactly the calldata the transaction carries.
		assert_eq!(
			hex::encode(&data),
			concat!(
				"a9059cbb",
				"00000000000000000000000070997970c51812dc3a010c7d01b50e0d17dc79c8",
				"0000000000000000000000000000000000000000000000008ac7230489e80000",
			)
		);
	}

	#[tokio::test]
	async fn test_contract_invocation_round_trip() {
		let node = Arc::new(MockNode::healthy());
		let courier = courier_with(node.clone()).await;

		let receipt = courier
			.invoke_contract_method(
				token(),
				"setItem(bytes32,bytes32)",
				&[
					AbiValue::FixedBytes(vec![1u8; 32]),
					AbiValue::FixedBytes(vec![2u8; 32]),
				],
				U256::ZERO,
			)
			.await
			.unwrap();

		assert_eq!(receipt.block_number, 7);
		assert_eq!(node.estimate_calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_reverted_receipt_surfaces_gas_used() {
		let node = Arc::new(MockNode {
			receipt_success: false,
			..MockNode::healthy()
		});
		let courier = courier_with(node).await;

		let err = courier
			.send_value_transfer(recipient(), U256::from(1u64))
			.await
			.unwrap_err();
		match err {
			CourierError::Delivery(DeliveryError::Reverted { gas_used, .. }) => {
				assert_eq!(gas_used, 21_000);
			},
			other => panic!("expected Reverted, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_fee_failure_aborts_before_signing() {
		let node = Arc::new(MockNode {
			fail_fees: true,
			..MockNode::healthy()
		});
		let courier = courier_with(node.clone()).await;

		let err = courier
			.send_value_transfer(recipient(), U256::from(1u64))
			.await
			.unwrap_err();
		assert!(matches!(err, CourierError::Fee(FeeError::Unavailable(_))));
		assert!(node.broadcasts.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_chain_id_mismatch_fails_at_construction() {
		let node = Arc::new(MockNode::healthy());
		let account = AccountService::new(Box::new(
			LocalAccount::new(&SecretString::from(TEST_KEY)).unwrap(),
		));
		let fees = courier_fees::create_estimator("eip1559", 2).unwrap();

		let err = Courier::new(node, account, fees, Duration::from_secs(1), None, Some(1))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			CourierError::ChainIdMismatch {
				expected: 1,
				actual: 31337,
			}
		));
	}

	#[tokio::test]
	async fn test_balance_queries() {
		let node = Arc::new(MockNode::healthy());
		let courier = courier_with(node).await;

		let native = courier.native_balance(recipient()).await.unwrap();
		assert_eq!(native, U256::from(42u64));

		let tokens = courier.token_balance(token(), recipient()).await.unwrap();
		assert_eq!(tokens, U256::from_str("10000000000000000000").unwrap());
	}

	#[tokio::test]
	async fn test_bad_signature_rejected_before_any_node_write() {
		let node = Arc::new(MockNode::healthy());
		let courier = courier_with(node.clone()).await;

		let err = courier
			.invoke_contract_method(token(), "store(string)", &[], U256::ZERO)
			.await
			.unwrap_err();
		assert!(matches!(err, CourierError::Abi(_)));
		assert!(node.broadcasts.lock().unwrap().is_empty());
	}
}
