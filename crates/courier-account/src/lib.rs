//! Account management for the evm-courier pipeline.
//!
//! This module defines the signing capability the pipeline depends on: any
//! implementation that can report its address and produce a chain-bound
//! signature over an unsigned transaction. The pipeline never sees raw key
//! material: it talks to the capability, and the capability owner decides
//! where the key lives.

use async_trait::async_trait;
use courier_types::{Address, SignedTransaction, Transaction};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// Error that occurs when signing operations fail.
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	/// Error that occurs when a cryptographic key is invalid or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

/// Trait defining the signing capability for a sending account.
///
/// Implementations must be stateless given their inputs: signing the same
/// transaction twice yields the same signature, and nothing about the
/// transaction is cached between calls.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// The address transactions are sent from.
	///
	/// Derivable from the public key; used for nonce queries and gas
	/// estimation.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs an unsigned transaction.
	///
	/// The chain id embedded in the transaction is folded into the
	/// signature (EIP-155 for legacy transactions, the typed envelope's own
	/// chain binding for EIP-1559), so the result cannot be replayed on
	/// another network. Returns the canonical envelope bytes together with
	/// the transaction hash derived from them.
	async fn sign_transaction(&self, tx: &Transaction)
		-> Result<SignedTransaction, AccountError>;
}

/// Service that manages account operations.
///
/// Thin wrapper around an [`AccountInterface`] implementation, giving the
/// rest of the pipeline a concrete type to hold.
pub struct AccountService {
	/// The underlying account implementation.
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	/// Creates a new AccountService with the specified implementation.
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	/// Retrieves the sending address of the managed account.
	pub async fn address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	/// Signs a transaction using the managed account.
	pub async fn sign(&self, tx: &Transaction) -> Result<SignedTransaction, AccountError> {
		self.implementation.sign_transaction(tx).await
	}
}
