//! Local private-key signer.
//!
//! Signs transactions with a secp256k1 key held in process memory. The key
//! is parsed once from a [`SecretString`] and lives inside the signer,
//! which zeroizes its scalar on drop; it is never logged or re-exposed.

use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_network::TxSignerSync;
use alloy_primitives::{Bytes, TxKind};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use courier_types::{
	without_0x_prefix, Address, FeeParams, SecretString, SignedTransaction, Transaction,
	TransactionHash,
};

use crate::{AccountError, AccountInterface};

/// Account backed by an in-memory secp256k1 private key.
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Creates a local account from a hex-encoded private key.
	///
	/// Accepts the key with or without a 0x prefix. Fails with
	/// [`AccountError::InvalidKey`] on malformed key material.
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			without_0x_prefix(key)
				.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		Ok(Self { signer })
	}

	fn sign_envelope(&self, tx: &Transaction) -> Result<TxEnvelope, AccountError> {
		let to = match tx.to {
			Some(address) => TxKind::Call(address),
			None => TxKind::Create,
		};

		let envelope = match tx.fees {
			FeeParams::Legacy { gas_price } => {
				let mut inner = TxLegacy {
					chain_id: Some(tx.chain_id),
					nonce: tx.nonce,
					gas_price,
					gas_limit: tx.gas_limit,
					to,
					value: tx.value,
					input: Bytes::from(tx.data.clone()),
				};
				let signature = self
					.signer
					.sign_transaction_sync(&mut inner)
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				inner.into_signed(signature).into()
			},
			FeeParams::Eip1559 {
				max_priority_fee_per_gas,
				max_fee_per_gas,
			} => {
				let mut inner = TxEip1559 {
					chain_id: tx.chain_id,
					nonce: tx.nonce,
					gas_limit: tx.gas_limit,
					max_fee_per_gas,
					max_priority_fee_per_gas,
					to,
					value: tx.value,
					access_list: Default::default(),
					input: Bytes::from(tx.data.clone()),
				};
				let signature = self
					.signer
					.sign_transaction_sync(&mut inner)
					.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
				inner.into_signed(signature).into()
			},
		};

		Ok(envelope)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn sign_transaction(
		&self,
		tx: &Transaction,
	) -> Result<SignedTransaction, AccountError> {
		let envelope = self.sign_envelope(tx)?;
		let raw = envelope.encoded_2718();
		let hash = TransactionHash(envelope.tx_hash().0);
		Ok(SignedTransaction { raw, hash })
	}
}

/// Factory function to create a local account from configuration.
pub fn create_account(
	private_key: &SecretString,
) -> Result<Box<dyn AccountInterface>, AccountError> {
	Ok(Box::new(LocalAccount::new(private_key)?))
}
