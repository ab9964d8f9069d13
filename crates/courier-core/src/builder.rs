//! Transaction assembly.
//!
//! [`TransactionBuilder`] aggregates the ordering, pricing, and payload
//! inputs into an immutable [`Transaction`], validating the invariants that
//! must hold before signing: a positive gas limit, a recipient unless this
//! is a contract creation, and a fee cap that covers the tip. Building is
//! pure; identical inputs always produce identical transactions.

use courier_types::{Address, FeeParams, Transaction, U256};
use thiserror::Error;

/// Errors that can occur while assembling a transaction.
#[derive(Debug, Error)]
pub enum BuildError {
	/// A required input was never supplied.
	#[error("Missing field: {0}")]
	MissingField(&'static str),
	/// The gas limit is zero.
	#[error("Gas limit must be positive")]
	InvalidGasLimit,
	/// The fee parameters are internally inconsistent.
	#[error("Invalid fees: {0}")]
	InvalidFees(String),
	/// No recipient and no deploy code; the transaction would do nothing.
	#[error("Recipient required for a non-creation transaction")]
	MissingRecipient,
}

/// Builder for an unsigned [`Transaction`].
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
	chain_id: u64,
	nonce: Option<u64>,
	to: Option<Address>,
	value: U256,
	gas_limit: Option<u64>,
	fees: Option<FeeParams>,
	data: Vec<u8>,
}

impl TransactionBuilder {
	/// Starts a builder for the given chain.
	pub fn new(chain_id: u64) -> Self {
		Self {
			chain_id,
			nonce: None,
			to: None,
			value: U256::ZERO,
			gas_limit: None,
			fees: None,
			data: Vec::new(),
		}
	}

	/// Sets the sender's pending-transaction count.
	pub fn nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	/// Sets the recipient. Leave unset for contract creation.
	pub fn to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	/// Sets the native value transferred, in wei.
	pub fn value(mut self, value: U256) -> Self {
		self.value = value;
		self
	}

	/// Sets the gas limit.
	pub fn gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	/// Sets the fee parameters.
	pub fn fees(mut self, fees: FeeParams) -> Self {
		self.fees = Some(fees);
		self
	}

	/// Sets the calldata (or deploy code for a creation).
	pub fn data(mut self, data: Vec<u8>) -> Self {
		self.data = data;
		self
	}

	/// Validates the inputs and produces the immutable transaction.
	pub fn build(self) -> Result<Transaction, BuildError> {
		let nonce = self.nonce.ok_or(BuildError::MissingField("nonce"))?;
		let gas_limit = self.gas_limit.ok_or(BuildError::MissingField("gas_limit"))?;
		let fees = self.fees.ok_or(BuildError::MissingField("fees"))?;

		if gas_limit == 0 {
			return Err(BuildError::InvalidGasLimit);
		}
		if self.to.is_none() && self.data.is_empty() {
			return Err(BuildError::MissingRecipient);
		}
		if let FeeParams::Eip1559 {
			max_priority_fee_per_gas,
			max_fee_per_gas,
		} = fees
		{
			if max_fee_per_gas < max_priority_fee_per_gas {
				return Err(BuildError::InvalidFees(format!(
					"fee cap {} is below tip {}",
					max_fee_per_gas, max_priority_fee_per_gas
				)));
			}
		}

		Ok(Transaction {
			chain_id: self.chain_id,
			nonce,
			to: self.to,
			value: self.value,
			gas_limit,
			fees,
			data: self.data,
		})
	}
}
