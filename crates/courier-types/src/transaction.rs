//! Unsigned and signed transaction types.
//!
//! An unsigned [`Transaction`] aggregates everything the signer needs to
//! produce a chain-bound signature; it is immutable once built. The
//! [`SignedTransaction`] carries the canonical envelope bytes ready for
//! broadcast together with the hash derived from them.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{FeeParams, TransactionHash};

/// An unsigned transaction, ready for signing.
///
/// `to == None` denotes a contract-creation transaction; everything else
/// must carry a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Chain the transaction is bound to (replay protection).
	pub chain_id: u64,
	/// Sender's pending-transaction count at build time.
	pub nonce: u64,
	/// Recipient account or contract, absent for contract creation.
	pub to: Option<Address>,
	/// Native value transferred, in wei.
	pub value: U256,
	/// Upper bound on gas consumption.
	pub gas_limit: u64,
	/// Gas pricing parameters.
	pub fees: FeeParams,
	/// Calldata: empty for plain transfers, selector + arguments otherwise.
	pub data: Vec<u8>,
}

/// A signed transaction in its canonical wire encoding.
///
/// `raw` is the network serialization (RLP for legacy transactions, the
/// type-prefixed EIP-2718 envelope for EIP-1559); `hash` is the keccak-256
/// of exactly those bytes and keys the receipt lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
	/// Canonical envelope bytes, ready for broadcast.
	pub raw: Vec<u8>,
	/// Hash of the canonical envelope.
	pub hash: TransactionHash,
}

impl SignedTransaction {
	/// The raw envelope bytes.
	pub fn raw(&self) -> &[u8] {
		&self.raw
	}
}
