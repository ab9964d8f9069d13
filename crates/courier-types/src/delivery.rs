//! Transaction hash and receipt types.
//!
//! A confirmed transaction is identified by the keccak-256 hash of its
//! canonical envelope; the receipt records its on-chain execution outcome
//! and is owned by the node, referenced here by hash only.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keccak-256 hash of a transaction's canonical encoding.
///
/// Used as the confirmation key when polling for receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub [u8; 32]);

impl TransactionHash {
	/// The hash as a 0x-prefixed lowercase hex string.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0))
	}
}

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl From<B256> for TransactionHash {
	fn from(hash: B256) -> Self {
		Self(hash.0)
	}
}

/// A log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
	/// Contract that emitted the log.
	pub address: Address,
	/// Indexed topics, the first being the event signature hash.
	pub topics: Vec<B256>,
	/// Unindexed event data.
	pub data: Vec<u8>,
}

/// Execution outcome of a confirmed transaction.
///
/// Created once the network includes the transaction in a block; immutable
/// thereafter. `success == false` means the transaction executed but
/// reverted; gas was still consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// Hash of the confirmed transaction.
	pub hash: TransactionHash,
	/// Block the transaction was included in.
	pub block_number: u64,
	/// Gas consumed by the execution.
	pub gas_used: u64,
	/// Whether execution succeeded on chain.
	pub success: bool,
	/// Log entries emitted during execution.
	pub logs: Vec<ReceiptLog>,
}
