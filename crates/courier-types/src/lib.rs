//! Common types for the evm-courier transaction pipeline.
//!
//! This module defines the core data model shared by every pipeline stage:
//! fee parameters, unsigned and signed transactions, transaction hashes and
//! receipts, and the secret wrapper used for private key material.

/// Transaction hash and receipt types.
pub mod delivery;
/// Fee parameter types for legacy and EIP-1559 pricing.
pub mod fees;
/// Hex string formatting helpers.
pub mod format;
/// Secure wrapper for private key material.
pub mod secret;
/// Unsigned and signed transaction types.
pub mod transaction;

// Re-export the primitive types the whole pipeline is written in terms of.
pub use alloy_primitives::{Address, B256, U256};

pub use delivery::{ReceiptLog, TransactionHash, TransactionReceipt};
pub use fees::FeeParams;
pub use format::{format_units, with_0x_prefix, without_0x_prefix};
pub use secret::SecretString;
pub use transaction::{SignedTransaction, Transaction};
