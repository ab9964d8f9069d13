//! ABI encoding for the evm-courier transaction pipeline.
//!
//! This crate builds calldata for contract-interacting transactions: the
//! word-level codec for addresses and unsigned integers, and the
//! function-call encoder that derives a 4-byte keccak-256 selector from a
//! declared signature and appends the encoded arguments in order.
//!
//! Only static (fixed-width) argument types are supported; dynamic types
//! are rejected when the signature is parsed.

pub mod call;
pub mod codec;

use thiserror::Error;

pub use call::{AbiValue, Function, ParamType};
pub use codec::{decode_address, decode_uint, encode_address, encode_uint, encode_uint_checked};

/// Errors produced by the codec and the call encoder.
///
/// All variants are local and deterministic on their input; none are
/// retryable.
#[derive(Debug, Error)]
pub enum AbiError {
	/// A value cannot be represented in the target width.
	#[error("Encoding error: {0}")]
	Encoding(String),
	/// The signature text is malformed or uses an unsupported type.
	#[error("Invalid signature: {0}")]
	InvalidSignature(String),
	/// The supplied arguments disagree with the declared signature.
	#[error("Signature mismatch: {0}")]
	SignatureMismatch(String),
}
