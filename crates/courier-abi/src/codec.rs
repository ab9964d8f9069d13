//! Word-level encoding of addresses and unsigned integers.
//!
//! ABI words are 32 bytes. Addresses and integers are left-padded with zero
//! bytes; decoding checks that the padding is actually zero so a truncated
//! or misaligned word is rejected rather than silently reinterpreted.

use alloy_primitives::{Address, U256};

use crate::AbiError;

/// Width of an ABI word in bytes.
pub const WORD_BYTES: usize = 32;

/// Encodes an address as a left-padded 32-byte word.
pub fn encode_address(address: &Address) -> [u8; WORD_BYTES] {
	let mut word = [0u8; WORD_BYTES];
	word[12..].copy_from_slice(address.as_slice());
	word
}

/// Encodes an unsigned integer as a big-endian 32-byte word.
pub fn encode_uint(value: U256) -> [u8; WORD_BYTES] {
	value.to_be_bytes::<WORD_BYTES>()
}

/// Encodes an unsigned integer into `width_bytes` big-endian bytes.
///
/// Fails when the value does not fit the requested width.
pub fn encode_uint_checked(value: U256, width_bytes: usize) -> Result<Vec<u8>, AbiError> {
	if width_bytes == 0 || width_bytes > WORD_BYTES {
		return Err(AbiError::Encoding(format!(
			"unsupported integer width: {} bytes",
			width_bytes
		)));
	}
	if value.bit_len() > width_bytes * 8 {
		return Err(AbiError::Encoding(format!(
			"value {} does not fit in {} bytes",
			value, width_bytes
		)));
	}
	let word = value.to_be_bytes::<WORD_BYTES>();
	Ok(word[WORD_BYTES - width_bytes..].to_vec())
}

/// Decodes an address from a 32-byte word.
///
/// The 12 padding bytes must be zero.
pub fn decode_address(word: &[u8]) -> Result<Address, AbiError> {
	if word.len() < WORD_BYTES {
		return Err(AbiError::Encoding(format!(
			"address word too short: {} bytes",
			word.len()
		)));
	}
	if word[..12].iter().any(|b| *b != 0) {
		return Err(AbiError::Encoding(
			"address word has non-zero padding".to_string(),
		));
	}
	Ok(Address::from_slice(&word[12..WORD_BYTES]))
}

/// Decodes an unsigned integer from the first 32 bytes of `word`.
pub fn decode_uint(word: &[u8]) -> Result<U256, AbiError> {
	if word.len() < WORD_BYTES {
		return Err(AbiError::Encoding(format!(
			"uint word too short: {} bytes",
			word.len()
		)));
	}
	Ok(U256::from_be_slice(&word[..WORD_BYTES]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn test_address_round_trip() {
		let address = Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
		let word = encode_address(&address);
		assert_eq!(word.len(), 32);
		assert_eq!(&word[..12], &[0u8; 12]);
		assert_eq!(decode_address(&word).unwrap(), address);
	}

	#[test]
	fn test_uint_round_trip() {
		for value in [U256::ZERO, U256::from(1u64), U256::MAX] {
			let word = encode_uint(value);
			assert_eq!(decode_uint(&word).unwrap(), value);
		}
	}

	#[test]
	fn test_ten_tokens_pads_to_32_bytes() {
		// 10 tokens at 18 decimals.
		let value = U256::from_str("10000000000000000000").unwrap();
		let word = encode_uint(value);
		assert_eq!(word.len(), 32);
		assert_eq!(
			hex::encode(word),
			"0000000000000000000000000000000000000000000000008ac7230489e80000"
		);
	}

	#[test]
	fn test_checked_width_overflow() {
		// 256 fits in two bytes, not one.
		let value = U256::from(256u64);
		assert!(encode_uint_checked(value, 2).is_ok());
		assert!(matches!(
			encode_uint_checked(value, 1),
			Err(AbiError::Encoding(_))
		));
	}

	#[test]
	fn test_checked_width_bounds() {
		assert!(encode_uint_checked(U256::ZERO, 0).is_err());
		assert!(encode_uint_checked(U256::ZERO, 33).is_err());
		assert_eq!(encode_uint_checked(U256::MAX, 32).unwrap().len(), 32);
	}

	#[test]
	fn test_decode_rejects_malformed_words() {
		assert!(decode_address(&[0u8; 31]).is_err());
		assert!(decode_uint(&[0u8; 31]).is_err());

		let mut dirty = [0u8; 32];
		dirty[0] = 1;
		assert!(decode_address(&dirty).is_err());
	}
}
