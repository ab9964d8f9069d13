//! Function-call encoding from a declared signature.
//!
//! A [`Function`] is parsed from canonical signature text such as
//! `"transfer(address,uint256)"`. Its selector is the first four bytes of
//! the keccak-256 hash of that canonical text, and calldata is the selector
//! followed by each argument encoded as a 32-byte word in declared order.

use alloy_primitives::{keccak256, Address, U256};
use std::fmt;

use crate::codec::{encode_address, encode_uint, WORD_BYTES};
use crate::AbiError;

/// Selector width in bytes.
pub const SELECTOR_BYTES: usize = 4;

/// A static ABI parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
	/// 20-byte account or contract address.
	Address,
	/// Unsigned integer of the given bit width (8..=256, multiple of 8).
	Uint(usize),
	/// Boolean, encoded as a 0/1 word.
	Bool,
	/// Fixed byte array of the given length (1..=32), right-padded.
	FixedBytes(usize),
}

impl ParamType {
	/// Parses a single canonical type token.
	///
	/// Dynamic types (`string`, `bytes`, arrays) are rejected here so the
	/// encoder never meets one.
	fn parse(token: &str) -> Result<Self, AbiError> {
		match token {
			"address" => return Ok(ParamType::Address),
			"bool" => return Ok(ParamType::Bool),
			"uint" => return Ok(ParamType::Uint(256)),
			"string" | "bytes" => {
				return Err(AbiError::InvalidSignature(format!(
					"dynamic type '{}' is not supported",
					token
				)))
			},
			_ => {},
		}
		if token.ends_with(']') {
			return Err(AbiError::InvalidSignature(format!(
				"array type '{}' is not supported",
				token
			)));
		}
		if let Some(bits) = token.strip_prefix("uint") {
			let bits: usize = bits.parse().map_err(|_| {
				AbiError::InvalidSignature(format!("malformed type '{}'", token))
			})?;
			if bits == 0 || bits > 256 || bits % 8 != 0 {
				return Err(AbiError::InvalidSignature(format!(
					"unsupported integer width '{}'",
					token
				)));
			}
			return Ok(ParamType::Uint(bits));
		}
		if let Some(len) = token.strip_prefix("bytes") {
			let len: usize = len.parse().map_err(|_| {
				AbiError::InvalidSignature(format!("malformed type '{}'", token))
			})?;
			if len == 0 || len > 32 {
				return Err(AbiError::InvalidSignature(format!(
					"unsupported fixed-bytes length '{}'",
					token
				)));
			}
			return Ok(ParamType::FixedBytes(len));
		}
		Err(AbiError::InvalidSignature(format!(
			"unknown type '{}'",
			token
		)))
	}
}

impl fmt::Display for ParamType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ParamType::Address => write!(f, "address"),
			ParamType::Uint(bits) => write!(f, "uint{}", bits),
			ParamType::Bool => write!(f, "bool"),
			ParamType::FixedBytes(len) => write!(f, "bytes{}", len),
		}
	}
}

/// A typed argument value for a function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
	/// An address argument.
	Address(Address),
	/// An unsigned integer argument.
	Uint(U256),
	/// A boolean argument.
	Bool(bool),
	/// A fixed byte array argument; length must match the declared type.
	FixedBytes(Vec<u8>),
}

impl AbiValue {
	/// Encodes the value as a 32-byte word under the declared type.
	fn encode(&self, ty: &ParamType) -> Result<[u8; WORD_BYTES], AbiError> {
		match (self, ty) {
			(AbiValue::Address(address), ParamType::Address) => Ok(encode_address(address)),
			(AbiValue::Uint(value), ParamType::Uint(bits)) => {
				if value.bit_len() > *bits {
					return Err(AbiError::Encoding(format!(
						"value {} does not fit in uint{}",
						value, bits
					)));
				}
				Ok(encode_uint(*value))
			},
			(AbiValue::Bool(flag), ParamType::Bool) => {
				let mut word = [0u8; WORD_BYTES];
				word[WORD_BYTES - 1] = *flag as u8;
				Ok(word)
			},
			(AbiValue::FixedBytes(bytes), ParamType::FixedBytes(len)) => {
				if bytes.len() != *len {
					return Err(AbiError::Encoding(format!(
						"expected {} bytes for bytes{}, got {}",
						len,
						len,
						bytes.len()
					)));
				}
				let mut word = [0u8; WORD_BYTES];
				word[..bytes.len()].copy_from_slice(bytes);
				Ok(word)
			},
			(value, ty) => Err(AbiError::SignatureMismatch(format!(
				"argument {:?} does not match declared type {}",
				value, ty
			))),
		}
	}
}

/// A parsed function signature with static parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
	name: String,
	inputs: Vec<ParamType>,
}

impl Function {
	/// Parses canonical signature text like `"transfer(address,uint256)"`.
	pub fn parse(signature: &str) -> Result<Self, AbiError> {
		let open = signature.find('(').ok_or_else(|| {
			AbiError::InvalidSignature(format!("missing '(' in '{}'", signature))
		})?;
		if !signature.ends_with(')') {
			return Err(AbiError::InvalidSignature(format!(
				"missing ')' in '{}'",
				signature
			)));
		}
		let name = &signature[..open];
		if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return Err(AbiError::InvalidSignature(format!(
				"malformed function name in '{}'",
				signature
			)));
		}
		let params = &signature[open + 1..signature.len() - 1];
		let inputs = if params.is_empty() {
			Vec::new()
		} else {
			params
				.split(',')
				.map(|token| ParamType::parse(token.trim()))
				.collect::<Result<Vec<_>, _>>()?
		};
		Ok(Self {
			name: name.to_string(),
			inputs,
		})
	}

	/// The declared parameter types.
	pub fn inputs(&self) -> &[ParamType] {
		&self.inputs
	}

	/// The canonical signature text the selector is derived from.
	///
	/// Aliases are normalized, so `"transfer(address,uint)"` and
	/// `"transfer(address,uint256)"` share a selector.
	pub fn canonical_signature(&self) -> String {
		let params = self
			.inputs
			.iter()
			.map(ParamType::to_string)
			.collect::<Vec<_>>()
			.join(",");
		format!("{}({})", self.name, params)
	}

	/// First four bytes of the keccak-256 hash of the canonical signature.
	pub fn selector(&self) -> [u8; SELECTOR_BYTES] {
		let hash = keccak256(self.canonical_signature().as_bytes());
		let mut selector = [0u8; SELECTOR_BYTES];
		selector.copy_from_slice(&hash[..SELECTOR_BYTES]);
		selector
	}

	/// Builds calldata: selector followed by each argument word in order.
	pub fn encode_call(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
		if args.len() != self.inputs.len() {
			return Err(AbiError::SignatureMismatch(format!(
				"{} expects {} arguments, got {}",
				self.canonical_signature(),
				self.inputs.len(),
				args.len()
			)));
		}
		let mut data = Vec::with_capacity(SELECTOR_BYTES + args.len() * WORD_BYTES);
		data.extend_from_slice(&self.selector());
		for (value, ty) in args.iter().zip(&self.inputs) {
			data.extend_from_slice(&value.encode(ty)?);
		}
		Ok(data)
	}
}
