//! Hex string formatting helpers.
//!
//! Display conversions only. Values produced here are never fed back into
//! on-chain amounts.

use alloy_primitives::U256;

/// Adds a "0x" prefix to a hex string if missing.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a leading "0x" / "0X" from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Formats a raw on-chain amount as a human-scaled decimal string.
///
/// Lossy presentation helper: `1500000000000000000` with 18 decimals
/// becomes `"1.5"`. Trailing zeros in the fractional part are trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
	let raw = amount.to_string();
	if decimals == 0 {
		return raw;
	}

	let places = decimals as usize;
	let (integer, fraction) = if raw.len() <= places {
		("0".to_string(), format!("{:0>width$}", raw, width = places))
	} else {
		let split = raw.len() - places;
		(raw[..split].to_string(), raw[split..].to_string())
	};

	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		integer
	} else {
		format!("{}.{}", integer, fraction)
	}
}
