//! Fee parameters for transaction pricing.
//!
//! A transaction is priced either with a single legacy gas price or with the
//! EIP-1559 tip / fee-cap pair. The variant chosen here decides which
//! transaction envelope the signer produces.

use serde::{Deserialize, Serialize};

/// Gas pricing for a transaction.
///
/// All values are denominated in wei per gas unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeParams {
	/// Single gas price, pre-EIP-1559 pricing.
	Legacy {
		/// Price paid per gas unit.
		gas_price: u128,
	},
	/// EIP-1559 dynamic-fee pricing.
	///
	/// Invariant: `max_fee_per_gas >= max_priority_fee_per_gas`. The fee cap
	/// must cover `base_fee + tip` at inclusion time or the transaction
	/// stalls.
	Eip1559 {
		/// Tip paid to the block producer on top of the base fee.
		max_priority_fee_per_gas: u128,
		/// Upper bound on the total per-gas cost.
		max_fee_per_gas: u128,
	},
}

impl FeeParams {
	/// The worst-case cost per gas unit under these parameters.
	pub fn max_cost_per_gas(&self) -> u128 {
		match self {
			FeeParams::Legacy { gas_price } => *gas_price,
			FeeParams::Eip1559 {
				max_fee_per_gas, ..
			} => *max_fee_per_gas,
		}
	}

	/// Whether these parameters price a typed EIP-1559 transaction.
	pub fn is_eip1559(&self) -> bool {
		matches!(self, FeeParams::Eip1559 { .. })
	}
}
