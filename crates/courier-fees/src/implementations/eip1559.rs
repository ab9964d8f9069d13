//! EIP-1559 tip / fee-cap strategy.
//!
//! Takes the node's suggested priority fee and caps the total per-gas cost
//! at `tip * multiplier`. The cap is not base-fee-aware: it over-provisions
//! so the transaction stays includable under moderate base-fee growth,
//! trading cost precision for a cap that is never too low at submission
//! time.

use async_trait::async_trait;
use courier_delivery::NodeInterface;
use courier_types::FeeParams;

use crate::{FeeError, FeeEstimator, DEFAULT_FEE_CAP_MULTIPLIER};

/// Strategy that derives the fee cap as a multiple of the suggested tip.
pub struct Eip1559Estimator {
	/// Fee cap as a multiple of the suggested priority fee.
	fee_cap_multiplier: u64,
}

impl Eip1559Estimator {
	/// Creates an estimator with the given fee-cap multiplier.
	pub fn new(fee_cap_multiplier: u64) -> Self {
		Self { fee_cap_multiplier }
	}
}

impl Default for Eip1559Estimator {
	fn default() -> Self {
		Self::new(DEFAULT_FEE_CAP_MULTIPLIER)
	}
}

#[async_trait]
impl FeeEstimator for Eip1559Estimator {
	async fn estimate(&self, node: &dyn NodeInterface) -> Result<FeeParams, FeeError> {
		let tip = node
			.suggest_priority_fee()
			.await
			.map_err(|e| FeeError::Unavailable(e.to_string()))?;

		let fee_cap = tip
			.checked_mul(self.fee_cap_multiplier as u128)
			.ok_or_else(|| {
				FeeError::Unavailable(format!(
					"fee cap overflow: tip {} * multiplier {}",
					tip, self.fee_cap_multiplier
				))
			})?;

		tracing::debug!(tip, fee_cap, "Computed EIP-1559 fee parameters");

		Ok(FeeParams::Eip1559 {
			max_priority_fee_per_gas: tip,
			max_fee_per_gas: fee_cap,
		})
	}
}
