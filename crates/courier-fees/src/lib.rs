//! Fee strategies for the evm-courier pipeline.
//!
//! A fee strategy turns node-supplied pricing hints into the [`FeeParams`]
//! a transaction is built with. Two strategies exist: `legacy` uses the
//! node's suggested gas price directly, `eip1559` takes the suggested tip
//! and caps the total fee at a configurable multiple of it. A node that
//! cannot supply a hint is an error: the pipeline never falls back to a
//! hardcoded price, since a stale price can leave a transaction stuck
//! indefinitely.

use async_trait::async_trait;
use courier_delivery::NodeInterface;
use courier_types::FeeParams;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod eip1559;
	pub mod legacy;
}

/// Default fee-cap multiplier for the EIP-1559 strategy.
pub const DEFAULT_FEE_CAP_MULTIPLIER: u64 = 2;

/// Errors that can occur while computing fee parameters.
#[derive(Debug, Error)]
pub enum FeeError {
	/// The node could not supply a usable fee suggestion.
	#[error("Fee suggestion unavailable: {0}")]
	Unavailable(String),
	/// The configured strategy name is not known.
	#[error("Unknown fee strategy: {0}")]
	UnknownStrategy(String),
}

/// Trait defining a fee pricing strategy.
#[async_trait]
pub trait FeeEstimator: Send + Sync {
	/// Computes fee parameters from the node's current hints.
	async fn estimate(&self, node: &dyn NodeInterface) -> Result<FeeParams, FeeError>;
}

/// Factory function to create a fee estimator by strategy name.
///
/// `mode` is `"legacy"` or `"eip1559"`; `fee_cap_multiplier` only applies
/// to the EIP-1559 strategy.
pub fn create_estimator(
	mode: &str,
	fee_cap_multiplier: u64,
) -> Result<Box<dyn FeeEstimator>, FeeError> {
	match mode {
		"legacy" => Ok(Box::new(implementations::legacy::LegacyEstimator)),
		"eip1559" => Ok(Box::new(implementations::eip1559::Eip1559Estimator::new(
			fee_cap_multiplier,
		))),
		other => Err(FeeError::UnknownStrategy(other.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factory_selects_strategy() {
		assert!(create_estimator("legacy", 2).is_ok());
		assert!(create_estimator("eip1559", 3).is_ok());
		assert!(matches!(
			create_estimator("cheapest", 2),
			Err(FeeError::UnknownStrategy(_))
		));
	}
}
