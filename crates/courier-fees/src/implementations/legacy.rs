//! Legacy gas-price strategy.
//!
//! Uses the node's suggested gas price as-is. The suggestion tracks market
//! demand, so it is preferred over any hardcoded price.

use async_trait::async_trait;
use courier_delivery::NodeInterface;
use courier_types::FeeParams;

use crate::{FeeError, FeeEstimator};

/// Strategy that prices transactions with a single suggested gas price.
pub struct LegacyEstimator;

#[async_trait]
impl FeeEstimator for LegacyEstimator {
	async fn estimate(&self, node: &dyn NodeInterface) -> Result<FeeParams, FeeError> {
		let gas_price = node
			.suggest_gas_price()
			.await
			.map_err(|e| FeeError::Unavailable(e.to_string()))?;

		tracing::debug!(gas_price, "Using suggested gas price");

		Ok(FeeParams::Legacy { gas_price })
	}
}
