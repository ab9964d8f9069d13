//! Configuration for the evm-courier pipeline.
//!
//! Configuration is loaded from a TOML file with `${VAR}` and
//! `${VAR:-default}` environment-variable resolution, then validated so
//! every required value is present before any pipeline component is built.
//! The private key is deserialized straight into a [`SecretString`] and
//! never appears in logs or serialized output.

use courier_types::SecretString;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Fee strategy names accepted in `[fees] mode`.
pub const FEE_MODES: [&str; 2] = ["legacy", "eip1559"];

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for one courier instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Node endpoint the pipeline talks to.
	pub node: NodeConfig,
	/// Sending account.
	pub account: AccountConfig,
	/// Fee strategy selection.
	#[serde(default)]
	pub fees: FeesConfig,
	/// Receipt polling behavior.
	#[serde(default)]
	pub confirmation: ConfirmationConfig,
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
	/// HTTP RPC endpoint URL.
	pub rpc_url: String,
	/// Expected chain id. When set, a mismatch with the node's reported
	/// chain id fails at startup instead of at signing time.
	pub chain_id: Option<u64>,
}

/// Sending account configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
	/// secp256k1 private key, hex-encoded with or without 0x prefix.
	pub private_key: SecretString,
}

/// Fee strategy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
	/// Strategy name: "legacy" or "eip1559".
	#[serde(default = "default_fee_mode")]
	pub mode: String,
	/// Fee cap as a multiple of the suggested tip (eip1559 mode only).
	#[serde(default = "default_fee_cap_multiplier")]
	pub fee_cap_multiplier: u64,
}

impl Default for FeesConfig {
	fn default() -> Self {
		Self {
			mode: default_fee_mode(),
			fee_cap_multiplier: default_fee_cap_multiplier(),
		}
	}
}

/// Returns the default fee strategy name.
fn default_fee_mode() -> String {
	"eip1559".to_string()
}

/// Returns the default fee-cap multiplier.
///
/// A cap of twice the suggested tip keeps the transaction includable under
/// moderate base-fee growth without tracking the base fee directly.
fn default_fee_cap_multiplier() -> u64 {
	2
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
	/// Seconds to sleep between receipt polls.
	#[serde(default = "default_poll_interval_secs")]
	pub poll_interval_secs: u64,
	/// Optional deadline in seconds; once exceeded the wait reports a
	/// timeout while the transaction's on-chain fate stays unresolved.
	pub max_wait_secs: Option<u64>,
}

impl Default for ConfirmationConfig {
	fn default() -> Self {
		Self {
			poll_interval_secs: default_poll_interval_secs(),
			max_wait_secs: None,
		}
	}
}

/// Returns the default receipt poll interval in seconds.
fn default_poll_interval_secs() -> u64 {
	3
}

impl ConfirmationConfig {
	/// Poll interval as a [`Duration`].
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	/// Deadline as a [`Duration`], if configured.
	pub fn max_wait(&self) -> Option<Duration> {
		self.max_wait_secs.map(Duration::from_secs)
	}
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable, and
/// `${VAR_NAME:-default}` with the default when the variable is unset.
///
/// Input is limited to 1MB to bound regex work on hostile files.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut cursor = 0;
	for cap in re.captures_iter(input) {
		let matched = cap.get(0).expect("capture group 0 always present");
		let name = cap.get(1).expect("variable name group").as_str();
		let value = match std::env::var(name) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name
					)))
				},
			},
		};
		resolved.push_str(&input[cursor..matched.start()]);
		resolved.push_str(&value);
		cursor = matched.end();
	}
	resolved.push_str(&input[cursor..]);

	Ok(resolved)
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let raw = tokio::fs::read_to_string(path).await?;
		Self::from_toml_str(&raw)
	}

	/// Parses and validates configuration from TOML text.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let resolved = resolve_env_vars(raw)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the configuration.
	///
	/// Checks that the node endpoint and private key are set, the fee mode
	/// names a known strategy, and the polling parameters are usable.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.node.rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"node.rpc_url cannot be empty".into(),
			));
		}
		if self.account.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"account.private_key cannot be empty".into(),
			));
		}
		if !FEE_MODES.contains(&self.fees.mode.as_str()) {
			return Err(ConfigError::Validation(format!(
				"fees.mode must be one of {:?}, got '{}'",
				FEE_MODES, self.fees.mode
			)));
		}
		if self.fees.fee_cap_multiplier == 0 {
			return Err(ConfigError::Validation(
				"fees.fee_cap_multiplier must be at least 1".into(),
			));
		}
		if self.confirmation.poll_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"confirmation.poll_interval_secs must be at least 1".into(),
			));
		}
		Ok(())
	}
}
