//! Command-line entry point for the evm-courier pipeline.
//!
//! Wires configuration, logging, and the pipeline facade into runnable
//! commands: native value transfers, ERC-20 token transfers, contract
//! method invocations, and balance queries.

use clap::{Parser, Subcommand};
use courier_abi::{AbiValue, Function, ParamType};
use courier_account::implementations::local::create_account;
use courier_account::AccountService;
use courier_config::Config;
use courier_core::Courier;
use courier_delivery::implementations::evm::alloy::AlloyNode;
use courier_fees::create_estimator;
use courier_types::{format_units, without_0x_prefix, Address, TransactionReceipt, U256};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the courier binary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Send native value to an address
	Transfer {
		/// Recipient address
		#[arg(long)]
		to: String,
		/// Amount in wei
		#[arg(long)]
		amount: String,
	},
	/// Send ERC-20 tokens to an address
	TokenTransfer {
		/// Token contract address
		#[arg(long)]
		token: String,
		/// Recipient address
		#[arg(long)]
		to: String,
		/// Amount in the token's smallest unit
		#[arg(long)]
		amount: String,
	},
	/// Invoke a state-changing contract method
	Call {
		/// Contract address
		#[arg(long)]
		contract: String,
		/// Canonical method signature, e.g. "setItem(bytes32,bytes32)"
		#[arg(long)]
		signature: String,
		/// Arguments in declared order
		#[arg(long = "arg")]
		args: Vec<String>,
		/// Native value attached to the call, in wei
		#[arg(long, default_value = "0")]
		value: String,
	},
	/// Query a native or token balance
	Balance {
		/// Account to query
		#[arg(long)]
		address: String,
		/// ERC-20 contract; omit for the native balance
		#[arg(long)]
		token: Option<String>,
		/// Decimals used for display
		#[arg(long, default_value = "18")]
		decimals: u8,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt().with_env_filter(env_filter).with_target(true).init();

	// Load configuration
	let config = Config::from_file(args.config.to_str().ok_or("Invalid config path")?).await?;
	tracing::info!(rpc_url = %config.node.rpc_url, "Loaded configuration");

	// Build the pipeline
	let node = Arc::new(AlloyNode::new(&config.node.rpc_url)?);
	let account = AccountService::new(create_account(&config.account.private_key)?);
	let fees = create_estimator(&config.fees.mode, config.fees.fee_cap_multiplier)?;

	let courier = Courier::new(
		node,
		account,
		fees,
		config.confirmation.poll_interval(),
		config.confirmation.max_wait(),
		config.node.chain_id,
	)
	.await?;
	tracing::info!(chain_id = courier.chain_id(), "Connected to node");

	match args.command {
		Command::Transfer { to, amount } => {
			let receipt = courier
				.send_value_transfer(parse_address(&to)?, parse_u256(&amount)?)
				.await?;
			print_receipt(&receipt);
		},
		Command::TokenTransfer { token, to, amount } => {
			let receipt = courier
				.send_token_transfer(
					parse_address(&token)?,
					parse_address(&to)?,
					parse_u256(&amount)?,
				)
				.await?;
			print_receipt(&receipt);
		},
		Command::Call {
			contract,
			signature,
			args: raw_args,
			value,
		} => {
			let function = Function::parse(&signature)?;
			let call_args = parse_call_args(&function, &raw_args)?;
			let receipt = courier
				.invoke_contract_method(
					parse_address(&contract)?,
					&signature,
					&call_args,
					parse_u256(&value)?,
				)
				.await?;
			print_receipt(&receipt);
		},
		Command::Balance {
			address,
			token,
			decimals,
		} => {
			let address = parse_address(&address)?;
			let balance = match token {
				Some(token) => courier.token_balance(parse_address(&token)?, address).await?,
				None => courier.native_balance(address).await?,
			};
			println!("{} ({} raw units)", format_units(balance, decimals), balance);
		},
	}

	Ok(())
}

/// Prints a confirmed receipt to stdout.
fn print_receipt(receipt: &TransactionReceipt) {
	println!("tx confirmed: {}", receipt.hash);
	println!("  block:    {}", receipt.block_number);
	println!("  gas used: {}", receipt.gas_used);
	println!("  logs:     {}", receipt.logs.len());
}

/// Parses a 0x-prefixed address.
fn parse_address(input: &str) -> Result<Address, String> {
	input
		.parse::<Address>()
		.map_err(|e| format!("Invalid address '{}': {}", input, e))
}

/// Parses an amount as decimal, or as hex with a 0x prefix.
fn parse_u256(input: &str) -> Result<U256, String> {
	let parsed = if let Some(hex_digits) = input.strip_prefix("0x") {
		U256::from_str_radix(hex_digits, 16)
	} else {
		U256::from_str_radix(input, 10)
	};
	parsed.map_err(|e| format!("Invalid amount '{}': {}", input, e))
}

/// Parses CLI argument strings against the declared parameter types.
fn parse_call_args(function: &Function, raw: &[String]) -> Result<Vec<AbiValue>, String> {
	if raw.len() != function.inputs().len() {
		return Err(format!(
			"{} expects {} arguments, got {}",
			function.canonical_signature(),
			function.inputs().len(),
			raw.len()
		));
	}

	function
		.inputs()
		.iter()
		.zip(raw)
		.map(|(ty, input)| parse_call_arg(ty, input))
		.collect()
}

fn parse_call_arg(ty: &ParamType, input: &str) -> Result<AbiValue, String> {
	match ty {
		ParamType::Address => Ok(AbiValue::Address(parse_address(input)?)),
		ParamType::Uint(_) => Ok(AbiValue::Uint(parse_u256(input)?)),
		ParamType::Bool => match input {
			"true" => Ok(AbiValue::Bool(true)),
			"false" => Ok(AbiValue::Bool(false)),
			other => Err(format!("Invalid bool '{}'", other)),
		},
		ParamType::FixedBytes(len) => {
			let bytes = hex::decode(without_0x_prefix(input))
				.map_err(|e| format!("Invalid hex '{}': {}", input, e))?;
			if bytes.len() != *len {
				return Err(format!(
					"Expected {} bytes for {}, got {}",
					len,
					ty,
					bytes.len()
				));
			}
			Ok(AbiValue::FixedBytes(bytes))
		},
	}
}
