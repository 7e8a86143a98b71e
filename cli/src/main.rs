//! logscope CLI: inspect ABIs and decode EVM event logs.
//!
//! # Commands
//! ```text
//! logscope inspect     --abi <path|url>
//! logscope decode-log  --abi <path|url> --topics <hex>... --data <hex>
//! logscope fetch-logs  [--config <yaml>] --rpc <url> --address <addr> --abi <path|url>
//! logscope info
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logscope_core::config::{DecodeMode, DecoderConfig};
use logscope_observability::{init_tracing, LogConfig};
use std::path::PathBuf;

mod abi_source;
mod cmd_decode;
mod cmd_fetch;
mod cmd_inspect;
mod config;
mod rpc;

use config::LogscopeConfig;

#[derive(Parser)]
#[command(
    name = "logscope",
    about = "Decode EVM event logs against a contract ABI",
    long_about = "
logscope: match EVM logs to the events of a contract ABI and decode their
indexed topics and data payload into named values.

ENVIRONMENT VARIABLES:
  LOGSCOPE_RPC_URL   JSON-RPC endpoint for fetch-logs (overrides --rpc and the config file)
  RUST_LOG           tracing filter directives (overrides --verbose)
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the events declared by an ABI
    Inspect {
        /// ABI file path or http(s) URL
        #[arg(long)]
        abi: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode one event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// ABI file path or http(s) URL
        #[arg(long)]
        abi: String,
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        /// Reject dirty padding and out-of-range words
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a contract's logs over JSON-RPC and decode them
    #[command(name = "fetch-logs")]
    FetchLogs {
        /// YAML config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
        /// JSON-RPC endpoint
        #[arg(long)]
        rpc: Option<String>,
        /// Contract address
        #[arg(long)]
        address: Option<String>,
        /// ABI file path or http(s) URL
        #[arg(long)]
        abi: Option<String>,
        /// Only decode events with this name
        #[arg(long)]
        event: Option<String>,
        #[arg(long)]
        from_block: Option<u64>,
        #[arg(long)]
        to_block: Option<u64>,
        /// Reject dirty padding and out-of-range words
        #[arg(long)]
        strict: bool,
        /// One JSON object per decoded log
        #[arg(long)]
        json: bool,
    },

    /// Show build and capability info
    Info,
}

fn decoder_config(strict: bool) -> DecoderConfig {
    if strict {
        DecoderConfig::strict()
    } else {
        DecoderConfig::default()
    }
}

fn logging(mut config: LogConfig, verbose: bool) -> Result<()> {
    if verbose {
        config.level = "debug".into();
    }
    init_tracing(&config).context("failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { abi, json } => {
            logging(LogConfig::default(), cli.verbose)?;
            cmd_inspect::run(&abi, json).await
        }

        Commands::DecodeLog { abi, topics, data, strict, json } => {
            logging(LogConfig::default(), cli.verbose)?;
            cmd_decode::run(&abi, &topics, &data, decoder_config(strict), json).await
        }

        Commands::FetchLogs {
            config,
            rpc,
            address,
            abi,
            event,
            from_block,
            to_block,
            strict,
            json,
        } => {
            let mut cfg = match &config {
                Some(path) => LogscopeConfig::load(path)?,
                None => LogscopeConfig::default(),
            };
            if rpc.is_some() {
                cfg.rpc.url = rpc;
            }
            cfg.contract.address = address.or(cfg.contract.address);
            cfg.contract.abi = abi.or(cfg.contract.abi);
            cfg.contract.event = event.or(cfg.contract.event);
            cfg.contract.from_block = from_block.or(cfg.contract.from_block);
            cfg.contract.to_block = to_block.or(cfg.contract.to_block);
            if strict {
                cfg.decode.mode = DecodeMode::Strict;
            }
            cfg.apply_env();

            logging(cfg.logging.clone(), cli.verbose)?;
            cmd_fetch::run(&cfg, json).await
        }

        Commands::Info => cmd_info(),
    }
}

fn cmd_info() -> Result<()> {
    println!("logscope v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Field types:   uint8..uint256, int8..int256, address, bool, bytes1..bytes32,");
    println!("               bytes, string, T[], T[k] (nested)");
    println!("Indexed:       word types decoded; string/bytes/arrays exposed as topic hashes");
    println!("Decode modes:  relaxed (default), strict (--strict)");
    println!("ABI sources:   JSON array, compiler artifact {{\"abi\": [...]}}, local path or http(s) URL");
    println!("Log source:    eth_getLogs over HTTP JSON-RPC with retry/backoff");
    println!(
        "Parallelism:   batch decoding across {} cores",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );
    Ok(())
}
