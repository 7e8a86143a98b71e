//! YAML configuration for `logscope fetch-logs`.
//!
//! Every section is optional; command-line flags override file values and
//! `LOGSCOPE_RPC_URL` overrides the RPC endpoint from either source.

use anyhow::{Context, Result};
use logscope_core::config::DecoderConfig;
use logscope_observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const RPC_URL_ENV: &str = "LOGSCOPE_RPC_URL";

/// JSON-RPC endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP(S) JSON-RPC endpoint
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff in milliseconds, doubled per attempt
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_retries() -> u32 { 3 }
fn default_backoff_ms() -> u64 { 500 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// The contract whose logs are fetched and the ABI used to decode them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Contract address, 0x-prefixed
    #[serde(default)]
    pub address: Option<String>,
    /// ABI file path or http(s) URL
    #[serde(default)]
    pub abi: Option<String>,
    /// Only decode this event (all overloads with the name)
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub from_block: Option<u64>,
    #[serde(default)]
    pub to_block: Option<u64>,
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogscopeConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub decode: DecoderConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl LogscopeConfig {
    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("failed to parse config YAML")
    }

    /// Apply the `LOGSCOPE_RPC_URL` override, if set and non-empty.
    pub fn apply_env(&mut self) {
        self.override_rpc_url(std::env::var(RPC_URL_ENV).ok());
    }

    fn override_rpc_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.rpc.url = Some(url);
        }
    }
}
