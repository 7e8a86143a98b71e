//! Minimal JSON-RPC client for `eth_getLogs`.
//!
//! Transient failures (transport errors, HTTP 429 and 5xx) are retried
//! with exponential backoff. Node-side JSON-RPC errors are not.

use alloy_primitives::{Address, Bytes, B256, U64};
use logscope_core::event::RawLog;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::RpcConfig;

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// One entry of an `eth_getLogs` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub log_index: Option<U64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub removed: bool,
}

impl RpcLog {
    pub fn block_number(&self) -> Option<u64> {
        self.block_number.map(|n| n.to::<u64>())
    }

    pub fn log_index(&self) -> Option<u64> {
        self.log_index.map(|n| n.to::<u64>())
    }

    /// The decoder's view of this log.
    pub fn to_raw(&self) -> RawLog {
        RawLog::new(self.address, self.topics.clone(), self.data.clone())
    }
}

/// `eth_getLogs` filter for one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub address: Address,
    pub from_block: Option<u64>,
    pub to_block: Option<u64>,
    /// Accepted `topics[0]` values; empty means any
    pub signatures: Vec<B256>,
}

impl LogFilter {
    fn to_json(&self) -> Value {
        let block = |n: Option<u64>, default: &str| match n {
            Some(n) => Value::String(format!("{n:#x}")),
            None => Value::String(default.into()),
        };
        let mut filter = json!({
            "address": self.address,
            "fromBlock": block(self.from_block, "earliest"),
            "toBlock": block(self.to_block, "latest"),
        });
        if !self.signatures.is_empty() {
            filter["topics"] = json!([self.signatures]);
        }
        filter
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// Transient errors worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Rpc(_) | Self::InvalidResponse(_) => false,
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    max_retries: u32,
    backoff: Duration,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, config: &RpcConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            url: url.into(),
            http,
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RpcLog>, RpcError> {
        let result = self.call("eth_getLogs", vec![filter.to_json()]).await?;
        let logs: Vec<RpcLog> = serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        debug!(count = logs.len(), "eth_getLogs returned");
        Ok(logs)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.send_once(&req).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => match backoff_delay(self.backoff, attempt, self.max_retries) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            method,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        error!(attempt, error = %e, method, "max retries exceeded");
                        return Err(e);
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, req: &JsonRpcRequest<'_>) -> Result<Value, RpcError> {
        let resp = self.http.post(&self.url).json(req).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Status { status, body });
        }

        let body: JsonRpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(RpcError::Rpc(err));
        }
        body.result
            .ok_or_else(|| RpcError::InvalidResponse("missing result".into()))
    }
}

/// Delay before retry `attempt` (1-based), or `None` once retries are spent.
fn backoff_delay(initial: Duration, attempt: u32, max_retries: u32) -> Option<Duration> {
    if attempt > max_retries {
        return None;
    }
    let factor = 1u32 << (attempt - 1).min(16);
    Some(initial.saturating_mul(factor).min(Duration::from_secs(30)))
}
