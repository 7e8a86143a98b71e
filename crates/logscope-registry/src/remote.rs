//! Remote ABI fetching.
//!
//! Sources:
//! - **Plain URL**: any HTTP(S) endpoint serving an ABI array or a compiler
//!   artifact with an `"abi"` key
//! - **Sourcify**: no API key required
//! - **Etherscan** and compatible explorers: API key recommended
//!
//! Requires the `remote` feature.
//!
//! ```ignore
//! let fetcher = AbiFetcher::new()?;
//! let json = fetcher.fetch_abi(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").await?;
//! let set = SchemaSet::from_abi_json(&json)?;
//! ```

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

// ─── Error ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("ABI not found for {address} on chain {chain_id}")]
    NotFound { chain_id: u64, address: String },

    #[error("Etherscan API error: {message}")]
    Etherscan { message: String },

    #[error("Invalid ABI JSON returned from {origin}: {reason}")]
    InvalidAbi { origin: String, reason: String },

    #[error("Rate limited by {origin}")]
    RateLimited { origin: String },
}

// ─── Response shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SourcifyFilesResponse {
    files: Option<Vec<SourcifyFile>>,
}

#[derive(Debug, Deserialize)]
struct SourcifyFile {
    name: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: String,
}

// ─── Fetcher ──────────────────────────────────────────────────────────────────

/// Remote ABI fetcher. Prefers Sourcify over Etherscan.
#[derive(Debug, Clone)]
pub struct AbiFetcher {
    client: Client,
    sourcify_base: String,
    etherscan_base: String,
    etherscan_api_key: Option<String>,
}

impl AbiFetcher {
    /// Fetcher with the public Sourcify and Etherscan mainnet endpoints.
    pub fn new() -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("logscope/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            sourcify_base: "https://sourcify.dev/server".into(),
            etherscan_base: "https://api.etherscan.io/api".into(),
            etherscan_api_key: None,
        })
    }

    pub fn with_sourcify_base(mut self, url: impl Into<String>) -> Self {
        self.sourcify_base = url.into();
        self
    }

    pub fn with_etherscan_key(mut self, key: impl Into<String>) -> Self {
        self.etherscan_api_key = Some(key.into());
        self
    }

    /// Etherscan-compatible explorer, e.g. `https://api.arbiscan.io/api`.
    pub fn with_etherscan_base(mut self, url: impl Into<String>) -> Self {
        self.etherscan_base = url.into();
        self
    }

    /// Download ABI JSON from a plain URL.
    ///
    /// The body must be valid JSON; its shape is checked by the parser.
    pub async fn fetch_url(&self, url: &str) -> Result<String, RemoteError> {
        debug!(%url, "fetching ABI");
        let resp = self.client.get(url).send().await?;
        match resp.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(RemoteError::RateLimited { origin: url.into() })
            }
            status => {
                return Err(RemoteError::Status {
                    url: url.into(),
                    status,
                })
            }
        }

        let body = resp.text().await?;
        validate_json(url, &body)?;
        info!(%url, bytes = body.len(), "ABI downloaded");
        Ok(body)
    }

    /// Fetch ABI JSON from Sourcify. Tries full then partial match, then
    /// the v1 files endpoint.
    pub async fn fetch_from_sourcify(
        &self,
        chain_id: u64,
        address: &str,
    ) -> Result<String, RemoteError> {
        let address = normalize_address(address);

        for match_type in ["full_match", "partial_match"] {
            let url = format!("{}/v2/contract/{chain_id}/{address}", self.sourcify_base);
            let resp = self
                .client
                .get(&url)
                .query(&[("matchType", match_type), ("fields", "abi")])
                .send()
                .await;

            match resp {
                Ok(r) if r.status() == StatusCode::OK => {
                    let json: serde_json::Value = r.json().await?;
                    if let Some(abi) = json.get("abi") {
                        return Ok(abi.to_string());
                    }
                }
                Ok(r) if r.status() == StatusCode::TOO_MANY_REQUESTS => {
                    return Err(RemoteError::RateLimited {
                        origin: "Sourcify".into(),
                    })
                }
                Ok(r) => debug!(status = %r.status(), match_type, "sourcify miss"),
                Err(e) => debug!(error = %e, match_type, "sourcify request failed"),
            }
        }

        let url = format!("{}/v1/files/any/{chain_id}/{address}", self.sourcify_base);
        if let Ok(r) = self.client.get(&url).send().await {
            if r.status() == StatusCode::OK {
                let files: SourcifyFilesResponse = r.json().await.map_err(|e| {
                    RemoteError::InvalidAbi {
                        origin: "Sourcify".into(),
                        reason: e.to_string(),
                    }
                })?;

                for file in files.files.unwrap_or_default() {
                    if !file.name.ends_with("metadata.json") {
                        continue;
                    }
                    let metadata: serde_json::Value = serde_json::from_str(&file.content)
                        .map_err(|e| RemoteError::InvalidAbi {
                            origin: "Sourcify".into(),
                            reason: e.to_string(),
                        })?;
                    if let Some(abi) = metadata.get("output").and_then(|o| o.get("abi")) {
                        return Ok(abi.to_string());
                    }
                }
            }
        }

        Err(RemoteError::NotFound { chain_id, address })
    }

    /// Fetch ABI JSON from Etherscan (or a compatible explorer).
    pub async fn fetch_from_etherscan(&self, address: &str) -> Result<String, RemoteError> {
        let api_key = self
            .etherscan_api_key
            .as_deref()
            .unwrap_or("YourApiKeyToken"); // public, rate-limited

        let resp = self
            .client
            .get(&self.etherscan_base)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address),
                ("apikey", api_key),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited {
                origin: "Etherscan".into(),
            });
        }

        let body: EtherscanResponse = resp.json().await?;
        if body.status != "1" {
            return Err(RemoteError::Etherscan {
                message: format!("{}: {}", body.message, body.result),
            });
        }

        validate_json("Etherscan", &body.result)?;
        Ok(body.result)
    }

    /// Sourcify first, Etherscan on `NotFound`.
    pub async fn fetch_abi(&self, chain_id: u64, address: &str) -> Result<String, RemoteError> {
        match self.fetch_from_sourcify(chain_id, address).await {
            Ok(abi) => return Ok(abi),
            Err(RemoteError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        self.fetch_from_etherscan(address).await
    }
}

fn normalize_address(address: &str) -> String {
    let address = address.trim().to_lowercase();
    if address.starts_with("0x") {
        address
    } else {
        format!("0x{address}")
    }
}

fn validate_json(origin: &str, body: &str) -> Result<(), RemoteError> {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|_| ())
        .map_err(|e| RemoteError::InvalidAbi {
            origin: origin.into(),
            reason: e.to_string(),
        })
}
