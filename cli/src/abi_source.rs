//! Load an ABI from a local path or an http(s) URL into a `SchemaSet`.

use anyhow::{bail, Context, Result};
use logscope_registry::{AbiFetcher, SchemaSet};
use std::path::Path;
use tracing::info;

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Raw ABI JSON text from `source`.
pub async fn read_abi(source: &str) -> Result<String> {
    if is_url(source) {
        let fetcher = AbiFetcher::new().context("failed to build HTTP client")?;
        fetcher
            .fetch_url(source)
            .await
            .with_context(|| format!("failed to fetch ABI from '{source}'"))
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("failed to read ABI file '{source}'"))
    }
}

/// Build the schema set for `source`, optionally narrowed to one event name.
pub async fn load_schemas(source: &str, event: Option<&str>) -> Result<SchemaSet> {
    let json = read_abi(source).await?;
    let set = match event {
        Some(name) => {
            let set = SchemaSet::from_abi_json_named(&json, name)
                .with_context(|| format!("invalid event '{name}' in ABI '{source}'"))?;
            if set.is_empty() {
                bail!("ABI '{source}' declares no event named '{name}'");
            }
            set
        }
        None => SchemaSet::from_abi_json(&json)
            .with_context(|| format!("invalid ABI in '{source}'"))?,
    };

    info!(source, events = set.len(), "ABI loaded");
    Ok(set)
}
