//! `logscope fetch-logs`: pull a contract's logs over JSON-RPC and decode
//! them against its ABI.

use alloy_primitives::{Address, B256};
use anyhow::{Context, Result};
use logscope_core::{
    decoder::{ErrorMode, LogDecoder},
    event::{DecodedEvent, RawLog},
};
use logscope_evm::EvmDecoder;
use logscope_observability::DecodeMetrics;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    abi_source,
    cmd_decode::print_event,
    config::LogscopeConfig,
    rpc::{LogFilter, RpcClient, RpcLog},
};

/// A decoded log with its chain position.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocatedEvent<'a> {
    block_number: Option<u64>,
    log_index: Option<u64>,
    transaction_hash: Option<B256>,
    #[serde(flatten)]
    event: &'a DecodedEvent,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct FetchSummary {
    fetched: usize,
    decoded: usize,
    unmatched: usize,
    failed: usize,
    removed: usize,
}

pub async fn run(config: &LogscopeConfig, as_json: bool) -> Result<()> {
    let url = config
        .rpc
        .url
        .as_deref()
        .context("no RPC URL: pass --rpc, set rpc.url, or set LOGSCOPE_RPC_URL")?;
    let address: Address = config
        .contract
        .address
        .as_deref()
        .context("no contract address: pass --address or set contract.address")?
        .parse()
        .context("invalid contract address")?;
    let abi = config
        .contract
        .abi
        .as_deref()
        .context("no ABI: pass --abi or set contract.abi")?;

    let set = abi_source::load_schemas(abi, config.contract.event.as_deref()).await?;

    let filter = LogFilter {
        address,
        from_block: config.contract.from_block,
        to_block: config.contract.to_block,
        signatures: set.iter().map(|s| s.signature_hash()).collect(),
    };

    let client = RpcClient::new(url, &config.rpc)?;
    info!(url = client.url(), %address, "fetching logs");
    let mut logs = client
        .get_logs(&filter)
        .await
        .with_context(|| format!("eth_getLogs failed against {url}"))?;
    sort_logs(&mut logs);

    let decoder = EvmDecoder::with_config(config.decode.clone());
    let metrics = DecodeMetrics::global();
    metrics.record_batch(logs.len());
    debug!(count = logs.len(), "decoding logs");

    let (live, removed): (Vec<RpcLog>, Vec<RpcLog>) = logs.into_iter().partition(|l| !l.removed);
    let raws: Vec<RawLog> = live.iter().map(RpcLog::to_raw).collect();
    let result = decoder.decode_batch(&raws, &set, ErrorMode::Collect, None)?;

    let summary = FetchSummary {
        fetched: live.len() + removed.len(),
        decoded: result.events.len(),
        unmatched: result.unmatched,
        failed: result.errors.len(),
        removed: removed.len(),
    };

    for (idx, err) in &result.errors {
        let log = &live[*idx];
        metrics.record_error(err.kind());
        warn!(
            block = log.block_number(),
            log_index = log.log_index(),
            error = %err,
            "skipping log that failed to decode"
        );
    }
    for (idx, event) in &result.events {
        metrics.record_decoded(event.name());
        emit(&live[*idx], event, as_json)?;
    }
    metrics.record_unmatched(summary.unmatched as u64);

    info!(
        fetched = summary.fetched,
        decoded = summary.decoded,
        unmatched = summary.unmatched,
        failed = summary.failed,
        removed = summary.removed,
        "done"
    );
    Ok(())
}

/// Chain order: block number, then log index. Logs missing either
/// (pending) sort last.
fn sort_logs(logs: &mut [RpcLog]) {
    logs.sort_by_key(|l| {
        (
            l.block_number().unwrap_or(u64::MAX),
            l.log_index().unwrap_or(u64::MAX),
        )
    });
}

fn emit(log: &RpcLog, event: &DecodedEvent, as_json: bool) -> Result<()> {
    if as_json {
        let located = LocatedEvent {
            block_number: log.block_number(),
            log_index: log.log_index(),
            transaction_hash: log.transaction_hash,
            event,
        };
        println!("{}", serde_json::to_string(&located)?);
        return Ok(());
    }

    let block = log.block_number().map_or("pending".into(), |n| n.to_string());
    let index = log.log_index().map_or("?".into(), |n| n.to_string());
    println!();
    println!("Block {block}, log {index}");
    if let Some(tx) = log.transaction_hash {
        println!("Tx:      {tx}");
    }
    print_event(event, false)
}
