//! `logscope decode-log`: decode one log given as hex topics and data.

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{anyhow, bail, Context, Result};
use logscope_core::{
    config::DecoderConfig,
    decoder::LogDecoder,
    event::{DecodedEvent, RawLog},
};
use logscope_evm::EvmDecoder;

use crate::abi_source;

pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).with_context(|| format!("invalid hex '{s}'"))
}

pub fn parse_topic(s: &str) -> Result<B256> {
    let bytes = parse_hex(s)?;
    if bytes.len() != 32 {
        bail!("topic '{s}' is {} bytes, expected 32", bytes.len());
    }
    Ok(B256::from_slice(&bytes))
}

pub async fn run(
    abi: &str,
    topics: &[String],
    data: &str,
    decoder: DecoderConfig,
    as_json: bool,
) -> Result<()> {
    let set = abi_source::load_schemas(abi, None).await?;

    let topics = topics
        .iter()
        .map(|t| parse_topic(t))
        .collect::<Result<Vec<_>>>()?;
    let log = RawLog::new(Address::ZERO, topics, Bytes::from(parse_hex(data)?));

    let decoder = EvmDecoder::with_config(decoder);
    let event = decoder
        .decode_log(&log, &set)?
        .ok_or_else(|| match log.signature() {
            Some(topic0) => anyhow!("no event in the ABI has signature hash {topic0}"),
            None => anyhow!("log has no topics; anonymous events cannot be matched"),
        })?;

    print_event(&event, as_json)
}

pub fn print_event(event: &DecodedEvent, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(event)?);
    } else {
        println!("Event:   {}", event.schema.signature());
        println!("Fields:");
        for (name, value) in event.iter() {
            println!("  {name}: {value}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_accepts_optional_prefix() {
        assert_eq!(parse_hex("0x0102").unwrap(), [1, 2]);
        assert_eq!(parse_hex("0102").unwrap(), [1, 2]);
        assert!(parse_hex("0x").unwrap().is_empty());
        assert!(parse_hex("0xzz").is_err());
    }

    #[test]
    fn topics_must_be_one_word() {
        let t = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
        assert_eq!(parse_topic(t).unwrap()[0], 0xdd);
        assert!(parse_topic("0x01").is_err());
    }
}
