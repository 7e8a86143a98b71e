//! Indexed argument extraction from log topics.
//!
//! Word-sized value types (uint, int, bool, address, bytes1–bytes32) are
//! stored in their topic exactly as they would be ABI-encoded, so they
//! decode like a head word.
//!
//! Everything else (string, bytes, and every array) is stored as the
//! keccak-256 of its encoding. The original value cannot be recovered
//! from the topic; it is exposed as [`DecodedValue::TopicHash`].

use alloy_primitives::B256;
use logscope_core::{
    config::DecodeMode,
    error::DecodeError,
    types::{DecodedValue, FieldType},
};

use crate::payload::decode_word;

/// Decode one indexed topic according to its field type.
pub fn decode_topic(
    topic: &B256,
    ty: &FieldType,
    mode: DecodeMode,
) -> Result<DecodedValue, DecodeError> {
    if ty.is_word_value() {
        decode_word(ty, topic, mode)
    } else {
        Ok(DecodedValue::TopicHash(*topic))
    }
}
