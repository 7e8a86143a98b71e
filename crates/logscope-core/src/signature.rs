//! Event signature hashing.
//!
//! The identifier of an event is the keccak-256 hash of its canonical
//! signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! Every log emitted by that event carries this digest in `topics[0]`.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

use crate::types::FieldType;

/// Hash an event signature string: `"EventName(type1,type2,...)"`.
pub fn keccak256_signature(signature: &str) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(signature.as_bytes());
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Build the canonical signature string from an event name and its field
/// types in declared order. Indexed flags play no part in it.
pub fn canonical_signature<'a>(
    name: &str,
    types: impl IntoIterator<Item = &'a FieldType>,
) -> String {
    let types: Vec<String> = types.into_iter().map(FieldType::canonical_name).collect();
    format!("{name}({})", types.join(","))
}
