//! # logscope-evm
//!
//! EVM event-log decoder implementing the `LogDecoder` trait.
//!
//! ## Implementation notes
//! - `topics[0]` → keccak-256 of the canonical event signature
//! - `topics[1..]` → indexed parameters, one 32-byte word each; dynamic
//!   types are only available as their digest
//! - `data` → non-indexed parameters, ABI head/tail encoded
//! - No `unsafe`; every read is bounds-checked against the payload

pub mod assembler;
pub mod batch;
pub mod decoder;
pub mod payload;
pub mod topic;

pub use assembler::assemble;
pub use batch::{chunked_decode, DEFAULT_CHUNK_SIZE};
pub use decoder::EvmDecoder;
pub use payload::{decode_params, decode_payload};
pub use topic::decode_topic;
