//! # logscope-core
//!
//! Core types shared across all logscope crates: the event schema model,
//! the signature hasher, raw and decoded log records, the decoder trait,
//! and the error types every decode path reports.

pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod schema;
pub mod signature;
pub mod types;

pub use config::{DecodeMode, DecoderConfig};
pub use decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback};
pub use error::{BatchDecodeError, DecodeError, LogDecodeError, SchemaError, TopicCountError};
pub use event::{DecodedEvent, RawLog};
pub use schema::{EventField, EventSchema, SchemaRegistry, MAX_INDEXED_FIELDS};
pub use signature::{canonical_signature, keccak256_signature};
pub use types::{DecodedValue, FieldType};

/// One 32-byte ABI word / log topic.
pub type Word = alloy_primitives::B256;
