//! Error types for schema registration and the log decode pipeline.

use alloy_primitives::{B256, U256};
use thiserror::Error;

/// Errors raised while building event schemas or registering them.
/// Always fatal to the registration that produced them.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Event name is missing")]
    MissingName,

    #[error("Invalid event name '{name}'")]
    InvalidName { name: String },

    #[error("Field '{field}': unrecognized type '{ty}': {reason}")]
    UnknownType {
        field: String,
        ty: String,
        reason: String,
    },

    #[error("Event '{event}' declares {count} indexed fields (max {max})")]
    TooManyIndexed {
        event: String,
        count: usize,
        max: usize,
    },

    #[error("Event '{event}' declares field '{field}' more than once")]
    DuplicateField { event: String, field: String },

    #[error("Event '{event}' is anonymous and has no signature topic")]
    Anonymous { event: String },

    #[error("Signature collision on {hash}: '{existing}' and '{incoming}'")]
    SignatureCollision {
        hash: B256,
        existing: String,
        incoming: String,
    },

    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("ABI JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding a log's data payload or one of its topics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Payload truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Offset {offset} points outside the {len}-byte payload")]
    OffsetOutOfBounds { offset: U256, len: usize },

    #[error("Declared length {length} exceeds the {available} bytes remaining")]
    LengthOutOfBounds { length: U256, available: usize },

    #[error("Invalid {ty} value: {reason}")]
    InvalidValue { ty: String, reason: String },

    #[error("String at byte {at} is not valid UTF-8")]
    InvalidUtf8 { at: usize },

    #[error("Nesting deeper than {max} levels")]
    DepthExceeded { max: usize },
}

/// The number of topics on a log does not fit the schema it matched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Event '{event}' expects {expected} topics, log carries {actual}")]
pub struct TopicCountError {
    pub event: String,
    pub expected: usize,
    pub actual: usize,
}

/// Per-log failure of the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogDecodeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    TopicCount(#[from] TopicCountError),
}

impl LogDecodeError {
    /// Short, stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            LogDecodeError::Decode(_) => "decode",
            LogDecodeError::TopicCount(_) => "topic_count",
        }
    }
}

/// Errors that abort a batch decode.
#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("Decode error at index {index}: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: LogDecodeError,
    },

    #[error("{0}")]
    Other(String),
}
