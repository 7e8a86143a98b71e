//! Event schema types: the in-memory form of one ABI event definition.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::event::RawLog;
use crate::signature::{canonical_signature, keccak256_signature};
use crate::types::FieldType;

/// Topic slots available to indexed arguments (topic 0 holds the signature hash).
pub const MAX_INDEXED_FIELDS: usize = 3;

/// A single event argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventField {
    /// Argument name; may be empty for unnamed ABI arguments.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Stored in a topic slot rather than the data payload.
    #[serde(default)]
    pub indexed: bool,
}

impl EventField {
    pub fn new(name: impl Into<String>, ty: FieldType, indexed: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed,
        }
    }
}

/// A validated event definition.
///
/// Immutable once built. The indexed / non-indexed partition is computed
/// here, once, so decoding a log never re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSchema {
    name: String,
    fields: Vec<EventField>,
    signature: String,
    signature_hash: B256,
    #[serde(skip)]
    indexed: Vec<usize>,
    #[serde(skip)]
    data: Vec<usize>,
}

impl EventSchema {
    /// Build a schema, deriving its canonical signature and hash.
    ///
    /// Fails when the name is empty or malformed, when more than
    /// [`MAX_INDEXED_FIELDS`] fields are indexed, or when two fields
    /// resolve to the same value key.
    pub fn new(name: impl Into<String>, fields: Vec<EventField>) -> Result<Self, SchemaError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SchemaError::MissingName);
        }
        if !is_identifier(trimmed) {
            return Err(SchemaError::InvalidName { name });
        }
        let name = trimmed.to_string();

        let (indexed, data): (Vec<usize>, Vec<usize>) =
            (0..fields.len()).partition(|&i| fields[i].indexed);
        if indexed.len() > MAX_INDEXED_FIELDS {
            return Err(SchemaError::TooManyIndexed {
                event: name,
                count: indexed.len(),
                max: MAX_INDEXED_FIELDS,
            });
        }

        if let Some(field) = first_duplicate_key(&fields) {
            return Err(SchemaError::DuplicateField { event: name, field });
        }

        let signature = canonical_signature(&name, fields.iter().map(|f| &f.ty));
        let signature_hash = keccak256_signature(&signature);

        Ok(Self {
            name,
            fields,
            signature,
            signature_hash,
            indexed,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields in declared order.
    pub fn fields(&self) -> &[EventField] {
        &self.fields
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// keccak-256 of [`signature`](Self::signature); equals `topics[0]` of matching logs.
    pub fn signature_hash(&self) -> B256 {
        self.signature_hash
    }

    /// Declared positions of the indexed fields, in order.
    pub fn indexed_positions(&self) -> &[usize] {
        &self.indexed
    }

    /// Declared positions of the non-indexed fields, in order.
    pub fn data_positions(&self) -> &[usize] {
        &self.data
    }

    /// Indexed fields (topics[1..]) in declared order.
    pub fn indexed_fields(&self) -> Vec<&EventField> {
        self.indexed.iter().map(|&i| &self.fields[i]).collect()
    }

    /// Non-indexed fields (data payload) in declared order.
    pub fn data_fields(&self) -> Vec<&EventField> {
        self.data.iter().map(|&i| &self.fields[i]).collect()
    }

    /// Number of topics a log of this event must carry.
    pub fn expected_topics(&self) -> usize {
        self.indexed.len() + 1
    }

    /// Key under which the field at `position` appears in decoded values:
    /// its name, or `arg<position>` for unnamed arguments.
    pub fn field_key(&self, position: usize) -> Cow<'_, str> {
        match self.fields.get(position) {
            Some(field) => value_key(&field.name, position),
            None => Cow::Owned(format!("arg{position}")),
        }
    }
}

fn value_key(name: &str, position: usize) -> Cow<'_, str> {
    if name.is_empty() {
        Cow::Owned(format!("arg{position}"))
    } else {
        Cow::Borrowed(name)
    }
}

fn first_duplicate_key(fields: &[EventField]) -> Option<String> {
    let mut seen = HashSet::with_capacity(fields.len());
    fields
        .iter()
        .enumerate()
        .map(|(i, field)| value_key(&field.name, i))
        .find(|key| !seen.insert(key.clone()))
        .map(Cow::into_owned)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A thread-safe, read-only set of event schemas.
/// The concrete build-once implementation lives in `logscope-registry`.
pub trait SchemaRegistry: Send + Sync {
    /// Look up a schema by its signature hash.
    fn get_by_signature(&self, hash: &B256) -> Option<Arc<EventSchema>>;

    /// Look up a schema by event name. With overloaded events, the first
    /// one registered wins.
    fn get_by_name(&self, name: &str) -> Option<Arc<EventSchema>>;

    /// Match a log against the registry by its signature topic.
    ///
    /// Returns `None` for logs without topics or whose `topics[0]` belongs
    /// to no registered event. Neither case is an error.
    fn match_log(&self, log: &RawLog) -> Option<Arc<EventSchema>> {
        let signature = log.signature()?;
        self.get_by_signature(signature)
    }
}
