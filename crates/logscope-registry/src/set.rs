//! `SchemaSet`: the build-once `SchemaRegistry`.
//!
//! Schemas are registered while the set is exclusively owned and looked up
//! by signature hash afterwards. Once shared (typically behind an `Arc`)
//! the set is read-only, so concurrent lookups take no lock.

use alloy_primitives::B256;
use logscope_core::{
    error::SchemaError,
    schema::{EventSchema, SchemaRegistry},
};
use std::{collections::HashMap, path::Path, sync::Arc};
use tracing::debug;

use crate::abi::AbiParser;

/// An immutable set of event schemas keyed by signature hash.
#[derive(Debug, Default, Clone)]
pub struct SchemaSet {
    by_hash: HashMap<B256, Arc<EventSchema>>,
    /// Registration order
    order: Vec<Arc<EventSchema>>,
}

impl SchemaSet {
    /// Build a set from schemas. Fails on the first signature collision.
    pub fn new(schemas: impl IntoIterator<Item = EventSchema>) -> Result<Self, SchemaError> {
        let mut set = Self::default();
        for schema in schemas {
            set.insert(schema)?;
        }
        Ok(set)
    }

    /// Build a set from every non-anonymous event in a contract ABI.
    pub fn from_abi_json(json: &str) -> Result<Self, SchemaError> {
        Self::new(AbiParser::parse_abi(json)?)
    }

    /// Build a set from the events called `name` only. Overloads are all
    /// kept. Other events in the ABI are not converted.
    pub fn from_abi_json_named(json: &str, name: &str) -> Result<Self, SchemaError> {
        Self::new(AbiParser::parse_abi_named(json, name)?)
    }

    /// Read a contract ABI (or compiler artifact) from disk.
    pub fn from_abi_file(path: &Path) -> Result<Self, SchemaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_abi_json(&json)
    }

    /// Register one more schema. Any schema already holding the same
    /// signature hash is a collision, including an identical one.
    pub fn insert(&mut self, schema: EventSchema) -> Result<Arc<EventSchema>, SchemaError> {
        let hash = schema.signature_hash();
        if let Some(existing) = self.by_hash.get(&hash) {
            return Err(SchemaError::SignatureCollision {
                hash,
                existing: existing.signature().to_string(),
                incoming: schema.signature().to_string(),
            });
        }

        debug!(event = schema.name(), signature = %hash, "schema registered");
        let schema = Arc::new(schema);
        self.by_hash.insert(hash, Arc::clone(&schema));
        self.order.push(Arc::clone(&schema));
        Ok(schema)
    }

    /// Schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EventSchema>> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl SchemaRegistry for SchemaSet {
    fn get_by_signature(&self, hash: &B256) -> Option<Arc<EventSchema>> {
        self.by_hash.get(hash).cloned()
    }

    /// The first registered schema with this name.
    fn get_by_name(&self, name: &str) -> Option<Arc<EventSchema>> {
        self.order.iter().find(|s| s.name() == name).cloned()
    }
}
