//! Raw and decoded log types.

use alloy_primitives::{Address, Bytes, B256};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

use crate::schema::EventSchema;
use crate::types::DecodedValue;

/// A raw, undecoded log as received from a node. This is the input to every decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    /// Contract that emitted the log
    pub address: Address,
    /// topics[0] is the event signature hash; further topics are indexed arguments.
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed arguments.
    #[serde(default)]
    pub data: Bytes,
}

impl RawLog {
    pub fn new(address: Address, topics: Vec<B256>, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            topics,
            data: data.into(),
        }
    }

    /// The event signature topic, if the log has any topics.
    pub fn signature(&self) -> Option<&B256> {
        self.topics.first()
    }

    /// Topics after the signature slot.
    pub fn indexed_topics(&self) -> &[B256] {
        self.topics.get(1..).unwrap_or_default()
    }
}

/// A fully decoded event: one value per schema field, in declared order.
///
/// Only ever built whole by the assembler; a log that fails to decode
/// produces no `DecodedEvent` at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedEvent {
    /// The schema the log matched
    #[serde(rename = "event", serialize_with = "serialize_schema_name")]
    pub schema: Arc<EventSchema>,
    /// Decoded values keyed by field name, in declared order
    pub values: IndexMap<String, DecodedValue>,
}

impl DecodedEvent {
    pub fn new(schema: Arc<EventSchema>, values: IndexMap<String, DecodedValue>) -> Self {
        Self { schema, values }
    }

    /// Event name, e.g. "Transfer".
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Get a value by field name.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.values.get(name)
    }

    /// Iterate `(name, value)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn serialize_schema_name<S: Serializer>(
    schema: &Arc<EventSchema>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(schema.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EventField;
    use crate::types::FieldType;
    use alloy_primitives::U256;

    #[test]
    fn raw_log_signature_and_indexed_topics() {
        let log = RawLog::new(
            Address::ZERO,
            vec![B256::repeat_byte(1), B256::repeat_byte(2)],
            Bytes::new(),
        );
        assert_eq!(log.signature(), Some(&B256::repeat_byte(1)));
        assert_eq!(log.indexed_topics(), &[B256::repeat_byte(2)]);

        let empty = RawLog::new(Address::ZERO, vec![], Bytes::new());
        assert!(empty.signature().is_none());
        assert!(empty.indexed_topics().is_empty());
    }

    #[test]
    fn raw_log_from_rpc_json() {
        let json = r#"{
            "address": "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x00000000000000000000000000000000000000000000000000000000000003e8"
        }"#;
        let log: RawLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.topics.len(), 1);
        assert_eq!(log.data.len(), 32);
        assert_eq!(log.data[31], 0xe8);
    }

    #[test]
    fn decoded_event_serializes_event_name() {
        let schema = Arc::new(
            EventSchema::new("Ping", vec![EventField::new("n", FieldType::Uint(8), false)]).unwrap(),
        );
        let mut values = IndexMap::new();
        values.insert("n".to_string(), DecodedValue::Uint(U256::from(3u8)));
        let event = DecodedEvent::new(schema, values);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Ping");
        assert!(json["values"]["n"].is_object());
        assert_eq!(event.name(), "Ping");
        assert_eq!(event.get("n").and_then(DecodedValue::as_u256), Some(U256::from(3u8)));
    }
}
