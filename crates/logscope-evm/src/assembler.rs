//! Event assembly: topics + payload → one `DecodedEvent` in declared order.

use indexmap::IndexMap;
use logscope_core::{
    config::DecodeMode,
    error::{LogDecodeError, TopicCountError},
    event::{DecodedEvent, RawLog},
    schema::EventSchema,
    types::DecodedValue,
};
use std::sync::Arc;

use crate::{payload, topic};

/// Assemble a log against the schema it matched.
///
/// The log must carry exactly one topic per indexed field plus the
/// signature topic. Either every field decodes or no event is produced.
pub fn assemble(
    log: &RawLog,
    schema: &Arc<EventSchema>,
    mode: DecodeMode,
) -> Result<DecodedEvent, LogDecodeError> {
    let expected = schema.expected_topics();
    if log.topics.len() != expected {
        return Err(TopicCountError {
            event: schema.name().to_string(),
            expected,
            actual: log.topics.len(),
        }
        .into());
    }

    let fields = schema.fields();

    let indexed = log
        .indexed_topics()
        .iter()
        .zip(schema.indexed_positions())
        .map(|(t, &pos)| topic::decode_topic(t, &fields[pos].ty, mode))
        .collect::<Result<Vec<DecodedValue>, _>>()?;

    let data = payload::decode_payload(&log.data, &schema.data_fields(), mode)?;

    let mut indexed = indexed.into_iter();
    let mut data = data.into_iter();
    let values: IndexMap<String, DecodedValue> = fields
        .iter()
        .enumerate()
        .filter_map(|(i, field)| {
            let value = if field.indexed {
                indexed.next()
            } else {
                data.next()
            }?;
            Some((schema.field_key(i).into_owned(), value))
        })
        .collect();

    Ok(DecodedEvent::new(Arc::clone(schema), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, B256, U256};
    use logscope_core::{
        error::DecodeError,
        schema::EventField,
        types::FieldType,
    };

    fn word_u64(v: u64) -> [u8; 32] {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&v.to_be_bytes());
        w
    }

    fn interleaved() -> Arc<EventSchema> {
        Arc::new(
            EventSchema::new(
                "Interleaved",
                vec![
                    EventField::new("amount", FieldType::Uint(256), false),
                    EventField::new("owner", FieldType::Address, true),
                    EventField::new("memo", FieldType::String, true),
                    EventField::new("ok", FieldType::Bool, false),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn merges_back_into_declared_order() {
        let schema = interleaved();
        let owner = B256::left_padding_from(&[0x42; 20]);
        let memo_hash = B256::repeat_byte(0x99);
        let log = RawLog::new(
            Address::ZERO,
            vec![schema.signature_hash(), owner, memo_hash],
            Bytes::from([word_u64(5), word_u64(1)].concat()),
        );

        let event = assemble(&log, &schema, DecodeMode::Strict).unwrap();
        let keys: Vec<_> = event.values.keys().map(String::as_str).collect();
        assert_eq!(keys, ["amount", "owner", "memo", "ok"]);
        assert_eq!(event.get("amount"), Some(&DecodedValue::Uint(U256::from(5u64))));
        assert_eq!(
            event.get("owner"),
            Some(&DecodedValue::Address(Address::repeat_byte(0x42)))
        );
        assert_eq!(event.get("memo"), Some(&DecodedValue::TopicHash(memo_hash)));
        assert_eq!(event.get("ok"), Some(&DecodedValue::Bool(true)));
    }

    #[test]
    fn topic_count_mismatch() {
        let schema = interleaved();
        let log = RawLog::new(
            Address::ZERO,
            vec![schema.signature_hash(), B256::ZERO],
            Bytes::from([word_u64(5), word_u64(1)].concat()),
        );
        let err = assemble(&log, &schema, DecodeMode::Relaxed).unwrap_err();
        assert_eq!(
            err,
            LogDecodeError::TopicCount(TopicCountError {
                event: "Interleaved".into(),
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn payload_errors_propagate() {
        let schema = interleaved();
        let log = RawLog::new(
            Address::ZERO,
            vec![schema.signature_hash(), B256::ZERO, B256::ZERO],
            Bytes::from(word_u64(5).to_vec()),
        );
        let err = assemble(&log, &schema, DecodeMode::Relaxed).unwrap_err();
        assert_eq!(
            err,
            LogDecodeError::Decode(DecodeError::Truncated {
                needed: 64,
                available: 32
            })
        );
    }

    #[test]
    fn strict_topic_errors_propagate() {
        let schema = interleaved();
        let log = RawLog::new(
            Address::ZERO,
            vec![schema.signature_hash(), B256::repeat_byte(0xff), B256::ZERO],
            Bytes::from([word_u64(5), word_u64(1)].concat()),
        );
        assert!(assemble(&log, &schema, DecodeMode::Relaxed).is_ok());
        assert!(matches!(
            assemble(&log, &schema, DecodeMode::Strict),
            Err(LogDecodeError::Decode(DecodeError::InvalidValue { .. }))
        ));
    }
}
