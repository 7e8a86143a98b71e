//! End-to-end decode tests.
//!
//! Logs are built by hand or with the `alloy-dyn-abi` encoder, matched
//! through a `SchemaSet`, and decoded with `EvmDecoder`.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, B256, I256, U256};
use logscope_core::{
    config::DecodeMode,
    decoder::LogDecoder,
    error::{DecodeError, LogDecodeError},
    event::RawLog,
    schema::{EventField, EventSchema, SchemaRegistry},
    types::{DecodedValue, FieldType},
};
use logscope_evm::{decode_params, EvmDecoder};
use logscope_registry::{AbiParser, SchemaSet};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn hex_bytes(s: &str) -> Bytes {
    let s = s.strip_prefix("0x").unwrap_or(s);
    Bytes::from(hex::decode(s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}")))
}

fn topic(s: &str) -> B256 {
    B256::from_slice(&hex_bytes(s))
}

fn single(decl: &str) -> SchemaSet {
    SchemaSet::new([AbiParser::parse_declaration(decl).unwrap()]).unwrap()
}

/// Mirror of a `DynSolValue` in the decoder's value model.
fn expected(v: &DynSolValue) -> DecodedValue {
    match v {
        DynSolValue::Bool(b) => DecodedValue::Bool(*b),
        DynSolValue::Int(i, _) => DecodedValue::Int(*i),
        DynSolValue::Uint(u, _) => DecodedValue::Uint(*u),
        DynSolValue::FixedBytes(w, n) => DecodedValue::FixedBytes(Bytes::copy_from_slice(&w[..*n])),
        DynSolValue::Address(a) => DecodedValue::Address(*a),
        DynSolValue::Bytes(b) => DecodedValue::Bytes(Bytes::from(b.clone())),
        DynSolValue::String(s) => DecodedValue::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            DecodedValue::Array(items.iter().map(expected).collect())
        }
        other => panic!("no counterpart for {other:?}"),
    }
}

// ─── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn erc20_transfer() {
    let set = single("event Transfer(address indexed from, address indexed to, uint256 value)");
    let log = RawLog::new(
        "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse().unwrap(),
        vec![
            topic("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
            topic("0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"),
            topic("0x000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b"),
        ],
        hex_bytes("0x00000000000000000000000000000000000000000000000000000000000003e8"),
    );

    let event = EvmDecoder::new().decode_log(&log, &set).unwrap().unwrap();
    assert_eq!(event.name(), "Transfer");
    assert_eq!(
        event.get("from").and_then(DecodedValue::as_address),
        Some("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap())
    );
    assert_eq!(
        event.get("to").and_then(DecodedValue::as_address),
        Some("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B".parse().unwrap())
    );
    assert_eq!(
        event.get("value").and_then(DecodedValue::as_u256),
        Some(U256::from(1000u64))
    );
    let keys: Vec<_> = event.values.keys().map(String::as_str).collect();
    assert_eq!(keys, ["from", "to", "value"]);
}

#[test]
fn single_string_hello() {
    let set = single("event Message(string msg)");
    let hash = set.get_by_name("Message").unwrap().signature_hash();
    let data = hex_bytes(concat!(
        "0000000000000000000000000000000000000000000000000000000000000020",
        "0000000000000000000000000000000000000000000000000000000000000005",
        "68656c6c6f000000000000000000000000000000000000000000000000000000",
    ));
    let log = RawLog::new(Address::ZERO, vec![hash], data);

    let event = EvmDecoder::strict().decode_log(&log, &set).unwrap().unwrap();
    assert_eq!(event.get("msg").and_then(DecodedValue::as_str), Some("hello"));
}

#[test]
fn uint_array_seven_nine() {
    let set = single("event Values(uint256[] xs)");
    let hash = set.get_by_name("Values").unwrap().signature_hash();
    let data = hex_bytes(concat!(
        "0000000000000000000000000000000000000000000000000000000000000020",
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000007",
        "0000000000000000000000000000000000000000000000000000000000000009",
    ));
    let log = RawLog::new(Address::ZERO, vec![hash], data);

    let event = EvmDecoder::new().decode_log(&log, &set).unwrap().unwrap();
    assert_eq!(
        event.get("xs"),
        Some(&DecodedValue::Array(vec![
            DecodedValue::Uint(U256::from(7u64)),
            DecodedValue::Uint(U256::from(9u64)),
        ]))
    );
}

#[test]
fn indexed_string_is_a_digest() {
    let set = single("event Named(string indexed label, uint8 n)");
    let schema = set.get_by_name("Named").unwrap();
    let digest = B256::repeat_byte(0x5a);
    let mut data = [0u8; 32];
    data[31] = 3;
    let log = RawLog::new(
        Address::ZERO,
        vec![schema.signature_hash(), digest],
        Bytes::from(data.to_vec()),
    );

    let event = EvmDecoder::new().decode_event(&log, &schema).unwrap();
    assert_eq!(event.get("label"), Some(&DecodedValue::TopicHash(digest)));
    assert_eq!(event.get("n"), Some(&DecodedValue::Uint(U256::from(3u8))));
}

#[test]
fn unnamed_fields_use_positional_keys() {
    let set = single("event Pair(address indexed, uint256)");
    let schema = set.get_by_name("Pair").unwrap();
    let log = RawLog::new(
        Address::ZERO,
        vec![schema.signature_hash(), B256::ZERO],
        Bytes::from(vec![0u8; 32]),
    );
    let event = EvmDecoder::new().decode_event(&log, &schema).unwrap();
    let keys: Vec<_> = event.values.keys().map(String::as_str).collect();
    assert_eq!(keys, ["arg0", "arg1"]);
}

// ─── Round-trip against the reference encoder ─────────────────────────────────

#[test]
fn round_trip_every_field_type() {
    let cases: Vec<(&str, DynSolValue)> = vec![
        ("uint8", DynSolValue::Uint(U256::from(200u8), 8)),
        ("uint256", DynSolValue::Uint(U256::MAX, 256)),
        ("int16", DynSolValue::Int(I256::try_from(-1234i64).unwrap(), 16)),
        ("int256", DynSolValue::Int(I256::MIN, 256)),
        ("address", DynSolValue::Address(Address::repeat_byte(0x11))),
        ("bool", DynSolValue::Bool(true)),
        (
            "bytes4",
            DynSolValue::FixedBytes(B256::right_padding_from(&[0xde, 0xad, 0xbe, 0xef]), 4),
        ),
        ("bytes32", DynSolValue::FixedBytes(B256::repeat_byte(0x77), 32)),
        ("bytes", DynSolValue::Bytes((1..=33).collect())),
        ("string", DynSolValue::String("hello, logscope ✓".into())),
        (
            "uint256[]",
            DynSolValue::Array(vec![
                DynSolValue::Uint(U256::from(7u8), 256),
                DynSolValue::Uint(U256::from(9u8), 256),
            ]),
        ),
        (
            "string[]",
            DynSolValue::Array(vec![
                DynSolValue::String("a".into()),
                DynSolValue::String(String::new()),
                DynSolValue::String("x".repeat(40)),
            ]),
        ),
        (
            "address[2]",
            DynSolValue::FixedArray(vec![
                DynSolValue::Address(Address::repeat_byte(1)),
                DynSolValue::Address(Address::repeat_byte(2)),
            ]),
        ),
        (
            "bytes[2]",
            DynSolValue::FixedArray(vec![
                DynSolValue::Bytes(vec![0xaa]),
                DynSolValue::Bytes(vec![]),
            ]),
        ),
        (
            "uint8[][]",
            DynSolValue::Array(vec![
                DynSolValue::Array(vec![DynSolValue::Uint(U256::from(1u8), 8)]),
                DynSolValue::Array(vec![]),
                DynSolValue::Array(vec![
                    DynSolValue::Uint(U256::from(2u8), 8),
                    DynSolValue::Uint(U256::from(3u8), 8),
                ]),
            ]),
        ),
        ("bool[]", DynSolValue::Array(vec![])),
    ];

    // Each type on its own.
    for (ty, value) in &cases {
        let field_type: FieldType = ty.parse().unwrap();
        let encoded = DynSolValue::Tuple(vec![value.clone()]).abi_encode_params();
        for mode in [DecodeMode::Strict, DecodeMode::Relaxed] {
            let decoded = decode_params(&encoded, &[&field_type], mode)
                .unwrap_or_else(|e| panic!("{ty} ({mode}): {e}"));
            assert_eq!(decoded, vec![expected(value)], "{ty} ({mode})");
        }
    }

    // All of them together in one payload.
    let types: Vec<FieldType> = cases.iter().map(|(ty, _)| ty.parse().unwrap()).collect();
    let type_refs: Vec<&FieldType> = types.iter().collect();
    let values: Vec<DynSolValue> = cases.iter().map(|(_, v)| v.clone()).collect();
    let encoded = DynSolValue::Tuple(values.clone()).abi_encode_params();

    let decoded = decode_params(&encoded, &type_refs, DecodeMode::Strict).unwrap();
    let want: Vec<DecodedValue> = values.iter().map(expected).collect();
    assert_eq!(decoded, want);
}

#[test]
fn round_trip_through_a_log() {
    let set = single(
        "event Posted(address indexed author, uint64 indexed id, string title, string[] tags, bytes body)",
    );
    let schema = set.get_by_name("Posted").unwrap();

    let author = Address::repeat_byte(0xa1);
    let data = DynSolValue::Tuple(vec![
        DynSolValue::String("release notes".into()),
        DynSolValue::Array(vec![
            DynSolValue::String("rust".into()),
            DynSolValue::String("evm".into()),
        ]),
        DynSolValue::Bytes(vec![0xfe; 70]),
    ])
    .abi_encode_params();

    let log = RawLog::new(
        Address::ZERO,
        vec![
            schema.signature_hash(),
            author.into_word(),
            B256::from(U256::from(42u64).to_be_bytes::<32>()),
        ],
        data,
    );

    let event = EvmDecoder::strict().decode_log(&log, &set).unwrap().unwrap();
    assert_eq!(event.get("author"), Some(&DecodedValue::Address(author)));
    assert_eq!(event.get("id"), Some(&DecodedValue::Uint(U256::from(42u64))));
    assert_eq!(
        event.get("title").and_then(DecodedValue::as_str),
        Some("release notes")
    );
    assert_eq!(
        event.get("tags"),
        Some(&DecodedValue::Array(vec![
            DecodedValue::String("rust".into()),
            DecodedValue::String("evm".into()),
        ]))
    );
    assert_eq!(
        event.get("body").and_then(DecodedValue::as_bytes).map(|b| b.len()),
        Some(70)
    );
}

// ─── Failure modes ────────────────────────────────────────────────────────────

#[test]
fn empty_topics_never_match() {
    let set = single("event Transfer(address indexed from, address indexed to, uint256 value)");
    let log = RawLog::new(Address::ZERO, vec![], Bytes::from(vec![0u8; 32]));
    assert!(EvmDecoder::new().decode_log(&log, &set).unwrap().is_none());
}

#[test]
fn unknown_signature_is_no_match() {
    let set = single("event Transfer(address indexed from, address indexed to, uint256 value)");
    let log = RawLog::new(Address::ZERO, vec![B256::repeat_byte(3)], Bytes::new());
    assert!(EvmDecoder::new().decode_log(&log, &set).unwrap().is_none());
}

#[test]
fn topic_count_mismatch_is_reported() {
    let set = single("event Transfer(address indexed from, address indexed to, uint256 value)");
    let hash = set.get_by_name("Transfer").unwrap().signature_hash();
    let log = RawLog::new(Address::ZERO, vec![hash], Bytes::from(vec![0u8; 96]));

    let err = EvmDecoder::new().decode_log(&log, &set).unwrap_err();
    match err {
        LogDecodeError::TopicCount(e) => {
            assert_eq!(e.expected, 3);
            assert_eq!(e.actual, 1);
        }
        other => panic!("expected topic count error, got {other:?}"),
    }
}

#[test]
fn truncated_payload_fails_without_zero_fill() {
    let set = single("event Values(uint256[] xs)");
    let hash = set.get_by_name("Values").unwrap().signature_hash();
    let full = DynSolValue::Tuple(vec![DynSolValue::Array(vec![
        DynSolValue::Uint(U256::from(7u8), 256),
        DynSolValue::Uint(U256::from(9u8), 256),
    ])])
    .abi_encode_params();

    for cut in [0, 31, 32, 64, full.len() - 1] {
        let log = RawLog::new(Address::ZERO, vec![hash], full[..cut].to_vec());
        let err = EvmDecoder::new().decode_log(&log, &set).unwrap_err();
        assert!(
            matches!(
                err,
                LogDecodeError::Decode(
                    DecodeError::Truncated { .. }
                        | DecodeError::OffsetOutOfBounds { .. }
                        | DecodeError::LengthOutOfBounds { .. }
                )
            ),
            "cut at {cut}: {err:?}"
        );
    }
}

#[test]
fn strict_and_relaxed_disagree_on_dirty_words() {
    let set = single("event Flags(uint8 small, bool flag)");
    let hash = set.get_by_name("Flags").unwrap().signature_hash();
    let mut data = vec![0u8; 64];
    data[30] = 0x01; // small = 0x0102, wider than uint8
    data[31] = 0x02;
    data[63] = 0x02; // bool word 2
    let log = RawLog::new(Address::ZERO, vec![hash], data);

    let relaxed = EvmDecoder::new().decode_log(&log, &set).unwrap().unwrap();
    assert_eq!(relaxed.get("small"), Some(&DecodedValue::Uint(U256::from(2u8))));
    assert_eq!(relaxed.get("flag"), Some(&DecodedValue::Bool(true)));

    assert!(matches!(
        EvmDecoder::strict().decode_log(&log, &set),
        Err(LogDecodeError::Decode(DecodeError::InvalidValue { .. }))
    ));
}

#[test]
fn registry_json_form_decodes_like_declaration() {
    let abi = r#"[{"type":"event","name":"Transfer","inputs":[
        {"name":"from","type":"address","indexed":true},
        {"name":"to","type":"address","indexed":true},
        {"name":"value","type":"uint256","indexed":false}
    ]}]"#;
    let from_json = SchemaSet::from_abi_json(abi).unwrap();
    let schema: &EventSchema = &from_json.get_by_name("Transfer").unwrap();
    assert_eq!(
        schema.signature_hash(),
        topic("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
    );
    assert_eq!(schema.fields()[2], EventField::new("value", FieldType::Uint(256), false));
}

#[test]
fn decoded_event_serializes_in_declared_order() {
    let set = single("event Transfer(address indexed from, address indexed to, uint256 value)");
    let schema = set.get_by_name("Transfer").unwrap();
    let log = RawLog::new(
        Address::ZERO,
        vec![
            schema.signature_hash(),
            Address::repeat_byte(1).into_word(),
            Address::repeat_byte(2).into_word(),
        ],
        U256::from(1000u64).to_be_bytes::<32>().to_vec(),
    );
    let event = EvmDecoder::new().decode_event(&log, &schema).unwrap();

    let text = serde_json::to_string(&event).unwrap();
    // field entries are objects; the inner "value" content keys are not
    let pos = |key: &str| text.find(&format!("\"{key}\":{{")).unwrap();
    assert!(pos("from") < pos("to") && pos("to") < pos("value"));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["event"], "Transfer");
    assert_eq!(json["values"]["value"]["type"], "uint");
}
