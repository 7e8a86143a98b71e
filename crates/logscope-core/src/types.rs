//! The ABI field type model and the decoded value representation.
//!
//! `FieldType` is the explicit tagged model of every ABI type an event
//! argument can carry. `DecodedValue` is what the decoder produces for
//! each argument, regardless of whether it came from a topic or the
//! data payload.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// An ABI field type.
///
/// Serializes as its canonical type name, e.g. `"uint256"` or `"string[]"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FieldType {
    /// Unsigned integer. Width in bits (8..=256, multiple of 8).
    Uint(u16),
    /// Two's-complement signed integer. Width in bits.
    Int(u16),
    /// 20-byte account address.
    Address,
    Bool,
    /// `bytes1` .. `bytes32`. Length in bytes.
    FixedBytes(u8),
    /// Variable-length byte string (`bytes`).
    Bytes,
    /// UTF-8 string.
    String,
    /// `elem[len]` when `len` is set, `elem[]` otherwise.
    Array {
        elem: Box<FieldType>,
        len: Option<usize>,
    },
}

impl FieldType {
    /// Convenience constructor for `elem[]`.
    pub fn vec(elem: FieldType) -> Self {
        FieldType::Array {
            elem: Box::new(elem),
            len: None,
        }
    }

    /// Convenience constructor for `elem[len]`.
    pub fn fixed_array(elem: FieldType, len: usize) -> Self {
        FieldType::Array {
            elem: Box::new(elem),
            len: Some(len),
        }
    }

    /// Whether the value lives in the tail region and is referenced from the
    /// head by an offset word.
    pub fn is_dynamic(&self) -> bool {
        match self {
            FieldType::Bytes | FieldType::String => true,
            FieldType::Array { len: None, .. } => true,
            FieldType::Array { elem, len: Some(_) } => elem.is_dynamic(),
            _ => false,
        }
    }

    /// Width in bytes of this type's head slot: the full inline encoding for
    /// static types, one offset word for dynamic ones.
    pub fn encoded_width(&self) -> usize {
        match self {
            _ if self.is_dynamic() => WORD_SIZE,
            FieldType::Array {
                elem,
                len: Some(len),
            } => elem.encoded_width().saturating_mul(*len),
            _ => WORD_SIZE,
        }
    }

    /// Whether the value fits a single word and is stored in a topic as-is.
    /// Everything else is stored as the keccak-256 digest of its encoding.
    pub fn is_word_value(&self) -> bool {
        matches!(
            self,
            FieldType::Uint(_)
                | FieldType::Int(_)
                | FieldType::Address
                | FieldType::Bool
                | FieldType::FixedBytes(_)
        )
    }

    /// Canonical name as used in event signatures.
    pub fn canonical_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Uint(bits) => write!(f, "uint{bits}"),
            FieldType::Int(bits) => write!(f, "int{bits}"),
            FieldType::Address => write!(f, "address"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::FixedBytes(n) => write!(f, "bytes{n}"),
            FieldType::Bytes => write!(f, "bytes"),
            FieldType::String => write!(f, "string"),
            FieldType::Array { elem, len: Some(len) } => write!(f, "{elem}[{len}]"),
            FieldType::Array { elem, len: None } => write!(f, "{elem}[]"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.to_string()
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_type(&s)
    }
}

/// Most array dimensions a type may declare. Each dimension can open one
/// nested region in the payload decoder.
pub const MAX_ARRAY_DIMS: usize = 16;

/// Parse an ABI type string. `uint`/`int` are normalised to their 256-bit form.
///
/// Array suffixes are peeled outermost first, so `uint8[2][]` is a dynamic
/// array of `uint8[2]`.
fn parse_type(s: &str) -> Result<FieldType, String> {
    let mut base = s.trim();
    let mut dims = Vec::new();
    while let Some(head) = base.strip_suffix(']') {
        if dims.len() == MAX_ARRAY_DIMS {
            return Err(format!(
                "more than {MAX_ARRAY_DIMS} array dimensions in '{}'",
                truncate(s)
            ));
        }
        let open = head
            .rfind('[')
            .ok_or_else(|| format!("unbalanced brackets in '{}'", truncate(s)))?;
        let len = match &head[open + 1..] {
            "" => None,
            digits => {
                let len = parse_decimal(digits)
                    .ok_or_else(|| format!("invalid array length '{digits}'"))?;
                if len == 0 {
                    return Err("fixed arrays must have a positive length".into());
                }
                Some(len)
            }
        };
        dims.push(len);
        base = head[..open].trim();
    }

    let elem = parse_scalar(base)?;
    Ok(dims.into_iter().rev().fold(elem, |elem, len| FieldType::Array {
        elem: Box::new(elem),
        len,
    }))
}

/// Keeps error messages short for pathological inputs.
fn truncate(s: &str) -> &str {
    match s.char_indices().nth(64) {
        Some((at, _)) => &s[..at],
        None => s,
    }
}

fn parse_scalar(s: &str) -> Result<FieldType, String> {
    match s {
        "address" => Ok(FieldType::Address),
        "bool" => Ok(FieldType::Bool),
        "string" => Ok(FieldType::String),
        "bytes" => Ok(FieldType::Bytes),
        "uint" => Ok(FieldType::Uint(256)),
        "int" => Ok(FieldType::Int(256)),
        _ if s.starts_with("uint") => int_width(&s[4..]).map(FieldType::Uint),
        _ if s.starts_with("int") => int_width(&s[3..]).map(FieldType::Int),
        _ if s.starts_with("bytes") => {
            let n = parse_decimal(&s[5..]).ok_or_else(|| format!("unknown type '{s}'"))?;
            if (1..=32).contains(&n) {
                Ok(FieldType::FixedBytes(n as u8))
            } else {
                Err(format!("bytes{n} is out of range (1..=32)"))
            }
        }
        _ => Err(format!("unknown type '{s}'")),
    }
}

fn int_width(digits: &str) -> Result<u16, String> {
    let bits = parse_decimal(digits).ok_or_else(|| format!("invalid integer width '{digits}'"))?;
    if bits % 8 == 0 && (8..=256).contains(&bits) {
        Ok(bits as u16)
    } else {
        Err(format!("integer width {bits} must be a multiple of 8 in 8..=256"))
    }
}

/// Plain decimal without sign or leading zeros.
fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}

/// A decoded event argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Uint(U256),
    Int(I256),
    Address(Address),
    Bool(bool),
    /// `bytesN`, exactly N bytes.
    FixedBytes(Bytes),
    Bytes(Bytes),
    String(String),
    Array(Vec<DecodedValue>),
    /// An indexed dynamic value (`string`, `bytes`, arrays). The topic holds
    /// only the keccak-256 digest of the value's encoding.
    TopicHash(B256),
}

impl DecodedValue {
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            DecodedValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i256(&self) -> Option<I256> {
        match self {
            DecodedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            DecodedValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DecodedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of a `bytes` or `bytesN` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            DecodedValue::Bytes(b) | DecodedValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_topic_hash(&self) -> Option<B256> {
        match self {
            DecodedValue::TopicHash(h) => Some(*h),
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Uint(v) => write!(f, "{v}"),
            DecodedValue::Int(v) => write!(f, "{v}"),
            DecodedValue::Address(a) => write!(f, "{}", a.to_checksum(None)),
            DecodedValue::Bool(b) => write!(f, "{b}"),
            DecodedValue::FixedBytes(b) | DecodedValue::Bytes(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            DecodedValue::String(s) => write!(f, "{s}"),
            DecodedValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            DecodedValue::TopicHash(h) => write!(f, "0x{}", hex::encode(h)),
        }
    }
}
