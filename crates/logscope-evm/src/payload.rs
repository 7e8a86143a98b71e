//! ABI head/tail payload decoding.
//!
//! The data payload of a log is the ABI encoding of the tuple of its
//! non-indexed arguments:
//! - the head holds one slot per argument, in declared order. Static
//!   values are inline; dynamic values store a byte offset, relative to
//!   the start of the enclosing head, into the tail.
//! - at that offset, `bytes`/`string` carry a length word then the raw
//!   bytes zero-padded to a word boundary; `T[]` carries a length word then
//!   its elements encoded as a nested head/tail region; `T[k]` with dynamic
//!   `T` is a nested region without a length word.
//!
//! Offsets are not assumed to be ordered or contiguous. Every read is
//! bounds-checked against the whole payload.

use alloy_primitives::{Address, Bytes, B256, I256, U256};
use logscope_core::{
    config::DecodeMode,
    error::DecodeError,
    schema::EventField,
    types::{DecodedValue, FieldType, MAX_ARRAY_DIMS, WORD_SIZE},
};

/// Maximum nesting of dynamic regions (arrays inside arrays).
pub const MAX_DEPTH: usize = MAX_ARRAY_DIMS;

/// Decode a data payload into one value per non-indexed field, in order.
pub fn decode_payload(
    data: &[u8],
    fields: &[&EventField],
    mode: DecodeMode,
) -> Result<Vec<DecodedValue>, DecodeError> {
    let types: Vec<&FieldType> = fields.iter().map(|f| &f.ty).collect();
    decode_params(data, &types, mode)
}

/// Decode a payload as the ABI encoding of a tuple of `types`.
pub fn decode_params(
    data: &[u8],
    types: &[&FieldType],
    mode: DecodeMode,
) -> Result<Vec<DecodedValue>, DecodeError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    Reader { data, mode }.region(0, types, 0)
}

/// Decode a single word-sized value (`uint`, `int`, `address`, `bool`,
/// `bytesN`) from its 32-byte encoding.
pub fn decode_word(ty: &FieldType, word: &B256, mode: DecodeMode) -> Result<DecodedValue, DecodeError> {
    let strict = mode.is_strict();
    match ty {
        FieldType::Uint(bits) => {
            let raw = U256::from_be_bytes(word.0);
            let mask = low_mask(*bits);
            if raw > mask {
                if strict {
                    return Err(invalid(ty, "value exceeds declared width"));
                }
                return Ok(DecodedValue::Uint(raw & mask));
            }
            Ok(DecodedValue::Uint(raw))
        }
        FieldType::Int(bits) => {
            let raw = U256::from_be_bytes(word.0);
            let extended = sign_extend(raw, *bits);
            if strict && extended != raw {
                return Err(invalid(ty, "value is not a valid sign extension"));
            }
            Ok(DecodedValue::Int(I256::from_raw(extended)))
        }
        FieldType::Address => {
            if strict && word[..12].iter().any(|b| *b != 0) {
                return Err(invalid(ty, "non-zero high bytes"));
            }
            Ok(DecodedValue::Address(Address::from_slice(&word[12..])))
        }
        FieldType::Bool => match U256::from_be_bytes(word.0) {
            v if v.is_zero() => Ok(DecodedValue::Bool(false)),
            v if v == U256::from(1u8) => Ok(DecodedValue::Bool(true)),
            _ if strict => Err(invalid(ty, "word is neither 0 nor 1")),
            _ => Ok(DecodedValue::Bool(true)),
        },
        FieldType::FixedBytes(n) => {
            let n = usize::from(*n);
            if strict && word[n..].iter().any(|b| *b != 0) {
                return Err(invalid(ty, "non-zero padding"));
            }
            Ok(DecodedValue::FixedBytes(Bytes::copy_from_slice(&word[..n])))
        }
        _ => Err(invalid(ty, "not a single-word type")),
    }
}

/// All-ones in the low `bits` bits.
fn low_mask(bits: u16) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << usize::from(bits)) - U256::from(1u8)
    }
}

/// Two's-complement sign extension of the low `bits` bits to 256.
fn sign_extend(raw: U256, bits: u16) -> U256 {
    if bits >= 256 {
        return raw;
    }
    let mask = low_mask(bits);
    let low = raw & mask;
    if low.bit(usize::from(bits) - 1) {
        low | (U256::MAX ^ mask)
    } else {
        low
    }
}

fn invalid(ty: &FieldType, reason: &str) -> DecodeError {
    DecodeError::InvalidValue {
        ty: ty.to_string(),
        reason: reason.to_string(),
    }
}

/// Interpret a word as a `usize`, if it fits.
fn word_to_usize(word: &B256) -> Option<usize> {
    let (high, low) = word.0.split_at(24);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let low: [u8; 8] = low.try_into().ok()?;
    usize::try_from(u64::from_be_bytes(low)).ok()
}

struct Reader<'a> {
    data: &'a [u8],
    mode: DecodeMode,
}

impl<'a> Reader<'a> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn word(&self, at: usize) -> Result<B256, DecodeError> {
        let end = at.checked_add(WORD_SIZE).ok_or(DecodeError::Truncated {
            needed: usize::MAX,
            available: self.len(),
        })?;
        self.data
            .get(at..end)
            .map(B256::from_slice)
            .ok_or(DecodeError::Truncated {
                needed: end,
                available: self.len(),
            })
    }

    /// Decode a head/tail region of `types` starting at `base`.
    fn region(
        &self,
        base: usize,
        types: &[&FieldType],
        depth: usize,
    ) -> Result<Vec<DecodedValue>, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::DepthExceeded { max: MAX_DEPTH });
        }

        let head_len = types
            .iter()
            .try_fold(0usize, |acc, ty| acc.checked_add(ty.encoded_width()));
        let head_end = head_len.and_then(|len| base.checked_add(len));
        match head_end {
            Some(end) if end <= self.len() => {}
            _ => {
                return Err(DecodeError::Truncated {
                    needed: head_end.unwrap_or(usize::MAX),
                    available: self.len(),
                })
            }
        }

        let mut values = Vec::with_capacity(types.len());
        let mut pos = base;
        for ty in types {
            let value = if ty.is_dynamic() {
                let at = self.offset(pos, base)?;
                self.tail(ty, at, depth)?
            } else {
                self.inline(ty, pos)?
            };
            values.push(value);
            pos += ty.encoded_width();
        }
        Ok(values)
    }

    /// Resolve the offset word at `at` against `base`.
    fn offset(&self, at: usize, base: usize) -> Result<usize, DecodeError> {
        let word = self.word(at)?;
        let out_of_bounds = || DecodeError::OffsetOutOfBounds {
            offset: U256::from_be_bytes(word.0),
            len: self.len(),
        };
        let target = word_to_usize(&word)
            .and_then(|rel| base.checked_add(rel))
            .ok_or_else(out_of_bounds)?;
        if target >= self.len() {
            return Err(out_of_bounds());
        }
        Ok(target)
    }

    /// Decode a static value stored inline at `pos`.
    fn inline(&self, ty: &FieldType, pos: usize) -> Result<DecodedValue, DecodeError> {
        match ty {
            FieldType::Array { elem, len: Some(len) } => {
                let width = elem.encoded_width();
                let items = (0..*len)
                    .map(|i| self.inline(elem, pos + i * width))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DecodedValue::Array(items))
            }
            _ => decode_word(ty, &self.word(pos)?, self.mode),
        }
    }

    /// Decode a dynamic value whose encoding starts at `at`.
    fn tail(&self, ty: &FieldType, at: usize, depth: usize) -> Result<DecodedValue, DecodeError> {
        match ty {
            FieldType::Bytes => Ok(DecodedValue::Bytes(Bytes::copy_from_slice(
                self.byte_string(at)?,
            ))),
            FieldType::String => {
                let raw = self.byte_string(at)?;
                let s = match std::str::from_utf8(raw) {
                    Ok(s) => s.to_string(),
                    Err(_) if self.mode.is_strict() => {
                        return Err(DecodeError::InvalidUtf8 { at: at + WORD_SIZE })
                    }
                    Err(_) => String::from_utf8_lossy(raw).into_owned(),
                };
                Ok(DecodedValue::String(s))
            }
            FieldType::Array { elem, len: None } => {
                let count = self.length(at)?;
                let start = at + WORD_SIZE;
                let available = self.len() - start;
                if count.checked_mul(elem.encoded_width()).map_or(true, |need| need > available) {
                    return Err(DecodeError::LengthOutOfBounds {
                        length: U256::from(count),
                        available,
                    });
                }
                let types = vec![elem.as_ref(); count];
                self.region(start, &types, depth + 1)
                    .map(DecodedValue::Array)
            }
            FieldType::Array { elem, len: Some(len) } => {
                // The declared length comes from the schema, not the payload,
                // so it still has to fit before the head is laid out.
                let available = self.len() - at;
                if len.checked_mul(elem.encoded_width()).map_or(true, |need| need > available) {
                    return Err(DecodeError::LengthOutOfBounds {
                        length: U256::from(*len),
                        available,
                    });
                }
                let types = vec![elem.as_ref(); *len];
                self.region(at, &types, depth + 1)
                    .map(DecodedValue::Array)
            }
            _ => self.inline(ty, at),
        }
    }

    /// Read the length word at `at`. The returned count is only known to
    /// fit a `usize`; callers check it against the remaining buffer.
    fn length(&self, at: usize) -> Result<usize, DecodeError> {
        let word = self.word(at)?;
        word_to_usize(&word).ok_or_else(|| DecodeError::LengthOutOfBounds {
            length: U256::from_be_bytes(word.0),
            available: self.len().saturating_sub(at + WORD_SIZE),
        })
    }

    /// Length-prefixed byte string at `at`.
    fn byte_string(&self, at: usize) -> Result<&'a [u8], DecodeError> {
        let len = self.length(at)?;
        let start = at + WORD_SIZE;
        let available = self.len() - start;
        if len > available {
            return Err(DecodeError::LengthOutOfBounds {
                length: U256::from(len),
                available,
            });
        }
        let bytes = &self.data[start..start + len];

        if self.mode.is_strict() {
            let padded = len.div_ceil(WORD_SIZE) * WORD_SIZE;
            if padded > available {
                return Err(DecodeError::Truncated {
                    needed: start + padded,
                    available: self.len(),
                });
            }
            if self.data[start + len..start + padded].iter().any(|b| *b != 0) {
                return Err(DecodeError::InvalidValue {
                    ty: "bytes".into(),
                    reason: "non-zero padding".into(),
                });
            }
        }
        Ok(bytes)
    }
}
