//! Schema-driven binary codec.
//!
//! Records are written as fixed-width layouts described by a [`Schema`]:
//! - `Chars(n)`: `n` four-byte slots, one UTF-8 encoded char per slot,
//!   zero-padded. Longer strings are truncated to `n` chars.
//! - `U8`/`U32`/`U64`: little-endian unsigned integers.
//! - `Bytes(n)`: exactly `n` raw bytes.
//!
//! Instruction payloads prepend a single tag byte (see [`tag_and_encode`]).

pub mod schema;

pub use schema::{Field, FieldType, FieldValue, FieldValues, Schema, CHAR_SLOT_WIDTH};

use crate::error::{CodecError, CodecResult};

/// Returns exactly `size` chars: the first `size` chars of `s`, padded with
/// `'\0'` when `s` is shorter.
pub fn fixed_size_char_array(s: &str, size: usize) -> Vec<char> {
    let mut chars: Vec<char> = s.chars().take(size).collect();
    chars.resize(size, '\0');
    chars
}

/// Serialize `values` into the layout described by `schema`.
pub fn encode(schema: &Schema, values: &FieldValues) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(schema.width());
    for field in schema.fields() {
        let value = values
            .get(field.name)
            .ok_or_else(|| CodecError::encoding(field.name, "missing value"))?;
        encode_field(field, value, &mut out)?;
    }
    debug_assert_eq!(out.len(), schema.width());
    Ok(out)
}

/// Parse `bytes` according to `schema`. Bytes past `schema.width()` are ignored.
pub fn decode(schema: &Schema, bytes: &[u8]) -> CodecResult<FieldValues> {
    if bytes.len() < schema.width() {
        let first = schema.fields().first().map(|f| f.name).unwrap_or("<empty>");
        return Err(CodecError::decoding(
            first,
            format!(
                "buffer is {} bytes, schema needs {}",
                bytes.len(),
                schema.width()
            ),
        ));
    }

    let mut values = FieldValues::new();
    let mut offset = 0;
    for field in schema.fields() {
        let width = field.ty.width();
        let raw = &bytes[offset..offset + width];
        values.insert(field.name, decode_field(field, raw)?);
        offset += width;
    }
    Ok(values)
}

/// Prefix an optional schema-encoded body with a one-byte instruction tag.
pub fn tag_and_encode(tag: u8, body: Option<(&Schema, &FieldValues)>) -> CodecResult<Vec<u8>> {
    let mut data = vec![tag];
    if let Some((schema, values)) = body {
        data.extend_from_slice(&encode(schema, values)?);
    }
    Ok(data)
}

fn encode_field(field: &Field, value: &FieldValue, out: &mut Vec<u8>) -> CodecResult<()> {
    match (field.ty, value) {
        (FieldType::Chars(n), FieldValue::Text(s)) => {
            for c in fixed_size_char_array(s, n) {
                let mut slot = [0u8; CHAR_SLOT_WIDTH];
                if c != '\0' {
                    c.encode_utf8(&mut slot);
                }
                out.extend_from_slice(&slot);
            }
        }
        (FieldType::U8, FieldValue::Uint(v)) => {
            let v = u8::try_from(*v)
                .map_err(|_| CodecError::encoding(field.name, format!("{} overflows u8", v)))?;
            out.push(v);
        }
        (FieldType::U32, FieldValue::Uint(v)) => {
            let v = u32::try_from(*v)
                .map_err(|_| CodecError::encoding(field.name, format!("{} overflows u32", v)))?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        (FieldType::U64, FieldValue::Uint(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (FieldType::Bytes(n), FieldValue::Bytes(b)) => {
            if b.len() != n {
                return Err(CodecError::encoding(
                    field.name,
                    format!("expected exactly {} bytes, got {}", n, b.len()),
                ));
            }
            out.extend_from_slice(b);
        }
        (ty, other) => {
            return Err(CodecError::encoding(
                field.name,
                format!("value {:?} does not match field type {:?}", other, ty),
            ))
        }
    }
    Ok(())
}

fn decode_field(field: &Field, raw: &[u8]) -> CodecResult<FieldValue> {
    Ok(match field.ty {
        FieldType::Chars(_) => {
            // Zero bytes are padding wherever they appear, not only at the tail.
            let content: Vec<u8> = raw.iter().copied().filter(|b| *b != 0).collect();
            let text = String::from_utf8(content)
                .map_err(|e| CodecError::decoding(field.name, e.to_string()))?;
            FieldValue::Text(text)
        }
        FieldType::U8 => FieldValue::Uint(raw[0] as u64),
        FieldType::U32 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(raw);
            FieldValue::Uint(u32::from_le_bytes(buf) as u64)
        }
        FieldType::U64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            FieldValue::Uint(u64::from_le_bytes(buf))
        }
        FieldType::Bytes(_) => FieldValue::Bytes(raw.to_vec()),
    })
}
