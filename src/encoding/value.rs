//! # Typed CQL Value Serialization
//!
//! Builds `Value` encoding on top of the framing primitives in [`super::cql`].
//!
//! | Value | Wire form |
//! |-------|-----------|
//! | null | length `-1`, no payload |
//! | boolean | length 1, one byte (0 or 1) |
//! | tinyint .. bigint, timestamp | `encode_num` at the type's width |
//! | float, double | `encode_float` (bit image) |
//! | uuid | 16 raw bytes |
//! | text, blob | raw bytes |
//! | list, set | backpatched length, element count, framed elements |
//! | map | backpatched length, entry count, framed key then value per entry |
//!
//! Decoding is driven by the expected [`ColumnType`], never by the bytes, and
//! a value is only committed to the cursor once it has decoded completely.

use eyre::Result;

use super::byte_order::load_u8;
use super::cql::{
    decode_bytes_ref, decode_float, decode_length, decode_num, encode_bytes, encode_float,
    encode_length, encode_num, finish_collection, start_collection,
};
use crate::config::NULL_VALUE_LENGTH;
use crate::error::WireError;
use crate::types::{ColumnType, DataType, Value};

impl Value {
    /// Appends this value as one framed CQL value.
    pub fn serialize(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Value::Null => encode_length(NULL_VALUE_LENGTH, buf),
            Value::Bool(v) => {
                encode_length(1, buf);
                buf.push(u8::from(*v));
            }
            Value::Int8(v) => encode_num(*v, buf),
            Value::Int16(v) => encode_num(*v, buf),
            Value::Int32(v) => encode_num(*v, buf),
            Value::Int64(v) | Value::Timestamp(v) => encode_num(*v, buf),
            Value::Float(v) => encode_float(*v, buf),
            Value::Double(v) => encode_float(*v, buf),
            Value::Uuid(v) => encode_bytes(v, buf)?,
            Value::String(v) => encode_bytes(v.as_bytes(), buf)?,
            Value::Binary(v) => encode_bytes(v, buf)?,
            Value::List(_) | Value::Set(_) | Value::Map(_) => {
                let mark = start_collection(buf);
                self.write_collection_body(buf)?;
                finish_collection(mark, buf)?;
            }
        }
        Ok(())
    }

    /// Appends the payload of a non-null value without its length prefix.
    ///
    /// This is the form stored in row block indirect data for variable-width
    /// columns; the slot length takes the place of the prefix.
    pub fn serialize_payload(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Value::Null => {
                return Err(eyre::eyre!("null has no payload form"));
            }
            Value::String(v) => buf.extend_from_slice(v.as_bytes()),
            Value::Binary(v) => buf.extend_from_slice(v),
            Value::List(_) | Value::Set(_) | Value::Map(_) => self.write_collection_body(buf)?,
            scalar => {
                let mut framed = Vec::with_capacity(12);
                scalar.serialize(&mut framed)?;
                buf.extend_from_slice(&framed[crate::config::LENGTH_PREFIX_SIZE..]);
            }
        }
        Ok(())
    }

    fn write_collection_body(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Value::List(elems) | Value::Set(elems) => {
                encode_length(collection_count(elems.len())?, buf);
                for elem in elems {
                    elem.serialize(buf)?;
                }
            }
            Value::Map(entries) => {
                encode_length(collection_count(entries.len())?, buf);
                for (key, val) in entries {
                    key.serialize(buf)?;
                    val.serialize(buf)?;
                }
            }
            _ => unreachable!("write_collection_body called on a scalar"),
        }
        Ok(())
    }

    /// Decodes one framed value of type `ty` from the front of `data`.
    ///
    /// On failure `data` is left where it was.
    pub fn deserialize(ty: &ColumnType, data: &mut &[u8]) -> Result<Value> {
        let mut cursor = *data;
        let len = decode_length(&mut cursor)?;
        if len == NULL_VALUE_LENGTH {
            *data = cursor;
            return Ok(Value::Null);
        }
        if len < 0 {
            return Err(WireError::protocol(format!(
                "negative value length: {}",
                len
            )));
        }
        let payload = decode_bytes_ref(len as usize, &mut cursor)?;
        let value = Value::deserialize_payload(ty, payload)?;
        *data = cursor;
        Ok(value)
    }

    /// Decodes an unframed payload that must be consumed exactly.
    pub fn deserialize_payload(ty: &ColumnType, payload: &[u8]) -> Result<Value> {
        let mut p = payload;
        let len = payload.len();
        let value = match ty.data_type() {
            DataType::Bool => {
                if len != 1 {
                    return Err(WireError::protocol(format!(
                        "unexpected boolean byte length: {}",
                        len
                    )));
                }
                p = &p[1..];
                Value::Bool(load_u8(payload) != 0)
            }
            DataType::Int8 => Value::Int8(decode_num(len, &mut p)?),
            DataType::Int16 => Value::Int16(decode_num(len, &mut p)?),
            DataType::Int32 => Value::Int32(decode_num(len, &mut p)?),
            DataType::Int64 => Value::Int64(decode_num(len, &mut p)?),
            DataType::Timestamp => Value::Timestamp(decode_num(len, &mut p)?),
            DataType::Float => Value::Float(decode_float(len, &mut p)?),
            DataType::Double => Value::Double(decode_float(len, &mut p)?),
            DataType::Uuid => {
                let bytes: [u8; 16] = payload.try_into().map_err(|_| {
                    WireError::protocol(format!("unexpected uuid byte length: {}", len))
                })?;
                p = &payload[len..];
                Value::Uuid(bytes)
            }
            DataType::String => {
                let text = std::str::from_utf8(payload)
                    .map_err(|e| WireError::protocol(format!("invalid UTF-8 in text value: {}", e)))?;
                p = &payload[len..];
                Value::String(text.to_string())
            }
            DataType::Binary => {
                p = &payload[len..];
                Value::Binary(payload.to_vec())
            }
            DataType::List | DataType::Set => {
                let elem_type = scalar_param(ty, ty.element_type())?;
                let count = decode_count(&mut p)?;
                let mut elems = Vec::with_capacity(count.min(p.len() / 4));
                for _ in 0..count {
                    elems.push(Value::deserialize(&elem_type, &mut p)?);
                }
                if ty.data_type() == DataType::List {
                    Value::List(elems)
                } else {
                    Value::Set(elems)
                }
            }
            DataType::Map => {
                let key_type = scalar_param(ty, ty.element_type())?;
                let val_type = scalar_param(ty, ty.value_type())?;
                let count = decode_count(&mut p)?;
                let mut entries = Vec::with_capacity(count.min(p.len() / 8));
                for _ in 0..count {
                    let key = Value::deserialize(&key_type, &mut p)?;
                    let val = Value::deserialize(&val_type, &mut p)?;
                    entries.push((key, val));
                }
                Value::Map(entries)
            }
        };
        if !p.is_empty() {
            return Err(WireError::protocol(format!(
                "{} trailing bytes after {} value",
                p.len(),
                ty
            )));
        }
        Ok(value)
    }
}

fn collection_count(n: usize) -> Result<i32> {
    i32::try_from(n)
        .map_err(|_| WireError::protocol(format!("collection of {} elements is too large", n)))
}

fn decode_count(data: &mut &[u8]) -> Result<usize> {
    let count = decode_length(data)?;
    usize::try_from(count)
        .map_err(|_| WireError::protocol(format!("negative collection element count: {}", count)))
}

fn scalar_param(ty: &ColumnType, param: Option<DataType>) -> Result<ColumnType> {
    match param {
        Some(dt) if !dt.is_collection() => Ok(ColumnType::scalar(dt)),
        _ => Err(WireError::protocol(format!("malformed collection type {}", ty))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::wire_error;

    fn roundtrip(ty: ColumnType, value: Value) {
        let mut buf = Vec::new();
        value.serialize(&mut buf).unwrap();
        let mut cursor = buf.as_slice();
        assert_eq!(Value::deserialize(&ty, &mut cursor).unwrap(), value);
        assert!(cursor.is_empty());
    }

    #[test]
    fn null_is_minus_one_length() {
        let mut buf = Vec::new();
        Value::Null.serialize(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0xFF, 0xFF, 0xFF]);
        roundtrip(ColumnType::scalar(DataType::String), Value::Null);
    }

    #[test]
    fn scalar_values_roundtrip() {
        roundtrip(DataType::Bool.into(), Value::Bool(true));
        roundtrip(DataType::Int8.into(), Value::Int8(-128));
        roundtrip(DataType::Int16.into(), Value::Int16(-300));
        roundtrip(DataType::Int64.into(), Value::Int64(i64::MIN));
        roundtrip(DataType::Double.into(), Value::Double(3.25));
        roundtrip(DataType::Uuid.into(), Value::Uuid([7; 16]));
        roundtrip(DataType::String.into(), Value::String("héllo".into()));
    }

    #[test]
    fn list_layout_is_count_then_framed_elements() {
        let mut buf = Vec::new();
        Value::List(vec![Value::Int32(1), Value::Int32(2)])
            .serialize(&mut buf)
            .unwrap();
        assert_eq!(
            buf,
            [
                0, 0, 0, 20, // body length
                0, 0, 0, 2, // element count
                0, 0, 0, 4, 0, 0, 0, 1, //
                0, 0, 0, 4, 0, 0, 0, 2,
            ]
        );
    }

    #[test]
    fn map_values_roundtrip() {
        roundtrip(
            ColumnType::map(DataType::String, DataType::Int64),
            Value::Map(vec![
                ("a".into(), Value::Int64(1)),
                ("b".into(), Value::Null),
            ]),
        );
    }

    #[test]
    fn truncated_collection_is_rejected_without_advancing() {
        let mut buf = Vec::new();
        Value::Set(vec!["x".into(), "y".into()])
            .serialize(&mut buf)
            .unwrap();
        buf[3] -= 1;
        let mut cursor = buf.as_slice();
        let ty = ColumnType::set(DataType::String);
        let err = Value::deserialize(&ty, &mut cursor).unwrap_err();
        assert!(matches!(wire_error(&err), Some(WireError::Protocol(_))));
        assert_eq!(cursor.len(), buf.len());
    }

    #[test]
    fn invalid_utf8_is_a_protocol_error() {
        let err = Value::deserialize_payload(&DataType::String.into(), &[0xFF, 0xFE]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn wrong_scalar_width_is_rejected() {
        let err = Value::deserialize_payload(&DataType::Int32.into(), &[0, 1]).unwrap_err();
        assert!(err.to_string().contains("unexpected number byte length"));
    }

    #[test]
    fn payload_form_drops_the_prefix() {
        let mut buf = Vec::new();
        Value::Int32(9).serialize_payload(&mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0, 9]);
        assert_eq!(
            Value::deserialize_payload(&DataType::Int32.into(), &buf).unwrap(),
            Value::Int32(9)
        );
    }
}
