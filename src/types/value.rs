//! # Runtime Values
//!
//! `Value` is the owned form of a single cell. It is what `RowBatchBuilder`
//! accepts, what `RowView::value` returns, and what the CQL value codec
//! serializes. Sets and maps keep insertion order; uniqueness is not enforced
//! here because the wire format does not enforce it either.

use super::{ColumnType, DataType};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Uuid([u8; 16]),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar or collection kind of this value, None for null.
    pub fn data_type(&self) -> Option<DataType> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => DataType::Bool,
            Value::Int8(_) => DataType::Int8,
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Uuid(_) => DataType::Uuid,
            Value::String(_) => DataType::String,
            Value::Binary(_) => DataType::Binary,
            Value::List(_) => DataType::List,
            Value::Set(_) => DataType::Set,
            Value::Map(_) => DataType::Map,
        })
    }

    /// True when this value can be stored in a column of `ty`. Null matches
    /// every type; nullability is the schema's concern.
    pub fn matches_type(&self, ty: &ColumnType) -> bool {
        match self {
            Value::Null => true,
            Value::List(elems) | Value::Set(elems) => {
                self.data_type() == Some(ty.data_type())
                    && elems
                        .iter()
                        .all(|e| e.matches_scalar(ty.element_type()))
            }
            Value::Map(entries) => {
                ty.data_type() == DataType::Map
                    && entries.iter().all(|(k, v)| {
                        k.matches_scalar(ty.element_type()) && v.matches_scalar(ty.value_type())
                    })
            }
            _ => self.data_type() == Some(ty.data_type()),
        }
    }

    fn matches_scalar(&self, expected: Option<DataType>) -> bool {
        match expected {
            Some(dt) => self.is_null() || self.data_type() == Some(dt),
            None => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_match_their_own_type_only() {
        let int = ColumnType::scalar(DataType::Int32);
        assert!(Value::Int32(7).matches_type(&int));
        assert!(!Value::Int64(7).matches_type(&int));
        assert!(Value::Null.matches_type(&int));
    }

    #[test]
    fn collections_check_element_types() {
        let tags = ColumnType::list(DataType::String);
        assert!(Value::List(vec!["a".into(), "b".into()]).matches_type(&tags));
        assert!(!Value::List(vec![Value::Int32(1)]).matches_type(&tags));
        assert!(!Value::Set(vec!["a".into()]).matches_type(&tags));

        let attrs = ColumnType::map(DataType::String, DataType::Int64);
        assert!(Value::Map(vec![("k".into(), Value::Int64(1))]).matches_type(&attrs));
        assert!(!Value::Map(vec![("k".into(), Value::Int32(1))]).matches_type(&attrs));
    }
}
