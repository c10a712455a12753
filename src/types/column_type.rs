//! # Column Types
//!
//! `ColumnType` pairs a [`DataType`] with the scalar parameters of a
//! collection: one element type for `list`/`set`, key and value types for
//! `map`. Scalars carry no parameters. Nested collections are not supported,
//! so every parameter is itself a scalar.
//!
//! ```ignore
//! let id = ColumnType::scalar(DataType::Int32);
//! let tags = ColumnType::list(DataType::String);
//! let attrs = ColumnType::map(DataType::String, DataType::Int64);
//! assert_eq!(attrs.to_string(), "map<text, bigint>");
//! ```

use std::fmt;

use eyre::Result;
use smallvec::{smallvec, SmallVec};

use super::DataType;
use crate::error::WireError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnType {
    data_type: DataType,
    params: SmallVec<[DataType; 2]>,
}

impl ColumnType {
    pub fn scalar(data_type: DataType) -> Self {
        debug_assert!(!data_type.is_collection(), "{data_type:?} needs parameters");
        Self {
            data_type,
            params: SmallVec::new(),
        }
    }

    pub fn list(element: DataType) -> Self {
        Self {
            data_type: DataType::List,
            params: smallvec![element],
        }
    }

    pub fn set(element: DataType) -> Self {
        Self {
            data_type: DataType::Set,
            params: smallvec![element],
        }
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        Self {
            data_type: DataType::Map,
            params: smallvec![key, value],
        }
    }

    /// Builds a type from its wire parts, validating the parameter shape.
    pub fn from_parts(data_type: DataType, params: &[DataType]) -> Result<Self> {
        if params.len() != data_type.param_count() {
            return Err(WireError::protocol(format!(
                "{} takes {} type parameters, got {}",
                data_type.cql_name(),
                data_type.param_count(),
                params.len()
            )));
        }
        if let Some(nested) = params.iter().find(|p| p.is_collection()) {
            return Err(WireError::protocol(format!(
                "nested collection {} inside {} is not supported",
                nested.cql_name(),
                data_type.cql_name()
            )));
        }
        Ok(Self {
            data_type,
            params: params.iter().copied().collect(),
        })
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn params(&self) -> &[DataType] {
        &self.params
    }

    /// Element type of a list or set, key type of a map.
    pub fn element_type(&self) -> Option<DataType> {
        self.params.first().copied()
    }

    /// Value type of a map.
    pub fn value_type(&self) -> Option<DataType> {
        if self.data_type == DataType::Map {
            self.params.get(1).copied()
        } else {
            None
        }
    }

    pub fn fixed_size(&self) -> Option<usize> {
        self.data_type.fixed_size()
    }

    pub fn is_variable(&self) -> bool {
        self.data_type.is_variable()
    }

    pub fn is_collection(&self) -> bool {
        self.data_type.is_collection()
    }
}

impl From<DataType> for ColumnType {
    fn from(data_type: DataType) -> Self {
        ColumnType::scalar(data_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_type.cql_name())?;
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("<")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p.cql_name())?;
        }
        f.write_str(">")
    }
}
