//! # Column Schemas
//!
//! A `ColumnSchema` is everything a table definition says about one column:
//! its name, logical type, nullability, key membership, and the optional
//! read/write defaults and storage attributes. Column ids are not part of the
//! column; they are assigned per schema (see [`Schema`](super::Schema)).
//!
//! ```ignore
//! let id = ColumnSchema::new("id", DataType::Int32).hash_key();
//! let ts = ColumnSchema::new("ts", DataType::Timestamp).key().sorting(SortingType::Descending);
//! let tags = ColumnSchema::new("tags", ColumnType::list(DataType::String)).nullable(true);
//! ```

use std::fmt;

use eyre::{ensure, Result};

use crate::types::{ColumnType, Value};

/// Stable numeric column identifier, assigned by whoever owns the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub u32);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortingType {
    #[default]
    NotSpecified = 0,
    Ascending = 1,
    Descending = 2,
}

impl TryFrom<u8> for SortingType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SortingType::NotSpecified),
            1 => Ok(SortingType::Ascending),
            2 => Ok(SortingType::Descending),
            _ => Err(crate::error::WireError::protocol(format!(
                "invalid sorting type: {}",
                value
            ))),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingType {
    #[default]
    Auto = 0,
    Plain = 1,
    Prefix = 2,
    RunLength = 3,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionType {
    #[default]
    Default = 0,
    None = 1,
    Snappy = 2,
    Lz4 = 3,
    Zlib = 4,
}

/// Server-side storage hints. Client-authored schemas leave these at their
/// defaults and strip them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnStorageAttributes {
    pub encoding: EncodingType,
    pub compression: CompressionType,
    /// Zero means "use the table default".
    pub block_size: u32,
}

impl TryFrom<u8> for EncodingType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncodingType::Auto),
            1 => Ok(EncodingType::Plain),
            2 => Ok(EncodingType::Prefix),
            3 => Ok(EncodingType::RunLength),
            _ => Err(crate::error::WireError::protocol(format!(
                "invalid encoding type: {}",
                value
            ))),
        }
    }
}

impl TryFrom<u8> for CompressionType {
    type Error = eyre::Report;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionType::Default),
            1 => Ok(CompressionType::None),
            2 => Ok(CompressionType::Snappy),
            3 => Ok(CompressionType::Lz4),
            4 => Ok(CompressionType::Zlib),
            _ => Err(crate::error::WireError::protocol(format!(
                "invalid compression type: {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    name: String,
    column_type: ColumnType,
    nullable: bool,
    is_key: bool,
    is_hash_key: bool,
    sorting_type: SortingType,
    read_default: Option<Value>,
    write_default: Option<Value>,
    storage: ColumnStorageAttributes,
}

impl ColumnSchema {
    /// A non-null, non-key column.
    pub fn new(name: impl Into<String>, column_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: false,
            is_key: false,
            is_hash_key: false,
            sorting_type: SortingType::NotSpecified,
            read_default: None,
            write_default: None,
            storage: ColumnStorageAttributes::default(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks this column as a range key column.
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Marks this column as a hash key column, which is also a key column.
    pub fn hash_key(mut self) -> Self {
        self.is_key = true;
        self.is_hash_key = true;
        self
    }

    pub fn sorting(mut self, sorting_type: SortingType) -> Self {
        self.sorting_type = sorting_type;
        self
    }

    pub fn storage(mut self, storage: ColumnStorageAttributes) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_read_default(mut self, value: Value) -> Result<Self> {
        self.check_default("read", &value)?;
        self.read_default = Some(value);
        Ok(self)
    }

    pub fn with_write_default(mut self, value: Value) -> Result<Self> {
        self.check_default("write", &value)?;
        self.write_default = Some(value);
        Ok(self)
    }

    fn check_default(&self, which: &str, value: &Value) -> Result<()> {
        ensure!(
            value.matches_type(&self.column_type),
            "{} default for column '{}' does not match type {}",
            which,
            self.name,
            self.column_type
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn is_hash_key(&self) -> bool {
        self.is_hash_key
    }

    pub fn sorting_type(&self) -> SortingType {
        self.sorting_type
    }

    pub fn read_default(&self) -> Option<&Value> {
        self.read_default.as_ref()
    }

    pub fn write_default(&self) -> Option<&Value> {
        self.write_default.as_ref()
    }

    pub fn storage_attributes(&self) -> &ColumnStorageAttributes {
        &self.storage
    }

    /// Bytes this column occupies in a row block's direct buffer.
    pub fn slot_size(&self) -> usize {
        self.column_type
            .fixed_size()
            .unwrap_or(crate::config::VAR_SLOT_SIZE)
    }
}
