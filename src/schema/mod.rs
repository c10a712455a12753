//! # Table Schemas
//!
//! A `Schema` is an ordered, validated list of [`ColumnSchema`]s. Once built it
//! is immutable and is shared (`Arc<Schema>`) by every batch and row block
//! that uses it.
//!
//! ## Key Invariants
//!
//! ```text
//! index:   0        1        2        3        4
//!        +--------+--------+--------+--------+--------+
//!        | hash   | hash   | range  | value  | value  |
//!        | key    | key    | key    | (null?)| (null?)|
//!        +--------+--------+--------+--------+--------+
//!        |<---- num_key_columns --->|
//!        |<-hash->|
//! ```
//!
//! - key columns form a contiguous prefix starting at index 0
//! - key columns are never nullable
//! - hash key columns form a prefix of the key columns
//! - column names are unique
//! - column ids are either absent for every column or present and unique
//!   for every column
//!
//! Violations are reported as `WireError::InvalidSchema` before any schema is
//! produced.
//!
//! ## Row Layout
//!
//! The schema also fixes the row block layout so that stride arithmetic is
//! never repeated per row:
//!
//! ```text
//! +-------------+-------------+-----+-----------------------------+
//! | col 0 slot  | col 1 slot  | ... | null bitmap (if nullables)  |
//! +-------------+-------------+-----+-----------------------------+
//! |<------------- byte_size ------->|<-- (column_count + 7) / 8 ->|
//! ```
//!
//! Fixed-width columns use their natural width; variable-width columns use a
//! 16-byte `VarSlot`.

mod builder;
mod codec;
mod column;
mod wire;

#[cfg(test)]
mod tests;

pub use builder::SchemaBuilder;
pub use column::{
    ColumnId, ColumnSchema, ColumnStorageAttributes, CompressionType, EncodingType, SortingType,
};
pub use wire::{
    column_from_wire, column_pbs_to_column_tuple, column_pbs_to_schema, column_to_wire,
    schema_flags, schema_from_wire, schema_to_column_pbs, schema_to_wire,
    schema_to_wire_without_ids, ColumnSchemaPb, SchemaPb, StorageAttributesPb,
};

use eyre::Result;
use hashbrown::{HashMap, HashSet};

use crate::error::WireError;

#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
    column_ids: Vec<ColumnId>,
    num_key_columns: usize,
    num_hash_key_columns: usize,
    name_to_index: HashMap<String, usize>,
    col_offsets: Vec<usize>,
    byte_size: usize,
    has_nullables: bool,
}

/// Validates `columns` and returns the schema with its inferred key count.
pub fn schema_from_columns(columns: Vec<ColumnSchema>) -> Result<(Schema, usize)> {
    let schema = Schema::new(columns, Vec::new())?;
    let num_keys = schema.num_key_columns();
    Ok((schema, num_keys))
}

impl Schema {
    /// Builds a schema. `column_ids` must be empty or match `columns` one to one.
    pub fn new(columns: Vec<ColumnSchema>, column_ids: Vec<ColumnId>) -> Result<Self> {
        if !column_ids.is_empty() {
            if column_ids.len() != columns.len() {
                return Err(WireError::invalid_schema(format!(
                    "mismatched column ids: {} ids for {} columns",
                    column_ids.len(),
                    columns.len()
                )));
            }
            let mut seen = HashSet::with_capacity(column_ids.len());
            if let Some(dup) = column_ids.iter().find(|id| !seen.insert(**id)) {
                return Err(WireError::invalid_schema(format!(
                    "duplicate column id {}",
                    dup
                )));
            }
        }

        let mut name_to_index = HashMap::with_capacity(columns.len());
        let mut num_key_columns = 0;
        let mut num_hash_key_columns = 0;
        let mut in_key_prefix = true;
        let mut in_hash_prefix = true;

        for (idx, col) in columns.iter().enumerate() {
            if name_to_index.insert(col.name().to_string(), idx).is_some() {
                return Err(WireError::invalid_schema(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }

            if col.is_key() {
                if !in_key_prefix {
                    return Err(WireError::invalid_schema(format!(
                        "out-of-order key column '{}' at index {}: key columns must be contiguous from index 0",
                        col.name(),
                        idx
                    )));
                }
                if col.is_nullable() {
                    return Err(WireError::invalid_schema(format!(
                        "nullable key column '{}' at index {}",
                        col.name(),
                        idx
                    )));
                }
                num_key_columns += 1;
            } else {
                in_key_prefix = false;
            }

            if col.is_hash_key() {
                if !in_hash_prefix {
                    return Err(WireError::invalid_schema(format!(
                        "hash key column '{}' at index {} follows a range key column",
                        col.name(),
                        idx
                    )));
                }
                num_hash_key_columns += 1;
            } else {
                in_hash_prefix = false;
            }
        }

        let mut col_offsets = Vec::with_capacity(columns.len());
        let mut byte_size = 0;
        for col in &columns {
            col_offsets.push(byte_size);
            byte_size += col.slot_size();
        }
        let has_nullables = columns.iter().any(ColumnSchema::is_nullable);

        Ok(Self {
            columns,
            column_ids,
            num_key_columns,
            num_hash_key_columns,
            name_to_index,
            col_offsets,
            byte_size,
            has_nullables,
        })
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnSchema> {
        self.columns.get(idx)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn num_key_columns(&self) -> usize {
        self.num_key_columns
    }

    pub fn num_hash_key_columns(&self) -> usize {
        self.num_hash_key_columns
    }

    pub fn is_key_column(&self, idx: usize) -> bool {
        idx < self.num_key_columns
    }

    pub fn has_column_ids(&self) -> bool {
        !self.column_ids.is_empty()
    }

    pub fn column_ids(&self) -> &[ColumnId] {
        &self.column_ids
    }

    pub fn column_id(&self, idx: usize) -> Option<ColumnId> {
        self.column_ids.get(idx).copied()
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Byte offset of column `idx` inside a row.
    pub fn column_offset(&self, idx: usize) -> usize {
        self.col_offsets[idx]
    }

    /// Bytes used by the column slots of one row, excluding the null bitmap.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn has_nullables(&self) -> bool {
        self.has_nullables
    }

    pub fn null_bitmap_size(&self) -> usize {
        if self.has_nullables {
            self.columns.len().div_ceil(8)
        } else {
            0
        }
    }

    /// Fixed per-row size of a row block's direct buffer.
    pub fn row_stride(&self) -> usize {
        self.byte_size + self.null_bitmap_size()
    }

    pub fn var_column_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.column_type().is_variable())
            .map(|(idx, _)| idx)
    }

    /// Same columns in the same order; ids are not compared.
    pub fn equals_ignoring_ids(&self, other: &Schema) -> bool {
        self.columns == other.columns
    }

    /// Returns a copy with the given ids attached.
    pub fn with_column_ids(&self, column_ids: Vec<ColumnId>) -> Result<Schema> {
        Schema::new(self.columns.clone(), column_ids)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && self.column_ids == other.column_ids
    }
}
