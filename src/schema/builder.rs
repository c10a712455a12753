//! # SchemaBuilder
//!
//! Incremental schema construction with local id assignment:
//!
//! ```ignore
//! let schema = SchemaBuilder::new()
//!     .add_hash_key_column("keyspace_name", DataType::String)
//!     .add_key_column("type_name", DataType::String)
//!     .add_nullable_column("field_names", ColumnType::list(DataType::String))
//!     .build()?;
//! ```
//!
//! Validation is deferred to `build()`, which reports the first violation.

use eyre::Result;

use super::{ColumnId, ColumnSchema, Schema};
use crate::config::FIRST_COLUMN_ID;
use crate::types::ColumnType;

#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    columns: Vec<ColumnSchema>,
    assign_ids: bool,
    next_id: u32,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            assign_ids: true,
            next_id: FIRST_COLUMN_ID,
        }
    }

    /// Builds schemas with no column ids, for ids that the server assigns later.
    pub fn without_ids() -> Self {
        Self {
            assign_ids: false,
            ..Self::new()
        }
    }

    pub fn next_id(mut self, id: u32) -> Self {
        self.next_id = id;
        self
    }

    pub fn add_hash_key_column(self, name: &str, ty: impl Into<ColumnType>) -> Self {
        self.add_column_schema(ColumnSchema::new(name, ty).hash_key())
    }

    pub fn add_key_column(self, name: &str, ty: impl Into<ColumnType>) -> Self {
        self.add_column_schema(ColumnSchema::new(name, ty).key())
    }

    pub fn add_column(self, name: &str, ty: impl Into<ColumnType>) -> Self {
        self.add_column_schema(ColumnSchema::new(name, ty))
    }

    pub fn add_nullable_column(self, name: &str, ty: impl Into<ColumnType>) -> Self {
        self.add_column_schema(ColumnSchema::new(name, ty).nullable(true))
    }

    pub fn add_column_schema(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let ids = if self.assign_ids {
            (0..self.columns.len() as u32)
                .map(|i| ColumnId(self.next_id + i))
                .collect()
        } else {
            Vec::new()
        };
        Schema::new(self.columns, ids)
    }
}
