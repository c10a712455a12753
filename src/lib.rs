//! # rowwire - Row Batch And Schema Wire Codecs
//!
//! rowwire is the wire-serialization layer of a distributed tabular engine.
//! It converts columnar row batches and table schemas into compact binary
//! messages and back, and provides the length-prefixed value codec used by a
//! CQL-style row protocol.
//!
//! - **Position-independent wire form**: row blocks carry relative offsets
//!   that are rewritten to absolute addresses only after the whole block has
//!   been validated
//! - **Zero-copy reads**: `RowView` borrows straight from the received
//!   buffers
//! - **All-or-nothing decoding**: a malformed message is rejected as a whole
//!   and never leaves partial output behind
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rowwire::{serialize_row_batch, extract_rows_from_row_block};
//! use rowwire::{DataType, RowBatchBuilder, SchemaBuilder, Value};
//!
//! let schema = Arc::new(
//!     SchemaBuilder::new()
//!         .add_hash_key_column("id", DataType::Int32)
//!         .add_column("name", DataType::String)
//!         .build()?,
//! );
//!
//! let mut builder = RowBatchBuilder::new(Arc::clone(&schema));
//! builder.push_row(&[Value::Int32(1), Value::from("alice")])?;
//! let batch = builder.finish();
//!
//! let (mut direct, mut indirect) = (Vec::new(), Vec::new());
//! let block = serialize_row_batch(&batch, None, &mut direct, &mut indirect)?;
//!
//! // ... transmit block, direct and indirect ...
//!
//! let rows = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct)?;
//! assert_eq!(rows[0].get_str(1)?, "alice");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Row Blocks (serialize / extract)   │
//! ├───────────────────┬─────────────────┤
//! │  Schema Converter │  Row Batches     │
//! ├───────────────────┴─────────────────┤
//! │  CQL Value Codec (length-prefixed)   │
//! ├─────────────────────────────────────┤
//! │  Byte Order │ Types │ Config │ Error │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`types`]: `DataType`, `ColumnType`, `Value`
//! - [`encoding`]: byte-order helpers and the length-prefixed value codec
//! - [`schema`]: validated schemas, the builder and wire conversion
//! - [`rowblock`]: row batches, the row block codec and row views
//! - [`config`]: wire layout constants
//! - [`error`]: the `WireError` kinds carried inside `eyre::Report`

#[macro_use]
mod macros;

pub mod config;
pub mod encoding;
pub mod error;
pub mod rowblock;
pub mod schema;
pub mod types;

pub use error::WireError;
pub use rowblock::{
    deserialize_row_block, extract_rows_from_row_block, relativize_row_block_pointers,
    rewrite_row_block_pointers, serialize_row_batch, LoadedRowBlock, RowBatch, RowBatchBuilder,
    RowBlockPb, RowView, SelectionVector,
};
pub use schema::{
    schema_flags, schema_from_columns, schema_from_wire, schema_to_wire, ColumnId, ColumnSchema,
    ColumnSchemaPb, Schema, SchemaBuilder, SchemaPb,
};
pub use types::{ColumnType, DataType, Value};
