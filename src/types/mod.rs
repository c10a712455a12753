//! # Type System
//!
//! ## Module Structure
//!
//! - `data_type`: `DataType` discriminant with inline widths
//! - `column_type`: `ColumnType`, a discriminant plus collection parameters
//! - `value`: owned runtime `Value`
//!
//! | Type | Purpose |
//! |------|---------|
//! | `DataType` | Storage-level discriminant, one byte on the wire |
//! | `ColumnType` | Logical column type (`int`, `list<text>`, ...) |
//! | `Value` | Owned cell value for batches, views and the CQL codec |

mod column_type;
mod data_type;
mod value;

pub use column_type::ColumnType;
pub use data_type::DataType;
pub use value::Value;
