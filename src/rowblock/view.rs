//! # RowView - Zero-Copy Row Access
//!
//! A `RowView` is one row of a rewritten direct buffer together with the
//! indirect buffer its pointers refer to. Fixed columns are read straight out
//! of the row; variable columns resolve their absolute address back into a
//! checked range of the indirect buffer, so no getter ever dereferences an
//! address directly.
//!
//! ```ignore
//! let rows = extract_rows_from_row_block(&schema, &block, &indirect, &mut direct)?;
//! let id: i32 = rows[0].get_i32(0)?;
//! let name: &str = rows[0].get_str(1)?;   // borrows from `indirect`
//! ```
//!
//! Views are only valid while both buffers are alive and unmodified, which the
//! borrow checker enforces through `'a`.

use eyre::{ensure, Result};

use super::cell::read_fixed_cell;
use super::is_null_in_row;
use super::slot::VarSlot;
use crate::error::WireError;
use crate::schema::{ColumnSchema, Schema};
use crate::types::{DataType, Value};

#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    schema: &'a Schema,
    index: usize,
    row: &'a [u8],
    indirect: &'a [u8],
}

impl<'a> RowView<'a> {
    pub(crate) fn new(schema: &'a Schema, index: usize, row: &'a [u8], indirect: &'a [u8]) -> Self {
        Self {
            schema,
            index,
            row,
            indirect,
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Position of this row within its block.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The row's bytes in the direct buffer, with absolute pointers.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.row
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn is_null(&self, col: usize) -> bool {
        is_null_in_row(self.schema, self.row, col)
    }

    fn column(&self, col: usize) -> Result<&'a ColumnSchema> {
        self.schema
            .column(col)
            .ok_or_else(|| {
                eyre::eyre!(
                    "column {} out of range for {} columns",
                    col,
                    self.schema.column_count()
                )
            })
    }

    fn fixed_bytes(&self, col: usize, expected: DataType) -> Result<&'a [u8]> {
        let column = self.column(col)?;
        ensure!(
            column.column_type().data_type() == expected,
            "column '{}' has type {}, not {}",
            column.name(),
            column.column_type(),
            expected.cql_name()
        );
        ensure!(!self.is_null(col), "column '{}' is null", column.name());
        let start = self.schema.column_offset(col);
        let width = column.slot_size();
        self.row
            .get(start..start + width)
            .ok_or_else(|| eyre::eyre!("insufficient data for column '{}'", column.name()))
    }

    pub fn get_bool(&self, col: usize) -> Result<bool> {
        Ok(self.fixed_bytes(col, DataType::Bool)?[0] != 0)
    }

    pub fn get_i8(&self, col: usize) -> Result<i8> {
        let bytes = self.fixed_bytes(col, DataType::Int8)?;
        Ok(i8::from_le_bytes([bytes[0]]))
    }

    pub fn get_i16(&self, col: usize) -> Result<i16> {
        let bytes = self.fixed_bytes(col, DataType::Int16)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn get_i32(&self, col: usize) -> Result<i32> {
        let bytes: [u8; 4] = self
            .fixed_bytes(col, DataType::Int32)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for int at col {}", col))?;
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn get_i64(&self, col: usize) -> Result<i64> {
        let bytes: [u8; 8] = self
            .fixed_bytes(col, DataType::Int64)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for bigint at col {}", col))?;
        Ok(i64::from_le_bytes(bytes))
    }

    pub fn get_f32(&self, col: usize) -> Result<f32> {
        let bytes: [u8; 4] = self
            .fixed_bytes(col, DataType::Float)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for float at col {}", col))?;
        Ok(f32::from_le_bytes(bytes))
    }

    pub fn get_f64(&self, col: usize) -> Result<f64> {
        let bytes: [u8; 8] = self
            .fixed_bytes(col, DataType::Double)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for double at col {}", col))?;
        Ok(f64::from_le_bytes(bytes))
    }

    /// Microseconds since the Unix epoch.
    pub fn get_timestamp(&self, col: usize) -> Result<i64> {
        let bytes: [u8; 8] = self
            .fixed_bytes(col, DataType::Timestamp)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for timestamp at col {}", col))?;
        Ok(i64::from_le_bytes(bytes))
    }

    pub fn get_uuid(&self, col: usize) -> Result<[u8; 16]> {
        self.fixed_bytes(col, DataType::Uuid)?
            .try_into()
            .map_err(|_| eyre::eyre!("insufficient data for uuid at col {}", col))
    }

    /// Raw payload of a variable-width column, borrowed from the indirect buffer.
    pub fn get_bytes(&self, col: usize) -> Result<&'a [u8]> {
        let column = self.column(col)?;
        ensure!(
            column.column_type().is_variable(),
            "column '{}' of type {} is not variable width",
            column.name(),
            column.column_type()
        );
        ensure!(!self.is_null(col), "column '{}' is null", column.name());

        let start = self.schema.column_offset(col);
        let slot = VarSlot::from_bytes(&self.row[start..])?;
        self.resolve(col, slot.offset(), slot.byte_len())
    }

    pub fn get_str(&self, col: usize) -> Result<&'a str> {
        let bytes = self.get_bytes(col)?;
        std::str::from_utf8(bytes)
            .map_err(|e| WireError::corrupt(format!("invalid UTF-8 in column {}: {}", col, e)))
    }

    /// Maps an absolute address back to a range of the indirect buffer.
    fn resolve(&self, col: usize, addr: u64, len: u64) -> Result<&'a [u8]> {
        let base = self.indirect.as_ptr() as u64;
        let range = addr
            .checked_sub(base)
            .and_then(|start| Some((start, start.checked_add(len)?)))
            .filter(|&(_, end)| end <= self.indirect.len() as u64);
        match range {
            Some((start, end)) => Ok(&self.indirect[start as usize..end as usize]),
            None => Err(eyre::Report::new(WireError::PointerOutOfRange {
                row: self.index,
                column: col,
                offset: addr,
                len,
                indirect_len: self.indirect.len(),
            })
            .wrap_err("row view pointer does not address its indirect buffer")),
        }
    }

    pub fn value(&self, col: usize) -> Result<Value> {
        let column = self.column(col)?;
        if self.is_null(col) {
            return Ok(Value::Null);
        }
        let ty = column.column_type();
        if ty.is_variable() {
            Value::deserialize_payload(ty, self.get_bytes(col)?)
        } else {
            let start = self.schema.column_offset(col);
            read_fixed_cell(ty.data_type(), &self.row[start..])
        }
    }

    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.column_count()).map(|col| self.value(col)).collect()
    }
}
