//! # Row Batches
//!
//! A `RowBatch` is the in-memory, column-oriented form that queries produce
//! and `serialize_row_batch` consumes. Each column is one `ColumnBlock`:
//!
//! ```text
//! fixed column:     [cell 0][cell 1][cell 2] ...      (width bytes each, LE)
//! variable column:  ends = [0, e0, e1, e2, ...]
//!                   bytes = payload 0 | payload 1 | payload 2 ...
//! nulls (optional): one bit per row, set = null
//! ```
//!
//! Variable payloads are `Value::serialize_payload` images, which is exactly
//! what ends up in a row block's indirect buffer.
//!
//! The `SelectionVector` marks which rows take part in serialization. Rows are
//! always emitted in ascending row order.

use std::sync::Arc;

use eyre::{ensure, Result};

use super::cell::{read_fixed_cell, write_fixed_cell};
use crate::error::WireError;
use crate::schema::Schema;
use crate::types::{ColumnType, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionVector {
    bits: Vec<u64>,
    len: usize,
}

impl SelectionVector {
    pub fn all_selected(len: usize) -> Self {
        let mut bits = vec![u64::MAX; len.div_ceil(64)];
        if len % 64 != 0 {
            if let Some(last) = bits.last_mut() {
                *last = (1u64 << (len % 64)) - 1;
            }
        }
        Self { bits, len }
    }

    pub fn none_selected(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_selected(&self, row: usize) -> bool {
        row < self.len && self.bits[row / 64] & (1 << (row % 64)) != 0
    }

    pub fn set(&mut self, row: usize, selected: bool) {
        assert!(row < self.len, "row {} out of range for {} rows", row, self.len);
        let mask = 1u64 << (row % 64);
        if selected {
            self.bits[row / 64] |= mask;
        } else {
            self.bits[row / 64] &= !mask;
        }
    }

    pub fn count_selected(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter_selected(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&row| self.is_selected(row))
    }
}

/// One cell of a column, borrowed from the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Null,
    Fixed(&'a [u8]),
    Variable(&'a [u8]),
}

#[derive(Debug, Clone)]
enum ColumnData {
    Fixed { width: usize, bytes: Vec<u8> },
    Variable { ends: Vec<usize>, bytes: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct ColumnBlock {
    column_type: ColumnType,
    data: ColumnData,
    nulls: Option<Vec<u8>>,
    len: usize,
}

impl ColumnBlock {
    fn new(column_type: ColumnType, nullable: bool) -> Self {
        let data = match column_type.fixed_size() {
            Some(width) => ColumnData::Fixed {
                width,
                bytes: Vec::new(),
            },
            None => ColumnData::Variable {
                ends: vec![0],
                bytes: Vec::new(),
            },
        };
        Self {
            column_type,
            data,
            nulls: nullable.then(Vec::new),
            len: 0,
        }
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_null(&self, row: usize) -> bool {
        match &self.nulls {
            Some(bitmap) => bitmap
                .get(row / 8)
                .is_some_and(|byte| byte & (1 << (row % 8)) != 0),
            None => false,
        }
    }

    pub fn cell(&self, row: usize) -> Option<Cell<'_>> {
        if row >= self.len {
            return None;
        }
        if self.is_null(row) {
            return Some(Cell::Null);
        }
        Some(match &self.data {
            ColumnData::Fixed { width, bytes } => {
                Cell::Fixed(&bytes[row * width..(row + 1) * width])
            }
            ColumnData::Variable { ends, bytes } => Cell::Variable(&bytes[ends[row]..ends[row + 1]]),
        })
    }

    fn push(&mut self, value: &Value) -> Result<()> {
        let row = self.len;
        if let Some(bitmap) = &mut self.nulls {
            if row % 8 == 0 {
                bitmap.push(0);
            }
            if value.is_null() {
                bitmap[row / 8] |= 1 << (row % 8);
            }
        }

        match &mut self.data {
            ColumnData::Fixed { width, bytes } => {
                let start = bytes.len();
                bytes.resize(start + *width, 0);
                if !value.is_null() {
                    write_fixed_cell(value, &mut bytes[start..])?;
                }
            }
            ColumnData::Variable { ends, bytes } => {
                if !value.is_null() {
                    value.serialize_payload(bytes)?;
                }
                ends.push(bytes.len());
            }
        }
        self.len += 1;
        Ok(())
    }

    fn value(&self, row: usize) -> Result<Value> {
        match self.cell(row) {
            None => Err(eyre::eyre!(
                "row {} out of range for column of {} rows",
                row,
                self.len
            )),
            Some(Cell::Null) => Ok(Value::Null),
            Some(Cell::Fixed(bytes)) => read_fixed_cell(self.column_type.data_type(), bytes),
            Some(Cell::Variable(bytes)) => Value::deserialize_payload(&self.column_type, bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RowBatch {
    schema: Arc<Schema>,
    num_rows: usize,
    columns: Vec<ColumnBlock>,
    selection: SelectionVector,
}

impl RowBatch {
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnBlock> {
        self.columns.get(idx)
    }

    pub fn selection(&self) -> &SelectionVector {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionVector {
        &mut self.selection
    }

    pub fn value(&self, row: usize, col: usize) -> Result<Value> {
        let column = self
            .columns
            .get(col)
            .ok_or_else(|| eyre::eyre!("column {} out of range", col))?;
        column.value(row)
    }

    /// Values of every column of `row`.
    pub fn row_values(&self, row: usize) -> Result<Vec<Value>> {
        (0..self.columns.len()).map(|col| self.value(row, col)).collect()
    }
}

/// Appends rows to a batch, checking each row against the schema.
#[derive(Debug)]
pub struct RowBatchBuilder {
    schema: Arc<Schema>,
    columns: Vec<ColumnBlock>,
    num_rows: usize,
}

impl RowBatchBuilder {
    pub fn new(schema: Arc<Schema>) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|c| ColumnBlock::new(c.column_type().clone(), c.is_nullable()))
            .collect();
        Self {
            schema,
            columns,
            num_rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Appends one row. The whole row is checked before anything is written,
    /// so a rejected row leaves the builder unchanged.
    pub fn push_row(&mut self, values: &[Value]) -> Result<()> {
        ensure!(
            values.len() == self.schema.column_count(),
            "row has {} values but the schema has {} columns",
            values.len(),
            self.schema.column_count()
        );
        for (col, value) in self.schema.columns().iter().zip(values) {
            if value.is_null() {
                if !col.is_nullable() {
                    return Err(WireError::invalid_schema(format!(
                        "null value for non-nullable column '{}'",
                        col.name()
                    )));
                }
                continue;
            }
            ensure!(
                value.matches_type(col.column_type()),
                "value {:?} does not match type {} of column '{}'",
                value,
                col.column_type(),
                col.name()
            );
        }

        for (block, value) in self.columns.iter_mut().zip(values) {
            block.push(value)?;
        }
        self.num_rows += 1;
        Ok(())
    }

    /// Finishes the batch with every row selected.
    pub fn finish(self) -> RowBatch {
        RowBatch {
            selection: SelectionVector::all_selected(self.num_rows),
            schema: self.schema,
            num_rows: self.num_rows,
            columns: self.columns,
        }
    }
}
