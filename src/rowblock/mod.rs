//! # Row Blocks
//!
//! A row block is the wire form of a `RowBatch`: two coupled byte buffers
//! plus a row count, interpreted through a schema both sides already know.
//!
//! ```text
//! direct (fixed stride, one row after another):
//! +----------+----------------------+----------+-------------+
//! | id (i32) | name VarSlot (16B)   | score f64| null bitmap |  row 0
//! +----------+----------------------+----------+-------------+
//! | id (i32) | name VarSlot (16B)   | score f64| null bitmap |  row 1
//! +----------+----------------------+----------+-------------+
//!                 │ offset, len
//!                 ▼
//! indirect:  "alice" "bob" ...   (payloads in row/column emission order)
//! ```
//!
//! ## Relative And Absolute Pointers
//!
//! On the wire every `VarSlot` offset is relative to the start of the indirect
//! buffer, so a block is position independent. On the receiving side
//! `rewrite_row_block_pointers` turns each offset into the absolute address
//! `indirect.as_ptr() + offset`, which `RowView` resolves back into a bounds
//! checked range of the same buffer. A rewritten block is tied to that buffer
//! and must be relativized again (`LoadedRowBlock::into_wire`) before it can be
//! sent anywhere.
//!
//! ## Lifecycle
//!
//! ```text
//! RowBatch ──serialize_row_batch──> (RowBlockPb, direct, indirect)   wire
//!                                              │
//!                       extract_rows_from_row_block / LoadedRowBlock::load
//!                                              ▼
//!                     validate stride ─> validate every slot ─> rewrite
//!                                              │
//!                                              ▼
//!                                       RowView per row
//! ```
//!
//! Every decode step validates the whole block before mutating it, so a
//! rejected block is left exactly as it was received.

mod batch;
mod cell;
mod extract;
mod loaded;
mod rewrite;
mod serialize;
mod slot;
mod view;


pub use batch::{Cell, ColumnBlock, RowBatch, RowBatchBuilder, SelectionVector};
pub use extract::{deserialize_row_block, extract_rows_from_row_block};
pub use loaded::LoadedRowBlock;
pub use rewrite::{relativize_row_block_pointers, rewrite_row_block_pointers};
pub use serialize::serialize_row_batch;
pub use slot::VarSlot;
pub use view::RowView;

use eyre::Result;
use smallvec::SmallVec;

use crate::error::WireError;
use crate::schema::Schema;

/// Row block metadata sent alongside the direct and indirect buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowBlockPb {
    pub num_rows: u64,
}

/// Reads the null bit of `col`. Columns the schema declares non-nullable are
/// never null, whatever their bit holds.
#[inline]
pub(crate) fn is_null_in_row(schema: &Schema, row: &[u8], col: usize) -> bool {
    if !schema.column(col).is_some_and(|c| c.is_nullable()) {
        return false;
    }
    row.get(schema.byte_size() + col / 8)
        .is_some_and(|byte| byte & (1 << (col % 8)) != 0)
}

/// Rejects a direct buffer whose null bitmaps mark a non-nullable column, or a
/// padding bit past the last column, as null.
pub(crate) fn check_null_bitmaps(schema: &Schema, direct: &[u8], num_rows: usize) -> Result<()> {
    let bitmap_size = schema.null_bitmap_size();
    if bitmap_size == 0 {
        return Ok(());
    }

    let mut allowed: SmallVec<[u8; 8]> = SmallVec::from_elem(0, bitmap_size);
    for (col, column) in schema.columns().iter().enumerate() {
        if column.is_nullable() {
            allowed[col / 8] |= 1 << (col % 8);
        }
    }

    let stride = schema.row_stride();
    let bitmap_start = schema.byte_size();
    for row_idx in 0..num_rows {
        let row = &direct[row_idx * stride..(row_idx + 1) * stride];
        let bitmap = &row[bitmap_start..bitmap_start + bitmap_size];
        for (byte_idx, (&bits, &mask)) in bitmap.iter().zip(allowed.iter()).enumerate() {
            let stray = bits & !mask;
            if stray != 0 {
                let col = byte_idx * 8 + stray.trailing_zeros() as usize;
                tracing::warn!(row = row_idx, column = col, "rejecting row block null bitmap");
                return Err(WireError::corrupt(format!(
                    "row {} marks non-nullable column {} as null",
                    row_idx, col
                )));
            }
        }
    }
    Ok(())
}

#[inline]
pub(crate) fn set_null_in_row(schema: &Schema, row: &mut [u8], col: usize) {
    row[schema.byte_size() + col / 8] |= 1 << (col % 8);
}

/// Rejects a direct buffer that is not a whole number of rows.
pub(crate) fn check_direct_len(schema: &Schema, direct_len: usize) -> Result<usize> {
    let stride = schema.row_stride();
    if stride == 0 {
        if direct_len != 0 {
            return Err(WireError::corrupt(format!(
                "{} direct bytes for a schema with an empty row",
                direct_len
            )));
        }
        return Ok(0);
    }
    if direct_len % stride != 0 {
        tracing::warn!(direct_len, stride, "rejecting row block with partial row");
        return Err(WireError::corrupt(format!(
            "direct buffer of {} bytes is not a multiple of the row stride {}",
            direct_len, stride
        )));
    }
    Ok(direct_len / stride)
}
