//! # Pointer Rewriting
//!
//! Converts the `VarSlot` offsets of a direct buffer between their wire form
//! (relative to the indirect buffer) and their loaded form (absolute address
//! inside the indirect buffer).
//!
//! Both directions run in two passes. The first pass checks the null bitmap
//! and every non-null slot of every row; the second pass rewrites. A block
//! with a single bad slot is therefore rejected without any slot having been
//! touched.

use eyre::Result;
use smallvec::SmallVec;

use super::slot::VarSlot;
use super::{check_direct_len, check_null_bitmaps, is_null_in_row};
use crate::error::WireError;
use crate::schema::Schema;

type VarColumns = SmallVec<[(usize, usize); 8]>;

/// (column index, slot offset within the row) for every variable column.
fn var_columns(schema: &Schema) -> VarColumns {
    schema
        .var_column_indices()
        .map(|col| (col, schema.column_offset(col)))
        .collect()
}

fn rows<'a>(direct: &'a [u8], stride: usize, num_rows: usize) -> impl Iterator<Item = &'a [u8]> {
    (0..num_rows).map(move |i| &direct[i * stride..(i + 1) * stride])
}

fn out_of_range(
    row: usize,
    column: usize,
    offset: u64,
    len: u64,
    indirect_len: usize,
) -> eyre::Report {
    tracing::warn!(row, column, offset, len, indirect_len, "rejecting row block pointer");
    eyre::Report::new(WireError::PointerOutOfRange {
        row,
        column,
        offset,
        len,
        indirect_len,
    })
}

/// Replaces every relative offset in `direct` with the absolute address of the
/// referenced bytes in `indirect`.
///
/// Must run exactly once per received buffer. Fails with
/// `WireError::CorruptData` on a partial row or a null bit set on a
/// non-nullable column, and with `WireError::PointerOutOfRange`
/// when `offset + len` runs past `indirect`; on failure `direct` is unchanged.
pub fn rewrite_row_block_pointers(
    schema: &Schema,
    direct: &mut [u8],
    indirect: &[u8],
) -> Result<()> {
    let num_rows = check_direct_len(schema, direct.len())?;
    check_null_bitmaps(schema, direct, num_rows)?;
    let vars = var_columns(schema);
    if vars.is_empty() || num_rows == 0 {
        return Ok(());
    }
    let stride = schema.row_stride();

    for (row_idx, row) in rows(direct, stride, num_rows).enumerate() {
        for &(col, slot_offset) in &vars {
            if is_null_in_row(schema, row, col) {
                continue;
            }
            let slot = VarSlot::from_bytes(&row[slot_offset..])?;
            let (offset, len) = (slot.offset(), slot.byte_len());
            let in_range = offset
                .checked_add(len)
                .is_some_and(|end| end <= indirect.len() as u64);
            if !in_range {
                return Err(out_of_range(row_idx, col, offset, len, indirect.len()));
            }
        }
    }

    let base = indirect.as_ptr() as u64;
    for row in direct.chunks_exact_mut(stride) {
        for &(col, slot_offset) in &vars {
            if is_null_in_row(schema, row, col) {
                continue;
            }
            let slot = VarSlot::from_bytes_mut(&mut row[slot_offset..])?;
            let absolute = base + slot.offset();
            slot.set_offset(absolute);
        }
    }

    tracing::trace!(rows = num_rows, base, "rewrote row block pointers");
    Ok(())
}

/// Inverse of [`rewrite_row_block_pointers`]: turns absolute addresses into
/// offsets relative to `indirect` so the block can be transmitted again.
pub fn relativize_row_block_pointers(
    schema: &Schema,
    direct: &mut [u8],
    indirect: &[u8],
) -> Result<()> {
    let num_rows = check_direct_len(schema, direct.len())?;
    check_null_bitmaps(schema, direct, num_rows)?;
    let vars = var_columns(schema);
    if vars.is_empty() || num_rows == 0 {
        return Ok(());
    }
    let stride = schema.row_stride();
    let base = indirect.as_ptr() as u64;

    for (row_idx, row) in rows(direct, stride, num_rows).enumerate() {
        for &(col, slot_offset) in &vars {
            if is_null_in_row(schema, row, col) {
                continue;
            }
            let slot = VarSlot::from_bytes(&row[slot_offset..])?;
            let (addr, len) = (slot.offset(), slot.byte_len());
            let in_range = addr
                .checked_sub(base)
                .and_then(|offset| offset.checked_add(len))
                .is_some_and(|end| end <= indirect.len() as u64);
            if !in_range {
                return Err(out_of_range(row_idx, col, addr, len, indirect.len()));
            }
        }
    }

    for row in direct.chunks_exact_mut(stride) {
        for &(col, slot_offset) in &vars {
            if is_null_in_row(schema, row, col) {
                continue;
            }
            let slot = VarSlot::from_bytes_mut(&mut row[slot_offset..])?;
            let relative = slot.offset() - base;
            slot.set_offset(relative);
        }
    }
    Ok(())
}
