use eyre::Result;
use smallvec::SmallVec;

use super::batch::{Cell, RowBatch};
use super::slot::VarSlot;
use super::{set_null_in_row, RowBlockPb};
use crate::error::WireError;
use crate::schema::Schema;

/// Appends the selected rows of `batch` to `direct` and `indirect`.
///
/// With a `projection`, only its columns are written, in its order; each is
/// matched to a batch column by name and must have the same type. Variable
/// slots carry offsets relative to the start of `indirect`, so both buffers
/// may already hold earlier rows of the same layout. The returned block counts
/// only the rows appended by this call.
///
/// # Panics
///
/// Panics if `batch` has no rows.
pub fn serialize_row_batch(
    batch: &RowBatch,
    projection: Option<&Schema>,
    direct: &mut Vec<u8>,
    indirect: &mut Vec<u8>,
) -> Result<RowBlockPb> {
    assert!(batch.num_rows() > 0, "cannot serialize an empty row batch");

    let source = batch.schema().as_ref();
    let out = projection.unwrap_or(source);
    let mapping = resolve_projection(source, projection)?;

    let stride = out.row_stride();
    let direct_start = direct.len();
    let indirect_start = indirect.len();
    direct.reserve(batch.selection().count_selected() * stride);

    let mut written = 0usize;
    for row in batch.selection().iter_selected() {
        let row_start = direct.len();
        direct.resize(row_start + stride, 0);

        for (out_idx, &src_idx) in mapping.iter().enumerate() {
            let cell = batch
                .column(src_idx)
                .and_then(|c| c.cell(row))
                .ok_or_else(|| eyre::eyre!("row {} column {} missing from batch", row, src_idx))?;
            let slot_start = row_start + out.column_offset(out_idx);

            match cell {
                Cell::Null => set_null_in_row(out, &mut direct[row_start..], out_idx),
                Cell::Fixed(bytes) => {
                    direct[slot_start..slot_start + bytes.len()].copy_from_slice(bytes);
                }
                Cell::Variable(bytes) => {
                    let slot = VarSlot::new(indirect.len() as u64, bytes.len() as u64);
                    indirect.extend_from_slice(bytes);
                    slot.store(&mut direct[slot_start..])?;
                }
            }
        }
        written += 1;
    }

    tracing::debug!(
        rows = written,
        direct_bytes = direct.len() - direct_start,
        indirect_bytes = indirect.len() - indirect_start,
        "serialized row batch"
    );
    Ok(RowBlockPb {
        num_rows: written as u64,
    })
}

fn resolve_projection(
    source: &Schema,
    projection: Option<&Schema>,
) -> Result<SmallVec<[usize; 16]>> {
    let Some(projection) = projection else {
        return Ok((0..source.column_count()).collect());
    };

    projection
        .columns()
        .iter()
        .map(|col| {
            let idx = source.find_column(col.name()).ok_or_else(|| {
                WireError::invalid_schema(format!(
                    "projection column '{}' is not in the batch schema",
                    col.name()
                ))
            })?;
            let src = &source.columns()[idx];
            if src.column_type() != col.column_type() {
                return Err(WireError::invalid_schema(format!(
                    "projection column '{}' has type {} but the batch column has type {}",
                    col.name(),
                    col.column_type(),
                    src.column_type()
                )));
            }
            if src.is_nullable() && !col.is_nullable() {
                return Err(WireError::invalid_schema(format!(
                    "projection column '{}' is not nullable but the batch column is",
                    col.name()
                )));
            }
            Ok(idx)
        })
        .collect()
}
