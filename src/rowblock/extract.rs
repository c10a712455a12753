use eyre::Result;

use super::rewrite::rewrite_row_block_pointers;
use super::view::RowView;
use super::{check_direct_len, RowBlockPb};
use crate::error::WireError;
use crate::schema::Schema;

/// Rewrites a received block in place and returns one view per row.
///
/// `direct` must hold exactly `block.num_rows` rows. The views borrow both
/// buffers, and `direct` stays borrowed for as long as any view is alive, so
/// the rewritten pointers cannot be invalidated underneath them. Any failure
/// rejects the whole block and leaves `direct` untouched.
pub fn extract_rows_from_row_block<'a>(
    schema: &'a Schema,
    block: &RowBlockPb,
    indirect: &'a [u8],
    direct: &'a mut [u8],
) -> Result<Vec<RowView<'a>>> {
    let num_rows = check_row_count(schema, block, direct.len())?;
    rewrite_row_block_pointers(schema, direct, indirect)?;

    let direct: &'a [u8] = direct;
    let stride = schema.row_stride();
    let rows = (0..num_rows)
        .map(move |i| RowView::new(schema, i, &direct[i * stride..(i + 1) * stride], indirect))
        .collect::<Vec<_>>();

    tracing::debug!(
        rows = num_rows,
        direct_bytes = direct.len(),
        indirect_bytes = indirect.len(),
        "extracted rows from row block"
    );
    Ok(rows)
}

/// Like [`extract_rows_from_row_block`] with the row count taken from the
/// length of `direct`.
///
/// A schema whose rows are zero bytes wide carries no count in `direct`, so
/// such blocks are rejected here and must go through
/// [`extract_rows_from_row_block`] with their `RowBlockPb`.
pub fn deserialize_row_block<'a>(
    schema: &'a Schema,
    direct: &'a mut [u8],
    indirect: &'a [u8],
) -> Result<Vec<RowView<'a>>> {
    if schema.row_stride() == 0 {
        return Err(WireError::corrupt(
            "cannot infer the row count of a zero-width row block",
        ));
    }
    let num_rows = check_direct_len(schema, direct.len())?;
    let block = RowBlockPb {
        num_rows: num_rows as u64,
    };
    extract_rows_from_row_block(schema, &block, indirect, direct)
}

pub(crate) fn check_row_count(
    schema: &Schema,
    block: &RowBlockPb,
    direct_len: usize,
) -> Result<usize> {
    let expected = usize::try_from(block.num_rows)
        .ok()
        .and_then(|n| n.checked_mul(schema.row_stride()).map(|len| (n, len)));
    match expected {
        Some((num_rows, len)) if len == direct_len => Ok(num_rows),
        _ => {
            tracing::warn!(
                num_rows = block.num_rows,
                stride = schema.row_stride(),
                direct_len,
                "rejecting row block with mismatched row count"
            );
            Err(WireError::corrupt(format!(
                "row block claims {} rows of {} bytes but the direct buffer has {} bytes",
                block.num_rows,
                schema.row_stride(),
                direct_len
            )))
        }
    }
}
