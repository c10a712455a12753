//! # LoadedRowBlock
//!
//! Owning counterpart of `extract_rows_from_row_block`. The block takes both
//! buffers, rewrites the pointers once, and lends out `RowView`s for as long
//! as it lives. Moving the block moves the `Vec` handles, not their heap
//! storage, so the rewritten addresses stay valid.
//!
//! ```ignore
//! let loaded = LoadedRowBlock::load(schema, &block, direct, indirect)?;
//! for row in loaded.rows() {
//!     println!("{:?}", row.values()?);
//! }
//! let (block, direct, indirect) = loaded.into_wire()?;   // relative again
//! ```

use std::sync::Arc;

use eyre::Result;

use super::extract::check_row_count;
use super::rewrite::{relativize_row_block_pointers, rewrite_row_block_pointers};
use super::view::RowView;
use super::RowBlockPb;
use crate::schema::Schema;

#[derive(Debug)]
pub struct LoadedRowBlock {
    schema: Arc<Schema>,
    direct: Vec<u8>,
    indirect: Vec<u8>,
    num_rows: usize,
}

impl LoadedRowBlock {
    pub fn load(
        schema: Arc<Schema>,
        block: &RowBlockPb,
        mut direct: Vec<u8>,
        indirect: Vec<u8>,
    ) -> Result<Self> {
        let num_rows = check_row_count(&schema, block, direct.len())?;
        rewrite_row_block_pointers(&schema, &mut direct, &indirect)?;
        tracing::debug!(
            rows = num_rows,
            direct_bytes = direct.len(),
            indirect_bytes = indirect.len(),
            "loaded row block"
        );
        Ok(Self {
            schema,
            direct,
            indirect,
            num_rows,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn row(&self, idx: usize) -> Option<RowView<'_>> {
        if idx >= self.num_rows {
            return None;
        }
        let stride = self.schema.row_stride();
        Some(RowView::new(
            &self.schema,
            idx,
            &self.direct[idx * stride..(idx + 1) * stride],
            &self.indirect,
        ))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        (0..self.num_rows).filter_map(move |idx| self.row(idx))
    }

    /// Converts the pointers back to relative offsets and returns the wire
    /// form of the block.
    pub fn into_wire(self) -> Result<(RowBlockPb, Vec<u8>, Vec<u8>)> {
        let Self {
            schema,
            mut direct,
            indirect,
            num_rows,
        } = self;
        relativize_row_block_pointers(&schema, &mut direct, &indirect)?;
        Ok((
            RowBlockPb {
                num_rows: num_rows as u64,
            },
            direct,
            indirect,
        ))
    }
}
