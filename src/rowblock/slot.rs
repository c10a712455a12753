//! # Variable-Length Slots
//!
//! A variable-width cell in the direct buffer is a 16-byte `VarSlot`:
//!
//! ```text
//! +---------------------------+---------------------------+
//! | offset / address (u64 LE) | length (u64 LE)           |
//! +---------------------------+---------------------------+
//! ```
//!
//! On the wire `offset` is relative to the start of the indirect buffer. After
//! `rewrite_row_block_pointers` it is the absolute address of the first byte.
//! A null cell is all zeros and is never rewritten.
//!
//! The struct is `Unaligned`, so it can be viewed in place at any row offset
//! without copying.

use eyre::{ensure, Result};
use zerocopy::little_endian::U64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::VAR_SLOT_SIZE;

#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct VarSlot {
    offset: U64,
    byte_len: U64,
}

const _: () = assert!(std::mem::size_of::<VarSlot>() == VAR_SLOT_SIZE);

impl VarSlot {
    pub fn new(offset: u64, len: u64) -> Self {
        Self {
            offset: U64::new(offset),
            byte_len: U64::new(len),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= VAR_SLOT_SIZE,
            "buffer too small for VarSlot: {} < {}",
            bytes.len(),
            VAR_SLOT_SIZE
        );
        Self::ref_from_bytes(&bytes[..VAR_SLOT_SIZE])
            .map_err(|e| eyre::eyre!("failed to read VarSlot: {:?}", e))
    }

    pub fn from_bytes_mut(bytes: &mut [u8]) -> Result<&mut Self> {
        ensure!(
            bytes.len() >= VAR_SLOT_SIZE,
            "buffer too small for VarSlot: {} < {}",
            bytes.len(),
            VAR_SLOT_SIZE
        );
        Self::mut_from_bytes(&mut bytes[..VAR_SLOT_SIZE])
            .map_err(|e| eyre::eyre!("failed to read VarSlot: {:?}", e))
    }

    pub fn store(&self, dst: &mut [u8]) -> Result<()> {
        ensure!(
            dst.len() >= VAR_SLOT_SIZE,
            "buffer too small for VarSlot: {} < {}",
            dst.len(),
            VAR_SLOT_SIZE
        );
        dst[..VAR_SLOT_SIZE].copy_from_slice(self.as_bytes());
        Ok(())
    }

    // offset is relative on the wire, an absolute address once rewritten.
    zerocopy_accessors! {
        offset: u64,
        byte_len: u64,
    }
}
