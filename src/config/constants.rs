//! # Wire Layout Constants
//!
//! ```text
//! LENGTH_PREFIX_SIZE (4 bytes, big-endian i32)
//!       │
//!       ├─> MAX_VALUE_LENGTH (i32::MAX, largest encodable payload)
//!       │
//!       └─> NULL_VALUE_LENGTH (-1, CQL null marker)
//!
//! VAR_SLOT_SIZE (16 bytes)
//!       │
//!       ├─> VAR_SLOT_OFFSET_SIZE (8, relative offset or absolute address)
//!       │
//!       └─> VAR_SLOT_LEN_SIZE (8, byte length)
//! ```
//!
//! Import from `crate::config` rather than redefining locally.

// ============================================================================
// LENGTH-PREFIXED VALUES
// ============================================================================

/// Size of the network-order length prefix in front of every CQL value.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Length written in place of a payload for a null value.
pub const NULL_VALUE_LENGTH: i32 = -1;

/// Largest payload a length prefix can describe.
pub const MAX_VALUE_LENGTH: usize = i32::MAX as usize;

const _: () = assert!(
    LENGTH_PREFIX_SIZE == std::mem::size_of::<i32>(),
    "length prefix must be exactly one i32"
);

// ============================================================================
// ROW BLOCK LAYOUT
// ============================================================================

/// Width of the relative-offset / absolute-address half of a variable slot.
pub const VAR_SLOT_OFFSET_SIZE: usize = 8;

/// Width of the byte-length half of a variable slot.
pub const VAR_SLOT_LEN_SIZE: usize = 8;

/// Direct-buffer bytes used by one variable-length cell.
pub const VAR_SLOT_SIZE: usize = VAR_SLOT_OFFSET_SIZE + VAR_SLOT_LEN_SIZE;

const _: () = assert!(
    VAR_SLOT_SIZE == 16,
    "VAR_SLOT_SIZE must match the zerocopy VarSlot layout"
);

const _: () = assert!(
    VAR_SLOT_OFFSET_SIZE >= std::mem::size_of::<usize>(),
    "slot offset must be wide enough to hold an absolute address"
);

// ============================================================================
// SCHEMA
// ============================================================================

/// First id handed out by `SchemaBuilder` when ids are assigned locally.
pub const FIRST_COLUMN_ID: u32 = 10;
