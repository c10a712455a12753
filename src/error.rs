//! # Wire Error Kinds
//!
//! Every fallible operation in this crate returns `eyre::Result`. Failures that
//! callers need to classify are raised from a [`WireError`] so they can be
//! recovered with `report.downcast_ref::<WireError>()`:
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | `InvalidSchema` | key contiguity, nullable keys, duplicate names, column ids |
//! | `CorruptData` | row stride mismatch, indirect pointer out of range |
//! | `Protocol` | length-prefix mismatch, truncated value, malformed payload |
//!
//! Any of these rejects the whole message. Nothing partially decoded is ever
//! handed back to the caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("corrupt row block: row {row} column {column}: offset {offset} + length {len} exceeds indirect data of {indirect_len} bytes")]
    PointerOutOfRange {
        row: usize,
        column: usize,
        offset: u64,
        len: u64,
        indirect_len: usize,
    },

    #[error("corrupt row block: {0}")]
    CorruptData(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl WireError {
    pub fn invalid_schema(msg: impl Into<String>) -> eyre::Report {
        eyre::Report::new(WireError::InvalidSchema(msg.into()))
    }

    pub fn corrupt(msg: impl Into<String>) -> eyre::Report {
        eyre::Report::new(WireError::CorruptData(msg.into()))
    }

    pub fn protocol(msg: impl Into<String>) -> eyre::Report {
        eyre::Report::new(WireError::Protocol(msg.into()))
    }

    /// True for both flavors of corrupt row data.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            WireError::CorruptData(_) | WireError::PointerOutOfRange { .. }
        )
    }
}

/// Classifies a report raised anywhere in this crate.
pub fn wire_error(report: &eyre::Report) -> Option<&WireError> {
    report.downcast_ref::<WireError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_downcast_back_to_their_kind() {
        let report = WireError::protocol("Truncated message");
        assert_eq!(
            wire_error(&report),
            Some(&WireError::Protocol("Truncated message".into()))
        );
        assert!(report.to_string().contains("Truncated message"));
    }

    #[test]
    fn pointer_out_of_range_names_row_and_column() {
        let err = WireError::PointerOutOfRange {
            row: 3,
            column: 1,
            offset: 10,
            len: 5,
            indirect_len: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("row 3"));
        assert!(msg.contains("column 1"));
        assert!(msg.contains("offset 10"));
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn reports_from_foreign_errors_are_unclassified() {
        let report = eyre::eyre!("something else");
        assert!(wire_error(&report).is_none());
    }
}
