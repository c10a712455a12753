//! # Wire Configuration Module
//!
//! Centralizes the numeric constants that define the wire layouts. Several of
//! them are coupled (a variable-length slot must hold both an offset and a
//! length, a length prefix must hold `MAX_VALUE_LENGTH`) and those couplings
//! are checked at compile time.
//!
//! - [`constants`]: layout sizes, sentinels and id assignment

pub mod constants;
pub use constants::*;
