//! # Encoding Module
//!
//! Low-level binary encoding shared by the schema and row block codecs:
//!
//! - **Byte order**: big-endian load/store helpers and the `NetworkOrder` /
//!   `FloatBits` traits
//! - **CQL framing**: length-prefixed values with collection backpatching
//! - **Typed values**: `Value::serialize` / `Value::deserialize`

pub mod byte_order;
pub mod cql;
mod value;

pub use byte_order::{FloatBits, NetworkOrder};
pub use cql::{
    decode_bytes, decode_bytes_ref, decode_float, decode_length, decode_num, decode_value_ref,
    encode_bytes, encode_float, encode_length, encode_length_at, encode_num, finish_collection,
    start_collection,
};
