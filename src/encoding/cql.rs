//! # Length-Prefixed CQL Value Primitives
//!
//! Every CQL value on the wire is a 4-byte big-endian signed length followed by
//! exactly that many payload bytes:
//!
//! ```text
//! +------------------+------------------------+
//! | Length (i32 BE)  | Payload [u8; length]   |
//! +------------------+------------------------+
//! ```
//!
//! Collections nest the same framing. Their byte length depends on elements
//! that have not been written yet, so it is backpatched:
//!
//! ```ignore
//! let body = start_collection(&mut buf);   // writes a 0 placeholder
//! encode_num(7i32, &mut buf);
//! encode_bytes(b"abc", &mut buf)?;
//! finish_collection(body, &mut buf)?;      // overwrites the placeholder
//! ```
//!
//! Nesting is handled by the caller keeping each mark on its own stack frame;
//! nothing is remembered here between calls.
//!
//! ## Decoding
//!
//! Decoders take a cursor (`&mut &[u8]`) that shrinks from the front as bytes
//! are consumed. Each check happens before the cursor moves, so a failed decode
//! leaves both the cursor and the caller's output untouched.
//!
//! | Failure | Error |
//! |---------|-------|
//! | declared width differs from the target type | `unexpected number byte length: expected N, provided M` |
//! | fewer bytes remain than required | `Truncated message` |

use eyre::Result;

use super::byte_order::{store_u32, FloatBits, NetworkOrder};
use crate::config::LENGTH_PREFIX_SIZE;
use crate::error::WireError;

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

/// Appends `len` as a 4-byte network-order integer.
#[inline]
pub fn encode_length(len: i32, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(len as u32).to_be_bytes());
}

/// Stores `len` into the first 4 bytes of an existing slot.
#[inline]
pub fn encode_length_at(len: i32, dst: &mut [u8]) {
    store_u32(dst, len as u32);
}

/// Appends `[width][value]` for a fixed-width integer.
#[inline]
pub fn encode_num<T: NetworkOrder>(val: T, buf: &mut Vec<u8>) {
    encode_length(T::WIDTH as i32, buf);
    let start = buf.len();
    buf.resize(start + T::WIDTH, 0);
    val.store_network(&mut buf[start..]);
}

/// Appends a float as the network-order image of its raw bit pattern.
#[inline]
pub fn encode_float<F: FloatBits>(val: F, buf: &mut Vec<u8>) {
    encode_num(val.to_wire_bits(), buf);
}

/// Appends `[len][bytes]` with no terminator or padding.
#[inline]
pub fn encode_bytes(val: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = i32::try_from(val.len()).map_err(|_| {
        WireError::protocol(format!("value of {} bytes exceeds the length prefix", val.len()))
    })?;
    encode_length(len, buf);
    buf.extend_from_slice(val);
    Ok(())
}

/// Reserves a zero length prefix and returns the position just past it, which
/// is where the collection body begins.
#[inline]
pub fn start_collection(buf: &mut Vec<u8>) -> usize {
    encode_length(0, buf);
    buf.len()
}

/// Backpatches the length prefix reserved by [`start_collection`] with the
/// number of body bytes written since.
pub fn finish_collection(body_start: usize, buf: &mut Vec<u8>) -> Result<()> {
    assert!(
        body_start >= LENGTH_PREFIX_SIZE && body_start <= buf.len(),
        "collection mark {} does not belong to a buffer of {} bytes",
        body_start,
        buf.len()
    );
    let body_len = buf.len() - body_start;
    let body_len = i32::try_from(body_len).map_err(|_| {
        WireError::protocol(format!(
            "collection body of {} bytes exceeds the length prefix",
            body_len
        ))
    })?;
    encode_length_at(body_len, &mut buf[body_start - LENGTH_PREFIX_SIZE..body_start]);
    tracing::trace!(body_start, body_len, "backpatched collection length");
    Ok(())
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

#[inline]
fn ensure_remaining(data: &[u8], needed: usize) -> Result<()> {
    if data.len() < needed {
        return Err(WireError::protocol("Truncated message"));
    }
    Ok(())
}

/// Reads a 4-byte signed length prefix.
pub fn decode_length(data: &mut &[u8]) -> Result<i32> {
    ensure_remaining(data, LENGTH_PREFIX_SIZE)?;
    let whole: &[u8] = *data;
    let len = i32::load_network(whole);
    *data = &whole[LENGTH_PREFIX_SIZE..];
    Ok(len)
}

/// Decodes a fixed-width integer whose declared length is `len`.
pub fn decode_num<T: NetworkOrder>(len: usize, data: &mut &[u8]) -> Result<T> {
    if len != T::WIDTH {
        return Err(WireError::protocol(format!(
            "unexpected number byte length: expected {}, provided {}",
            T::WIDTH,
            len
        )));
    }
    ensure_remaining(data, T::WIDTH)?;
    let whole: &[u8] = *data;
    let val = T::load_network(whole);
    *data = &whole[T::WIDTH..];
    Ok(val)
}

/// Decodes a float by decoding its same-width integer image.
pub fn decode_float<F: FloatBits>(len: usize, data: &mut &[u8]) -> Result<F> {
    let bits = decode_num::<F::Bits>(len, data)?;
    Ok(F::from_wire_bits(bits))
}

/// Borrows exactly `len` bytes off the front of the cursor.
pub fn decode_bytes_ref<'a>(len: usize, data: &mut &'a [u8]) -> Result<&'a [u8]> {
    let whole: &'a [u8] = *data;
    ensure_remaining(whole, len)?;
    let (head, tail) = whole.split_at(len);
    *data = tail;
    Ok(head)
}

/// Copies exactly `len` bytes off the front of the cursor.
pub fn decode_bytes(len: usize, data: &mut &[u8]) -> Result<Vec<u8>> {
    decode_bytes_ref(len, data).map(<[u8]>::to_vec)
}

/// Reads one framed value. `None` is the null marker; any other negative
/// length is rejected.
pub fn decode_value_ref<'a>(data: &mut &'a [u8]) -> Result<Option<&'a [u8]>> {
    let mut cursor = *data;
    let len = decode_length(&mut cursor)?;
    if len < 0 {
        if len == crate::config::NULL_VALUE_LENGTH {
            *data = cursor;
            return Ok(None);
        }
        return Err(WireError::protocol(format!("negative value length: {}", len)));
    }
    let payload = decode_bytes_ref(len as usize, &mut cursor)?;
    *data = cursor;
    Ok(Some(payload))
}
