//! # Network Byte Order
//!
//! Free load/store functions over byte slices plus two traits that let the
//! CQL codec stay generic over a small, closed set of widths:
//!
//! | Trait | Implemented for | Wire image |
//! |-------|-----------------|------------|
//! | `NetworkOrder` | u8/i8, u16/i16, u32/i32, u64/i64 | big-endian bytes |
//! | `FloatBits` | f32, f64 | big-endian bytes of the IEEE 754 bit pattern |
//!
//! Signed integers travel as the same-width unsigned two's-complement image.
//! Sign is recovered on decode purely because the widths match; no bit of the
//! value is inspected in transit.
//!
//! All functions are pure and stateless.

byte_order_fns!(u8, u16, u32, u64);

/// A fixed-width integer with a network-order wire image.
pub trait NetworkOrder: Copy + Sized {
    const WIDTH: usize;

    /// Reads `WIDTH` bytes from the front of `src`, which must be long enough.
    fn load_network(src: &[u8]) -> Self;

    /// Writes `WIDTH` bytes to the front of `dst`, which must be long enough.
    fn store_network(self, dst: &mut [u8]);
}

network_order_impls!((u8, i8), (u16, i16), (u32, i32), (u64, i64));

/// A floating point type that travels as the bit pattern of a same-width integer.
pub trait FloatBits: Copy + Sized {
    type Bits: NetworkOrder;

    fn to_wire_bits(self) -> Self::Bits;
    fn from_wire_bits(bits: Self::Bits) -> Self;
}

impl FloatBits for f32 {
    type Bits = u32;

    #[inline]
    fn to_wire_bits(self) -> u32 {
        self.to_bits()
    }

    #[inline]
    fn from_wire_bits(bits: u32) -> Self {
        f32::from_bits(bits)
    }
}

impl FloatBits for f64 {
    type Bits = u64;

    #[inline]
    fn to_wire_bits(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_wire_bits(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_u32_writes_big_endian() {
        let mut buf = [0u8; 4];
        store_u32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(load_u32(&buf), 0x0102_0304);
    }

    #[test]
    fn load_reads_only_the_prefix() {
        let buf = [0xAB, 0xCD, 0xFF, 0xFF];
        assert_eq!(load_u16(&buf), 0xABCD);
        assert_eq!(load_u8(&buf), 0xAB);
    }

    #[test]
    fn negative_values_use_twos_complement_image() {
        let mut buf = [0u8; 2];
        (-2i16).store_network(&mut buf);
        assert_eq!(buf, [0xFF, 0xFE]);
        assert_eq!(i16::load_network(&buf), -2);
        assert_eq!(u16::load_network(&buf), 0xFFFE);
    }

    #[test]
    fn min_signed_values_survive() {
        let mut buf = [0u8; 8];
        i64::MIN.store_network(&mut buf);
        assert_eq!(buf, [0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(i64::load_network(&buf), i64::MIN);
    }

    #[test]
    fn float_bits_preserve_nan_payload() {
        let nan = f32::from_bits(0x7FC0_0001);
        assert_eq!(f32::from_wire_bits(nan.to_wire_bits()).to_bits(), 0x7FC0_0001);
        assert_eq!((-0.0f64).to_wire_bits(), 0x8000_0000_0000_0000);
    }
}
