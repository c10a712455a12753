//! # Internal Macros
//!
//! ## byte_order_fns!
//!
//! Generates big-endian load/store free functions over byte slices for the
//! listed unsigned widths.
//!
//! ```ignore
//! byte_order_fns!(u16, u32);
//!
//! // Generates:
//! // pub fn load_u16(src: &[u8]) -> u16
//! // pub fn store_u16(dst: &mut [u8], val: u16)
//! // pub fn load_u32(src: &[u8]) -> u32
//! // pub fn store_u32(dst: &mut [u8], val: u32)
//! ```
//!
//! ## network_order_impls!
//!
//! Implements `NetworkOrder` for a signed/unsigned pair of the same width by
//! routing both through the unsigned load/store functions.
//!
//! ## zerocopy_accessors!
//!
//! Generates getters and setters for little-endian `U64` fields of zerocopy
//! structs that are viewed in place inside row buffers.
//!
//! ```ignore
//! impl VarSlot {
//!     zerocopy_accessors! {
//!         offset: u64,
//!         byte_len: u64,
//!     }
//! }
//!
//! // Generates:
//! // pub fn offset(&self) -> u64
//! // pub fn set_offset(&mut self, val: u64)
//! // pub fn byte_len(&self) -> u64
//! // pub fn set_byte_len(&mut self, val: u64)
//! ```

/// Generates `load_<ty>` / `store_<ty>` big-endian helpers.
#[macro_export]
macro_rules! byte_order_fns {
    ($($ty:ident),+ $(,)?) => {
        $(
            ::paste::paste! {
                /// Reads a network-order value from the front of `src`.
                ///
                /// Panics if `src` is shorter than the value; callers bound-check first.
                #[inline]
                pub fn [<load_ $ty>](src: &[u8]) -> $ty {
                    let mut bytes = [0u8; ::std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&src[..::std::mem::size_of::<$ty>()]);
                    $ty::from_be_bytes(bytes)
                }

                /// Writes `val` in network order to the front of `dst`.
                #[inline]
                pub fn [<store_ $ty>](dst: &mut [u8], val: $ty) {
                    dst[..::std::mem::size_of::<$ty>()].copy_from_slice(&val.to_be_bytes());
                }
            }
        )+
    };
}

/// Implements `NetworkOrder` for `$unsigned` and its same-width `$signed` twin.
#[macro_export]
macro_rules! network_order_impls {
    ($(($unsigned:ident, $signed:ident)),+ $(,)?) => {
        $(
            ::paste::paste! {
                impl NetworkOrder for $unsigned {
                    const WIDTH: usize = ::std::mem::size_of::<$unsigned>();

                    #[inline]
                    fn load_network(src: &[u8]) -> Self {
                        [<load_ $unsigned>](src)
                    }

                    #[inline]
                    fn store_network(self, dst: &mut [u8]) {
                        [<store_ $unsigned>](dst, self)
                    }
                }

                impl NetworkOrder for $signed {
                    const WIDTH: usize = ::std::mem::size_of::<$signed>();

                    #[inline]
                    fn load_network(src: &[u8]) -> Self {
                        [<load_ $unsigned>](src) as $signed
                    }

                    #[inline]
                    fn store_network(self, dst: &mut [u8]) {
                        [<store_ $unsigned>](dst, self as $unsigned)
                    }
                }
            }
        )+
    };
}

/// Generates getter and setter methods for zerocopy little-endian fields.
#[macro_export]
macro_rules! zerocopy_accessors {
    (@impl $field:ident, u64) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> u64 {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: u64) {
                self.$field = ::zerocopy::little_endian::U64::new(val);
            }
        }
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::zerocopy_accessors!(@impl $field, $ty);
        )*
    };
}
