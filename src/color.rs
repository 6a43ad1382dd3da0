//! Packed 32-bit ARGB colors.
//!
//! The locked view of a [`Bitmap`](crate::Bitmap) stores one `u32` per
//! pixel laid out as `0xAARRGGBB`. These helpers convert between that
//! packed value and the structured [`Rgba`] type from the `rgb` crate.

use rgb::Rgba;

/// Pack a structured color into `0xAARRGGBB`.
#[inline]
pub const fn pack_argb(color: Rgba<u8>) -> u32 {
    u32::from_be_bytes([color.a, color.r, color.g, color.b])
}

/// Unpack `0xAARRGGBB` into a structured color.
#[inline]
pub const fn unpack_argb(argb: u32) -> Rgba<u8> {
    let [a, r, g, b] = argb.to_be_bytes();
    Rgba { r, g, b, a }
}

/// Read a packed color from its little-endian `B, G, R, A` storage bytes.
#[inline]
pub(crate) fn read_packed(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Write a packed color as little-endian `B, G, R, A` storage bytes.
#[inline]
pub(crate) fn write_packed(bytes: &mut [u8], argb: u32) {
    bytes[..4].copy_from_slice(&argb.to_le_bytes());
}
