//! Pixel format tags for [`Bitmap`](crate::Bitmap) storage.

/// In-memory pixel layout of a [`Bitmap`](crate::Bitmap).
///
/// Multi-byte formats store their channels little-endian, so a 32-bit
/// pixel occupies `B, G, R, A` in memory and reads back as `0xAARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 8-bit luminance.
    Gray8,
    /// 24-bit `B, G, R`, no alpha.
    Rgb24,
    /// 32-bit `B, G, R, X`. The fourth byte is carried but not interpreted.
    Rgb32,
    /// 32-bit `B, G, R, A` with straight alpha.
    Argb32,
    /// 32-bit `B, G, R, A` with premultiplied alpha.
    Pargb32,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb24 => 3,
            Self::Rgb32 | Self::Argb32 | Self::Pargb32 => 4,
        }
    }

    /// Whether the format carries an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Argb32 | Self::Pargb32)
    }

    /// Whether pixels are stored as one packed 32-bit color each.
    ///
    /// Only these formats can be locked for direct access; the alpha
    /// arrangement makes no difference to the locked view.
    #[inline]
    pub const fn is_packed_32(self) -> bool {
        matches!(self, Self::Rgb32 | Self::Argb32 | Self::Pargb32)
    }

    /// Row stride in bytes for `width` pixels, padded to a 4-byte boundary.
    #[inline]
    pub const fn aligned_stride(self, width: u32) -> usize {
        let raw = width as usize * self.bytes_per_pixel();
        align_up(raw, 4)
    }

    /// [`aligned_stride`](Self::aligned_stride), or `None` on overflow.
    pub(crate) const fn checked_stride(self, width: u32) -> Option<usize> {
        match (width as usize).checked_mul(self.bytes_per_pixel()) {
            Some(raw) if raw <= usize::MAX - 3 => Some(align_up(raw, 4)),
            _ => None,
        }
    }
}

/// Round `val` up to the next multiple of `align` (must be a power of 2).
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}
