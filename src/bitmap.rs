//! Owned bitmap storage.
//!
//! [`Bitmap`] plays the role of a decoded, platform-style image: it owns
//! a stride-padded byte buffer in one of several [`PixelFormat`]s and
//! hands out a packed 32-bit mapping of its pixels through
//! `lock_bits` / `unlock_bits`. The lock flag lives here, on the image,
//! so independent [`FastBitmap`](crate::FastBitmap) guards over the same
//! bitmap exclude each other.

use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use imgref::ImgRef;
use rgb::alt::BGRA;
use rgb::{Gray, Rgb, Rgba};

use crate::color::{pack_argb, read_packed, write_packed};
use crate::{FastBitmapError, PixelFormat, Rect};

/// Owned image with format metadata and a per-image lock flag.
///
/// Rows are padded to a 4-byte boundary. Slow per-pixel accessors
/// ([`pixel`](Self::pixel), [`set_pixel`](Self::set_pixel)) work for every
/// format and convert to and from packed `0xAARRGGBB`; they refuse to run
/// while the bitmap is locked, since the live pixels are then held by the
/// locking guard.
pub struct Bitmap {
    data: RefCell<Vec<u8>>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    locked: Cell<bool>,
}

impl Bitmap {
    /// Allocate a zero-filled bitmap.
    ///
    /// # Panics
    ///
    /// Panics if `stride * height` overflows `usize`. Use
    /// [`try_new`](Self::try_new) for untrusted dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        match Self::try_new(width, height, format) {
            Ok(bitmap) => bitmap,
            Err(err) => panic!("Bitmap::new({width}, {height}, {format:?}): {err}"),
        }
    }

    /// Allocate a zero-filled bitmap, failing on oversized dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`FastBitmapError::InvalidDimensions`] if the buffer size
    /// overflows `usize`.
    pub fn try_new(
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FastBitmapError> {
        let stride = format
            .checked_stride(width)
            .ok_or(FastBitmapError::InvalidDimensions)?;
        let total = stride
            .checked_mul(height as usize)
            .ok_or(FastBitmapError::InvalidDimensions)?;
        Ok(Self {
            data: RefCell::new(vec![0u8; total]),
            width,
            height,
            stride,
            format,
            locked: Cell::new(false),
        })
    }

    /// Wrap an existing `Vec<u8>` as a bitmap.
    ///
    /// Rows are expected at [`PixelFormat::aligned_stride`] intervals.
    ///
    /// # Errors
    ///
    /// Returns [`FastBitmapError::InsufficientData`] if the vec is too small
    /// and [`FastBitmapError::InvalidDimensions`] if the size overflows.
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FastBitmapError> {
        let stride = format
            .checked_stride(width)
            .ok_or(FastBitmapError::InvalidDimensions)?;
        let total = stride
            .checked_mul(height as usize)
            .ok_or(FastBitmapError::InvalidDimensions)?;
        if data.len() < total {
            return Err(FastBitmapError::InsufficientData {
                expected: total,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: RefCell::new(data),
            width,
            height,
            stride,
            format,
            locked: Cell::new(false),
        })
    }

    /// Consume the bitmap and return the backing bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_inner()
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Whether a guard currently holds this bitmap locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// The full image rectangle `(0, 0, width, height)`.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Read one pixel as packed `0xAARRGGBB`.
    ///
    /// Formats without alpha report an opaque alpha; packed 32-bit formats
    /// return the stored value unchanged.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::AlreadyLocked`] while locked,
    /// [`FastBitmapError::OutOfRange`] outside the image.
    pub fn pixel(&self, x: i32, y: i32) -> Result<u32, FastBitmapError> {
        let offset = self.byte_offset(x, y)?;
        let data = self.data.borrow();
        let px = &data[offset..offset + self.format.bytes_per_pixel()];
        Ok(match self.format {
            PixelFormat::Gray8 => {
                let v = px[0] as u32;
                0xFF00_0000 | (v << 16) | (v << 8) | v
            }
            PixelFormat::Rgb24 => read_packed(&[px[0], px[1], px[2], 0xFF]),
            PixelFormat::Rgb32 | PixelFormat::Argb32 | PixelFormat::Pargb32 => read_packed(px),
        })
    }

    /// Write one pixel from packed `0xAARRGGBB`.
    ///
    /// Formats without alpha drop it; `Gray8` stores integer BT.601 luma.
    ///
    /// # Errors
    ///
    /// Same as [`pixel`](Self::pixel).
    pub fn set_pixel(&mut self, x: i32, y: i32, argb: u32) -> Result<(), FastBitmapError> {
        let offset = self.byte_offset(x, y)?;
        let bpp = self.format.bytes_per_pixel();
        let px = &mut self.data.get_mut()[offset..offset + bpp];
        let [b, g, r, _] = argb.to_le_bytes();
        match self.format {
            PixelFormat::Gray8 => {
                let luma = (77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8;
                px[0] = luma as u8;
            }
            PixelFormat::Rgb24 => px.copy_from_slice(&[b, g, r]),
            PixelFormat::Rgb32 | PixelFormat::Argb32 | PixelFormat::Pargb32 => {
                write_packed(px, argb);
            }
        }
        Ok(())
    }

    /// Deep copy of the pixels and metadata. The copy starts unlocked.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::AlreadyLocked`] while locked, since the stored
    /// bytes are stale until the lock is released.
    pub fn try_clone(&self) -> Result<Bitmap, FastBitmapError> {
        if self.locked.get() {
            return Err(FastBitmapError::AlreadyLocked);
        }
        Ok(Self {
            data: RefCell::new(self.data.borrow().clone()),
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
            locked: Cell::new(false),
        })
    }

    /// Take a packed, row-major `width * height` mapping of the pixels and
    /// mark the bitmap locked.
    pub(crate) fn lock_bits(&self) -> Result<Vec<u32>, FastBitmapError> {
        if !self.format.is_packed_32() {
            return Err(FastBitmapError::UnsupportedFormat(self.format));
        }
        if self.locked.get() {
            return Err(FastBitmapError::AlreadyLocked);
        }
        let width = self.width as usize;
        let row_bytes = width * 4;
        let data = self.data.borrow();
        let mut bits = Vec::with_capacity(width * self.height as usize);
        for y in 0..self.height as usize {
            let start = y * self.stride;
            bits.extend(data[start..start + row_bytes].chunks_exact(4).map(read_packed));
        }
        self.locked.set(true);
        Ok(bits)
    }

    /// Commit a mapping taken by [`lock_bits`](Self::lock_bits) and clear
    /// the lock flag.
    pub(crate) fn unlock_bits(&self, bits: &[u32]) -> Result<(), FastBitmapError> {
        if !self.locked.get() {
            return Err(FastBitmapError::NotLocked);
        }
        let width = self.width as usize;
        let expected = width * self.height as usize;
        if bits.len() != expected {
            return Err(FastBitmapError::LengthMismatch {
                expected,
                actual: bits.len(),
            });
        }
        let mut data = self.data.borrow_mut();
        if width > 0 {
            for (y, row) in bits.chunks_exact(width).enumerate() {
                let start = y * self.stride;
                let dst = &mut data[start..start + width * 4];
                for (chunk, &argb) in dst.chunks_exact_mut(4).zip(row) {
                    write_packed(chunk, argb);
                }
            }
        }
        self.locked.set(false);
        Ok(())
    }

    fn byte_offset(&self, x: i32, y: i32) -> Result<usize, FastBitmapError> {
        if self.locked.get() {
            return Err(FastBitmapError::AlreadyLocked);
        }
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Err(FastBitmapError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride + x as usize * self.format.bytes_per_pixel())
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bitmap({}x{}, {:?}{})",
            self.width,
            self.height,
            self.format,
            if self.locked.get() { ", locked" } else { "" }
        )
    }
}

// ---------------------------------------------------------------------------
// ImgRef → Bitmap (From impls, always copies)
// ---------------------------------------------------------------------------

macro_rules! impl_from_imgref {
    ($pixel:ty, $format:expr, $write:expr) => {
        impl From<ImgRef<'_, $pixel>> for Bitmap {
            fn from(img: ImgRef<'_, $pixel>) -> Self {
                let write: fn(&mut [u8], $pixel) = $write;
                let width = img.width();
                let format: PixelFormat = $format;
                let bpp = format.bytes_per_pixel();
                let mut bitmap = Bitmap::new(width as u32, img.height() as u32, format);
                let stride = bitmap.stride;
                let data = bitmap.data.get_mut();
                for y in 0..img.height() {
                    let src = &img.buf()[y * img.stride()..][..width];
                    let dst = &mut data[y * stride..][..width * bpp];
                    for (chunk, &px) in dst.chunks_exact_mut(bpp).zip(src) {
                        write(chunk, px);
                    }
                }
                bitmap
            }
        }
    };
}

impl_from_imgref!(BGRA<u8>, PixelFormat::Argb32, |dst, px| {
    dst.copy_from_slice(&[px.b, px.g, px.r, px.a]);
});
impl_from_imgref!(Rgba<u8>, PixelFormat::Argb32, |dst, px| {
    write_packed(dst, pack_argb(px));
});
impl_from_imgref!(Rgb<u8>, PixelFormat::Rgb24, |dst, px| {
    dst.copy_from_slice(&[px.b, px.g, px.r]);
});
impl_from_imgref!(Gray<u8>, PixelFormat::Gray8, |dst, px| dst[0] = px.value());
