//! Locked, bounds-checked pixel access.
//!
//! A [`FastBitmap`] is a guard over one [`Bitmap`]. Locking it takes a
//! packed `0xAARRGGBB` mapping of the pixels; every read and write then
//! goes straight to that mapping instead of through the bitmap's slow
//! per-pixel path. Unlocking commits the mapping back.
//!
//! [`FastBitmap::lock`] returns a [`LockScope`] that dereferences to the
//! guard and unlocks it when dropped, unless it was already unlocked by
//! hand:
//!
//! ```
//! use fastbitmap::{Bitmap, FastBitmap, PixelFormat};
//!
//! let bitmap = Bitmap::new(4, 4, PixelFormat::Argb32);
//! let mut fast = FastBitmap::new(&bitmap)?;
//! {
//!     let mut scope = fast.lock()?;
//!     scope.set_pixel(1, 2, 0xFF00_FF00)?;
//!     assert_eq!(scope.get_pixel(1, 2)?, 0xFF00_FF00);
//! }
//! assert!(!fast.locked());
//! assert_eq!(bitmap.pixel(1, 2)?, 0xFF00_FF00);
//! # Ok::<(), fastbitmap::FastBitmapError>(())
//! ```

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};
use core::ptr;

use log::{trace, warn};
use rgb::Rgba;

use crate::color::{pack_argb, unpack_argb};
use crate::{Bitmap, FastBitmapError, Rect};

/// Lock guard and pixel accessor over a [`Bitmap`].
///
/// Only packed 32-bit formats are accepted. At most one guard can hold a
/// given bitmap locked; a second guard's [`lock`](Self::lock) fails with
/// [`FastBitmapError::AlreadyLocked`] until the first unlocks. A guard
/// dropped while locked unlocks itself.
pub struct FastBitmap<'a> {
    bitmap: &'a Bitmap,
    /// The locked mapping; `Some` exactly while this guard holds the lock.
    bits: Option<Vec<u32>>,
    width: u32,
    height: u32,
}

impl<'a> FastBitmap<'a> {
    /// Create an unlocked guard over `bitmap`.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::UnsupportedFormat`] unless the bitmap is
    /// `Rgb32`, `Argb32` or `Pargb32`.
    pub fn new(bitmap: &'a Bitmap) -> Result<Self, FastBitmapError> {
        let format = bitmap.pixel_format();
        if !format.is_packed_32() {
            return Err(FastBitmapError::UnsupportedFormat(format));
        }
        Ok(Self {
            bitmap,
            bits: None,
            width: bitmap.width(),
            height: bitmap.height(),
        })
    }

    /// The bitmap this guard operates on.
    #[inline]
    pub fn bitmap(&self) -> &'a Bitmap {
        self.bitmap
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether this guard currently holds the lock.
    #[inline]
    pub fn locked(&self) -> bool {
        self.bits.is_some()
    }

    /// Whether this guard operates on `bitmap`.
    #[inline]
    pub fn is_over(&self, bitmap: &Bitmap) -> bool {
        ptr::eq(self.bitmap, bitmap)
    }

    // --- Lock state machine ---

    /// Lock the bitmap for direct access.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::AlreadyLocked`] if this guard, or any other guard
    /// over the same bitmap, holds the lock.
    pub fn lock(&mut self) -> Result<LockScope<'_, 'a>, FastBitmapError> {
        if self.bits.is_some() {
            return Err(FastBitmapError::AlreadyLocked);
        }
        self.bits = Some(self.bitmap.lock_bits()?);
        trace!("locked {}x{} bitmap", self.width, self.height);
        Ok(LockScope { guard: self })
    }

    /// Release the lock, committing all writes to the bitmap.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::NotLocked`] if this guard is unlocked.
    pub fn unlock(&mut self) -> Result<(), FastBitmapError> {
        let bits = self.bits.take().ok_or(FastBitmapError::NotLocked)?;
        if let Err(err) = self.bitmap.unlock_bits(&bits) {
            self.bits = Some(bits);
            return Err(err);
        }
        trace!("unlocked {}x{} bitmap", self.width, self.height);
        Ok(())
    }

    /// Run `f` with the lock held, releasing it afterwards.
    fn with_lock<R>(
        &mut self,
        f: impl FnOnce(&mut FastBitmap<'a>) -> Result<R, FastBitmapError>,
    ) -> Result<R, FastBitmapError> {
        let mut scope = self.lock()?;
        let result = f(&mut *scope);
        scope.unlock()?;
        result
    }

    // --- Pixel access ---

    /// Read the packed color at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::NotLocked`] while unlocked,
    /// [`FastBitmapError::OutOfRange`] outside the image.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<u32, FastBitmapError> {
        let index = self.index_of(x, y)?;
        Ok(self.mapped()?[index])
    }

    /// Read the color at `(x, y)` as a structured value.
    #[inline]
    pub fn get_pixel_color(&self, x: i32, y: i32) -> Result<Rgba<u8>, FastBitmapError> {
        self.get_pixel(x, y).map(unpack_argb)
    }

    /// Write the packed color `argb` at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Same as [`get_pixel`](Self::get_pixel).
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, argb: u32) -> Result<(), FastBitmapError> {
        let index = self.index_of(x, y)?;
        self.mapped_mut()?[index] = argb;
        Ok(())
    }

    /// Write a structured color at `(x, y)`. Stores the same bytes as
    /// [`set_pixel`](Self::set_pixel) with the packed equivalent.
    #[inline]
    pub fn set_pixel_color(
        &mut self,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    ) -> Result<(), FastBitmapError> {
        self.set_pixel(x, y, pack_argb(color))
    }

    /// All pixels, row-major, `width * height` long.
    pub fn pixels(&self) -> Result<&[u32], FastBitmapError> {
        self.mapped()
    }

    /// All pixels, row-major, mutable.
    pub fn pixels_mut(&mut self) -> Result<&mut [u32], FastBitmapError> {
        self.mapped_mut()
    }

    /// Pixels of row `y`.
    pub fn row(&self, y: u32) -> Result<&[u32], FastBitmapError> {
        let range = self.row_range(y)?;
        Ok(&self.mapped()?[range])
    }

    /// Mutable pixels of row `y`.
    pub fn row_mut(&mut self, y: u32) -> Result<&mut [u32], FastBitmapError> {
        let range = self.row_range(y)?;
        Ok(&mut self.mapped_mut()?[range])
    }

    // --- Bulk operations ---

    /// Snapshot of every pixel, row-major.
    ///
    /// When the guard is unlocked this locks, copies and unlocks, so the
    /// guard is unlocked again afterwards.
    pub fn data_array(&mut self) -> Result<Vec<u32>, FastBitmapError> {
        if self.locked() {
            return Ok(self.mapped()?.to_vec());
        }
        self.with_lock(|fast| Ok(fast.mapped()?.to_vec()))
    }

    /// Overwrite every pixel from a row-major array.
    ///
    /// With `ignore_zeroes`, entries equal to `0` leave the destination
    /// pixel untouched.
    ///
    /// # Errors
    ///
    /// [`FastBitmapError::LengthMismatch`] if `colors.len()` is not
    /// `width * height`; nothing is written in that case.
    /// [`FastBitmapError::NotLocked`] while unlocked.
    pub fn copy_from_array(
        &mut self,
        colors: &[u32],
        ignore_zeroes: bool,
    ) -> Result<(), FastBitmapError> {
        let expected = self.pixel_count();
        if colors.len() != expected {
            return Err(FastBitmapError::LengthMismatch {
                expected,
                actual: colors.len(),
            });
        }
        let bits = self.mapped_mut()?;
        if ignore_zeroes {
            for (dst, &src) in bits.iter_mut().zip(colors) {
                if src != 0 {
                    *dst = src;
                }
            }
        } else {
            bits.copy_from_slice(colors);
        }
        Ok(())
    }

    /// Fill every pixel with `argb`, locking around the fill if needed.
    pub fn clear(&mut self, argb: u32) -> Result<(), FastBitmapError> {
        if !self.locked() {
            return self.with_lock(|fast| fast.clear(argb));
        }
        self.mapped_mut()?.fill(argb);
        Ok(())
    }

    /// [`clear`](Self::clear) with a structured color.
    pub fn clear_color(&mut self, color: Rgba<u8>) -> Result<(), FastBitmapError> {
        self.clear(pack_argb(color))
    }

    /// Fill the part of `region` that lies inside the image with `argb`,
    /// locking around the fill if needed. Empty regions are a no-op.
    pub fn clear_region(&mut self, region: Rect, argb: u32) -> Result<(), FastBitmapError> {
        let area = region.intersect(&self.bitmap.bounds());
        if area.is_empty() {
            return Ok(());
        }
        if !self.locked() {
            return self.with_lock(|fast| fast.clear_region(area, argb));
        }
        let width = self.width as usize;
        let bits = self.mapped_mut()?;
        for y in area.top()..area.bottom() {
            let start = y as usize * width + area.left() as usize;
            bits[start..start + area.width as usize].fill(argb);
        }
        Ok(())
    }

    // --- Private helpers ---

    #[inline]
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    fn mapped(&self) -> Result<&[u32], FastBitmapError> {
        self.bits.as_deref().ok_or(FastBitmapError::NotLocked)
    }

    #[inline]
    fn mapped_mut(&mut self) -> Result<&mut [u32], FastBitmapError> {
        self.bits.as_deref_mut().ok_or(FastBitmapError::NotLocked)
    }

    /// Row-major index of `(x, y)`. Lock state is checked before bounds.
    #[inline]
    fn index_of(&self, x: i32, y: i32) -> Result<usize, FastBitmapError> {
        if !self.locked() {
            return Err(FastBitmapError::NotLocked);
        }
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Err(FastBitmapError::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    fn row_range(&self, y: u32) -> Result<core::ops::Range<usize>, FastBitmapError> {
        if !self.locked() {
            return Err(FastBitmapError::NotLocked);
        }
        if y >= self.height {
            return Err(FastBitmapError::OutOfRange {
                x: 0,
                y: i32::try_from(y).unwrap_or(i32::MAX),
                width: self.width,
                height: self.height,
            });
        }
        let start = y as usize * self.width as usize;
        Ok(start..start + self.width as usize)
    }
}

impl Drop for FastBitmap<'_> {
    fn drop(&mut self) {
        if self.locked()
            && let Err(err) = self.unlock()
        {
            warn!("failed to unlock bitmap on drop: {err}");
        }
    }
}

impl core::fmt::Debug for FastBitmap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "FastBitmap({}x{}, {})",
            self.width,
            self.height,
            if self.locked() { "locked" } else { "unlocked" }
        )
    }
}

// ---------------------------------------------------------------------------
// LockScope
// ---------------------------------------------------------------------------

/// Open access window returned by [`FastBitmap::lock`].
///
/// Dereferences to the originating guard. Dropping the scope unlocks the
/// guard if it is still locked; after a manual
/// [`unlock`](FastBitmap::unlock) the drop does nothing.
#[must_use = "dropping the scope unlocks the bitmap immediately"]
pub struct LockScope<'g, 'a> {
    guard: &'g mut FastBitmap<'a>,
}

impl<'a> Deref for LockScope<'_, 'a> {
    type Target = FastBitmap<'a>;

    fn deref(&self) -> &Self::Target {
        &*self.guard
    }
}

impl DerefMut for LockScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.guard
    }
}

impl Drop for LockScope<'_, '_> {
    fn drop(&mut self) {
        if self.guard.locked()
            && let Err(err) = self.guard.unlock()
        {
            warn!("failed to unlock bitmap at end of scope: {err}");
        }
    }
}

impl core::fmt::Debug for LockScope<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "LockScope({:?})", self.guard)
    }
}

// ---------------------------------------------------------------------------
// One-shot helpers
// ---------------------------------------------------------------------------

/// Fill every pixel of `bitmap` with `argb`.
pub fn clear_bitmap(bitmap: &Bitmap, argb: u32) -> Result<(), FastBitmapError> {
    FastBitmap::new(bitmap)?.clear(argb)
}

/// Row-major snapshot of every pixel of `bitmap`.
pub fn data_array_of(bitmap: &Bitmap) -> Result<Vec<u32>, FastBitmapError> {
    FastBitmap::new(bitmap)?.data_array()
}
