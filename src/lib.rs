//! Locked, bounds-checked pixel access for 32-bit ARGB bitmaps.
//!
//! - [`Bitmap`]: owned image storage in one of several [`PixelFormat`]s,
//!   carrying the per-image lock flag
//! - [`FastBitmap`] / [`LockScope`]: lock guard and scoped lock handle;
//!   direct `get_pixel` / `set_pixel`, bulk array access, `clear`
//! - [`copy_region`] / [`copy_pixels`]: clipped rectangle copies between
//!   two bitmaps, locking both internally
//! - [`Rect`]: signed integer rectangles with intersection
//!
//! Colors are packed `0xAARRGGBB` `u32`s; [`pack_argb`] and
//! [`unpack_argb`] convert to and from [`Rgba`].
//!
//! ```
//! use fastbitmap::{Bitmap, PixelFormat, Rect, clear_bitmap, copy_region};
//!
//! let source = Bitmap::new(32, 32, PixelFormat::Argb32);
//! let canvas = Bitmap::new(64, 64, PixelFormat::Argb32);
//! clear_bitmap(&source, 0xFFFF_0000)?;
//!
//! // Source origin (-5, 5) lands on (40, 9); only the valid overlap is copied.
//! let copied = copy_region(&source, &canvas, Rect::new(-5, 5, 32, 32), Rect::new(40, 9, 23, 48))?;
//! assert!(copied);
//! assert_eq!(canvas.pixel(45, 9)?, 0xFFFF_0000);
//! assert_eq!(canvas.pixel(44, 9)?, 0);
//! # Ok::<(), fastbitmap::FastBitmapError>(())
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bitmap;
mod color;
mod copy;
mod error;
mod fast_bitmap;
mod format;
mod rect;

pub use bitmap::Bitmap;
pub use color::{pack_argb, unpack_argb};
pub use copy::{copy_pixels, copy_region};
pub use error::{ErrorKind, FastBitmapError};
pub use fast_bitmap::{FastBitmap, LockScope, clear_bitmap, data_array_of};
pub use format::PixelFormat;
pub use rect::Rect;

// Re-exports for callers building colors and decoded-image inputs.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
pub use rgb::{Gray, Rgb, Rgba};
