//! Error type shared by every fallible operation in the crate.

use core::fmt;

use crate::PixelFormat;

/// Broad classification of a [`FastBitmapError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The caller passed a value the operation cannot accept.
    InvalidArgument,
    /// The operation is not allowed in the current lock state.
    InvalidState,
    /// A pixel coordinate lies outside the image.
    OutOfRange,
}

/// Errors from bitmap locking and pixel access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FastBitmapError {
    /// Pixel format cannot be mapped as packed 32-bit colors.
    UnsupportedFormat(PixelFormat),
    /// Array length does not match `width * height`.
    LengthMismatch { expected: usize, actual: usize },
    /// Source and destination are the same bitmap.
    SelfCopy,
    /// Width or height causes overflow.
    InvalidDimensions,
    /// Backing data is too small for the given dimensions.
    InsufficientData { expected: usize, actual: usize },
    /// The bitmap is already locked.
    AlreadyLocked,
    /// The operation requires a lock that is not held.
    NotLocked,
    /// Coordinate outside `[0, width) x [0, height)`.
    OutOfRange { x: i32, y: i32, width: u32, height: u32 },
}

impl FastBitmapError {
    /// Classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_)
            | Self::LengthMismatch { .. }
            | Self::SelfCopy
            | Self::InvalidDimensions
            | Self::InsufficientData { .. } => ErrorKind::InvalidArgument,
            Self::AlreadyLocked | Self::NotLocked => ErrorKind::InvalidState,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}

impl fmt::Display for FastBitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(format) => {
                write!(f, "pixel format {format:?} is not a packed 32-bit format")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "array length {actual} does not match pixel count {expected}")
            }
            Self::SelfCopy => write!(f, "source and destination are the same bitmap"),
            Self::InvalidDimensions => write!(f, "width or height causes overflow"),
            Self::InsufficientData { expected, actual } => write!(
                f,
                "data holds {actual} bytes but {expected} are required"
            ),
            Self::AlreadyLocked => write!(f, "bitmap is already locked"),
            Self::NotLocked => write!(f, "bitmap is not locked"),
            Self::OutOfRange {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({x}, {y}) is outside {width}x{height}"),
        }
    }
}

impl core::error::Error for FastBitmapError {}
