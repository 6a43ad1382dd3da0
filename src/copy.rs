//! Clipped pixel transfer between two bitmaps.
//!
//! [`copy_region`] maps `source_rect` in the source onto `target_rect` in
//! the destination with a pure translation (no scaling) and copies only the
//! pixels that are valid on both sides. [`copy_pixels`] is the full-image
//! special case. Both lock the two bitmaps themselves and leave them
//! unlocked on return; callers must not hold a lock on either.

use core::ptr;

use log::debug;

use crate::{Bitmap, FastBitmap, FastBitmapError, Rect};

/// Copy the pixels of `source_rect` in `source` to `target_rect` in
/// `destination`.
///
/// The source rectangle's origin lands on the target rectangle's origin.
/// The copied area is the part of `source_rect` that lies inside the
/// source image, fits within the size of `target_rect`, and lands inside
/// the destination image. Pixels are copied verbatim.
///
/// Returns `Ok(true)` if any pixels were copied and `Ok(false)` when the
/// clipped area is empty (non-positive rectangle sizes, rectangles outside
/// their images). Nothing is locked on the `Ok(false)` paths.
///
/// # Errors
///
/// - [`FastBitmapError::SelfCopy`] if `source` and `destination` are the
///   same bitmap.
/// - [`FastBitmapError::UnsupportedFormat`] if either bitmap is not a
///   packed 32-bit format.
/// - [`FastBitmapError::AlreadyLocked`] if either bitmap is locked.
pub fn copy_region(
    source: &Bitmap,
    destination: &Bitmap,
    source_rect: Rect,
    target_rect: Rect,
) -> Result<bool, FastBitmapError> {
    if ptr::eq(source, destination) {
        debug!("copy_region: source and destination are the same bitmap");
        return Err(FastBitmapError::SelfCopy);
    }

    let source_bounds = source.bounds();
    let dest_bounds = destination.bounds();

    if !source_bounds.is_empty()
        && source_rect == source_bounds
        && target_rect == dest_bounds
        && source_bounds == dest_bounds
        && source.pixel_format() == destination.pixel_format()
    {
        return copy_pixels(source, destination);
    }

    let Some((from, to)) = clip_regions(source_bounds, dest_bounds, source_rect, target_rect)
    else {
        debug!("copy_region: {source_rect:?} -> {target_rect:?} clips to nothing");
        return Ok(false);
    };

    let mut src = FastBitmap::new(source)?;
    let mut dst = FastBitmap::new(destination)?;
    let mut src_scope = src.lock()?;
    let mut dst_scope = dst.lock()?;

    let src_width = source.width() as usize;
    let dst_width = destination.width() as usize;
    let run = from.width as usize;
    {
        let src_bits = src_scope.pixels()?;
        let dst_bits = dst_scope.pixels_mut()?;
        for row in 0..from.height as usize {
            let s = (from.y as usize + row) * src_width + from.x as usize;
            let d = (to.y as usize + row) * dst_width + to.x as usize;
            dst_bits[d..d + run].copy_from_slice(&src_bits[s..s + run]);
        }
    }

    dst_scope.unlock()?;
    src_scope.unlock()?;
    Ok(true)
}

/// Copy every pixel of `source` into `destination`.
///
/// Returns `Ok(false)` without touching anything if the two bitmaps differ
/// in width, height or pixel format, or are the same bitmap.
///
/// # Errors
///
/// [`FastBitmapError::UnsupportedFormat`] for formats that cannot be
/// locked, [`FastBitmapError::AlreadyLocked`] if either bitmap is locked.
pub fn copy_pixels(source: &Bitmap, destination: &Bitmap) -> Result<bool, FastBitmapError> {
    if ptr::eq(source, destination)
        || source.width() != destination.width()
        || source.height() != destination.height()
        || source.pixel_format() != destination.pixel_format()
    {
        debug!("copy_pixels: {source:?} and {destination:?} are not compatible");
        return Ok(false);
    }

    let mut src = FastBitmap::new(source)?;
    let mut dst = FastBitmap::new(destination)?;
    let mut src_scope = src.lock()?;
    let mut dst_scope = dst.lock()?;
    dst_scope.pixels_mut()?.copy_from_slice(src_scope.pixels()?);
    dst_scope.unlock()?;
    src_scope.unlock()?;
    Ok(true)
}

/// Clip a region copy to what both images can supply and receive.
///
/// Returns the source area and the equally sized destination area, or
/// `None` if nothing is copied. Destination coordinates are source
/// coordinates shifted by `target_rect.origin - source_rect.origin`.
fn clip_regions(
    source_bounds: Rect,
    dest_bounds: Rect,
    source_rect: Rect,
    target_rect: Rect,
) -> Option<(Rect, Rect)> {
    if source_rect.is_empty()
        || target_rect.is_empty()
        || !source_rect.intersects(&source_bounds)
        || !target_rect.intersects(&dest_bounds)
    {
        return None;
    }

    let dx = target_rect.x.checked_sub(source_rect.x)?;
    let dy = target_rect.y.checked_sub(source_rect.y)?;

    // Source pixels that exist.
    let from = source_rect.intersect(&source_bounds);
    // No more than the target rectangle can take.
    let from = from.intersect(&Rect::new(
        source_rect.x,
        source_rect.y,
        target_rect.width,
        target_rect.height,
    ));
    let to = target_rect.intersect(&dest_bounds);
    // Destination image, seen from source space.
    let from = from.intersect(&dest_bounds.offset(dx.checked_neg()?, dy.checked_neg()?));

    let width = from.width.min(to.width);
    let height = from.height.min(to.height);
    if width <= 0 || height <= 0 {
        return None;
    }

    let from = Rect::new(from.x, from.y, width, height);
    let to = from.offset(dx, dy);
    debug_assert_eq!(to.intersect(&target_rect.intersect(&dest_bounds)), to);
    Some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, PixelFormat, data_array_of};
    use alloc::vec::Vec;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_bitmap(width: u32, height: u32, seed: u64) -> Bitmap {
        let bmp = Bitmap::new(width, height, PixelFormat::Argb32);
        let mut rng = StdRng::seed_from_u64(seed);
        let colors: Vec<u32> = (0..width * height).map(|_| rng.random()).collect();
        let mut fast = FastBitmap::new(&bmp).unwrap();
        fast.lock()
            .unwrap()
            .copy_from_array(&colors, false)
            .unwrap();
        drop(fast);
        bmp
    }

    fn blank(width: u32, height: u32) -> Bitmap {
        Bitmap::new(width, height, PixelFormat::Argb32)
    }

    /// Reference: every destination pixel whose preimage lies in the source
    /// image, the source rect, and whose position lies in the target rect.
    fn expected_after_copy(
        source: &Bitmap,
        before: &[u32],
        dest_width: u32,
        dest_height: u32,
        source_rect: Rect,
        target_rect: Rect,
    ) -> Vec<u32> {
        let src = data_array_of(source).unwrap();
        let mut out = before.to_vec();
        let dx = target_rect.x - source_rect.x;
        let dy = target_rect.y - source_rect.y;
        for y in 0..dest_height as i32 {
            for x in 0..dest_width as i32 {
                let (sx, sy) = (x - dx, y - dy);
                let valid = target_rect.contains(x, y)
                    && source_rect.contains(sx, sy)
                    && source.bounds().contains(sx, sy);
                if valid {
                    out[(y as u32 * dest_width + x as u32) as usize] =
                        src[(sy as u32 * source.width() + sx as u32) as usize];
                }
            }
        }
        out
    }

    fn assert_copy_matches(source: &Bitmap, dest: &Bitmap, source_rect: Rect, target_rect: Rect) {
        let before = data_array_of(dest).unwrap();
        let expected = expected_after_copy(
            source,
            &before,
            dest.width(),
            dest.height(),
            source_rect,
            target_rect,
        );
        copy_region(source, dest, source_rect, target_rect).unwrap();
        assert!(!source.is_locked());
        assert!(!dest.is_locked());
        assert_eq!(data_array_of(dest).unwrap(), expected);
    }

    // --- Clipping math ---

    #[test]
    fn clip_full_overlap() {
        let got = clip_regions(
            Rect::from_size(32, 32),
            Rect::from_size(64, 64),
            Rect::new(0, 0, 32, 32),
            Rect::new(0, 0, 64, 64),
        );
        assert_eq!(got, Some((Rect::new(0, 0, 32, 32), Rect::new(0, 0, 32, 32))));
    }

    #[test]
    fn clip_negative_source_origin() {
        let got = clip_regions(
            Rect::from_size(32, 32),
            Rect::from_size(64, 64),
            Rect::new(-5, 5, 32, 32),
            Rect::new(40, 9, 23, 48),
        );
        // Source column 0 sits 5 columns into the source rect, so it lands
        // 5 columns into the target rect.
        assert_eq!(got, Some((Rect::new(0, 5, 18, 27), Rect::new(45, 9, 18, 27))));
    }

    #[test]
    fn clip_target_past_destination_edge() {
        let got = clip_regions(
            Rect::from_size(32, 32),
            Rect::from_size(64, 64),
            Rect::new(0, 0, 32, 32),
            Rect::new(50, -10, 32, 32),
        );
        assert_eq!(got, Some((Rect::new(0, 10, 14, 22), Rect::new(50, 0, 14, 22))));
    }

    #[test]
    fn clip_degenerate() {
        let src = Rect::from_size(32, 32);
        let dst = Rect::from_size(64, 64);
        for (s, t) in [
            (Rect::new(0, 0, -1, 32), Rect::new(0, 0, 64, 64)),
            (Rect::new(0, 0, 32, 0), Rect::new(0, 0, 64, 64)),
            (Rect::new(0, 0, 32, 32), Rect::new(0, 0, 64, -5)),
            (Rect::new(32, 0, 8, 8), Rect::new(0, 0, 8, 8)),
            (Rect::new(0, 0, 8, 8), Rect::new(-8, 0, 8, 8)),
            // Overlaps both images, but the translated source misses the canvas.
            (Rect::new(-40, 0, 48, 8), Rect::new(-48, 0, 60, 8)),
        ] {
            assert_eq!(clip_regions(src, dst, s, t), None, "{s:?} -> {t:?}");
        }
    }

    // --- copy_region ---

    #[test]
    fn copy_into_larger_canvas() {
        let source = random_bitmap(32, 32, 1);
        let canvas = blank(64, 64);
        let source_rect = Rect::new(0, 0, 32, 32);
        let target_rect = Rect::new(0, 0, 64, 64);
        assert!(copy_region(&source, &canvas, source_rect, target_rect).unwrap());

        let src = data_array_of(&source).unwrap();
        let dst = data_array_of(&canvas).unwrap();
        for y in 0..64usize {
            for x in 0..64usize {
                let want = if x < 32 && y < 32 { src[y * 32 + x] } else { 0 };
                assert_eq!(dst[y * 64 + x], want, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn copy_clipped_negative_origin() {
        let source = random_bitmap(32, 32, 2);
        let canvas = blank(64, 64);
        assert_copy_matches(
            &source,
            &canvas,
            Rect::new(-5, 5, 32, 32),
            Rect::new(40, 9, 23, 48),
        );
        let dst = data_array_of(&canvas).unwrap();
        let src = data_array_of(&source).unwrap();
        assert_eq!(dst[9 * 64 + 45], src[5 * 32]);
        assert_eq!(dst[9 * 64 + 44], 0);
    }

    #[test]
    fn copy_matches_reference_for_many_rects() {
        let source = random_bitmap(32, 32, 3);
        let canvas = random_bitmap(64, 64, 4);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let source_rect = Rect::new(
                rng.random_range(-40..40),
                rng.random_range(-40..40),
                rng.random_range(-4..48),
                rng.random_range(-4..48),
            );
            let target_rect = Rect::new(
                rng.random_range(-70..70),
                rng.random_range(-70..70),
                rng.random_range(-4..80),
                rng.random_range(-4..80),
            );
            assert_copy_matches(&source, &canvas, source_rect, target_rect);
        }
    }

    #[test]
    fn negative_width_is_noop() {
        let source = random_bitmap(32, 32, 6);
        let canvas = random_bitmap(64, 64, 7);
        let before = data_array_of(&canvas).unwrap();
        let copied =
            copy_region(&source, &canvas, Rect::new(0, 0, -1, 32), Rect::new(0, 0, 64, 64))
                .unwrap();
        assert!(!copied);
        assert_eq!(data_array_of(&canvas).unwrap(), before);
        assert!(!source.is_locked());
        assert!(!canvas.is_locked());
    }

    #[test]
    fn self_copy_is_rejected() {
        let bitmap = random_bitmap(16, 16, 8);
        let before = data_array_of(&bitmap).unwrap();
        let err = copy_region(
            &bitmap,
            &bitmap,
            Rect::new(0, 0, 8, 8),
            Rect::new(4, 4, 8, 8),
        )
        .unwrap_err();
        assert_eq!(err, FastBitmapError::SelfCopy);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(data_array_of(&bitmap).unwrap(), before);
        assert!(!bitmap.is_locked());
    }

    #[test]
    fn copy_fails_while_destination_locked() {
        let source = random_bitmap(8, 8, 9);
        let canvas = blank(8, 8);
        let mut guard = FastBitmap::new(&canvas).unwrap();
        let scope = guard.lock().unwrap();
        let err = copy_region(&source, &canvas, Rect::new(0, 0, 4, 4), Rect::new(0, 0, 4, 4))
            .unwrap_err();
        assert_eq!(err, FastBitmapError::AlreadyLocked);
        assert!(!source.is_locked());
        drop(scope);
        assert!(!canvas.is_locked());
    }

    #[test]
    fn copy_between_packed_formats_is_verbatim() {
        let source = random_bitmap(4, 4, 10);
        let canvas = Bitmap::new(4, 4, PixelFormat::Rgb32);
        assert!(copy_region(&source, &canvas, source.bounds(), canvas.bounds()).unwrap());
        assert_eq!(data_array_of(&canvas).unwrap(), data_array_of(&source).unwrap());
    }

    #[test]
    fn copy_rejects_unpacked_format() {
        let source = random_bitmap(4, 4, 11);
        let canvas = Bitmap::new(4, 4, PixelFormat::Rgb24);
        let err = copy_region(&source, &canvas, Rect::new(0, 0, 2, 2), Rect::new(0, 0, 2, 2))
            .unwrap_err();
        assert_eq!(err, FastBitmapError::UnsupportedFormat(PixelFormat::Rgb24));
        assert!(!source.is_locked());
    }

    // --- copy_pixels ---

    #[test]
    fn copy_pixels_same_shape() {
        let source = random_bitmap(13, 7, 12);
        let dest = blank(13, 7);
        assert!(copy_pixels(&source, &dest).unwrap());
        assert_eq!(data_array_of(&dest).unwrap(), data_array_of(&source).unwrap());
        assert!(!source.is_locked());
        assert!(!dest.is_locked());
    }

    #[test]
    fn copy_pixels_mismatch_returns_false() {
        let source = random_bitmap(8, 8, 13);
        for dest in [
            blank(8, 9),
            blank(9, 8),
            Bitmap::new(8, 8, PixelFormat::Pargb32),
        ] {
            let before = data_array_of(&dest).unwrap();
            assert!(!copy_pixels(&source, &dest).unwrap());
            assert_eq!(data_array_of(&dest).unwrap(), before);
        }
        assert!(!copy_pixels(&source, &source).unwrap());
    }

    #[test]
    fn full_bounds_region_uses_whole_copy() {
        let source = random_bitmap(16, 16, 14);
        let dest = blank(16, 16);
        assert!(copy_region(&source, &dest, source.bounds(), dest.bounds()).unwrap());
        assert_eq!(data_array_of(&dest).unwrap(), data_array_of(&source).unwrap());
    }
}
