//! Integer rectangles for region operations.
//!
//! Coordinates follow the usual image convention: origin at the top-left,
//! X to the right, Y downward. Edges are half-open, so `right()` and
//! `bottom()` are the first column and row outside the rectangle.
//! Width and height may be zero or negative; such rectangles are empty.

/// A rectangle defined by origin and signed dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels; non-positive means empty.
    pub width: i32,
    /// Height in pixels; non-positive means empty.
    pub height: i32,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `(0, 0)` covering a `width x height` image.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, clamp_dim(width), clamp_dim(height))
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// True when the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `(x, y)` lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The same rectangle moved by `(dx, dy)`.
    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Overlap of two rectangles, or [`Rect::EMPTY`] if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::EMPTY;
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.intersect(other).is_empty()
    }
}

const fn clamp_dim(v: u32) -> i32 {
    if v > i32::MAX as u32 {
        i32::MAX
    } else {
        v as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert!(r.contains(10, 20));
        assert!(!r.contains(110, 20));
        assert!(!r.contains(10, 70));
    }

    #[test]
    fn intersect_overlap() {
        let a = Rect::new(0, 0, 32, 32);
        let b = Rect::new(-5, 5, 32, 32);
        assert_eq!(a.intersect(&b), Rect::new(0, 5, 27, 27));
        assert_eq!(b.intersect(&a), Rect::new(0, 5, 27, 27));
    }

    #[test]
    fn intersect_disjoint_is_empty() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersect(&b), Rect::EMPTY);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn negative_dimensions_are_empty() {
        let r = Rect::new(0, 0, -1, 10);
        assert!(r.is_empty());
        assert!(!r.intersects(&Rect::from_size(64, 64)));
        assert!(!Rect::new(0, 0, 10, 0).intersects(&Rect::from_size(64, 64)));
    }

    #[test]
    fn offset_moves_origin() {
        let r = Rect::new(1, 2, 3, 4).offset(-5, 10);
        assert_eq!(r, Rect::new(-4, 12, 3, 4));
    }

    #[test]
    fn from_size_clamps() {
        assert_eq!(Rect::from_size(u32::MAX, 1).width, i32::MAX);
    }
}
