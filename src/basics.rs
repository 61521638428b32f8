//! Foundation types and fixed-point helpers.
//!
//! The most fundamental pieces everything else depends on: the integer
//! rectangle used for fill areas, clip areas and updated areas, and the
//! `/ 255` rounding primitive shared by all channel arithmetic.

// ============================================================================
// Fixed-point rounding
// ============================================================================

/// Divide a channel product by 255 with rounding.
///
/// `(v + (v >> 8) + 0x80) >> 8`, the only rounding rule used for channel
/// math. For products of two 8-bit values it lands on the nearest integer
/// except for a handful of quotients just above a half, which round down.
#[inline]
pub fn div255(v: u32) -> u32 {
    (v + (v >> 8) + 0x80) >> 8
}

// ============================================================================
// Rect
// ============================================================================

/// An axis-aligned rectangle: origin plus size.
///
/// Width and height are unsigned; a rectangle with either of them zero is
/// empty and covers no pixels regardless of its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub const fn with_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns the overlap of `self` and `other`.
    ///
    /// The result is empty (zero width and height) when the rectangles
    /// do not overlap or either of them is empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::new(self.x, self.y, 0, 0);
        }

        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return Rect::new(left as i32, top as i32, 0, 0);
        }

        Rect::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
    }

    /// Returns `true` if every pixel of `other` lies inside `self`.
    /// An empty `other` is contained by anything.
    pub fn contains(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns `true` if the point lies inside the rectangle.
    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && (x as i64) < self.right() && (y as i64) < self.bottom()
    }

    /// Multiply every field by `scale` (logical → device pixels).
    pub fn upscale(&self, scale: u32) -> Rect {
        let s = scale as i64;
        Rect::new(
            clamp_i32(self.x as i64 * s),
            clamp_i32(self.y as i64 * s),
            (self.width as u64 * scale as u64).min(u32::MAX as u64) as u32,
            (self.height as u64 * scale as u64).min(u32::MAX as u64) as u32,
        )
    }

    /// Divide every field by `scale`, truncating toward zero.
    /// A zero scale leaves the rectangle unchanged.
    pub fn downscale(&self, scale: u32) -> Rect {
        if scale == 0 {
            return *self;
        }
        let s = scale as i64;
        Rect::new(
            (self.x as i64 / s) as i32,
            (self.y as i64 / s) as i32,
            self.width / scale,
            self.height / scale,
        )
    }
}

#[inline]
fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// ============================================================================
// Tests
// ============================================================================
