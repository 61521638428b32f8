//! Accumulator of touched rectangles.
//!
//! Keeps a list of display-space rectangles plus their bounding box, much
//! like a multi-clip renderer keeps its clip boxes. Rectangles are merged
//! only when one fully contains another; overlapping rectangles are kept as
//! separate entries, so flushing a region may touch a pixel twice but never
//! misses one.

use crate::basics::Rect;

/// An ordered, mergeable set of rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<Rect>,
    bounds: Rect,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Rectangles in insertion order.
    pub fn rectangles(&self) -> &[Rect] {
        &self.rects
    }

    /// Rectangles sorted top-to-bottom, then left-to-right.
    pub fn sorted_rectangles(&self) -> Vec<Rect> {
        let mut rects = self.rects.clone();
        rects.sort_by_key(|r| (r.y, r.x));
        rects
    }

    /// Smallest rectangle covering every entry (empty for an empty region).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Add a rectangle. Empty rectangles are ignored, rectangles already
    /// covered by an entry are dropped, and entries covered by the new
    /// rectangle are replaced by it.
    pub fn add_rectangle(&mut self, rect: &Rect) {
        if rect.is_empty() {
            return;
        }
        if self.rects.iter().any(|r| r.contains(rect)) {
            return;
        }
        self.rects.retain(|r| !rect.contains(r));
        self.rects.push(*rect);
        self.bounds = if self.rects.len() == 1 {
            *rect
        } else {
            union_bounds(&self.bounds, rect)
        };
    }

    /// Returns `true` if some entry overlaps `rect`.
    pub fn intersects(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| !r.intersect(rect).is_empty())
    }

    pub fn clear(&mut self) {
        self.rects.clear();
        self.bounds = Rect::default();
    }

    /// Move the rectangles out, leaving the region empty.
    pub fn take(&mut self) -> Region {
        std::mem::take(self)
    }
}

fn union_bounds(a: &Rect, b: &Rect) -> Rect {
    let left = a.x.min(b.x);
    let top = a.y.min(b.y);
    let right = a.right().max(b.right());
    let bottom = a.bottom().max(b.bottom());
    Rect::new(
        left,
        top,
        (right - left as i64) as u32,
        (bottom - top as i64) as u32,
    )
}
