//! Device rotation.
//!
//! Panels mounted sideways or upside down keep their scanout memory in
//! panel order while drawing code addresses pixels in the upright,
//! user-facing orientation. [`DeviceRotation::pixel_offset`] is the one place
//! that translates between the two; sideways rotations address storage as if
//! it were transposed, swapping x and y the way a pixel-format transposer
//! does.

use crate::basics::Rect;

/// How the panel is mounted relative to the image drawn on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceRotation {
    #[default]
    Upright,
    UpsideDown,
    Clockwise,
    CounterClockwise,
}

impl DeviceRotation {
    /// Returns `true` for the 90° and 270° rotations, whose drawing area
    /// has width and height swapped relative to storage.
    #[inline]
    pub fn is_sideways(self) -> bool {
        matches!(
            self,
            DeviceRotation::Clockwise | DeviceRotation::CounterClockwise
        )
    }

    /// Flat index of drawing coordinate `(x, y)` in storage.
    ///
    /// `width` and `height` are the drawing-area (device pixel) dimensions.
    /// The caller guarantees `x < width` and `y < height`.
    #[inline]
    pub fn pixel_offset(self, width: usize, height: usize, x: usize, y: usize) -> usize {
        match self {
            DeviceRotation::Upright => row_major(width, x, y),
            DeviceRotation::UpsideDown => row_major(width, width - 1 - x, height - 1 - y),
            DeviceRotation::Clockwise => column_major(height, x, height - 1 - y),
            DeviceRotation::CounterClockwise => column_major(height, width - 1 - x, y),
        }
    }

    /// Map a rectangle of the drawing area onto the panel (display) space.
    ///
    /// `area` is the full drawing area. Sideways rotations swap the
    /// rectangle's width and height.
    pub fn rect_to_display(self, area: &Rect, rect: &Rect) -> Rect {
        let aw = area.width as i64;
        let ah = area.height as i64;
        let (x, y, w, h) = (
            rect.x as i64,
            rect.y as i64,
            rect.width as i64,
            rect.height as i64,
        );
        match self {
            DeviceRotation::Upright => *rect,
            DeviceRotation::UpsideDown => {
                Rect::new((aw - w - x) as i32, (ah - h - y) as i32, rect.width, rect.height)
            }
            DeviceRotation::Clockwise => {
                Rect::new((ah - h - y) as i32, x as i32, rect.height, rect.width)
            }
            DeviceRotation::CounterClockwise => {
                Rect::new(y as i32, (aw - w - x) as i32, rect.height, rect.width)
            }
        }
    }
}

#[inline]
fn row_major(width: usize, x: usize, y: usize) -> usize {
    y * width + x
}

#[inline]
fn column_major(height: usize, x: usize, y: usize) -> usize {
    x * height + y
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: [DeviceRotation; 4] = [
        DeviceRotation::Upright,
        DeviceRotation::UpsideDown,
        DeviceRotation::Clockwise,
        DeviceRotation::CounterClockwise,
    ];

    #[test]
    fn test_is_sideways() {
        assert!(!DeviceRotation::Upright.is_sideways());
        assert!(!DeviceRotation::UpsideDown.is_sideways());
        assert!(DeviceRotation::Clockwise.is_sideways());
        assert!(DeviceRotation::CounterClockwise.is_sideways());
    }

    #[test]
    fn test_offset_upright() {
        let r = DeviceRotation::Upright;
        assert_eq!(r.pixel_offset(4, 3, 0, 0), 0);
        assert_eq!(r.pixel_offset(4, 3, 3, 0), 3);
        assert_eq!(r.pixel_offset(4, 3, 1, 2), 9);
    }

    #[test]
    fn test_offset_upside_down() {
        let r = DeviceRotation::UpsideDown;
        assert_eq!(r.pixel_offset(4, 3, 0, 0), 11);
        assert_eq!(r.pixel_offset(4, 3, 3, 2), 0);
        assert_eq!(r.pixel_offset(4, 3, 1, 2), 2);
    }

    #[test]
    fn test_offset_clockwise() {
        // 3 wide, 4 tall drawing area stored as 4-wide rows.
        let r = DeviceRotation::Clockwise;
        assert_eq!(r.pixel_offset(3, 4, 0, 0), 3);
        assert_eq!(r.pixel_offset(3, 4, 0, 3), 0);
        assert_eq!(r.pixel_offset(3, 4, 2, 0), 11);
        assert_eq!(r.pixel_offset(3, 4, 1, 1), 6);
    }

    #[test]
    fn test_offset_counter_clockwise() {
        let r = DeviceRotation::CounterClockwise;
        assert_eq!(r.pixel_offset(3, 4, 0, 0), 8);
        assert_eq!(r.pixel_offset(3, 4, 2, 0), 0);
        assert_eq!(r.pixel_offset(3, 4, 2, 3), 3);
        assert_eq!(r.pixel_offset(3, 4, 1, 1), 5);
    }

    #[test]
    fn test_offset_is_bijection() {
        for rotation in ALL {
            let (w, h) = (5usize, 3usize);
            let mut seen = HashSet::new();
            for y in 0..h {
                for x in 0..w {
                    let off = rotation.pixel_offset(w, h, x, y);
                    assert!(off < w * h, "{:?} ({}, {})", rotation, x, y);
                    assert!(seen.insert(off), "{:?} duplicate at ({}, {})", rotation, x, y);
                }
            }
        }
    }

    #[test]
    fn test_rect_to_display_upright_identity() {
        let area = Rect::with_size(10, 6);
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(DeviceRotation::Upright.rect_to_display(&area, &r), r);
    }

    #[test]
    fn test_rect_to_display_upside_down() {
        let area = Rect::with_size(10, 6);
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(
            DeviceRotation::UpsideDown.rect_to_display(&area, &r),
            Rect::new(6, 0, 3, 4)
        );
    }

    #[test]
    fn test_rect_to_display_sideways_swaps_size() {
        let area = Rect::with_size(6, 10);
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(
            DeviceRotation::Clockwise.rect_to_display(&area, &r),
            Rect::new(4, 1, 4, 3)
        );
        assert_eq!(
            DeviceRotation::CounterClockwise.rect_to_display(&area, &r),
            Rect::new(2, 2, 4, 3)
        );
    }

    #[test]
    fn test_rect_to_display_full_area() {
        let area = Rect::with_size(6, 10);
        for rotation in ALL {
            let mapped = rotation.rect_to_display(&area, &area);
            assert_eq!((mapped.x, mapped.y), (0, 0), "{:?}", rotation);
            if rotation.is_sideways() {
                assert_eq!((mapped.width, mapped.height), (10, 6));
            } else {
                assert_eq!((mapped.width, mapped.height), (6, 10));
            }
        }
    }
}
