//! Owned ARGB32 storage with scale, rotation and clipping.
//!
//! A [`PixelBuffer`] owns one contiguous `u32` array. Callers describe fill
//! areas in *logical* pixels; each operation multiplies them by the device
//! scale, intersects the result with every entry of the clip stack and
//! writes only inside that cropped device-pixel rectangle. Each write goes
//! through the device rotation mapping, and the cropped rectangle is
//! recorded, in display space, in the updated-areas region so the display
//! layer can flush only what changed.
//!
//! The drawing operations themselves live in `fill`, `composite` and
//! `transform`; this module holds the state and the clip/update mechanics
//! they share.

use std::fmt;

use crate::basics::Rect;
use crate::color;
use crate::error::BufferError;
use crate::region::Region;
use crate::rotation::DeviceRotation;

// ============================================================================
// PixelBuffer
// ============================================================================

/// Premultiplied ARGB32 raster with a clip stack and damage tracking.
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Vec<u32>,
    /// Drawing area in device pixels, always at the origin.
    area: Rect,
    /// `area` divided by the device scale.
    logical_area: Rect,
    /// Device-pixel clip rectangles. Entry 0 is the whole area.
    clip_areas: Vec<Rect>,
    /// Display-space rectangles touched since the caller last drained them.
    updated_areas: Region,
    is_opaque: bool,
    device_scale: u32,
    device_rotation: DeviceRotation,
}

/// Allocate a zeroed (fully transparent) pixel array, reporting failure
/// instead of aborting.
pub(crate) fn allocate_pixels(width: u32, height: u32) -> Result<Vec<u32>, BufferError> {
    let err = || BufferError::AllocationFailed { width, height };
    let len = (width as usize).checked_mul(height as usize).ok_or_else(err)?;
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| err())?;
    pixels.resize(len, 0);
    Ok(pixels)
}

impl PixelBuffer {
    /// Create an upright, fully transparent buffer of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        Self::with_device_rotation(width, height, DeviceRotation::Upright)
    }

    /// Create a fully transparent buffer for a panel of `width` x `height`
    /// mounted with `device_rotation`.
    ///
    /// For sideways rotations the drawing area is `height` x `width`.
    pub fn with_device_rotation(
        width: u32,
        height: u32,
        device_rotation: DeviceRotation,
    ) -> Result<Self, BufferError> {
        let (width, height) = if device_rotation.is_sideways() {
            (height, width)
        } else {
            (width, height)
        };

        let pixels = allocate_pixels(width, height)?;
        let area = Rect::with_size(width, height);
        log::trace!(
            "created {}x{} pixel buffer ({:?})",
            width,
            height,
            device_rotation
        );

        Ok(Self {
            pixels,
            area,
            logical_area: area,
            clip_areas: vec![area],
            updated_areas: Region::new(),
            is_opaque: false,
            device_scale: 1,
            device_rotation,
        })
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Logical width.
    pub fn width(&self) -> u32 {
        self.logical_area.width
    }

    /// Logical height.
    pub fn height(&self) -> u32 {
        self.logical_area.height
    }

    /// Logical size as a rectangle at the origin.
    pub fn size(&self) -> Rect {
        self.logical_area
    }

    /// Drawing area in device pixels.
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn device_scale(&self) -> u32 {
        self.device_scale
    }

    /// Set the logical → device pixel multiplier. Zero is treated as one.
    /// Storage and clip areas are left untouched.
    pub fn set_device_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        if scale != self.device_scale {
            log::debug!("device scale {} -> {}", self.device_scale, scale);
        }
        self.device_scale = scale;
        self.logical_area = Rect::with_size(self.area.width / scale, self.area.height / scale);
    }

    pub fn device_rotation(&self) -> DeviceRotation {
        self.device_rotation
    }

    /// Change the device rotation without touching storage.
    ///
    /// Moving between the upright and sideways families swaps the drawing
    /// area's width and height. Any pushed clip areas are discarded.
    pub fn set_device_rotation(&mut self, device_rotation: DeviceRotation) {
        if self.device_rotation == device_rotation {
            return;
        }
        log::debug!(
            "device rotation {:?} -> {:?}",
            self.device_rotation,
            device_rotation
        );

        if self.device_rotation.is_sideways() != device_rotation.is_sideways() {
            self.area = Rect::with_size(self.area.height, self.area.width);
            self.set_device_scale(self.device_scale);
        }
        self.device_rotation = device_rotation;

        self.clip_areas.clear();
        self.clip_areas.push(self.area);
    }

    // ========================================================================
    // Opacity hint and raw data
    // ========================================================================

    /// `true` once the whole buffer is known to hold opaque pixels.
    /// This is a hint maintained by specific operations, not recomputed.
    pub fn is_opaque(&self) -> bool {
        self.is_opaque
    }

    pub fn set_opaque(&mut self, is_opaque: bool) {
        self.is_opaque = is_opaque;
    }

    /// Raw storage, in panel order.
    pub fn argb32_data(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable raw storage, e.g. for an image decoder to fill directly.
    pub fn argb32_data_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    // ========================================================================
    // Updated areas
    // ========================================================================

    pub fn updated_areas(&self) -> &Region {
        &self.updated_areas
    }

    pub fn updated_areas_mut(&mut self) -> &mut Region {
        &mut self.updated_areas
    }

    /// Drain the updated areas, leaving the region empty.
    pub fn take_updated_areas(&mut self) -> Region {
        self.updated_areas.take()
    }

    /// Record a device-pixel rectangle as touched, mapped to display space.
    pub(crate) fn add_updated_area(&mut self, area: &Rect) {
        if area.is_empty() {
            return;
        }
        let updated = self.device_rotation.rect_to_display(&self.area, area);
        self.updated_areas.add_rectangle(&updated);
    }

    // ========================================================================
    // Pixel access (device coordinates, rotation-aware)
    // ========================================================================

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.area.width && (y as u32) < self.area.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        self.device_rotation.pixel_offset(
            self.area.width as usize,
            self.area.height as usize,
            x as usize,
            y as usize,
        )
    }

    /// Read the pixel at device coordinate `(x, y)`.
    /// Coordinates outside the area read as transparent.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> u32 {
        if !self.in_bounds(x, y) {
            return 0;
        }
        self.pixels[self.offset(x, y)]
    }

    /// Overwrite the pixel at device coordinate `(x, y)`.
    /// Coordinates outside the area are ignored; the clip stack is not
    /// consulted.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, value: u32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let off = self.offset(x, y);
        self.pixels[off] = value;
    }

    /// Composite `value` over the pixel at `(x, y)`. Opaque values are
    /// stored directly.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, value: u32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let off = self.offset(x, y);
        self.pixels[off] = if color::is_opaque(value) {
            value
        } else {
            color::blend(value, self.pixels[off])
        };
    }

    // ========================================================================
    // Clipping
    // ========================================================================

    /// Restrict subsequent drawing to `clip_area` (logical pixels), on top
    /// of any clip areas already pushed.
    pub fn push_clip_area(&mut self, clip_area: &Rect) {
        self.clip_areas.push(clip_area.upscale(self.device_scale));
    }

    /// Remove the most recently pushed clip area.
    pub fn pop_clip_area(&mut self) {
        if self.clip_areas.len() <= 1 {
            log::warn!("pop_clip_area called with no pushed clip area");
            return;
        }
        self.clip_areas.pop();
    }

    /// Run `f` with `clip_area` pushed, popping it afterwards.
    pub fn with_clip_area<R>(&mut self, clip_area: &Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_clip_area(clip_area);
        let result = f(self);
        self.pop_clip_area();
        result
    }

    /// Number of clip areas pushed on top of the implicit full-area entry.
    pub fn clip_depth(&self) -> usize {
        self.clip_areas.len() - 1
    }

    /// Convert a logical rectangle to device pixels and intersect it with
    /// every clip area.
    pub(crate) fn crop_area_to_clip_area(&self, area: &Rect) -> Rect {
        self.clip_areas
            .iter()
            .fold(area.upscale(self.device_scale), |cropped, clip| {
                cropped.intersect(clip)
            })
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("area", &self.area)
            .field("logical_area", &self.logical_area)
            .field("device_scale", &self.device_scale)
            .field("device_rotation", &self.device_rotation)
            .field("clip_areas", &self.clip_areas)
            .field("is_opaque", &self.is_opaque)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let buf = PixelBuffer::new(8, 6).unwrap();
        assert_eq!(buf.width(), 8);
        assert_eq!(buf.height(), 6);
        assert_eq!(buf.area(), Rect::with_size(8, 6));
        assert_eq!(buf.device_scale(), 1);
        assert_eq!(buf.device_rotation(), DeviceRotation::Upright);
        assert_eq!(buf.argb32_data().len(), 48);
        assert!(buf.argb32_data().iter().all(|&p| p == 0));
        assert!(!buf.is_opaque());
        assert!(buf.updated_areas().is_empty());
        assert_eq!(buf.clip_depth(), 0);
    }

    #[test]
    fn test_new_sideways_swaps_size() {
        let buf = PixelBuffer::with_device_rotation(8, 6, DeviceRotation::Clockwise).unwrap();
        assert_eq!(buf.width(), 6);
        assert_eq!(buf.height(), 8);
        assert_eq!(buf.argb32_data().len(), 48);

        let buf = PixelBuffer::with_device_rotation(8, 6, DeviceRotation::UpsideDown).unwrap();
        assert_eq!((buf.width(), buf.height()), (8, 6));
    }

    #[test]
    fn test_new_zero_size() {
        let buf = PixelBuffer::new(0, 5).unwrap();
        assert_eq!(buf.argb32_data().len(), 0);
        assert_eq!(buf.pixel(0, 0), 0);
    }

    #[test]
    fn test_allocation_overflow_is_error() {
        if usize::BITS == 32 {
            assert_eq!(
                PixelBuffer::new(u32::MAX, u32::MAX).unwrap_err(),
                BufferError::AllocationFailed {
                    width: u32::MAX,
                    height: u32::MAX
                }
            );
        } else {
            assert!(allocate_pixels(u32::MAX, u32::MAX).is_err());
        }
    }

    #[test]
    fn test_device_scale() {
        let mut buf = PixelBuffer::new(9, 6).unwrap();
        buf.set_device_scale(2);
        assert_eq!(buf.device_scale(), 2);
        assert_eq!(buf.size(), Rect::with_size(4, 3));
        assert_eq!(buf.area(), Rect::with_size(9, 6));

        buf.set_device_scale(0);
        assert_eq!(buf.device_scale(), 1);
        assert_eq!(buf.size(), Rect::with_size(9, 6));
    }

    #[test]
    fn test_set_device_rotation_swaps_once() {
        let mut buf = PixelBuffer::new(8, 4).unwrap();
        buf.set_device_scale(2);
        buf.set_device_rotation(DeviceRotation::Clockwise);
        assert_eq!(buf.area(), Rect::with_size(4, 8));
        assert_eq!(buf.size(), Rect::with_size(2, 4));

        buf.set_device_rotation(DeviceRotation::CounterClockwise);
        assert_eq!(buf.area(), Rect::with_size(4, 8));

        buf.set_device_rotation(DeviceRotation::Upright);
        assert_eq!(buf.area(), Rect::with_size(8, 4));
        assert_eq!(buf.argb32_data().len(), 32);
    }

    #[test]
    fn test_set_device_rotation_resets_clip() {
        let mut buf = PixelBuffer::new(8, 4).unwrap();
        buf.push_clip_area(&Rect::new(0, 0, 1, 1));
        buf.push_clip_area(&Rect::new(0, 0, 1, 1));
        assert_eq!(buf.clip_depth(), 2);
        buf.set_device_rotation(DeviceRotation::UpsideDown);
        assert_eq!(buf.clip_depth(), 0);
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::new(-5, -5, 100, 100)),
            Rect::with_size(8, 4)
        );
    }

    #[test]
    fn test_set_get_pixel_upright() {
        let mut buf = PixelBuffer::new(4, 3).unwrap();
        buf.set_pixel(1, 2, 0xff123456);
        assert_eq!(buf.pixel(1, 2), 0xff123456);
        assert_eq!(buf.argb32_data()[9], 0xff123456);
    }

    #[test]
    fn test_set_get_pixel_rotated_storage() {
        let mut buf = PixelBuffer::with_device_rotation(4, 3, DeviceRotation::Clockwise).unwrap();
        // Drawing area is 3x4.
        buf.set_pixel(0, 0, 0xff0000ff);
        assert_eq!(buf.pixel(0, 0), 0xff0000ff);
        assert_eq!(buf.argb32_data()[3], 0xff0000ff);

        let mut buf =
            PixelBuffer::with_device_rotation(4, 3, DeviceRotation::UpsideDown).unwrap();
        buf.set_pixel(0, 0, 0xff00ff00);
        assert_eq!(buf.argb32_data()[11], 0xff00ff00);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut buf = PixelBuffer::new(4, 3).unwrap();
        buf.set_pixel(-1, 0, 0xffffffff);
        buf.set_pixel(4, 0, 0xffffffff);
        buf.set_pixel(0, 3, 0xffffffff);
        assert!(buf.argb32_data().iter().all(|&p| p == 0));
        assert_eq!(buf.pixel(100, 100), 0);
    }

    #[test]
    fn test_blend_pixel() {
        let mut buf = PixelBuffer::new(2, 1).unwrap();
        buf.set_pixel(0, 0, 0xff00ff00);
        buf.blend_pixel(0, 0, 0x80800000);
        assert_eq!(buf.pixel(0, 0), color::blend(0x80800000, 0xff00ff00));

        buf.blend_pixel(1, 0, 0xff112233);
        assert_eq!(buf.pixel(1, 0), 0xff112233);
    }

    #[test]
    fn test_clip_stack_intersection() {
        let mut buf = PixelBuffer::new(20, 20).unwrap();
        buf.push_clip_area(&Rect::new(2, 2, 10, 10));
        buf.push_clip_area(&Rect::new(5, 0, 10, 5));
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::with_size(20, 20)),
            Rect::new(5, 2, 7, 3)
        );
        buf.pop_clip_area();
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::with_size(20, 20)),
            Rect::new(2, 2, 10, 10)
        );
        buf.pop_clip_area();
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::with_size(20, 20)),
            Rect::with_size(20, 20)
        );
    }

    #[test]
    fn test_pop_never_removes_base() {
        let mut buf = PixelBuffer::new(4, 4).unwrap();
        buf.pop_clip_area();
        buf.pop_clip_area();
        assert_eq!(buf.clip_depth(), 0);
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::new(-1, -1, 10, 10)),
            Rect::with_size(4, 4)
        );
    }

    #[test]
    fn test_clip_areas_upscaled() {
        let mut buf = PixelBuffer::new(20, 20).unwrap();
        buf.set_device_scale(2);
        buf.push_clip_area(&Rect::new(1, 1, 2, 2));
        assert_eq!(
            buf.crop_area_to_clip_area(&Rect::with_size(10, 10)),
            Rect::new(2, 2, 4, 4)
        );
    }

    #[test]
    fn test_with_clip_area_pops() {
        let mut buf = PixelBuffer::new(10, 10).unwrap();
        let cropped = buf.with_clip_area(&Rect::new(1, 1, 2, 2), |b| {
            assert_eq!(b.clip_depth(), 1);
            b.crop_area_to_clip_area(&Rect::with_size(10, 10))
        });
        assert_eq!(cropped, Rect::new(1, 1, 2, 2));
        assert_eq!(buf.clip_depth(), 0);
    }

    #[test]
    fn test_add_updated_area_rotated() {
        let mut buf = PixelBuffer::with_device_rotation(10, 6, DeviceRotation::Clockwise).unwrap();
        buf.add_updated_area(&Rect::new(1, 2, 3, 4));
        assert_eq!(buf.updated_areas().rectangles(), &[Rect::new(4, 1, 4, 3)]);

        buf.add_updated_area(&Rect::new(1, 2, 0, 4));
        assert_eq!(buf.updated_areas().len(), 1);

        let drained = buf.take_updated_areas();
        assert_eq!(drained.len(), 1);
        assert!(buf.updated_areas().is_empty());
    }

    #[test]
    fn test_debug_omits_pixels() {
        let buf = PixelBuffer::new(2, 2).unwrap();
        let text = format!("{:?}", buf);
        assert!(text.starts_with("PixelBuffer"));
        assert!(!text.contains("pixels"));
    }
}
