//! Compositing one pixel buffer onto another.
//!
//! An opaque, same-scale source drawn at full opacity onto an upright
//! destination is copied row by row with no blending. Everything else is
//! routed through the ARGB32 blit, treating the source storage as image
//! data at the source's device scale.

use crate::basics::Rect;
use crate::pixel_buffer::PixelBuffer;
use crate::rotation::DeviceRotation;

impl PixelBuffer {
    /// Draw `source` with its top-left corner at logical `(x_offset, y_offset)`.
    pub fn fill_with_buffer(&mut self, source: &PixelBuffer, x_offset: i32, y_offset: i32) {
        self.fill_with_buffer_at_opacity_with_clip(source, x_offset, y_offset, None, 1.0);
    }

    /// Draw `source` at `opacity`.
    pub fn fill_with_buffer_at_opacity(
        &mut self,
        source: &PixelBuffer,
        x_offset: i32,
        y_offset: i32,
        opacity: f32,
    ) {
        self.fill_with_buffer_at_opacity_with_clip(source, x_offset, y_offset, None, opacity);
    }

    /// Draw `source` at full opacity, restricted to `clip_area`.
    pub fn fill_with_buffer_with_clip(
        &mut self,
        source: &PixelBuffer,
        x_offset: i32,
        y_offset: i32,
        clip_area: Option<&Rect>,
    ) {
        self.fill_with_buffer_at_opacity_with_clip(source, x_offset, y_offset, clip_area, 1.0);
    }

    /// Draw `source` at `opacity`, additionally restricted to `clip_area`.
    ///
    /// On the copy path `clip_area` is in device pixels of both buffers; on
    /// the blended path it is in the source's pixels, like the clip of
    /// [`fill_with_argb32_data_scaled`].
    ///
    /// [`fill_with_argb32_data_scaled`]: PixelBuffer::fill_with_argb32_data_scaled
    pub fn fill_with_buffer_at_opacity_with_clip(
        &mut self,
        source: &PixelBuffer,
        x_offset: i32,
        y_offset: i32,
        clip_area: Option<&Rect>,
        opacity: f32,
    ) {
        if opacity == 1.0
            && source.is_opaque()
            && self.device_scale() == source.device_scale()
            && self.device_rotation() == DeviceRotation::Upright
        {
            self.copy_buffer(source, x_offset, y_offset, clip_area);
            return;
        }

        let source_scale = source.device_scale();
        let source_area = source.area();
        let fill_area = Rect::new(
            x_offset.saturating_mul(source_scale as i32),
            y_offset.saturating_mul(source_scale as i32),
            source_area.width,
            source_area.height,
        );

        self.fill_with_argb32_data_scaled(
            Some(&fill_area),
            clip_area,
            source.argb32_data(),
            opacity as f64,
            source_scale,
        );
    }

    fn copy_buffer(
        &mut self,
        source: &PixelBuffer,
        x_offset: i32,
        y_offset: i32,
        clip_area: Option<&Rect>,
    ) {
        let source_size = source.size();
        let mut cropped = self.crop_area_to_clip_area(&Rect::new(
            x_offset,
            y_offset,
            source_size.width,
            source_size.height,
        ));
        if let Some(clip_area) = clip_area {
            cropped = cropped.intersect(clip_area);
        }
        if cropped.is_empty() {
            return;
        }

        let scale = self.device_scale() as i64;
        let src_x = (cropped.x as i64 - x_offset as i64 * scale) as usize;
        let src_y = (cropped.y as i64 - y_offset as i64 * scale) as usize;
        let src_stride = source.area().width as usize;
        let dst_stride = self.area().width as usize;
        let width = cropped.width as usize;

        let src = source.argb32_data();
        let dst = self.argb32_data_mut();
        for row in 0..cropped.height as usize {
            let src_start = (src_y + row) * src_stride + src_x;
            let dst_start = (cropped.y as usize + row) * dst_stride + cropped.x as usize;
            dst[dst_start..dst_start + width].copy_from_slice(&src[src_start..src_start + width]);
        }

        self.add_updated_area(&cropped);
    }
}
