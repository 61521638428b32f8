//! Resize, rotate, tile and rotate-to-upright.
//!
//! Each transform reads the source and returns a freshly allocated upright
//! buffer; the source is never modified. `resize`, `rotate` and `tile`
//! read raw storage and so expect an upright source. `rotate_upright` is
//! the one transform that honors the source's device rotation, and is how
//! a rotated buffer is brought back to upright before anything else.

use crate::error::BufferError;
use crate::fill::interpolate;
use crate::pixel_buffer::PixelBuffer;

impl PixelBuffer {
    /// Bilinearly resample to `width` x `height`.
    ///
    /// Corner pixels map onto corner pixels: the sampling step is
    /// `(old - 1) / (new - 1)` on each axis, with the divisor kept at least 1.
    pub fn resize(&self, width: u32, height: u32) -> Result<PixelBuffer, BufferError> {
        let mut buffer = PixelBuffer::new(width, height)?;
        if width == 0 || height == 0 {
            return Ok(buffer);
        }

        let area = self.area();
        let scale_x = (area.width as f64 - 1.0) / width.saturating_sub(1).max(1) as f64;
        let scale_y = (area.height as f64 - 1.0) / height.saturating_sub(1).max(1) as f64;
        log::trace!(
            "resize {}x{} -> {}x{}",
            area.width,
            area.height,
            width,
            height
        );

        let source = self.argb32_data();
        for (y, row) in buffer
            .argb32_data_mut()
            .chunks_mut(width as usize)
            .enumerate()
        {
            let old_y = y as f64 * scale_y;
            for (x, pixel) in row.iter_mut().enumerate() {
                let old_x = x as f64 * scale_x;
                *pixel = interpolate(source, area.width, area.height, old_x, old_y);
            }
        }
        Ok(buffer)
    }

    /// Rotate by `theta_offset` radians about `(center_x, center_y)`.
    ///
    /// The result has the same size as the source. Destination pixels whose
    /// sample point falls outside the source are transparent.
    pub fn rotate(
        &self,
        center_x: i64,
        center_y: i64,
        theta_offset: f64,
    ) -> Result<PixelBuffer, BufferError> {
        let area = self.area();
        let (width, height) = (area.width, area.height);
        let mut buffer = PixelBuffer::new(width, height)?;
        if width == 0 || height == 0 {
            return Ok(buffer);
        }
        log::trace!(
            "rotate {}x{} by {} about ({}, {})",
            width,
            height,
            theta_offset,
            center_x,
            center_y
        );

        let (cx, cy) = (center_x as f64, center_y as f64);
        let d = (center_x
            .saturating_mul(center_x)
            .saturating_add(center_y.saturating_mul(center_y)) as f64)
            .sqrt();
        let theta = (-cy).atan2(-cx) - theta_offset;
        let mut start_x = cx + d * theta.cos();
        let mut start_y = cy + d * theta.sin();
        let step_x = (-theta_offset).cos();
        let step_y = (-theta_offset).sin();

        let (w, h) = (width as f64, height as f64);
        let source = self.argb32_data();
        for row in buffer.argb32_data_mut().chunks_mut(width as usize) {
            let mut old_x = start_x;
            let mut old_y = start_y;
            start_y += step_x;
            start_x -= step_y;

            for pixel in row.iter_mut() {
                *pixel = if old_x < 0.0 || old_x > w || old_y < 0.0 || old_y > h {
                    0
                } else {
                    interpolate(source, width, height, old_x, old_y)
                };
                old_x += step_x;
                old_y += step_y;
            }
        }
        Ok(buffer)
    }

    /// Repeat the source to fill `width` x `height`, without filtering.
    /// An empty source tiles to a transparent buffer.
    pub fn tile(&self, width: u32, height: u32) -> Result<PixelBuffer, BufferError> {
        let mut buffer = PixelBuffer::new(width, height)?;
        let area = self.area();
        if width == 0 || height == 0 || area.is_empty() {
            return Ok(buffer);
        }

        let old_width = area.width as usize;
        let old_height = area.height as usize;
        let source = self.argb32_data();
        for (y, row) in buffer
            .argb32_data_mut()
            .chunks_mut(width as usize)
            .enumerate()
        {
            let old_row = &source[(y % old_height) * old_width..][..old_width];
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = old_row[x % old_width];
            }
        }
        Ok(buffer)
    }

    /// Copy into an upright buffer showing the same image, undoing the
    /// device rotation. Device scale and the opacity hint carry over.
    pub fn rotate_upright(&self) -> Result<PixelBuffer, BufferError> {
        let area = self.area();
        let mut buffer = PixelBuffer::new(area.width, area.height)?;
        log::trace!(
            "rotate {:?} {}x{} buffer upright",
            self.device_rotation(),
            area.width,
            area.height
        );

        for y in 0..area.height as i32 {
            for x in 0..area.width as i32 {
                buffer.set_pixel(x, y, self.pixel(x, y));
            }
        }

        buffer.set_device_scale(self.device_scale());
        buffer.set_opaque(self.is_opaque());
        Ok(buffer)
    }
}
