//! Solid colors, dithered gradients and ARGB32 blits.
//!
//! Every operation follows the same shape: take a logical fill area
//! (`None` means the whole buffer), crop it against the clip stack in
//! device pixels, write inside the cropped rectangle only, then record the
//! cropped rectangle as updated.

use crate::basics::Rect;
use crate::color;
use crate::pixel_buffer::PixelBuffer;
use crate::rotation::DeviceRotation;

// ============================================================================
// Gradient constants
// ============================================================================

// Channels are lined up so their lowest NOISE_BITS overlap the top of a
// 24-bit noise word, with the remaining noise bits acting as fraction.
const NOISE_BITS: u32 = 1;
const RED_SHIFT: u32 = 32 - (24 + NOISE_BITS);
const GREEN_SHIFT: u32 = RED_SHIFT + 8;
const BLUE_SHIFT: u32 = GREEN_SHIFT + 8;
const NOISE_MASK: u32 = 0x00ff_ffff;
const COLOR_MASK: u32 = 0xff << (24 - NOISE_BITS);

/// Fixed seed, so repainting the same area reproduces the same dither.
const NOISE_SEED: u32 = 0x0010_0001;

const UNROLLED_PIXEL_COUNT: usize = 8;

#[inline]
fn randomize(noise: &mut u32) -> u32 {
    *noise = (*noise + (*noise << 1)) & NOISE_MASK;
    *noise
}

/// Interpolated channel values in fixed point, stepped once per row.
struct GradientStops {
    red: u32,
    green: u32,
    blue: u32,
    red_step: u32,
    green_step: u32,
    blue_step: u32,
}

impl GradientStops {
    fn new(start: u32, end: u32, rows: u32) -> Self {
        let step = |from: u32, to: u32| -> u32 {
            (to.wrapping_sub(from) as i32 / rows.min(i32::MAX as u32) as i32) as u32
        };

        let red = (start << RED_SHIFT) & COLOR_MASK;
        let green = (start << GREEN_SHIFT) & COLOR_MASK;
        let blue = (start << BLUE_SHIFT) & COLOR_MASK;

        Self {
            red,
            green,
            blue,
            red_step: step(red, (end << RED_SHIFT) & COLOR_MASK),
            green_step: step(green, (end << GREEN_SHIFT) & COLOR_MASK),
            blue_step: step(blue, (end << BLUE_SHIFT) & COLOR_MASK),
        }
    }

    /// Produce one dithered opaque pixel, advancing the noise three times.
    #[inline]
    fn shade(&self, noise: &mut u32) -> u32 {
        let mut pixel = color::ALPHA_MASK;
        pixel |= (self.red.wrapping_add(randomize(noise)) & COLOR_MASK) >> RED_SHIFT;
        pixel |= (self.green.wrapping_add(randomize(noise)) & COLOR_MASK) >> GREEN_SHIFT;
        pixel |= (self.blue.wrapping_add(randomize(noise)) & COLOR_MASK) >> BLUE_SHIFT;
        pixel
    }

    #[inline]
    fn advance(&mut self) {
        self.red = self.red.wrapping_add(self.red_step);
        self.green = self.green.wrapping_add(self.green_step);
        self.blue = self.blue.wrapping_add(self.blue_step);
    }
}

// ============================================================================
// Bilinear sampling
// ============================================================================

/// Bilinearly sample a `width` x `height` row-major ARGB32 array at `(x, y)`.
///
/// The 2x2 neighborhood starts at `(floor(x), floor(y))`. Neighbors past
/// the right or bottom edge repeat the last column or row; negative
/// coordinates and indices missing from `data` read as transparent.
pub fn interpolate(data: &[u32], width: u32, height: u32, x: f64, y: f64) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }

    let floor_x = x.floor();
    let floor_y = y.floor();
    let ix = floor_x as i64;
    let iy = floor_y as i64;
    let (w, h) = (width as i64, height as i64);

    let sample = |ox: i64, oy: i64| -> u32 {
        let sx = ix.saturating_add(ox).min(w - 1);
        let sy = iy.saturating_add(oy).min(h - 1);
        if sx < 0 || sy < 0 {
            return 0;
        }
        data.get((sy * w + sx) as usize).copied().unwrap_or(0)
    };

    let p00 = sample(0, 0);
    let p01 = sample(1, 0);
    let p10 = sample(0, 1);
    let p11 = sample(1, 1);
    if p00 == 0 && p01 == 0 && p10 == 0 && p11 == 0 {
        return 0;
    }

    let fx = x - floor_x;
    let fy = y - floor_y;
    let mut reply = 0u32;
    for shift in [0u32, 8, 16, 24] {
        let mask = 0xffu32 << shift;
        // Accumulated in f64 and truncated back after every term.
        let mut value = 0u32;
        value = (value as f64 + (p00 & mask) as f64 * (1.0 - fx) * (1.0 - fy)) as u32;
        value = (value as f64 + (p01 & mask) as f64 * fx * (1.0 - fy)) as u32;
        value = (value as f64 + (p10 & mask) as f64 * (1.0 - fx) * fy) as u32;
        value = (value as f64 + (p11 & mask) as f64 * fx * fy) as u32;
        reply |= value & mask;
    }
    reply
}

/// Read `data` at a flat offset computed the way a row-major blit source
/// is addressed. Anything outside the slice is transparent.
#[inline]
fn source_pixel(data: &[u32], stride: u32, x: i64, y: i64) -> u32 {
    let index = stride as i64 * y + x;
    if index < 0 {
        return 0;
    }
    data.get(index as usize).copied().unwrap_or(0)
}

// ============================================================================
// PixelBuffer fill operations
// ============================================================================

impl PixelBuffer {
    /// Fill `fill_area` (logical pixels, `None` for everything) with a
    /// premultiplied pixel value, compositing it over existing content.
    ///
    /// Filling the whole device area with an opaque value marks the buffer
    /// opaque.
    pub fn fill_with_pixel(&mut self, fill_area: Option<&Rect>, pixel_value: u32) {
        let fill_area = fill_area.copied().unwrap_or_else(|| self.size());
        let cropped = self.crop_area_to_clip_area(&fill_area);

        if cropped == self.area() && color::is_opaque(pixel_value) {
            self.set_opaque(true);
        }

        for_each_pixel(&cropped, |x, y| self.blend_pixel(x, y, pixel_value));

        self.add_updated_area(&cropped);
    }

    /// Fill with straight (non-premultiplied) `[0, 1]` color channels.
    pub fn fill_with_color(
        &mut self,
        fill_area: Option<&Rect>,
        red: f64,
        green: f64,
        blue: f64,
        alpha: f64,
    ) {
        let pixel_value = color::straight_color_to_pixel_value(red, green, blue, alpha);
        self.fill_with_pixel(fill_area, pixel_value);
    }

    /// Fill with a `0xRRGGBBAA` (or `0xRRGGBB`) hex color.
    pub fn fill_with_hex_color(&mut self, fill_area: Option<&Rect>, hex_color: u32) {
        self.fill_with_hex_color_at_opacity(fill_area, hex_color, 1.0);
    }

    /// Fill with a hex color whose alpha is further multiplied by `opacity`.
    pub fn fill_with_hex_color_at_opacity(
        &mut self,
        fill_area: Option<&Rect>,
        hex_color: u32,
        opacity: f64,
    ) {
        let pixel_value = color::hex_color_to_pixel_value(hex_color, opacity);
        self.fill_with_pixel(fill_area, pixel_value);
    }

    /// Fill with a vertical gradient from `start` (top row of the buffer)
    /// to `end` (bottom row), dithered to hide banding.
    ///
    /// The gradient always spans the whole device height; `fill_area` only
    /// selects which part of it is painted. Pixels are written opaque,
    /// replacing existing content. The dither is deterministic: repeated
    /// fills of the same area produce identical pixels.
    pub fn fill_with_gradient(&mut self, fill_area: Option<&Rect>, start: u32, end: u32) {
        let fill_area = fill_area.copied().unwrap_or_else(|| self.size());
        let cropped = self.crop_area_to_clip_area(&fill_area);
        let area = self.area();
        if area.height == 0 {
            return;
        }

        let mut stops = GradientStops::new(start, end, area.height);
        let mut noise = NOISE_SEED;
        let batched = cropped.width as usize >= UNROLLED_PIXEL_COUNT
            && self.device_rotation() == DeviceRotation::Upright;

        for y in 0..area.height as i32 {
            if y >= cropped.y && (y as i64) < cropped.bottom() {
                if batched {
                    let mut shaded_set = [0u32; UNROLLED_PIXEL_COUNT];
                    for shaded in shaded_set.iter_mut() {
                        *shaded = stops.shade(&mut noise);
                    }

                    let offset = y as usize * area.width as usize + cropped.x as usize;
                    let row = &mut self.argb32_data_mut()[offset..offset + cropped.width as usize];
                    for chunk in row.chunks_mut(UNROLLED_PIXEL_COUNT) {
                        chunk.copy_from_slice(&shaded_set[..chunk.len()]);
                    }
                } else {
                    for x in cropped.x..(cropped.right() as i32) {
                        let pixel = stops.shade(&mut noise);
                        self.set_pixel(x, y, pixel);
                    }
                }
            }
            stops.advance();
        }

        self.add_updated_area(&cropped);
    }

    /// Blit a row-major ARGB32 image covering `fill_area`.
    ///
    /// Shorthand for [`fill_with_argb32_data_scaled`] at full opacity,
    /// without an extra clip and at scale 1.
    ///
    /// [`fill_with_argb32_data_scaled`]: PixelBuffer::fill_with_argb32_data_scaled
    pub fn fill_with_argb32_data(&mut self, fill_area: Option<&Rect>, data: &[u32]) {
        self.fill_with_argb32_data_scaled(fill_area, None, data, 1.0, 1);
    }

    /// Blit at scale 1 and `opacity`.
    pub fn fill_with_argb32_data_at_opacity(
        &mut self,
        fill_area: Option<&Rect>,
        data: &[u32],
        opacity: f64,
    ) {
        self.fill_with_argb32_data_scaled(fill_area, None, data, opacity, 1);
    }

    /// Blit at scale 1 and full opacity, restricted to `clip_area`.
    pub fn fill_with_argb32_data_with_clip(
        &mut self,
        fill_area: Option<&Rect>,
        clip_area: Option<&Rect>,
        data: &[u32],
    ) {
        self.fill_with_argb32_data_scaled(fill_area, clip_area, data, 1.0, 1);
    }

    pub fn fill_with_argb32_data_at_opacity_with_clip(
        &mut self,
        fill_area: Option<&Rect>,
        clip_area: Option<&Rect>,
        data: &[u32],
        opacity: f64,
    ) {
        self.fill_with_argb32_data_scaled(fill_area, clip_area, data, opacity, 1);
    }

    /// Blit a row-major ARGB32 image whose pixels are at `scale`.
    ///
    /// `fill_area` and `clip_area` are in the image's own pixels (so in
    /// logical pixels times `scale`); `fill_area.width` is the row stride
    /// of `data`. When `scale` differs from the device scale, samples are
    /// bilinearly interpolated. Fully transparent samples are skipped; all
    /// others are scaled by `opacity` and composited.
    pub fn fill_with_argb32_data_scaled(
        &mut self,
        fill_area: Option<&Rect>,
        clip_area: Option<&Rect>,
        data: &[u32],
        opacity: f64,
        scale: u32,
    ) {
        let scale = scale.max(1);
        let device_scale = self.device_scale();

        let (fill_area, logical_fill_area) = match fill_area {
            Some(area) => (*area, area.downscale(scale)),
            None => (self.size(), self.size()),
        };

        let mut cropped = self.crop_area_to_clip_area(&logical_fill_area);
        if let Some(clip_area) = clip_area {
            let device_clip_area = clip_area.downscale(scale).upscale(device_scale);
            cropped = cropped.intersect(&device_clip_area);
        }

        if cropped.is_empty() {
            return;
        }

        let opacity_as_byte = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let scale_factor = scale as f64 / device_scale as f64;

        for_each_pixel(&cropped, |column, row| {
            let pixel_value = if device_scale == scale {
                source_pixel(
                    data,
                    fill_area.width,
                    column as i64 - fill_area.x as i64,
                    row as i64 - fill_area.y as i64,
                )
            } else {
                interpolate(
                    data,
                    fill_area.width,
                    fill_area.height,
                    scale_factor * column as f64 - fill_area.x as f64,
                    scale_factor * row as f64 - fill_area.y as f64,
                )
            };

            if color::is_transparent(pixel_value) {
                return;
            }

            let pixel_value = color::scale_opacity(pixel_value, opacity_as_byte);
            self.blend_pixel(column, row, pixel_value);
        });

        self.add_updated_area(&cropped);
    }
}

/// Visit every device pixel of `rect`, row by row.
#[inline]
fn for_each_pixel(rect: &Rect, mut f: impl FnMut(i32, i32)) {
    for y in rect.y..rect.bottom() as i32 {
        for x in rect.x..rect.right() as i32 {
            f(x, y);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
