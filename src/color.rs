//! ARGB32 pixel values and blending.
//!
//! Pixels are `u32` words with alpha in the top byte, then red, green and
//! blue. Color channels are always stored premultiplied by alpha.
//!
//! Everything here is a pure function on pixel words; all channel math is
//! integer-only and rounds through [`div255`].

use crate::basics::div255;

pub const ALPHA_MASK: u32 = 0xff00_0000;

// ============================================================================
// Channel access
// ============================================================================

#[inline]
pub fn alpha(pixel: u32) -> u32 {
    pixel >> 24
}

#[inline]
pub fn red(pixel: u32) -> u32 {
    (pixel >> 16) & 0xff
}

#[inline]
pub fn green(pixel: u32) -> u32 {
    (pixel >> 8) & 0xff
}

#[inline]
pub fn blue(pixel: u32) -> u32 {
    pixel & 0xff
}

/// Pack four channels (each expected in `0..=255`) into an ARGB32 word.
#[inline]
pub fn pack_argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
    (a << 24) | (r << 16) | (g << 8) | b
}

#[inline]
pub fn is_opaque(pixel: u32) -> bool {
    pixel & ALPHA_MASK == ALPHA_MASK
}

#[inline]
pub fn is_transparent(pixel: u32) -> bool {
    pixel & ALPHA_MASK == 0
}

// ============================================================================
// Compositing
// ============================================================================

/// Composite `over` onto `under` (premultiplied source-over).
///
/// An opaque `under` takes the short form, which only computes the three
/// color channels and yields an opaque result. Any other `under` computes
/// all four channels and clamps them to 255. Both forms agree whenever
/// `under` is opaque.
#[inline]
pub fn blend(over: u32, under: u32) -> u32 {
    let a_over = alpha(over);
    let inv = 255 - a_over;

    if is_opaque(under) {
        let r = div255(red(over) * 255 + red(under) * inv).min(0xff);
        let g = div255(green(over) * 255 + green(under) * inv).min(0xff);
        let b = div255(blue(over) * 255 + blue(under) * inv).min(0xff);
        return pack_argb(0xff, r, g, b);
    }

    let a = div255(a_over * 255 + alpha(under) * inv).min(0xff);
    let r = div255(red(over) * 255 + red(under) * inv).min(0xff);
    let g = div255(green(over) * 255 + green(under) * inv).min(0xff);
    let b = div255(blue(over) * 255 + blue(under) * inv).min(0xff);
    pack_argb(a, r, g, b)
}

/// Multiply every channel, alpha included, by `opacity / 255`.
#[inline]
pub fn scale_opacity(pixel: u32, opacity: u8) -> u32 {
    if opacity == 255 {
        return pixel;
    }
    let o = opacity as u32;
    pack_argb(
        div255(alpha(pixel) * o) & 0xff,
        div255(red(pixel) * o) & 0xff,
        div255(green(pixel) * o) & 0xff,
        div255(blue(pixel) * o) & 0xff,
    )
}

// ============================================================================
// Conversions into pixel values
// ============================================================================

#[inline]
fn channel_to_byte(v: f64) -> u32 {
    // NaN clamps to zero through the `as` cast.
    (v * 255.0).clamp(0.0, 255.0) as u8 as u32
}

/// Pack already-premultiplied `[0, 1]` channels into a pixel value.
/// Out-of-range channels are clamped.
pub fn color_to_pixel_value(r: f64, g: f64, b: f64, a: f64) -> u32 {
    pack_argb(
        channel_to_byte(a),
        channel_to_byte(r),
        channel_to_byte(g),
        channel_to_byte(b),
    )
}

/// Convert straight (non-premultiplied) `[0, 1]` channels into a
/// premultiplied pixel value.
pub fn straight_color_to_pixel_value(r: f64, g: f64, b: f64, a: f64) -> u32 {
    color_to_pixel_value(r * a, g * a, b * a, a)
}

/// Convert a `0xRRGGBBAA` hex color into a premultiplied pixel value,
/// with its alpha multiplied by `opacity`.
///
/// A value whose top byte is zero is read as `0xRRGGBB` with full alpha.
pub fn hex_color_to_pixel_value(hex_color: u32, opacity: f64) -> u32 {
    let hex = if hex_color & 0xff00_0000 == 0 {
        (hex_color << 8) | 0xff
    } else {
        hex_color
    };

    let r = ((hex >> 24) & 0xff) as f64 / 255.0;
    let g = ((hex >> 16) & 0xff) as f64 / 255.0;
    let b = ((hex >> 8) & 0xff) as f64 / 255.0;
    let a = (hex & 0xff) as f64 / 255.0 * opacity;

    straight_color_to_pixel_value(r, g, b, a)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_access() {
        let p = 0x80402010;
        assert_eq!(alpha(p), 0x80);
        assert_eq!(red(p), 0x40);
        assert_eq!(green(p), 0x20);
        assert_eq!(blue(p), 0x10);
        assert_eq!(pack_argb(0x80, 0x40, 0x20, 0x10), p);
    }

    #[test]
    fn test_blend_opaque_over_anything() {
        assert_eq!(blend(0xff112233, 0xff445566), 0xff112233);
        assert_eq!(blend(0xff112233, 0x00000000), 0xff112233);
    }

    #[test]
    fn test_blend_transparent_over_keeps_under() {
        assert_eq!(blend(0x00000000, 0xff445566), 0xff445566);
        assert_eq!(blend(0x00000000, 0x80404040), 0x80404040);
    }

    #[test]
    fn test_blend_half_red_over_opaque_green() {
        // 50% red (premultiplied 0x80) over opaque green.
        let out = blend(0x80800000, 0xff00ff00);
        assert_eq!(alpha(out), 0xff);
        assert_eq!(red(out), 0x80);
        assert_eq!(green(out), div255(255 * 127));
        assert_eq!(blue(out), 0);
    }

    #[test]
    fn test_blend_translucent_under() {
        let out = blend(0x80800000, 0x80008000);
        assert_eq!(alpha(out), div255(0x80 * 255 + 0x80 * 127));
        assert_eq!(red(out), 0x80);
        assert_eq!(green(out), div255(0x80 * 127));
        assert_eq!(blue(out), 0);
    }

    #[test]
    fn test_blend_clamps_invalid_premultiplied() {
        // Color channels larger than alpha are not valid premultiplied
        // values; the general branch clamps rather than overflowing.
        let out = blend(0x10ffffff, 0x80ffffff);
        assert_eq!(red(out), 0xff);
        assert_eq!(green(out), 0xff);
        assert_eq!(blue(out), 0xff);
    }

    #[test]
    fn test_blend_clamps_over_opaque_under() {
        // Same overflow as above, but through the opaque-under form. It
        // must saturate like a nearly opaque under does, not wrap.
        assert_eq!(blend(0x10ffffff, 0xffffffff), 0xffffffff);
        assert_eq!(blend(0x10ffffff, 0xfeffffff), 0xfeffffff);
        assert_eq!(blend(0x01ff0000, 0xff808080), 0xffff7f7f);
    }

    #[test]
    fn test_scale_opacity_identity() {
        for p in [0u32, 0xffffffff, 0x80402010, 0x12345678] {
            assert_eq!(scale_opacity(p, 255), p);
        }
    }

    #[test]
    fn test_scale_opacity_zero_and_half() {
        assert_eq!(scale_opacity(0xffffffff, 0), 0);
        assert_eq!(scale_opacity(0xff804020, 128), 0x80402010);
    }

    #[test]
    fn test_color_to_pixel_value_clamps() {
        assert_eq!(color_to_pixel_value(1.0, 0.0, 0.0, 1.0), 0xffff0000);
        assert_eq!(color_to_pixel_value(2.0, -1.0, 0.5, 1.0), 0xffff007f);
        assert_eq!(color_to_pixel_value(f64::NAN, 0.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_straight_color_premultiplies() {
        assert_eq!(straight_color_to_pixel_value(1.0, 1.0, 1.0, 0.5), 0x7f7f7f7f);
    }

    #[test]
    fn test_hex_color_rgb_only() {
        assert_eq!(hex_color_to_pixel_value(0x00ff00, 1.0), 0xff00ff00);
        assert_eq!(hex_color_to_pixel_value(0x000000, 1.0), 0xff000000);
    }

    #[test]
    fn test_hex_color_rgba_and_opacity() {
        assert_eq!(hex_color_to_pixel_value(0xff0000ff, 1.0), 0xffff0000);
        assert_eq!(hex_color_to_pixel_value(0xff0000ff, 0.0), 0);
        assert_eq!(hex_color_to_pixel_value(0xffffffff, 0.5), 0x7f7f7f7f);
    }
}
