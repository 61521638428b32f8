//! # splash-raster
//!
//! Software pixel-buffer compositing for boot splash screens, drawn straight
//! into a framebuffer with no GPU or windowing system behind it.
//!
//! A [`PixelBuffer`] owns premultiplied ARGB32 pixels together with:
//!
//! - a device scale (logical pixels vs device pixels)
//! - a device rotation for panels mounted sideways or upside down
//! - a stack of rectangular clip areas
//! - the [`Region`] of display pixels touched since the caller last looked
//!
//! ## Layout
//!
//! 1. **basics / color**: rectangles and ARGB32 word arithmetic
//! 2. **rotation / pixel_buffer**: storage, coordinate mapping, clipping
//! 3. **fill / composite**: solid, gradient and image fills, buffer blits
//! 4. **transform**: resize, rotate, tile, rotate-to-upright
//! 5. **panel**: buffer construction from display geometry
//!
//! The library logs through the `log` facade and never installs a logger.

pub mod basics;
pub mod color;
pub mod error;
pub mod region;
pub mod rotation;

pub mod fill;
pub mod pixel_buffer;

pub mod composite;
pub mod transform;

pub mod panel;

pub use basics::Rect;
pub use color::{blend, scale_opacity};
pub use error::BufferError;
pub use fill::interpolate;
pub use panel::{device_scale_for, PanelInfo, PanelOrientation, PanelProperties, ScaleConfig};
pub use pixel_buffer::PixelBuffer;
pub use region::Region;
pub use rotation::DeviceRotation;
