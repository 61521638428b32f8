//! Where a buffer's size, rotation and scale come from.
//!
//! The engine never queries hardware itself. Whatever knows about the
//! display (a KMS backend, firmware framebuffer info, a test) implements
//! [`PanelProperties`], and [`PixelBuffer::for_panel`] turns that into a
//! correctly rotated and scaled buffer.

use crate::error::BufferError;
use crate::pixel_buffer::PixelBuffer;
use crate::rotation::DeviceRotation;

/// Environment variable forcing a device scale, bypassing detection.
pub const FORCE_SCALE_ENV: &str = "SPLASH_FORCE_SCALE";

/// Minimum density (dots per inch, both axes) that selects scale 2.
const HIDPI_LIMIT: f64 = 192.0;
/// Panels shorter than this are never scaled.
const HIDPI_MIN_HEIGHT: u32 = 1200;

// ============================================================================
// Orientation
// ============================================================================

/// Physical mounting of a panel, as reported by its connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PanelOrientation {
    #[default]
    Normal,
    UpsideDown,
    LeftSideUp,
    RightSideUp,
}

impl PanelOrientation {
    /// Parse a connector "panel orientation" property value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Normal" => Some(PanelOrientation::Normal),
            "Upside Down" => Some(PanelOrientation::UpsideDown),
            "Left Side Up" => Some(PanelOrientation::LeftSideUp),
            "Right Side Up" => Some(PanelOrientation::RightSideUp),
            _ => None,
        }
    }

    /// The device rotation that corrects for this mounting.
    pub fn device_rotation(self) -> DeviceRotation {
        match self {
            PanelOrientation::Normal => DeviceRotation::Upright,
            PanelOrientation::UpsideDown => DeviceRotation::UpsideDown,
            PanelOrientation::LeftSideUp => DeviceRotation::CounterClockwise,
            PanelOrientation::RightSideUp => DeviceRotation::Clockwise,
        }
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Geometry of the display a buffer is created for.
///
/// Width and height are in native (scanout) pixels; the physical size is in
/// millimetres and may be zero when unknown.
pub trait PanelProperties {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn width_mm(&self) -> u32;
    fn height_mm(&self) -> u32;

    fn orientation(&self) -> PanelOrientation {
        PanelOrientation::Normal
    }
}

/// Plain panel description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelInfo {
    pub width: u32,
    pub height: u32,
    pub width_mm: u32,
    pub height_mm: u32,
    pub orientation: PanelOrientation,
}

impl PanelInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_physical_size(mut self, width_mm: u32, height_mm: u32) -> Self {
        self.width_mm = width_mm;
        self.height_mm = height_mm;
        self
    }

    pub fn with_orientation(mut self, orientation: PanelOrientation) -> Self {
        self.orientation = orientation;
        self
    }
}

impl PanelProperties for PanelInfo {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn width_mm(&self) -> u32 {
        self.width_mm
    }
    fn height_mm(&self) -> u32 {
        self.height_mm
    }
    fn orientation(&self) -> PanelOrientation {
        self.orientation
    }
}

// ============================================================================
// Scale selection
// ============================================================================

/// User-level override for device scale detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScaleConfig {
    pub forced_scale: Option<u32>,
}

impl ScaleConfig {
    /// Read [`FORCE_SCALE_ENV`]. Missing, unparsable or zero values leave
    /// detection enabled.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(FORCE_SCALE_ENV).ok().as_deref())
    }

    /// Parse an override value (decimal, or hex with a `0x` prefix).
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };
        let raw = raw.trim();
        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => raw.parse::<u32>(),
        };
        match parsed {
            Ok(scale) if scale > 0 => {
                log::debug!("device scale forced to {}", scale);
                Self {
                    forced_scale: Some(scale),
                }
            }
            _ => {
                log::warn!("ignoring invalid {} value {:?}", FORCE_SCALE_ENV, raw);
                Self::default()
            }
        }
    }
}

/// Pick the device scale for `panel`.
///
/// A forced scale always wins. Otherwise only tall panels whose reported
/// physical size gives more than 192 dpi on both axes get scale 2. Sizes
/// that are really an aspect ratio (16:9 or 16:10 written as millimetres)
/// are not trusted.
pub fn device_scale_for(panel: &impl PanelProperties, config: &ScaleConfig) -> u32 {
    if let Some(scale) = config.forced_scale {
        return scale;
    }

    if panel.height() < HIDPI_MIN_HEIGHT {
        return 1;
    }

    let (width_mm, height_mm) = (panel.width_mm(), panel.height_mm());
    if matches!(
        (width_mm, height_mm),
        (160, 90) | (160, 100) | (16, 9) | (16, 10)
    ) {
        return 1;
    }

    if width_mm > 0 && height_mm > 0 {
        let dpi_x = panel.width() as f64 / (width_mm as f64 / 25.4);
        let dpi_y = panel.height() as f64 / (height_mm as f64 / 25.4);
        if dpi_x > HIDPI_LIMIT && dpi_y > HIDPI_LIMIT {
            return 2;
        }
    }

    1
}

impl PixelBuffer {
    /// Create a transparent buffer covering `panel`, rotated for its
    /// mounting and scaled for its density.
    pub fn for_panel(
        panel: &impl PanelProperties,
        config: &ScaleConfig,
    ) -> Result<PixelBuffer, BufferError> {
        let rotation = panel.orientation().device_rotation();
        let scale = device_scale_for(panel, config);
        log::debug!(
            "panel {}x{} ({}x{} mm): rotation {:?}, scale {}",
            panel.width(),
            panel.height(),
            panel.width_mm(),
            panel.height_mm(),
            rotation,
            scale
        );

        let mut buffer = PixelBuffer::with_device_rotation(panel.width(), panel.height(), rotation)?;
        buffer.set_device_scale(scale);
        Ok(buffer)
    }
}
