//! Post-processing applied to every frame after the effect ran.

use crate::frame::PixelBuffer;
use crate::math8::percent8;

pub trait Filter {
    /// Apply the filter to a frame
    fn apply(&self, frame: &mut PixelBuffer);
}

/// Global strip brightness, configured in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessFilter {
    /// Scale factor (0-255 = 0.0-1.0)
    scale: u8,
}

impl BrightnessFilter {
    /// Brightness from a 0-100 percentage, values above 100 are clamped
    pub const fn from_percent(percent: u8) -> Self {
        Self {
            scale: percent8(percent),
        }
    }

    pub const fn scale(self) -> u8 {
        self.scale
    }
}

impl Default for BrightnessFilter {
    fn default() -> Self {
        Self::from_percent(100)
    }
}

impl Filter for BrightnessFilter {
    fn apply(&self, frame: &mut PixelBuffer) {
        frame.scale(self.scale);
    }
}
