//! Single color fill effect
//!
//! Fills all LEDs with the configured color.

use super::{Effect, EffectContext};
use crate::{
    error::Result,
    frame::PixelBuffer,
    geometry::Geometry,
    settings::{Schema, SettingKind},
};

/// Single color effect - fills all LEDs with one color
#[derive(Debug, Clone, Default)]
pub struct SingleEffect {
    buffer: PixelBuffer,
}

impl Effect for SingleEffect {
    const SCHEMA: Schema = Schema::new(&[("color", SettingKind::Color)]);

    fn initialize(&mut self, geometry: Geometry) {
        self.buffer = PixelBuffer::zeroed(geometry.led_count);
    }

    fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        let color = ctx.palette.color_or_fallback(ctx.settings.text("color")?);
        self.buffer.fill(color);
        Ok(self.buffer.clone())
    }
}
