//! Rolling gradient effect
//!
//! Stretches the selected gradient over the whole strip once and then rolls
//! it by the speed-derived number of steps every tick.

use super::{Effect, EffectContext, MAX_SPEED};
use crate::{
    error::Result,
    frame::PixelBuffer,
    geometry::Geometry,
    settings::{Schema, SettingKind},
};

#[derive(Debug, Clone, Default)]
pub struct GradientEffect {
    geometry: Geometry,
    buffer: PixelBuffer,
    /// Gradient id the buffer was filled with
    filled_with: Option<String>,
}

impl Effect for GradientEffect {
    const SCHEMA: Schema = Schema::new(&[
        ("gradient", SettingKind::Gradient),
        ("speed", SettingKind::Int { min: 0, max: MAX_SPEED }),
        ("reverse", SettingKind::Bool),
        ("mirror", SettingKind::Bool),
    ]);

    fn initialize(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.buffer = PixelBuffer::zeroed(geometry.led_count);
        self.filled_with = None;
    }

    fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        let gradient_id = ctx.settings.text("gradient")?;
        let reverse = ctx.settings.bool("reverse")?;
        let mirror = ctx.settings.bool("mirror")?;
        let steps = ctx.roll_steps()?;

        if self.filled_with.as_deref() != Some(gradient_id) {
            let gradient = ctx.palette.gradient_or_fallback(gradient_id);
            gradient.fill(self.buffer.pixels_mut());
            self.filled_with = Some(gradient_id.to_owned());
        }

        self.buffer.roll(steps, reverse);

        if mirror {
            return Ok(self.buffer.mirror_window(self.geometry.led_mid));
        }
        Ok(self.buffer.clone())
    }
}
