//! Fade effect
//!
//! The whole strip shows one color that eases from one gradient stop to the
//! next. Speed controls how far the blend moves per tick.

use super::{Effect, EffectContext, MAX_SPEED, roll_steps};
use crate::{
    color::blend_colors,
    error::Result,
    frame::PixelBuffer,
    geometry::Geometry,
    math8::ease_in_out_quad,
    settings::{Schema, SettingKind},
};

/// Blend progress added per tick at full speed (out of 256)
const MAX_FADE_RATE: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct FadeEffect {
    buffer: PixelBuffer,
    /// Index of the stop the blend starts from
    stop: usize,
    /// Blend progress towards the following stop, `0..256`
    progress: usize,
}

impl FadeEffect {
    fn following(&self, len: usize, reverse: bool) -> usize {
        if reverse {
            (self.stop + len - 1) % len
        } else {
            (self.stop + 1) % len
        }
    }
}

impl Effect for FadeEffect {
    const SCHEMA: Schema = Schema::new(&[
        ("gradient", SettingKind::Gradient),
        ("speed", SettingKind::Int { min: 0, max: MAX_SPEED }),
        ("reverse", SettingKind::Bool),
    ]);

    fn initialize(&mut self, geometry: Geometry) {
        self.buffer = PixelBuffer::zeroed(geometry.led_count);
        self.stop = 0;
        self.progress = 0;
    }

    #[allow(clippy::cast_possible_truncation)]
    fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        let gradient = ctx
            .palette
            .gradient_or_fallback(ctx.settings.text("gradient")?);
        let reverse = ctx.settings.bool("reverse")?;
        let rate = roll_steps(ctx.settings.int("speed")?, MAX_FADE_RATE);

        let len = gradient.len();
        self.stop %= len;
        self.progress += rate;
        while self.progress >= 256 {
            self.progress -= 256;
            self.stop = self.following(len, reverse);
        }

        let from = gradient.stop(self.stop);
        let to = gradient.stop(self.following(len, reverse));
        let color = blend_colors(from, to, ease_in_out_quad(self.progress as u8));
        self.buffer.fill(color);

        Ok(self.buffer.clone())
    }
}
