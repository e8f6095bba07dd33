use super::{Effect, EffectContext};
use crate::{error::Result, frame::PixelBuffer, geometry::Geometry, settings::Schema};

/// Keeps every LED dark
#[derive(Debug, Clone, Default)]
pub struct OffEffect {
    led_count: usize,
}

impl Effect for OffEffect {
    const SCHEMA: Schema = Schema::new(&[]);

    fn initialize(&mut self, geometry: Geometry) {
        self.led_count = geometry.led_count;
    }

    fn advance(&mut self, _ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        Ok(PixelBuffer::zeroed(self.led_count))
    }
}
