//! Rods effect
//!
//! Spawns colored segments at the leading edge of the strip and rolls them
//! along it. The buffer is shifted before painting, so a freshly painted
//! segment stays in place for the tick it was painted in and previously
//! painted rods travel down the strip.

use super::{Effect, EffectContext, MAX_SPEED};
use crate::{
    color::Rgb,
    error::Result,
    frame::PixelBuffer,
    geometry::Geometry,
    settings::{Schema, SettingKind},
};

/// Largest accepted `rods_length` / `rods_distance`
const MAX_ROD_TICKS: i64 = 1_000;

#[derive(Debug, Clone, Default)]
pub struct RodsEffect {
    geometry: Geometry,
    /// Previous frame, always `led_count` wide
    buffer: PixelBuffer,
    ticks_since_last_rod: usize,
    /// Color of the rod being painted, `None` until the first rod
    current_color: Option<Rgb>,
    /// Gradient stop of the last picked color, `None` before the first pick
    color_index: Option<usize>,
}

/// Rods settings read on every tick
struct RodsSettings<'a> {
    color: &'a str,
    gradient: &'a str,
    change_color: bool,
    reverse: bool,
    mirror: bool,
    steps: usize,
    rods_length: usize,
    rods_distance: usize,
}

impl<'a> RodsSettings<'a> {
    fn read(ctx: &EffectContext<'a>) -> Result<Self> {
        let settings = ctx.settings;
        Ok(Self {
            color: settings.text("color")?,
            gradient: settings.text("gradient")?,
            change_color: settings.bool("change_color")?,
            reverse: settings.bool("reverse")?,
            mirror: settings.bool("mirror")?,
            steps: ctx.roll_steps()?,
            rods_length: settings.count("rods_length")?,
            rods_distance: settings.count("rods_distance")?,
        })
    }
}

impl RodsEffect {
    /// Pick the color of the next rod
    fn next_color(&mut self, ctx: &EffectContext<'_>, settings: &RodsSettings<'_>) -> Rgb {
        if !settings.change_color {
            return ctx.palette.color_or_fallback(settings.color);
        }

        let gradient = ctx.palette.gradient_or_fallback(settings.gradient);
        let index = match self.color_index {
            Some(index) => gradient.next_index(index),
            None => 0,
        };
        self.color_index = Some(index);
        gradient.stop(index)
    }

    /// Gradient stop of the last picked rod color, `None` before the first pick
    pub fn color_index(&self) -> Option<usize> {
        self.color_index
    }
}

impl Effect for RodsEffect {
    const SCHEMA: Schema = Schema::new(&[
        ("color", SettingKind::Color),
        ("gradient", SettingKind::Gradient),
        ("change_color", SettingKind::Bool),
        ("speed", SettingKind::Int { min: 0, max: MAX_SPEED }),
        ("reverse", SettingKind::Bool),
        ("mirror", SettingKind::Bool),
        ("rods_length", SettingKind::Int { min: 0, max: MAX_ROD_TICKS }),
        ("rods_distance", SettingKind::Int { min: 0, max: MAX_ROD_TICKS }),
    ]);

    fn initialize(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.buffer = PixelBuffer::zeroed(geometry.led_count);
        self.ticks_since_last_rod = 0;
        self.current_color = None;
        self.color_index = None;
    }

    fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        let settings = RodsSettings::read(ctx)?;
        let steps = settings.steps.min(self.geometry.led_count);

        self.ticks_since_last_rod += 1;

        let vacated = self.buffer.vacated(steps, settings.reverse);

        self.buffer.roll(steps, settings.reverse);
        self.buffer.clear_range(vacated.clone());

        let spawn = self
            .ticks_since_last_rod
            .checked_sub(settings.rods_length)
            .is_some_and(|elapsed| elapsed > settings.rods_distance);
        if spawn {
            self.ticks_since_last_rod = 0;
            self.current_color = Some(self.next_color(ctx, &settings));
        } else if self.current_color.is_none() {
            // The first rod starts right away, keeping the tick counter.
            self.current_color = Some(self.next_color(ctx, &settings));
        }

        if self.ticks_since_last_rod <= settings.rods_length {
            if let Some(color) = self.current_color {
                self.buffer.fill_range(vacated, color);
            }
        }

        if settings.mirror {
            return Ok(self.buffer.mirror_window(self.geometry.led_mid));
        }
        Ok(self.buffer.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::color::Palette;
    use crate::settings::Settings;

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };

    fn palette() -> Palette {
        let colors = BTreeMap::from([
            ("red".to_owned(), [255, 0, 0]),
            ("blue".to_owned(), [0, 0, 255]),
        ]);
        let gradients = BTreeMap::from([(
            "tricolor".to_owned(),
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]],
        )]);
        Palette::from_tables(&colors, &gradients)
    }

    fn settings() -> Settings {
        Settings::new()
            .with("color", "red")
            .with("gradient", "tricolor")
            .with("change_color", false)
            .with("speed", 20)
            .with("reverse", false)
            .with("mirror", false)
            .with("rods_length", 2)
            .with("rods_distance", 0)
    }

    fn rods(led_count: usize) -> RodsEffect {
        let mut effect = RodsEffect::default();
        effect.initialize(Geometry::new(led_count, led_count / 2));
        effect
    }

    #[test]
    fn test_shift_clears_trailing_edge() {
        let palette = palette();
        let settings = settings()
            .with("rods_length", 0)
            .with("rods_distance", 100);
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        effect.buffer.fill(BLUE);

        let frame = effect.advance(&ctx).unwrap();
        let black = Rgb::default();
        assert_eq!(&frame.pixels()[..2], &[black, black]);
        assert!(frame.pixels()[2..].iter().all(|p| *p == BLUE));
    }

    #[test]
    fn test_reverse_shift_clears_leading_edge() {
        let palette = palette();
        let settings = settings()
            .with("reverse", true)
            .with("rods_length", 0)
            .with("rods_distance", 100);
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        effect.buffer.fill_range(0..1, RED);
        effect.buffer.fill_range(9..10, BLUE);

        let frame = effect.advance(&ctx).unwrap();
        // pixel 9 moved to 7, pixel 0 wrapped into the cleared tail
        assert_eq!(frame.pixels()[7], BLUE);
        assert_eq!(frame.pixels()[8], Rgb::default());
        assert_eq!(frame.pixels()[9], Rgb::default());
    }

    #[test]
    fn test_rod_spawn_resets_counter() {
        let palette = palette();
        let settings = settings();
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        effect.advance(&ctx).unwrap();
        effect.advance(&ctx).unwrap();
        assert_eq!(effect.ticks_since_last_rod, 2);
        effect.advance(&ctx).unwrap();
        assert_eq!(effect.ticks_since_last_rod, 0);
    }

    #[test]
    fn test_gradient_index_wraps() {
        let palette = palette();
        let settings = settings()
            .with("change_color", true)
            .with("rods_length", 0)
            .with("rods_distance", 0);
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        let mut picked = Vec::new();
        for _ in 0..4 {
            effect.advance(&ctx).unwrap();
            picked.push(effect.color_index().unwrap());
        }
        assert_eq!(picked, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_rejected_tick_keeps_state() {
        let palette = palette();
        let settings = settings();
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        effect.advance(&ctx).unwrap();
        let before = effect.clone();

        let mut without_speed = Settings::new();
        for (key, value) in settings.iter() {
            if key != "speed" {
                without_speed.insert(key.clone(), value.clone());
            }
        }
        let ctx = EffectContext::new(&without_speed, &palette);
        assert!(matches!(
            effect.advance(&ctx),
            Err(crate::error::Error::Configuration(_))
        ));
        assert_eq!(effect.ticks_since_last_rod, before.ticks_since_last_rod);
        assert_eq!(effect.buffer, before.buffer);
        assert_eq!(effect.color_index, before.color_index);
    }

    #[test]
    fn test_initialize_discards_state() {
        let palette = palette();
        let settings = settings();
        let ctx = EffectContext::new(&settings, &palette);

        let mut effect = rods(10);
        effect.advance(&ctx).unwrap();
        effect.initialize(Geometry::new(4, 2));
        assert_eq!(effect.buffer, PixelBuffer::zeroed(4));
        assert_eq!(effect.ticks_since_last_rod, 0);
        assert!(effect.current_color.is_none());
    }
}
