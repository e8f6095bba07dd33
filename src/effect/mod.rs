//! Effect system with compile-time known effect variants
//!
//! All effects are stored in an enum so the render loop never has to know
//! which variant it is driving. Each effect implements the `Effect` trait.

mod fade;
mod gradient;
mod off;
mod rods;
mod single;

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use fade::FadeEffect;
pub use gradient::GradientEffect;
pub use off::OffEffect;
pub use rods::RodsEffect;
pub use single::SingleEffect;

use crate::color::Palette;
use crate::error::Result;
use crate::frame::PixelBuffer;
use crate::geometry::Geometry;
use crate::settings::{Schema, Settings};

const EFFECT_NAME_OFF: &str = "effect_off";
const EFFECT_NAME_SINGLE: &str = "effect_single";
const EFFECT_NAME_GRADIENT: &str = "effect_gradient";
const EFFECT_NAME_FADE: &str = "effect_fade";
const EFFECT_NAME_RODS: &str = "effect_rods";

const EFFECT_ID_OFF: u8 = 0;
const EFFECT_ID_SINGLE: u8 = 1;
const EFFECT_ID_GRADIENT: u8 = 2;
const EFFECT_ID_FADE: u8 = 3;
const EFFECT_ID_RODS: u8 = 4;

/// Upper bound of the `speed` setting
pub const MAX_SPEED: i64 = 100;

/// Default ceiling of [`roll_steps`]
pub const DEFAULT_MAX_ROLL_STEPS: usize = 10;

/// Number of pixel positions to move per tick for `speed`
///
/// Linear in `speed` (clamped to `0..=MAX_SPEED`) and rounded up, so any
/// positive speed moves at least one pixel and `MAX_SPEED` moves
/// `max_roll_steps` pixels.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn roll_steps(speed: i64, max_roll_steps: usize) -> usize {
    let speed = speed.clamp(0, MAX_SPEED) as usize;
    (speed * max_roll_steps).div_ceil(MAX_SPEED as usize)
}

/// Everything an effect reads while advancing one frame
#[derive(Debug, Clone, Copy)]
pub struct EffectContext<'a> {
    /// Settings of the active effect, re-read every tick
    pub settings: &'a Settings,
    pub palette: &'a Palette,
    /// Ceiling of [`roll_steps`]
    pub max_roll_steps: usize,
}

impl<'a> EffectContext<'a> {
    pub const fn new(settings: &'a Settings, palette: &'a Palette) -> Self {
        Self {
            settings,
            palette,
            max_roll_steps: DEFAULT_MAX_ROLL_STEPS,
        }
    }

    #[must_use]
    pub const fn with_max_roll_steps(mut self, max_roll_steps: usize) -> Self {
        self.max_roll_steps = max_roll_steps;
        self
    }

    /// Steps for the `speed` setting of the active effect
    pub fn roll_steps(&self) -> Result<usize> {
        Ok(roll_steps(self.settings.int("speed")?, self.max_roll_steps))
    }
}

pub trait Effect {
    /// Settings the effect requires on every tick
    const SCHEMA: Schema;

    /// Allocate the persistent buffer for `geometry` and reset all counters
    fn initialize(&mut self, geometry: Geometry);

    /// Compute the next frame
    ///
    /// The returned buffer is always `led_count` pixels wide.
    fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer>;
}

/// Effect slot - enum containing all possible effects
#[derive(Debug, Clone)]
pub enum EffectSlot {
    /// All LEDs off
    Off(OffEffect),
    /// Single solid color
    Single(SingleEffect),
    /// Gradient rolling along the strip
    Gradient(GradientEffect),
    /// Whole strip fading through gradient stops
    Fade(FadeEffect),
    /// Colored rods travelling along the strip
    Rods(RodsEffect),
}

/// Known effect ids that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EffectId {
    Off = EFFECT_ID_OFF,
    Single = EFFECT_ID_SINGLE,
    Gradient = EFFECT_ID_GRADIENT,
    Fade = EFFECT_ID_FADE,
    Rods = EFFECT_ID_RODS,
}

impl Default for EffectSlot {
    fn default() -> Self {
        Self::Off(OffEffect::default())
    }
}

impl EffectId {
    /// Every registered effect, in id order
    pub const ALL: [Self; 5] = [
        Self::Off,
        Self::Single,
        Self::Gradient,
        Self::Fade,
        Self::Rods,
    ];

    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            EFFECT_ID_OFF => Self::Off,
            EFFECT_ID_SINGLE => Self::Single,
            EFFECT_ID_GRADIENT => Self::Gradient,
            EFFECT_ID_FADE => Self::Fade,
            EFFECT_ID_RODS => Self::Rods,
            _ => return None,
        })
    }

    /// Construct a fresh, uninitialized effect instance
    pub fn to_slot(self) -> EffectSlot {
        match self {
            Self::Off => EffectSlot::Off(OffEffect::default()),
            Self::Single => EffectSlot::Single(SingleEffect::default()),
            Self::Gradient => EffectSlot::Gradient(GradientEffect::default()),
            Self::Fade => EffectSlot::Fade(FadeEffect::default()),
            Self::Rods => EffectSlot::Rods(RodsEffect::default()),
        }
    }

    pub const fn schema(self) -> Schema {
        match self {
            Self::Off => OffEffect::SCHEMA,
            Self::Single => SingleEffect::SCHEMA,
            Self::Gradient => GradientEffect::SCHEMA,
            Self::Fade => FadeEffect::SCHEMA,
            Self::Rods => RodsEffect::SCHEMA,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => EFFECT_NAME_OFF,
            Self::Single => EFFECT_NAME_SINGLE,
            Self::Gradient => EFFECT_NAME_GRADIENT,
            Self::Fade => EFFECT_NAME_FADE,
            Self::Rods => EFFECT_NAME_RODS,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            EFFECT_NAME_OFF => Some(Self::Off),
            EFFECT_NAME_SINGLE => Some(Self::Single),
            EFFECT_NAME_GRADIENT => Some(Self::Gradient),
            EFFECT_NAME_FADE => Some(Self::Fade),
            EFFECT_NAME_RODS => Some(Self::Rods),
            _ => None,
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EffectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EffectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse_from_str(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown effect `{name}`")))
    }
}

impl EffectSlot {
    /// Allocate buffers for `geometry` and reset the effect state
    pub fn initialize(&mut self, geometry: Geometry) {
        match self {
            Self::Off(effect) => effect.initialize(geometry),
            Self::Single(effect) => effect.initialize(geometry),
            Self::Gradient(effect) => effect.initialize(geometry),
            Self::Fade(effect) => effect.initialize(geometry),
            Self::Rods(effect) => effect.initialize(geometry),
        }
    }

    /// Advance the current effect by one frame
    pub fn advance(&mut self, ctx: &EffectContext<'_>) -> Result<PixelBuffer> {
        match self {
            Self::Off(effect) => effect.advance(ctx),
            Self::Single(effect) => effect.advance(ctx),
            Self::Gradient(effect) => effect.advance(ctx),
            Self::Fade(effect) => effect.advance(ctx),
            Self::Rods(effect) => effect.advance(ctx),
        }
    }

    /// Get the effect ID for external observation
    pub fn id(&self) -> EffectId {
        match self {
            Self::Off(_) => EffectId::Off,
            Self::Single(_) => EffectId::Single,
            Self::Gradient(_) => EffectId::Gradient,
            Self::Fade(_) => EffectId::Fade,
            Self::Rods(_) => EffectId::Rods,
        }
    }
}
