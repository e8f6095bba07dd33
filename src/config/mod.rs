//! Configuration data model
//!
//! [`ConfigSnapshot`] is the complete persisted state: general settings,
//! devices with their effect and output settings, and the color and
//! gradient tables. [`ConfigService`] owns the live snapshot.

mod defaults;
mod service;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_FPS, DEFAULT_LED_COUNT, DEVICE_SCHEMA, GENERAL_SCHEMA, LED_STRIPS, LOG_LEVELS,
    OUTPUT_TYPES,
    default_colors, default_device, default_effect_settings, default_general,
    default_gradients, default_output_settings, output_type_schema,
};
pub use service::ConfigService;

use crate::color::Palette;
use crate::effect::EffectId;
use crate::error::{Error, Result};
use crate::filter::BrightnessFilter;
use crate::geometry::Geometry;
use crate::settings::Settings;

/// Identifier of a configured device, `device_N`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The `index`-th device id
    pub fn indexed(index: usize) -> Self {
        Self(format!("device_{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub general: Settings,
    pub devices: BTreeMap<DeviceId, DeviceEntry>,
    pub colors: BTreeMap<String, [u8; 3]>,
    pub gradients: BTreeMap<String, Vec<[u8; 3]>>,
}

/// Configuration of a single device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Device level settings (geometry, output type, pacing)
    pub settings: Settings,
    pub active_effect: EffectId,
    /// Settings of every registered effect
    pub effects: BTreeMap<EffectId, Settings>,
    /// Settings per output type
    pub outputs: BTreeMap<String, Settings>,
}

impl DeviceEntry {
    pub fn geometry(&self) -> Result<Geometry> {
        let led_count = self.settings.count("led_count")?;
        let led_mid = self.settings.count("led_mid")?;
        Ok(Geometry::new(led_count, led_mid))
    }

    pub fn fps(&self) -> Result<u32> {
        let fps = self.settings.count("fps")?;
        Ok(u32::try_from(fps).unwrap_or(u32::MAX).max(1))
    }

    pub fn brightness(&self) -> Result<BrightnessFilter> {
        let percent = self.settings.count("led_brightness")?;
        Ok(BrightnessFilter::from_percent(
            u8::try_from(percent).unwrap_or(u8::MAX),
        ))
    }

    pub fn name(&self) -> &str {
        self.settings.text("device_name").unwrap_or_default()
    }

    fn validate(&self, id: &DeviceId, palette: &Palette) -> Result<()> {
        let context = |err: Error| match err {
            Error::Validation(msg) => Error::validation(format!("{id}: {msg}")),
            other => other,
        };

        DEVICE_SCHEMA
            .validate_complete(&self.settings, palette)
            .map_err(context)?;
        let geometry = self.geometry()?;
        let led_mid = self.settings.count("led_mid")?;
        if led_mid > geometry.led_count {
            return Err(context(Error::validation(format!(
                "led_mid {led_mid} exceeds led_count {}",
                geometry.led_count
            ))));
        }

        for effect in EffectId::ALL {
            let settings = self.effects.get(&effect).ok_or_else(|| {
                context(Error::validation(format!("missing settings of `{effect}`")))
            })?;
            effect
                .schema()
                .validate_complete(settings, palette)
                .map_err(context)?;
        }

        for output_type in OUTPUT_TYPES {
            let settings = self.outputs.get(output_type).ok_or_else(|| {
                context(Error::validation(format!(
                    "missing settings of `{output_type}`"
                )))
            })?;
            let schema = output_type_schema(output_type)
                .ok_or_else(|| Error::validation(format!("unknown output `{output_type}`")))?;
            schema
                .validate_complete(settings, palette)
                .map_err(context)?;
        }
        Ok(())
    }
}

impl ConfigSnapshot {
    /// Palette resolving the ids of this snapshot
    pub fn palette(&self) -> Palette {
        Palette::from_tables(&self.colors, &self.gradients)
    }

    /// Check that the snapshot is structurally complete
    pub fn validate(&self) -> Result<()> {
        if let Some((id, _)) = self.gradients.iter().find(|(_, stops)| stops.is_empty()) {
            return Err(Error::validation(format!("gradient `{id}` has no stops")));
        }

        let palette = self.palette();
        GENERAL_SCHEMA.validate_complete(&self.general, &palette)?;
        for (id, device) in &self.devices {
            device.validate(id, &palette)?;
        }
        Ok(())
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            general: default_general(),
            devices: BTreeMap::from([(DeviceId::indexed(0), default_device())]),
            colors: default_colors(),
            gradients: default_gradients(),
        }
    }
}

/// What a render loop needs from the configuration for a single tick
#[derive(Debug, Clone)]
pub struct DeviceFrameConfig {
    pub geometry: Geometry,
    pub active_effect: EffectId,
    /// Settings of the active effect only
    pub effect_settings: Settings,
    pub brightness: BrightnessFilter,
    pub fps: u32,
    pub max_roll_steps: usize,
    pub palette: Arc<Palette>,
}
