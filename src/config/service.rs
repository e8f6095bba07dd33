use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::{
    ConfigSnapshot, DEVICE_SCHEMA, DeviceEntry, DeviceFrameConfig, DeviceId, GENERAL_SCHEMA,
    OUTPUT_TYPES, default_device, output_type_schema,
};
use crate::color::Palette;
use crate::effect::{DEFAULT_MAX_ROLL_STEPS, EffectId};
use crate::error::{EntityKind, Error, Result};
use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::settings::{SettingValue, Settings};

struct Inner {
    snapshot: ConfigSnapshot,
    /// Resolved form of the snapshot color tables
    palette: Arc<Palette>,
}

impl Inner {
    fn new(snapshot: ConfigSnapshot) -> Self {
        let palette = Arc::new(snapshot.palette());
        Self { snapshot, palette }
    }

    fn device(&self, id: &DeviceId) -> Result<&DeviceEntry> {
        self.snapshot
            .devices
            .get(id)
            .ok_or_else(|| Error::not_found(EntityKind::Device, id.as_str()))
    }

    fn device_mut(&mut self, id: &DeviceId) -> Result<&mut DeviceEntry> {
        self.snapshot
            .devices
            .get_mut(id)
            .ok_or_else(|| Error::not_found(EntityKind::Device, id.as_str()))
    }
}

/// Process-safe owner of the live configuration
///
/// Every accessor takes the internal lock, so readers never observe a
/// partially applied update. Setters validate their whole input before
/// writing anything.
pub struct ConfigService {
    inner: Mutex<Inner>,
}

impl ConfigService {
    /// Wrap a snapshot after checking it is complete
    pub fn new(snapshot: ConfigSnapshot) -> Result<Self> {
        snapshot.validate()?;
        Ok(Self {
            inner: Mutex::new(Inner::new(snapshot)),
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            inner: Mutex::new(Inner::new(ConfigSnapshot::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_general(&self, key: &str) -> Result<SettingValue> {
        lookup(&self.lock().snapshot.general, key)
    }

    pub fn set_general(&self, settings: &Settings) -> Result<()> {
        let mut inner = self.lock();
        GENERAL_SCHEMA.validate(settings, &inner.palette)?;
        inner.snapshot.general.merge(settings);
        debug!("config: updated {} general setting(s)", settings.len());
        Ok(())
    }

    pub fn get_device_setting(&self, device: &DeviceId, key: &str) -> Result<SettingValue> {
        lookup(&self.lock().device(device)?.settings, key)
    }

    pub fn set_device_setting(&self, device: &DeviceId, settings: &Settings) -> Result<()> {
        let mut inner = self.lock();
        DEVICE_SCHEMA.validate(settings, &inner.palette)?;

        let entry = inner.device_mut(device)?;
        let mut merged = entry.settings.clone();
        merged.merge(settings);
        let led_count = merged.count("led_count")?;
        let led_mid = merged.count("led_mid")?;
        if led_mid > led_count {
            return Err(Error::validation(format!(
                "led_mid {led_mid} exceeds led_count {led_count}"
            )));
        }
        entry.settings = merged;
        debug!("config: {device} updated {} setting(s)", settings.len());
        Ok(())
    }

    pub fn get_effect_setting(
        &self,
        device: &DeviceId,
        effect: EffectId,
        key: &str,
    ) -> Result<SettingValue> {
        let inner = self.lock();
        let settings = inner
            .device(device)?
            .effects
            .get(&effect)
            .ok_or_else(|| Error::not_found(EntityKind::Effect, effect.as_str()))?;
        lookup(settings, key)
    }

    pub fn set_effect_setting(
        &self,
        device: &DeviceId,
        effect: EffectId,
        settings: &Settings,
    ) -> Result<()> {
        let mut inner = self.lock();
        effect.schema().validate(settings, &inner.palette)?;
        inner
            .device_mut(device)?
            .effects
            .entry(effect)
            .or_default()
            .merge(settings);
        debug!("config: {device} updated {effect}");
        Ok(())
    }

    /// Apply the same effect settings to every device
    pub fn set_effect_setting_for_all(&self, effect: EffectId, settings: &Settings) -> Result<()> {
        let mut inner = self.lock();
        effect.schema().validate(settings, &inner.palette)?;
        for entry in inner.snapshot.devices.values_mut() {
            entry.effects.entry(effect).or_default().merge(settings);
        }
        debug!("config: all devices updated {effect}");
        Ok(())
    }

    pub fn get_output_type_device_setting(
        &self,
        device: &DeviceId,
        output_type: &str,
        key: &str,
    ) -> Result<SettingValue> {
        let inner = self.lock();
        let settings = inner
            .device(device)?
            .outputs
            .get(output_type)
            .ok_or_else(|| Error::not_found(EntityKind::OutputType, output_type))?;
        lookup(settings, key)
    }

    pub fn set_output_type_device_setting(
        &self,
        device: &DeviceId,
        output_type: &str,
        settings: &Settings,
    ) -> Result<()> {
        let schema = output_type_schema(output_type)
            .ok_or_else(|| Error::not_found(EntityKind::OutputType, output_type))?;
        let mut inner = self.lock();
        schema.validate(settings, &inner.palette)?;
        inner
            .device_mut(device)?
            .outputs
            .entry(output_type.to_owned())
            .or_default()
            .merge(settings);
        debug!("config: {device} updated {output_type}");
        Ok(())
    }

    pub fn get_active_effect(&self, device: &DeviceId) -> Result<EffectId> {
        Ok(self.lock().device(device)?.active_effect)
    }

    pub fn set_active_effect(&self, device: &DeviceId, effect: EffectId) -> Result<()> {
        self.lock().device_mut(device)?.active_effect = effect;
        info!("config: {device} switched to {effect}");
        Ok(())
    }

    pub fn set_active_effect_for_all(&self, effect: EffectId) {
        for entry in self.lock().snapshot.devices.values_mut() {
            entry.active_effect = effect;
        }
        info!("config: all devices switched to {effect}");
    }

    /// Add a device with default settings under the first free `device_N` id
    pub fn create_device(&self) -> DeviceId {
        let mut inner = self.lock();
        let devices = &mut inner.snapshot.devices;
        let id = (0..)
            .map(DeviceId::indexed)
            .find(|id| !devices.contains_key(id))
            .unwrap_or_else(|| DeviceId::indexed(devices.len()));
        devices.insert(id.clone(), default_device());
        info!("config: created {id}");
        id
    }

    pub fn delete_device(&self, device: &DeviceId) -> Result<()> {
        self.lock()
            .snapshot
            .devices
            .remove(device)
            .ok_or_else(|| Error::not_found(EntityKind::Device, device.as_str()))?;
        info!("config: deleted {device}");
        Ok(())
    }

    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.lock().snapshot.devices.keys().cloned().collect()
    }

    /// Device ids with their display names
    pub fn devices(&self) -> BTreeMap<DeviceId, String> {
        self.lock()
            .snapshot
            .devices
            .iter()
            .map(|(id, entry)| (id.clone(), entry.name().to_owned()))
            .collect()
    }

    pub fn device_entry(&self, device: &DeviceId) -> Result<DeviceEntry> {
        self.lock().device(device).cloned()
    }

    pub fn contains_device(&self, device: &DeviceId) -> bool {
        self.lock().snapshot.devices.contains_key(device)
    }

    pub fn colors(&self) -> BTreeMap<String, [u8; 3]> {
        self.lock().snapshot.colors.clone()
    }

    pub fn gradients(&self) -> BTreeMap<String, Vec<[u8; 3]>> {
        self.lock().snapshot.gradients.clone()
    }

    pub fn palette(&self) -> Arc<Palette> {
        Arc::clone(&self.lock().palette)
    }

    pub fn output_types(&self) -> Vec<&'static str> {
        OUTPUT_TYPES.to_vec()
    }

    /// Capacity of newly created per-device frame queues
    pub fn output_queue_capacity(&self) -> usize {
        self.lock()
            .snapshot
            .general
            .count("output_queue_capacity")
            .unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Everything the render loop of `device` needs for the next tick
    pub fn frame_config(&self, device: &DeviceId) -> Result<DeviceFrameConfig> {
        let inner = self.lock();
        let entry = inner.device(device)?;
        let effect_settings = entry
            .effects
            .get(&entry.active_effect)
            .cloned()
            .unwrap_or_default();
        let max_roll_steps = inner
            .snapshot
            .general
            .count("max_roll_steps")
            .unwrap_or(DEFAULT_MAX_ROLL_STEPS);

        Ok(DeviceFrameConfig {
            geometry: entry.geometry()?,
            active_effect: entry.active_effect,
            effect_settings,
            brightness: entry.brightness()?,
            fps: entry.fps()?,
            max_roll_steps,
            palette: Arc::clone(&inner.palette),
        })
    }

    /// Restore the default configuration
    pub fn reset(&self) {
        *self.lock() = Inner::new(ConfigSnapshot::default());
        info!("config: reset to defaults");
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        self.lock().snapshot.clone()
    }

    /// Swap in a complete snapshot, leaving the current one untouched if it
    /// does not validate
    pub fn replace(&self, snapshot: ConfigSnapshot) -> Result<()> {
        snapshot.validate()?;
        *self.lock() = Inner::new(snapshot);
        info!("config: replaced");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn replace_unchecked(&self, snapshot: ConfigSnapshot) {
        *self.lock() = Inner::new(snapshot);
    }

    /// Serialize the live configuration as pretty-printed JSON
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.lock().snapshot)?)
    }

    /// Parse, validate and swap in a configuration exported by [`Self::export`]
    pub fn import(&self, json: &str) -> Result<()> {
        let snapshot: ConfigSnapshot =
            serde_json::from_str(json).map_err(|err| Error::validation(err.to_string()))?;
        self.replace(snapshot)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn lookup(settings: &Settings, key: &str) -> Result<SettingValue> {
    settings
        .get(key)
        .cloned()
        .ok_or_else(|| Error::not_found(EntityKind::Setting, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_device_fills_gaps() {
        let config = ConfigService::with_defaults();
        assert_eq!(config.create_device(), DeviceId::indexed(1));
        assert_eq!(config.create_device(), DeviceId::indexed(2));
        config.delete_device(&DeviceId::indexed(1)).unwrap();
        assert_eq!(config.create_device(), DeviceId::indexed(1));
    }

    #[test]
    fn test_led_mid_checked_after_merge() {
        let config = ConfigService::with_defaults();
        let device = DeviceId::indexed(0);
        let err = config
            .set_device_setting(&device, &Settings::new().with("led_count", 10))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            config.get_device_setting(&device, "led_count").unwrap(),
            SettingValue::Int(200)
        );

        config
            .set_device_setting(
                &device,
                &Settings::new().with("led_count", 10).with("led_mid", 5),
            )
            .unwrap();
        let geometry = config.frame_config(&device).unwrap().geometry;
        assert_eq!((geometry.led_count, geometry.led_mid), (10, 5));
    }

    #[test]
    fn test_frame_config_reads_active_effect() {
        let config = ConfigService::with_defaults();
        let device = DeviceId::indexed(0);
        config.set_active_effect(&device, EffectId::Rods).unwrap();
        let frame = config.frame_config(&device).unwrap();
        assert_eq!(frame.active_effect, EffectId::Rods);
        assert!(frame.effect_settings.contains_key("rods_length"));
        assert_eq!(frame.max_roll_steps, DEFAULT_MAX_ROLL_STEPS);
        assert_eq!(frame.fps, 60);
    }
}
