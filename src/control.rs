//! Control plane entry point
//!
//! [`ControlHandle`] is what an outer surface (HTTP API, dashboard, CLI)
//! talks to. Changes are validated and written to the [`ConfigService`]
//! before the engine is notified, so a rejected request never leaves a
//! partial update behind.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandSender, SettingsScope, Target};
use crate::config::{ConfigService, ConfigSnapshot, DeviceId, LED_STRIPS, LOG_LEVELS};
use crate::effect::EffectId;
use crate::error::{EntityKind, Error, Result};
use crate::settings::{SettingValue, Settings};

/// Cloneable handle applying configuration changes and notifying the engine
#[derive(Clone)]
pub struct ControlHandle {
    config: Arc<ConfigService>,
    commands: CommandSender,
    /// Serializes change-then-notify pairs across clones
    bus: Arc<Mutex<()>>,
}

/// Parse an effect name, failing with [`Error::NotFound`]
pub fn parse_effect(name: &str) -> Result<EffectId> {
    EffectId::parse_from_str(name).ok_or_else(|| Error::not_found(EntityKind::Effect, name))
}

fn target_of(device: Option<DeviceId>) -> Target {
    device.map_or(Target::All, Target::Device)
}

impl ControlHandle {
    pub fn new(config: Arc<ConfigService>, commands: CommandSender) -> Self {
        Self {
            config,
            commands,
            bus: Arc::default(),
        }
    }

    pub fn config(&self) -> &Arc<ConfigService> {
        &self.config
    }

    fn notify(&self, command: Command) -> Result<()> {
        let _bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        self.commands.try_send(command)?;
        Ok(())
    }

    /// Apply `change` to the configuration and announce it on the bus
    ///
    /// Fails with [`Error::Busy`] before touching the configuration when the
    /// bus has no room left. Should the bus still fill up in between, the
    /// previous configuration is restored.
    fn apply<T>(
        &self,
        change: impl FnOnce(&ConfigService) -> Result<T>,
        command: impl FnOnce(&T) -> Command,
    ) -> Result<T> {
        let _bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        if self.commands.is_full() {
            return Err(Error::Busy);
        }
        let previous = self.config.snapshot();
        let value = change(&self.config)?;
        if let Err(err) = self.commands.try_send(command(&value)) {
            warn!("control: command bus full, rolling back");
            self.config.replace(previous)?;
            return Err(err.into());
        }
        Ok(value)
    }

    fn require_device(&self, device: &DeviceId) -> Result<()> {
        if self.config.contains_device(device) {
            Ok(())
        } else {
            Err(Error::not_found(EntityKind::Device, device.as_str()))
        }
    }

    pub fn activate_effect(&self, device: &DeviceId, effect: EffectId) -> Result<()> {
        self.apply(
            |config| config.set_active_effect(device, effect),
            |()| Command::ActivateEffect {
                target: Target::Device(device.clone()),
                effect,
            },
        )
    }

    pub fn activate_effect_for_all(&self, effect: EffectId) -> Result<()> {
        self.apply(
            |config| {
                config.set_active_effect_for_all(effect);
                Ok(())
            },
            |()| Command::ActivateEffect {
                target: Target::All,
                effect,
            },
        )
    }

    pub fn get_active_effect(&self, device: &DeviceId) -> Result<EffectId> {
        self.config.get_active_effect(device)
    }

    pub fn set_effect_settings(
        &self,
        device: &DeviceId,
        effect: EffectId,
        settings: &Settings,
    ) -> Result<()> {
        self.apply(
            |config| config.set_effect_setting(device, effect, settings),
            |()| Command::ApplySettings {
                target: Target::Device(device.clone()),
                scope: SettingsScope::Effect(effect),
            },
        )
    }

    pub fn set_effect_settings_for_all(&self, effect: EffectId, settings: &Settings) -> Result<()> {
        self.apply(
            |config| config.set_effect_setting_for_all(effect, settings),
            |()| Command::ApplySettings {
                target: Target::All,
                scope: SettingsScope::Effect(effect),
            },
        )
    }

    pub fn get_effect_setting(
        &self,
        device: &DeviceId,
        effect: EffectId,
        key: &str,
    ) -> Result<SettingValue> {
        self.config.get_effect_setting(device, effect, key)
    }

    pub fn set_general_settings(&self, settings: &Settings) -> Result<()> {
        self.apply(
            |config| config.set_general(settings),
            |()| Command::ApplySettings {
                target: Target::All,
                scope: SettingsScope::General,
            },
        )
    }

    pub fn get_general_setting(&self, key: &str) -> Result<SettingValue> {
        self.config.get_general(key)
    }

    pub fn set_device_settings(&self, device: &DeviceId, settings: &Settings) -> Result<()> {
        self.apply(
            |config| config.set_device_setting(device, settings),
            |()| Command::ApplySettings {
                target: Target::Device(device.clone()),
                scope: SettingsScope::Device,
            },
        )
    }

    pub fn get_device_setting(&self, device: &DeviceId, key: &str) -> Result<SettingValue> {
        self.config.get_device_setting(device, key)
    }

    pub fn set_output_type_device_settings(
        &self,
        device: &DeviceId,
        output_type: &str,
        settings: &Settings,
    ) -> Result<()> {
        self.apply(
            |config| config.set_output_type_device_setting(device, output_type, settings),
            |()| Command::ApplySettings {
                target: Target::Device(device.clone()),
                scope: SettingsScope::OutputType(output_type.to_owned()),
            },
        )
    }

    pub fn get_output_type_device_setting(
        &self,
        device: &DeviceId,
        output_type: &str,
        key: &str,
    ) -> Result<SettingValue> {
        self.config
            .get_output_type_device_setting(device, output_type, key)
    }

    pub fn create_device(&self) -> Result<DeviceId> {
        self.apply(
            |config| Ok(config.create_device()),
            |device| Command::CreateDevice(device.clone()),
        )
    }

    /// Request the removal of `device`
    ///
    /// The engine stops the device worker before the configuration entry is
    /// removed, so the entry stays visible until the engine processed it.
    pub fn delete_device(&self, device: &DeviceId) -> Result<()> {
        self.require_device(device)?;
        self.notify(Command::DeleteDevice(device.clone()))
    }

    pub fn reset_settings(&self) -> Result<()> {
        self.apply(
            |config| {
                config.reset();
                Ok(())
            },
            |()| Command::ResetSettings,
        )
    }

    pub fn export_config(&self) -> Result<String> {
        self.config.export()
    }

    pub fn import_config(&self, json: &str) -> Result<()> {
        self.apply(|config| config.import(json), |()| Command::ImportConfig)
    }

    pub fn devices(&self) -> BTreeMap<DeviceId, String> {
        self.config.devices()
    }

    pub fn colors(&self) -> BTreeMap<String, [u8; 3]> {
        self.config.colors()
    }

    pub fn gradients(&self) -> BTreeMap<String, Vec<[u8; 3]>> {
        self.config.gradients()
    }

    pub fn output_types(&self) -> Vec<&'static str> {
        self.config.output_types()
    }

    pub fn effects(&self) -> Vec<EffectId> {
        EffectId::ALL.to_vec()
    }

    /// Strip types accepted by the `led_strip` device setting
    pub fn led_strips(&self) -> Vec<&'static str> {
        LED_STRIPS.to_vec()
    }

    /// Levels accepted by the `log_level` general setting
    pub fn log_levels(&self) -> Vec<&'static str> {
        LOG_LEVELS.to_vec()
    }

    /// Execute a decoded request
    pub fn handle(&self, request: Request) -> Result<Response> {
        debug!("control: {request:?}");
        let response = match request {
            Request::ActivateEffect { device, effect } => {
                let effect = parse_effect(&effect)?;
                match device {
                    Some(device) => self.activate_effect(&device, effect)?,
                    None => self.activate_effect_for_all(effect)?,
                }
                Response::Ok
            }
            Request::GetActiveEffect { device } => {
                Response::Effect(self.get_active_effect(&device)?)
            }
            Request::SetEffectSettings {
                device,
                effect,
                settings,
            } => {
                let effect = parse_effect(&effect)?;
                match target_of(device) {
                    Target::Device(device) => {
                        self.set_effect_settings(&device, effect, &settings)?;
                    }
                    Target::All => self.set_effect_settings_for_all(effect, &settings)?,
                }
                Response::Ok
            }
            Request::GetEffectSetting {
                device,
                effect,
                key,
            } => {
                let effect = parse_effect(&effect)?;
                Response::Value(self.get_effect_setting(&device, effect, &key)?)
            }
            Request::SetGeneralSettings { settings } => {
                self.set_general_settings(&settings)?;
                Response::Ok
            }
            Request::GetGeneralSetting { key } => Response::Value(self.get_general_setting(&key)?),
            Request::SetDeviceSettings { device, settings } => {
                self.set_device_settings(&device, &settings)?;
                Response::Ok
            }
            Request::GetDeviceSetting { device, key } => {
                Response::Value(self.get_device_setting(&device, &key)?)
            }
            Request::SetOutputTypeDeviceSettings {
                device,
                output_type,
                settings,
            } => {
                self.set_output_type_device_settings(&device, &output_type, &settings)?;
                Response::Ok
            }
            Request::GetOutputTypeDeviceSetting {
                device,
                output_type,
                key,
            } => Response::Value(self.get_output_type_device_setting(
                &device,
                &output_type,
                &key,
            )?),
            Request::CreateDevice => Response::Device(self.create_device()?),
            Request::DeleteDevice { device } => {
                self.delete_device(&device)?;
                Response::Ok
            }
            Request::ResetSettings => {
                self.reset_settings()?;
                Response::Ok
            }
            Request::ExportConfig => Response::Config(Box::new(self.config.snapshot())),
            Request::ImportConfig { config } => {
                self.apply(|service| service.replace(*config), |()| Command::ImportConfig)?;
                Response::Ok
            }
            Request::GetDevices => Response::Devices(self.devices()),
            Request::GetColors => Response::Colors(self.colors()),
            Request::GetGradients => Response::Gradients(self.gradients()),
            Request::GetOutputTypes => Response::OutputTypes(self.output_types()),
            Request::GetEffects => Response::Effects(self.effects()),
            Request::GetLedStrips => Response::LedStrips(self.led_strips()),
            Request::GetLogLevels => Response::LogLevels(self.log_levels()),
        };
        Ok(response)
    }

    /// Decode and execute a JSON request such as
    /// `{"command": "activate_effect", "device": "device_0", "effect": "effect_rods"}`
    ///
    /// Malformed input fails with [`Error::Validation`] before anything is
    /// touched.
    pub fn handle_json(&self, json: &str) -> Result<Response> {
        let request: Request =
            serde_json::from_str(json).map_err(|err| Error::validation(err.to_string()))?;
        self.handle(request)
    }
}

/// Control request, tagged by its `command` field
///
/// Requests with an optional `device` apply to every device when it is
/// omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    ActivateEffect {
        device: Option<DeviceId>,
        effect: String,
    },
    GetActiveEffect {
        device: DeviceId,
    },
    SetEffectSettings {
        device: Option<DeviceId>,
        effect: String,
        settings: Settings,
    },
    GetEffectSetting {
        device: DeviceId,
        effect: String,
        key: String,
    },
    SetGeneralSettings {
        settings: Settings,
    },
    GetGeneralSetting {
        key: String,
    },
    SetDeviceSettings {
        device: DeviceId,
        settings: Settings,
    },
    GetDeviceSetting {
        device: DeviceId,
        key: String,
    },
    SetOutputTypeDeviceSettings {
        device: DeviceId,
        output_type: String,
        settings: Settings,
    },
    GetOutputTypeDeviceSetting {
        device: DeviceId,
        output_type: String,
        key: String,
    },
    CreateDevice,
    DeleteDevice {
        device: DeviceId,
    },
    ResetSettings,
    ExportConfig,
    ImportConfig {
        config: Box<ConfigSnapshot>,
    },
    GetDevices,
    GetColors,
    GetGradients,
    GetOutputTypes,
    GetEffects,
    GetLedStrips,
    GetLogLevels,
}

/// Result of a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok,
    Value(SettingValue),
    Effect(EffectId),
    Device(DeviceId),
    Devices(BTreeMap<DeviceId, String>),
    Colors(BTreeMap<String, [u8; 3]>),
    Gradients(BTreeMap<String, Vec<[u8; 3]>>),
    OutputTypes(Vec<&'static str>),
    Effects(Vec<EffectId>),
    LedStrips(Vec<&'static str>),
    LogLevels(Vec<&'static str>),
    Config(Box<ConfigSnapshot>),
}
