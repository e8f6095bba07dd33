//! Command bus messages
//!
//! The control plane applies configuration changes to the
//! [`ConfigService`](crate::config::ConfigService) and then notifies the
//! engine through a [`CommandChannel`]. The engine drains it between polls and
//! forwards [`DeviceCommand`]s to the affected device workers.

use crate::channel::{Channel, Receiver, Sender};
use crate::config::DeviceId;
use crate::effect::EffectId;

/// Capacity of the inbound command channel
pub const COMMAND_CHANNEL_SIZE: usize = 32;

/// Capacity of every per-device command channel
pub const DEVICE_CHANNEL_SIZE: usize = 8;

/// Devices a command applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Device(DeviceId),
    All,
}

impl Target {
    pub fn matches(&self, device: &DeviceId) -> bool {
        match self {
            Self::Device(id) => id == device,
            Self::All => true,
        }
    }
}

/// Settings scope touched by [`Command::ApplySettings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsScope {
    General,
    Device,
    Effect(EffectId),
    OutputType(String),
}

/// Notification sent to the engine after the configuration changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The active effect of `target` was switched
    ActivateEffect { target: Target, effect: EffectId },
    /// Settings of `scope` were updated for `target`
    ApplySettings { target: Target, scope: SettingsScope },
    /// A device entry was added and needs a worker
    CreateDevice(DeviceId),
    /// Stop the worker of a device, then remove its entry
    DeleteDevice(DeviceId),
    /// The configuration was reset to defaults
    ResetSettings,
    /// A new configuration was imported
    ImportConfig,
}

/// Message drained by a device worker at the start of each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Switch to `effect` and reinitialize it
    ActivateEffect(EffectId),
    /// Reinitialize the current effect
    Reinitialize,
    /// Finish the current tick and exit
    Stop,
}

pub type CommandChannel = Channel<Command, COMMAND_CHANNEL_SIZE>;
pub type CommandSender = Sender<Command, COMMAND_CHANNEL_SIZE>;
pub type CommandReceiver = Receiver<Command, COMMAND_CHANNEL_SIZE>;

pub type DeviceChannel = Channel<DeviceCommand, DEVICE_CHANNEL_SIZE>;
pub type DeviceCommandSender = Sender<DeviceCommand, DEVICE_CHANNEL_SIZE>;
pub type DeviceCommandReceiver = Receiver<DeviceCommand, DEVICE_CHANNEL_SIZE>;
