//! Multi-device LED strip effect engine
//!
//! Every configured device gets its own render thread that advances the
//! active effect, applies the brightness filter and pushes the frame into a
//! bounded output queue. Configuration lives in a shared [`ConfigService`];
//! the control plane changes it through a [`ControlHandle`] and the
//! [`Engine`] keeps the render threads in line with it.

pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod control;
pub mod effect;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frame;
pub mod geometry;
pub mod math8;
pub mod queue;
pub mod render;
pub mod settings;

pub use color::{Gradient, Palette, Rgb};
pub use command::{Command, DeviceCommand, SettingsScope, Target};
pub use config::{ConfigService, ConfigSnapshot, DeviceEntry, DeviceId};
pub use control::{ControlHandle, Request, Response};
pub use effect::{Effect, EffectContext, EffectId, EffectSlot};
pub use engine::{Engine, EngineHandle, Outputs};
pub use error::{EntityKind, Error, Result};
pub use filter::{BrightnessFilter, Filter};
pub use frame::PixelBuffer;
pub use geometry::Geometry;
pub use queue::{FrameReceiver, FrameSender, frame_queue};
pub use render::{DeviceRenderer, DeviceWorker, FrameScheduler, TickOutcome};
pub use settings::{SettingValue, Settings};

pub use embassy_time::{Duration, Instant};

/// Abstract LED driver trait
///
/// Implement this trait to push frames to a physical strip or a network
/// receiver; [`FrameReceiver::forward`] feeds it from a device output queue.
pub trait OutputDriver {
    /// Write colors to the LED strip
    fn write(&mut self, colors: &[Rgb]);
}

impl<D: OutputDriver + ?Sized> OutputDriver for &mut D {
    fn write(&mut self, colors: &[Rgb]) {
        (**self).write(colors);
    }
}
