use std::sync::Arc;

use log::{debug, warn};

use crate::command::{DeviceCommand, DeviceCommandReceiver};
use crate::config::{ConfigService, DeviceFrameConfig, DeviceId};
use crate::effect::{EffectContext, EffectId, EffectSlot};
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::frame::PixelBuffer;
use crate::geometry::Geometry;
use crate::queue::FrameSender;

/// What a single [`DeviceRenderer::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was pushed, the next one is due in `1 / fps` seconds
    Rendered { fps: u32 },
    /// A [`DeviceCommand::Stop`] was received, nothing was rendered
    Stopped,
}

/// Render loop body of one device
///
/// Owns the running effect of the device. Every tick re-reads the device
/// configuration, so settings changes show up on the next frame without
/// any notification.
pub struct DeviceRenderer {
    device: DeviceId,
    config: Arc<ConfigService>,
    commands: DeviceCommandReceiver,
    output: FrameSender,

    effect: EffectSlot,
    geometry: Geometry,
    needs_init: bool,
    frames: u64,
}

impl DeviceRenderer {
    pub fn new(
        device: DeviceId,
        config: Arc<ConfigService>,
        commands: DeviceCommandReceiver,
        output: FrameSender,
    ) -> Self {
        Self {
            device,
            config,
            commands,
            output,
            effect: EffectSlot::default(),
            geometry: Geometry::default(),
            needs_init: true,
            frames: 0,
        }
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Id of the effect currently driven by this renderer
    pub fn effect(&self) -> EffectId {
        self.effect.id()
    }

    /// Number of frames pushed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render and push one frame
    ///
    /// Blocks while the output queue is full. Fails with [`Error::Closed`]
    /// once the output queue is closed and with [`Error::NotFound`] once the
    /// device is gone from the configuration.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.process_commands() {
            return Ok(TickOutcome::Stopped);
        }

        let rendered = match self.config.frame_config(&self.device) {
            Ok(config) => self.render(&config).map(|frame| (frame, config.fps)),
            Err(err @ Error::NotFound { .. }) => return Err(err),
            Err(err) => Err(err),
        };
        // Blank frames are paced at 1 fps until the configuration is fixed
        let (frame, fps) = rendered.unwrap_or_else(|err| {
            warn!("{}: {err}, rendering blank frame", self.device);
            (PixelBuffer::zeroed(self.geometry.led_count), 1)
        });

        self.output.send(frame)?;
        self.frames += 1;
        Ok(TickOutcome::Rendered { fps })
    }

    /// Drain pending device commands, returns whether a stop was requested
    fn process_commands(&mut self) -> bool {
        let pending: Vec<_> = self.commands.drain().collect();
        let mut stop = false;
        for command in pending {
            match command {
                DeviceCommand::ActivateEffect(effect) => {
                    self.switch_effect(effect);
                }
                DeviceCommand::Reinitialize => {
                    self.needs_init = true;
                }
                DeviceCommand::Stop => {
                    stop = true;
                }
            }
        }
        stop
    }

    fn switch_effect(&mut self, effect: EffectId) {
        self.effect = effect.to_slot();
        self.needs_init = true;
    }

    fn render(&mut self, config: &DeviceFrameConfig) -> Result<PixelBuffer> {
        if config.active_effect != self.effect.id() {
            self.switch_effect(config.active_effect);
        }
        if config.geometry != self.geometry {
            self.geometry = config.geometry;
            self.needs_init = true;
        }
        if self.needs_init {
            debug!(
                "{}: initializing {} for {} leds",
                self.device,
                self.effect.id(),
                self.geometry.led_count
            );
            self.effect.initialize(self.geometry);
            self.needs_init = false;
        }

        let ctx = EffectContext::new(&config.effect_settings, &config.palette)
            .with_max_roll_steps(config.max_roll_steps);
        let mut frame = self.effect.advance(&ctx)?;
        config.brightness.apply(&mut frame);
        Ok(frame)
    }
}
