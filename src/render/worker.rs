use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use embassy_time::Instant;
use log::{debug, info, warn};

use super::device::{DeviceRenderer, TickOutcome};
use super::scheduler::FrameScheduler;
use crate::command::{DeviceChannel, DeviceCommand, DeviceCommandSender};
use crate::config::{ConfigService, DEFAULT_FPS, DeviceId};
use crate::error::{Error, Result};
use crate::queue::{FrameReceiver, frame_queue};

/// Render thread of a single device
///
/// Dropping the worker without calling [`DeviceWorker::shutdown`] leaves the
/// thread running until its output queue is closed.
pub struct DeviceWorker {
    device: DeviceId,
    cancelled: Arc<AtomicBool>,
    commands: DeviceCommandSender,
    frames: FrameReceiver,
    handle: Option<JoinHandle<()>>,
}

impl DeviceWorker {
    /// Create the output queue of `device` and start rendering into it
    pub fn spawn(device: DeviceId, config: Arc<ConfigService>) -> Result<Self> {
        let (frame_tx, frame_rx) = frame_queue(config.output_queue_capacity());
        let (command_tx, command_rx) = DeviceChannel::split();
        let cancelled = Arc::new(AtomicBool::new(false));

        let renderer = DeviceRenderer::new(device.clone(), config, command_rx, frame_tx);
        let is_cancelled = Arc::clone(&cancelled);
        let handle = thread::Builder::new()
            .name(format!("render-{device}"))
            .spawn(move || run(renderer, &is_cancelled))?;

        info!("{device}: render worker started");
        Ok(Self {
            device,
            cancelled,
            commands: command_tx,
            frames: frame_rx,
            handle: Some(handle),
        })
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    /// Consuming side of the device output queue
    pub fn frames(&self) -> FrameReceiver {
        self.frames.clone()
    }

    /// Queue a command for the next tick
    pub fn send(&self, command: DeviceCommand) -> Result<()> {
        self.commands.try_send(command)?;
        Ok(())
    }

    /// Ask the thread to exit after its current tick
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::Release);
        if self.send(DeviceCommand::Stop).is_err() {
            debug!("{}: command channel full, relying on stop flag", self.device);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the thread, discard undelivered frames and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop();
        self.frames.close();
        let dropped = self.frames.drain();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("{}: render worker panicked", self.device);
        }
        info!("{}: render worker stopped, {dropped} frame(s) dropped", self.device);
    }
}

fn run(mut renderer: DeviceRenderer, cancelled: &AtomicBool) {
    let mut scheduler = FrameScheduler::new(DEFAULT_FPS);
    while !cancelled.load(Ordering::Acquire) {
        match renderer.tick() {
            Ok(TickOutcome::Rendered { fps }) => {
                scheduler.set_fps(fps);
                let sleep = scheduler.tick(Instant::now()).sleep_duration;
                thread::sleep(std::time::Duration::from_micros(sleep.as_micros()));
            }
            Ok(TickOutcome::Stopped) | Err(Error::Closed) => break,
            Err(err) => {
                warn!("{}: {err}, render worker exiting", renderer.device());
                break;
            }
        }
    }
    debug!(
        "{}: rendered {} frame(s)",
        renderer.device(),
        renderer.frames()
    );
}
