//! Render subsystem supervisor
//!
//! The [`Engine`] owns one [`DeviceWorker`] per configured device and keeps
//! the set of workers in line with the configuration by draining the command
//! bus between polls.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::command::{
    Command, CommandChannel, CommandReceiver, CommandSender, DeviceCommand, SettingsScope,
    Target,
};
use crate::config::{ConfigService, DeviceId};
use crate::error::Result;
use crate::queue::FrameReceiver;
use crate::render::DeviceWorker;

/// Default interval between two polls of the command bus
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output queues of the running devices, shared with the output side
#[derive(Clone, Default)]
pub struct Outputs {
    queues: Arc<Mutex<BTreeMap<DeviceId, FrameReceiver>>>,
}

impl Outputs {
    fn lock(&self) -> MutexGuard<'_, BTreeMap<DeviceId, FrameReceiver>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Output queue of `device`, if it has a running worker
    pub fn get(&self, device: &DeviceId) -> Option<FrameReceiver> {
        self.lock().get(device).cloned()
    }

    pub fn devices(&self) -> Vec<DeviceId> {
        self.lock().keys().cloned().collect()
    }

    /// Queue depth per device
    pub fn depths(&self) -> BTreeMap<DeviceId, usize> {
        self.lock()
            .iter()
            .map(|(id, queue)| (id.clone(), queue.len()))
            .collect()
    }

    fn insert(&self, device: DeviceId, queue: FrameReceiver) {
        self.lock().insert(device, queue);
    }

    fn remove(&self, device: &DeviceId) {
        self.lock().remove(device);
    }
}

pub struct Engine {
    config: Arc<ConfigService>,
    commands: CommandReceiver,
    workers: BTreeMap<DeviceId, DeviceWorker>,
    outputs: Outputs,
}

impl Engine {
    /// Create an engine together with the sender of its command bus
    pub fn new(config: Arc<ConfigService>) -> (Self, CommandSender) {
        let (sender, commands) = CommandChannel::split();
        let engine = Self {
            config,
            commands,
            workers: BTreeMap::new(),
            outputs: Outputs::default(),
        };
        (engine, sender)
    }

    pub fn config(&self) -> &Arc<ConfigService> {
        &self.config
    }

    pub fn outputs(&self) -> Outputs {
        self.outputs.clone()
    }

    /// Output queue of `device`
    pub fn frames(&self, device: &DeviceId) -> Option<FrameReceiver> {
        self.workers.get(device).map(DeviceWorker::frames)
    }

    /// Devices with a running worker
    pub fn devices(&self) -> impl Iterator<Item = &DeviceId> {
        self.workers.keys()
    }

    /// Spawn a worker for every configured device
    pub fn start(&mut self) -> Result<()> {
        self.sync_workers()
    }

    /// Handle every queued command in arrival order
    ///
    /// Returns the number of commands handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(command) = self.commands.try_receive() {
            debug!("engine: {command:?}");
            if let Err(err) = self.handle(command) {
                warn!("engine: {err}");
            }
            handled += 1;
        }
        if let Err(err) = self.revive_workers() {
            warn!("engine: {err}");
        }
        handled
    }

    fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::ActivateEffect { target, effect } => {
                self.notify(&target, DeviceCommand::ActivateEffect(effect));
            }
            Command::ApplySettings {
                target,
                scope: SettingsScope::Device,
            } => {
                self.notify(&target, DeviceCommand::Reinitialize);
            }
            Command::ApplySettings { .. } => {
                // Picked up by the workers on their next tick
            }
            Command::CreateDevice(device) => {
                if self.config.contains_device(&device) {
                    self.ensure_worker(device)?;
                }
            }
            Command::DeleteDevice(device) => {
                self.stop_worker(&device);
                self.config.delete_device(&device)?;
            }
            Command::ResetSettings | Command::ImportConfig => {
                self.sync_workers()?;
                self.notify(&Target::All, DeviceCommand::Reinitialize);
            }
        }
        Ok(())
    }

    fn notify(&self, target: &Target, command: DeviceCommand) {
        for (device, worker) in &self.workers {
            if target.matches(device) && worker.send(command).is_err() {
                warn!("{device}: command channel full, dropping {command:?}");
            }
        }
    }

    /// Stop workers of removed devices and start workers of new ones
    fn sync_workers(&mut self) -> Result<()> {
        let configured = self.config.device_ids();
        let stale: Vec<DeviceId> = self
            .workers
            .keys()
            .filter(|device| !configured.contains(device))
            .cloned()
            .collect();
        for device in &stale {
            self.stop_worker(device);
        }

        for device in configured {
            self.ensure_worker(device)?;
        }
        Ok(())
    }

    /// Replace workers that exited while their device is still configured
    ///
    /// A worker exits on its own once its device disappears from the
    /// configuration, which a reset followed by a create can undo before the
    /// engine gets to see either command.
    fn revive_workers(&mut self) -> Result<()> {
        let exited: Vec<DeviceId> = self
            .workers
            .iter()
            .filter(|(device, worker)| worker.is_finished() && self.config.contains_device(device))
            .map(|(device, _)| device.clone())
            .collect();
        for device in exited {
            self.ensure_worker(device)?;
        }
        Ok(())
    }

    /// Make sure `device` has a live worker, replacing one that exited
    fn ensure_worker(&mut self, device: DeviceId) -> Result<()> {
        match self.workers.get(&device) {
            Some(worker) if !worker.is_finished() => return Ok(()),
            Some(_) => {
                debug!("{device}: render worker exited, restarting");
                self.stop_worker(&device);
            }
            None => {}
        }
        self.spawn_worker(device)
    }

    fn spawn_worker(&mut self, device: DeviceId) -> Result<()> {
        let worker = DeviceWorker::spawn(device.clone(), Arc::clone(&self.config))?;
        self.outputs.insert(device.clone(), worker.frames());
        self.workers.insert(device, worker);
        Ok(())
    }

    fn stop_worker(&mut self, device: &DeviceId) {
        self.outputs.remove(device);
        if let Some(worker) = self.workers.remove(device) {
            worker.shutdown();
        }
    }

    /// Stop every worker
    pub fn shutdown(mut self) {
        let devices: Vec<DeviceId> = self.workers.keys().cloned().collect();
        for device in &devices {
            self.stop_worker(device);
        }
        info!("engine: stopped");
    }

    /// Start the workers and run the engine on its own thread
    pub fn spawn(mut self, poll_interval: Duration) -> Result<EngineHandle> {
        self.start()?;
        let outputs = self.outputs();
        let cancelled = Arc::new(AtomicBool::new(false));
        let is_cancelled = Arc::clone(&cancelled);

        let handle = thread::Builder::new()
            .name("engine".to_owned())
            .spawn(move || {
                while !is_cancelled.load(Ordering::Acquire) {
                    self.process_pending();
                    thread::sleep(poll_interval);
                }
                self.process_pending();
                self.shutdown();
            })?;

        info!("engine: started");
        Ok(EngineHandle {
            cancelled,
            outputs,
            handle,
        })
    }
}

/// Handle to an engine running on its own thread
pub struct EngineHandle {
    cancelled: Arc<AtomicBool>,
    outputs: Outputs,
    handle: JoinHandle<()>,
}

impl EngineHandle {
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    /// Output queue of `device`
    pub fn frames(&self, device: &DeviceId) -> Option<FrameReceiver> {
        self.outputs.get(device)
    }

    /// Stop the engine and all of its workers, waiting for them to exit
    pub fn stop(self) {
        self.cancelled.store(true, Ordering::Release);
        if self.handle.join().is_err() {
            warn!("engine: thread panicked");
        }
    }
}
