//! Per-device render loop
//!
//! [`DeviceRenderer`] produces one frame per tick, [`FrameScheduler`] paces
//! the ticks and [`DeviceWorker`] runs both on a dedicated thread.

mod device;
mod scheduler;
mod worker;

pub use device::{DeviceRenderer, TickOutcome};
pub use scheduler::{FrameResult, FrameScheduler, frame_duration};
pub use worker::DeviceWorker;
