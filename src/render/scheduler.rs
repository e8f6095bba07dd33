//! Frame pacing without platform timers.
//!
//! The scheduler only does the bookkeeping: it tells the caller how long to
//! wait before the next frame, and the caller sleeps however it likes.

use embassy_time::{Duration, Instant};

/// Frame duration for `fps` frames per second (at least one microsecond)
pub fn frame_duration(fps: u32) -> Duration {
    let micros = 1_000_000 / u64::from(fps.max(1));
    Duration::from_micros(micros.max(1))
}

/// Result of a frame tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    /// The deadline for the next frame.
    pub next_deadline: Instant,
    /// How long to wait until the next frame (zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Frame clock with drift correction.
///
/// Falling behind by more than two frame periods drops the backlog instead
/// of rendering a catch-up burst.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    next_frame: Option<Instant>,
    frame_duration: Duration,
}

impl FrameScheduler {
    pub fn new(fps: u32) -> Self {
        Self {
            next_frame: None,
            frame_duration: frame_duration(fps),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Change the target rate, effective from the next frame on
    pub fn set_fps(&mut self, fps: u32) {
        self.frame_duration = frame_duration(fps);
    }

    /// Account for a frame rendered at `now` and compute the next deadline
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        let max_drift = self.frame_duration * 2;
        let scheduled = match self.next_frame {
            Some(next) if now <= next + max_drift => next,
            _ => now,
        };

        let next_frame = scheduled + self.frame_duration;
        self.next_frame = Some(next_frame);

        FrameResult {
            next_deadline: next_frame,
            sleep_duration: next_frame
                .checked_duration_since(now)
                .unwrap_or(Duration::from_ticks(0)),
        }
    }
}
