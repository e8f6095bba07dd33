//! Bounded blocking queue carrying rendered frames to the output stage.
//!
//! Unlike the command [`Channel`](crate::channel::Channel), sending blocks
//! while the queue is full, so a slow consumer slows the producing render
//! loop down instead of losing frames. Closing the queue wakes every
//! blocked side.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;

use crate::OutputDriver;
use crate::error::{Error, Result};
use crate::frame::PixelBuffer;

/// Default output queue capacity per device
pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create a bounded queue holding at most `capacity` items (minimum 1)
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            items: VecDeque::with_capacity(capacity),
            closed: false,
        }),
        not_empty: Condvar::new(),
        not_full: Condvar::new(),
        capacity,
    });
    (
        QueueSender {
            shared: Arc::clone(&shared),
        },
        QueueReceiver { shared },
    )
}

/// Producing side of a [`bounded`] queue
pub struct QueueSender<T> {
    shared: Arc<Shared<T>>,
}

/// Consuming side of a [`bounded`] queue
///
/// Clones share the same queue and compete for items.
pub struct QueueReceiver<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> QueueSender<T> {
    /// Push an item, blocking while the queue is full
    ///
    /// Fails with [`Error::Closed`] once the queue is closed.
    pub fn send(&self, item: T) -> Result<()> {
        let mut state = self.shared.lock();
        while !state.closed && state.items.len() >= self.shared.capacity {
            state = self
                .shared
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            return Err(Error::Closed);
        }
        state.items.push_back(item);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Push an item without blocking
    pub fn try_send(&self, item: T) -> Result<()> {
        let mut state = self.shared.lock();
        if state.closed {
            return Err(Error::Closed);
        }
        if state.items.len() >= self.shared.capacity {
            return Err(Error::Busy);
        }
        state.items.push_back(item);
        self.shared.not_empty.notify_one();
        Ok(())
    }

    /// Current queue depth
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn close(&self) {
        close(&self.shared);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl<T> QueueReceiver<T> {
    /// Pop the oldest item, waiting up to `timeout` for one to arrive
    ///
    /// Returns `None` on timeout or once the queue is closed and empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let state = self.shared.lock();
        let (mut state, _) = self
            .shared
            .not_empty
            .wait_timeout_while(state, timeout, |state| {
                state.items.is_empty() && !state.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        let item = state.items.pop_front();
        if item.is_some() {
            self.shared.not_full.notify_one();
        }
        item
    }

    /// Pop the oldest item, blocking until one arrives
    ///
    /// Returns `None` once the queue is closed and empty.
    pub fn recv(&self) -> Option<T> {
        let mut state = self.shared.lock();
        while state.items.is_empty() && !state.closed {
            state = self
                .shared
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let item = state.items.pop_front();
        if item.is_some() {
            self.shared.not_full.notify_one();
        }
        item
    }

    /// Pop the oldest item without blocking
    pub fn try_recv(&self) -> Option<T> {
        let mut state = self.shared.lock();
        let item = state.items.pop_front();
        if item.is_some() {
            self.shared.not_full.notify_one();
        }
        item
    }

    /// Discard every queued item, returning how many were dropped
    pub fn drain(&self) -> usize {
        let mut state = self.shared.lock();
        let dropped = state.items.len();
        state.items.clear();
        self.shared.not_full.notify_all();
        dropped
    }

    /// Current queue depth
    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        close(&self.shared);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

fn close<T>(shared: &Shared<T>) {
    shared.lock().closed = true;
    shared.not_empty.notify_all();
    shared.not_full.notify_all();
}

/// Producing side of a device output queue
pub type FrameSender = QueueSender<PixelBuffer>;

/// Consuming side of a device output queue
pub type FrameReceiver = QueueReceiver<PixelBuffer>;

/// Create the output queue of a device
pub fn frame_queue(capacity: usize) -> (FrameSender, FrameReceiver) {
    bounded(capacity)
}

impl QueueReceiver<PixelBuffer> {
    /// Write every frame to `driver` until the queue is closed and empty
    ///
    /// Returns the number of frames written.
    pub fn forward<D: OutputDriver>(&self, driver: &mut D) -> usize {
        let mut written = 0;
        while let Some(frame) = self.recv() {
            driver.write(frame.pixels());
            written += 1;
        }
        debug!("output queue closed after {written} frame(s)");
        written
    }
}
