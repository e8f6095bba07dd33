//! Bounded non-blocking command channel.
//!
//! Backed by a `heapless::Deque` guarded by a `critical-section` mutex and
//! shared between its handles through an `Arc`, so senders can live on the
//! control plane while the receiver is drained by a render or engine thread
//! between frames. Neither side ever blocks.

use core::cell::RefCell;
use std::sync::Arc;

use critical_section::Mutex;
use heapless::Deque;

use crate::error::Error;

/// The channel was full, the rejected value is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

impl<T> TrySendError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<TrySendError<T>> for Error {
    fn from(_: TrySendError<T>) -> Self {
        Self::Busy
    }
}

/// The channel was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// FIFO of at most `SIZE` values.
pub struct Channel<T, const SIZE: usize> {
    queue: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> Channel<T, SIZE> {
    /// Create a channel and return its two handles.
    pub fn split() -> (Sender<T, SIZE>, Receiver<T, SIZE>) {
        let channel = Arc::new(Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        });
        let sender = Sender {
            channel: Arc::clone(&channel),
        };
        (sender, Receiver { channel })
    }

    fn with_queue<R>(&self, f: impl FnOnce(&mut Deque<T, SIZE>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.queue.borrow(cs).borrow_mut()))
    }
}

/// Producing handle of a [`Channel`]; clones feed the same queue.
pub struct Sender<T, const SIZE: usize> {
    channel: Arc<Channel<T, SIZE>>,
}

impl<T, const SIZE: usize> Clone for Sender<T, SIZE> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<T, const SIZE: usize> Sender<T, SIZE> {
    /// Queue `value`, handing it back if the channel is full.
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.channel
            .with_queue(|queue| queue.push_back(value))
            .map_err(TrySendError)
    }

    pub fn is_full(&self) -> bool {
        self.channel.with_queue(|queue| queue.is_full())
    }

    pub const fn capacity(&self) -> usize {
        SIZE
    }
}

/// Consuming handle of a [`Channel`].
pub struct Receiver<T, const SIZE: usize> {
    channel: Arc<Channel<T, SIZE>>,
}

impl<T, const SIZE: usize> Receiver<T, SIZE> {
    /// Take the oldest value, if any.
    pub fn try_receive(&self) -> Result<T, TryReceiveError> {
        self.channel
            .with_queue(Deque::pop_front)
            .ok_or(TryReceiveError)
    }

    /// Take every queued value in arrival order.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        core::iter::from_fn(|| self.try_receive().ok())
    }

    pub fn len(&self) -> usize {
        self.channel.with_queue(|queue| queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
