//! Single-consumer, multi-producer handoff queue.
//!
//! Producers call [`HandoffQueue::enqueue`], which never blocks. Exactly one
//! consumer calls [`HandoffQueue::dequeue`], which returns a buffered item
//! immediately or suspends until the next one arrives.
//!
//! The next item lives in one of two places: the FIFO buffer, or the oneshot
//! of the registered waiter. The two are mutually exclusive. A waiter only
//! exists while the buffer is empty, so a direct handoff never overtakes a
//! buffered item.
//!
//! ```text
//!  enqueue ──┬── waiter registered? ──▶ send to waiter (no buffering)
//!            └── otherwise ───────────▶ push to buffer
//!
//!  dequeue ──┬── buffer non-empty? ───▶ pop head (no suspension)
//!            ├── waiter registered? ──▶ QueueError::AlreadyAwaiting
//!            └── otherwise ───────────▶ register waiter, suspend
//! ```

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::QueueError;

/// A queue that hands items directly to a suspended consumer when one exists,
/// and buffers them otherwise.
///
/// # Thread Safety
///
/// `HandoffQueue` is `Send + Sync`; `enqueue` may be called concurrently from
/// any number of tasks. Every critical section is O(1) and never awaits.
pub struct HandoffQueue<T> {
    state: Mutex<State<T>>,
}

struct State<T> {
    buffer: VecDeque<T>,
    waiter: Option<Waiter<T>>,
    /// Incremented for every registered wait.
    generation: u64,
}

struct Waiter<T> {
    generation: u64,
    tx: oneshot::Sender<T>,
}

impl<T> State<T> {
    /// Hands `item` to the registered waiter, or buffers it.
    ///
    /// `front` puts a buffered item back at the head, used when a cancelled
    /// wait returns an item it already received.
    fn deliver(&mut self, item: T, front: bool) {
        let item = match self.waiter.take() {
            Some(waiter) => match waiter.tx.send(item) {
                Ok(()) => return,
                // The waiting future is gone; keep the item.
                Err(item) => item,
            },
            None => item,
        };

        if front {
            self.buffer.push_front(item);
        } else {
            self.buffer.push_back(item);
        }
    }
}

impl<T> HandoffQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                buffer: VecDeque::new(),
                waiter: None,
                generation: 0,
            }),
        }
    }

    /// Adds an item, handing it straight to a waiting consumer if there is one.
    pub fn enqueue(&self, item: T) {
        self.state.lock().deliver(item, false);
    }

    /// Returns the number of buffered items.
    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    /// Returns `true` if no item is buffered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    /// Returns `true` if a consumer is currently suspended in [`dequeue`](Self::dequeue).
    pub fn has_waiter(&self) -> bool {
        self.state.lock().waiter.is_some()
    }

    /// Waits for the next item.
    ///
    /// # Errors
    ///
    /// - [`QueueError::AlreadyAwaiting`] if another `dequeue` is still pending.
    ///   This is a caller error and is never queued.
    /// - [`QueueError::Cancelled`] if `cancel` fires first. The waiter slot is
    ///   released and any item handed over during cancellation is put back at
    ///   the head of the buffer.
    pub async fn dequeue(&self, cancel: &CancellationToken) -> Result<T, QueueError> {
        let mut wait = {
            let mut state = self.state.lock();
            if let Some(item) = state.buffer.pop_front() {
                return Ok(item);
            }
            if state.waiter.is_some() {
                return Err(QueueError::AlreadyAwaiting);
            }

            state.generation = state.generation.wrapping_add(1);
            let generation = state.generation;
            let (tx, rx) = oneshot::channel();
            state.waiter = Some(Waiter { generation, tx });
            trace!(generation, "Registered queue waiter");

            PendingWait {
                queue: self,
                generation,
                rx,
                completed: false,
            }
        };

        tokio::select! {
            biased;
            received = &mut wait.rx => match received {
                Ok(item) => {
                    wait.completed = true;
                    Ok(item)
                }
                // Only our own release path drops the sender.
                Err(_) => Err(QueueError::Cancelled),
            },
            () = cancel.cancelled() => Err(QueueError::Cancelled),
        }
    }
}

impl<T> Default for HandoffQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for HandoffQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HandoffQueue")
            .field("buffered", &state.buffer.len())
            .field("waiting", &state.waiter.is_some())
            .finish()
    }
}

/// A registered wait. Dropping it before completion releases the waiter slot.
struct PendingWait<'a, T> {
    queue: &'a HandoffQueue<T>,
    generation: u64,
    rx: oneshot::Receiver<T>,
    completed: bool,
}

impl<T> Drop for PendingWait<'_, T> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }

        let mut state = self.queue.state.lock();

        // A newer wait may have registered since; leave it alone.
        if state
            .waiter
            .as_ref()
            .is_some_and(|w| w.generation == self.generation)
        {
            state.waiter = None;
            trace!(generation = self.generation, "Released queue waiter");
        }

        // An enqueue may have raced the cancellation.
        if let Ok(item) = self.rx.try_recv() {
            state.deliver(item, true);
        }
    }
}
