//! Relay: the producer/consumer hand-off at the heart of pointer-relay.
//!
//! The OS hook calls [`Relay::push`] on a thread we do not own.  The consumer
//! event loop calls [`Relay::drain`] after it has been woken.  Everything
//! mutable (both ring-buffer indices, the slots, and the `stopped` flag) lives
//! behind a single [`Mutex`], so the two sides always observe them as one unit.
//!
//! # Locking discipline
//!
//! - `push` holds the lock for one ring-buffer write plus one wake signal.
//!   The wake is signalled while the lock is still held, so a woken consumer
//!   is guaranteed to find the record.
//! - `drain` holds the lock for the whole drain loop.  The consumer is
//!   single-threaded and never re-enters the relay from inside `drain`, the
//!   burst is bounded by the buffer capacity, and the callback only copies
//!   records out.  A producer arriving mid-drain waits at most that long.
//! - `stop` flips `stopped` under the lock.  Once set it is never cleared:
//!   every later `push` is dropped and every later `drain` returns at once.
//!
//! A poisoned mutex is recovered rather than propagated: the guarded state is
//! plain indices and `Copy` records, and a panic elsewhere cannot leave it
//! half-written in a way the next operation would misread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pointer_relay_core::{EventRecord, RingBuffer, RingBufferError};
use tracing::{debug, trace};

/// Cross-context signal that tells the consumer there is unread data.
///
/// Implementations must be safe to `signal` from the producer thread while
/// the consumer concurrently arms or closes them.  `signal` must never block.
#[cfg_attr(test, mockall::automock)]
pub trait WakeSignal: Send + Sync {
    /// Enables delivery of wake-ups to the consumer.
    fn arm(&self);

    /// Wakes the consumer.  Repeated signals before the consumer runs may be
    /// coalesced into a single wake-up.
    fn signal(&self);

    /// Permanently disables the signal and releases the consumer.
    fn close(&self);

    /// Keep-alive hint: the host should keep running while this is referenced.
    fn add_ref(&self);

    /// Keep-alive hint: the host may exit even though this is still open.
    fn remove_ref(&self);
}

/// State guarded by the relay mutex.
#[derive(Debug)]
struct RelayState {
    buffer: RingBuffer<EventRecord>,
    stopped: bool,
}

/// Thread-safe bounded hand-off of [`EventRecord`]s from producer to consumer.
pub struct Relay {
    state: Mutex<RelayState>,
    wake: Arc<dyn WakeSignal>,
}

impl Relay {
    /// Creates a relay with the default buffer capacity.
    pub fn new(wake: Arc<dyn WakeSignal>) -> Self {
        Self::from_buffer(RingBuffer::new(), wake)
    }

    /// Creates a relay holding at most `capacity` unread records.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::ZeroCapacity`] when `capacity == 0`.
    pub fn with_capacity(
        capacity: usize,
        wake: Arc<dyn WakeSignal>,
    ) -> Result<Self, RingBufferError> {
        Ok(Self::from_buffer(RingBuffer::with_capacity(capacity)?, wake))
    }

    fn from_buffer(buffer: RingBuffer<EventRecord>, wake: Arc<dyn WakeSignal>) -> Self {
        Self {
            state: Mutex::new(RelayState {
                buffer,
                stopped: false,
            }),
            wake,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Producer side: stores `record` and wakes the consumer.
    ///
    /// Returns `false` when the relay is stopped and the record was dropped.
    /// A full buffer is not a failure: the oldest unread record is replaced.
    pub fn push(&self, record: EventRecord) -> bool {
        let mut state = self.lock();
        if state.stopped {
            return false;
        }
        if state.buffer.write(record) {
            trace!(
                overwritten = state.buffer.overwritten(),
                "relay buffer full, oldest event overwritten"
            );
        }
        self.wake.signal();
        true
    }

    /// Consumer side: hands every unread record to `f`, oldest first.
    ///
    /// Stops early if the relay is stopped.  Returns the number of records
    /// passed to `f`.  `f` runs with the relay lock held and must not call
    /// back into this relay.
    pub fn drain<F>(&self, mut f: F) -> usize
    where
        F: FnMut(EventRecord),
    {
        let mut state = self.lock();
        let mut drained = 0;
        while !state.buffer.is_empty() && !state.stopped {
            let Some(record) = state.buffer.read() else {
                break;
            };
            f(record);
            drained += 1;
        }
        drained
    }

    /// Marks the relay stopped.  Idempotent.
    ///
    /// Returns `true` only for the call that performed the transition, so the
    /// caller can release external resources exactly once.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if state.stopped {
            return false;
        }
        state.stopped = true;
        debug!(
            pending = state.buffer.len(),
            overwritten = state.buffer.overwritten(),
            "relay stopped"
        );
        true
    }

    /// Returns `true` once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.lock().stopped
    }

    /// Number of unread records.
    pub fn pending(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Maximum number of unread records held before overwriting.
    pub fn capacity(&self) -> usize {
        self.lock().buffer.capacity()
    }

    /// Records lost to buffer overwrites since construction.
    pub fn overwritten(&self) -> u64 {
        self.lock().buffer.overwritten()
    }

    /// Current `(read_index, write_index)`, read atomically under the lock.
    pub fn indices(&self) -> (usize, usize) {
        let state = self.lock();
        (state.buffer.read_index(), state.buffer.write_index())
    }
}
