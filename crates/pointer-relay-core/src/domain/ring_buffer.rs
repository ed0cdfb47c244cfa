//! Fixed-capacity ring buffer with an overwrite-on-full policy.
//!
//! # What is a ring buffer? (for beginners)
//!
//! A ring buffer is an array used as a circle: a *write index* marks where the
//! next record goes and a *read index* marks the oldest unread record.  Both
//! indices move forward and wrap back to 0 at the end of the array, so no
//! memory is ever allocated after construction.
//!
//! ```text
//!   capacity = 4, two unread records (B, C)
//!
//!     ┌───┬───┬───┬───┐
//!     │ A │ B │ C │   │
//!     └───┴───┴───┴───┘
//!           ▲       ▲
//!         read    write
//! ```
//!
//! # Overwrite policy
//!
//! `write` never fails and never blocks.  When the buffer already holds
//! `capacity` unread records, the new record replaces the oldest one and the
//! read index moves forward with it.  A producer that outruns the consumer
//! therefore loses its *oldest* events first, and the consumer always sees the
//! most recent `capacity` records in the order they were written.
//!
//! A full buffer and an empty buffer both have `read_index == write_index`,
//! so the buffer also keeps an unread count to tell them apart.
//!
//! # Thread safety
//!
//! None.  `RingBuffer` is a plain data structure; callers that share it across
//! threads must wrap it in a lock (see `Relay` in the `pointer-relay` crate).

use thiserror::Error;

/// Default number of slots, matching the burst size the hook is expected to
/// produce between two consumer wake-ups.
pub const DEFAULT_CAPACITY: usize = 10;

/// Error returned by [`RingBuffer::with_capacity`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// A ring buffer needs at least one slot.
    #[error("ring buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// A fixed-capacity circular store of `Copy` records.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    read_index: usize,
    write_index: usize,
    len: usize,
    overwritten: u64,
}

impl<T: Copy> RingBuffer<T> {
    /// Creates a buffer with [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    /// Creates a buffer with `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::ZeroCapacity`] when `capacity == 0`.
    pub fn with_capacity(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity == 0 {
            return Err(RingBufferError::ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }

    fn allocate(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            read_index: 0,
            write_index: 0,
            len: 0,
            overwritten: 0,
        }
    }

    /// Stores `record` at the write index and advances it.
    ///
    /// Returns `true` when the buffer was full and the oldest unread record
    /// was overwritten.
    pub fn write(&mut self, record: T) -> bool {
        let capacity = self.capacity();
        let overwrote = self.len == capacity;

        // When full, read_index == write_index: the slot we are about to
        // fill holds the oldest unread record.
        self.slots[self.write_index] = Some(record);
        self.write_index = (self.write_index + 1) % capacity;

        if overwrote {
            self.read_index = self.write_index;
            self.overwritten += 1;
        } else {
            self.len += 1;
        }
        overwrote
    }

    /// Removes and returns the oldest unread record, or `None` when empty.
    pub fn read(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let record = self.slots[self.read_index].take();
        self.read_index = (self.read_index + 1) % self.capacity();
        self.len -= 1;
        record
    }

    /// Returns `true` when there is nothing left to read.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` when the next write will overwrite an unread record.
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Number of unread records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Index of the oldest unread record; always in `[0, capacity)`.
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Index the next write lands on; always in `[0, capacity)`.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Total number of records lost to overwrites since construction.
    pub fn overwritten(&self) -> u64 {
        self.overwritten
    }
}

impl<T: Copy> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
