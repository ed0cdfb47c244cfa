//! # pointer-relay-core
//!
//! Shared domain library for pointer-relay: the pointer event value types and
//! the fixed-capacity ring buffer that sits between the OS input hook and the
//! consumer event loop.
//!
//! This crate has zero dependencies on OS APIs, async runtimes, or threads.
//! Synchronisation is the job of the `Relay` in the `pointer-relay` crate.
//!
//! # Architecture overview (for beginners)
//!
//! An OS-level mouse hook fires on a thread we do not control (the
//! *producer*).  The application wants to see those events on its own event
//! loop (the *consumer*).  Between the two sits a small ring buffer:
//!
//! - **`domain::event`** – `EventRecord` (position + kind) and `EventKind`,
//!   including the stable semantic names delivered to the host
//!   (`"left-down"`, `"move"`, ...).
//!
//! - **`domain::ring_buffer`** – `RingBuffer`, a fixed-capacity circular
//!   store.  When the producer outruns the consumer the oldest unread record
//!   is overwritten rather than blocking the hook thread.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `pointer_relay_core::EventRecord` instead of the full module path.
pub use domain::event::{EventKind, EventRecord};
pub use domain::ring_buffer::{RingBuffer, RingBufferError, DEFAULT_CAPACITY};
