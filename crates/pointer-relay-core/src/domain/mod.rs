//! Domain layer: pure value types and data structures.
//!
//! Nothing in here touches the OS, spawns threads, or takes locks.

pub mod event;
pub mod ring_buffer;
