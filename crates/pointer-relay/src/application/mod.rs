//! Application layer: the cross-thread relay and the code that drives it.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The *application* layer sits between the domain (pure value types and the
//! ring buffer in `pointer-relay-core`) and the infrastructure (OS hooks, the
//! Tokio event loop, config files).  Code in here depends on traits such as
//! [`relay::WakeSignal`] and [`dispatch::EventSink`] rather than on concrete
//! implementations, so every piece can be unit-tested without an OS hook.
//!
//! # Sub-modules
//!
//! - **`relay`**     – The synchronisation core: a ring buffer, one mutex, a
//!   permanent `stopped` flag, and a wake primitive.  `push` runs on the
//!   producer (hook) thread, `drain` on the consumer.
//!
//! - **`dispatch`**  – Runs on the consumer when woken: drains the relay and
//!   hands `(name, x, y)` to the host sink.
//!
//! - **`lifecycle`** – The `Created → Running → Stopped` state machine that
//!   registers the hook on start and tears everything down exactly once.

pub mod dispatch;
pub mod lifecycle;
pub mod relay;
