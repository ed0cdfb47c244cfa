//! Infrastructure layer for pointer-relay.
//!
//! Contains OS- and runtime-facing adapters: the mouse hook, the Tokio wake
//! primitive and consumer loop, the stdout sink, and config file storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `pointer_relay_core`, but the domain crate never imports it.

pub mod hook;
pub mod host;
pub mod sink;
pub mod storage;
pub mod wake;
