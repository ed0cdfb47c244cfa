//! Mouse hook infrastructure.
//!
//! On Windows, [`windows::WindowsMouseHook`] installs a `WH_MOUSE_LL` hook on a
//! dedicated Win32 message-loop thread.  Every hook callback is routed through
//! the [`adapter::HookAdapter`], which drops anything that is not one of the
//! five relayed kinds and pushes the rest into the `Relay`.
//!
//! # Windows-Specific Implementation
//!
//! Low-level hook callbacks must complete within ~300ms or Windows silently
//! removes the hook.  The callback therefore does nothing but a short,
//! bounded `Relay::push`; all delivery happens later on the consumer.
//!
//! # Testability
//!
//! The [`HookService`] trait lets tests drive the relay with synthetic events
//! through [`mock::MockHookService`] instead of a real OS hook.

use std::sync::Arc;

pub mod adapter;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Callback invoked by a hook service for every raw mouse message.
///
/// Arguments are the raw message code (Windows `WM_*` numbering) and the
/// cursor position in screen coordinates.  May be called from any thread.
pub type HookCallback = Arc<dyn Fn(u32, i32, i32) + Send + Sync>;

/// Error type for hook registration.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to install mouse hook: {0}")]
    RegistrationFailed(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Capability interface over an OS-level mouse hook.
///
/// The relay never assumes which thread invokes the callback.  The only
/// guarantee it relies on is that no callback runs after [`unregister`]
/// returns.
///
/// [`unregister`]: HookService::unregister
pub trait HookService: Send + Sync {
    /// Opaque token identifying one active registration.
    type Handle: Send;

    /// Installs the hook; `callback` receives every raw mouse message.
    fn register(&self, callback: HookCallback) -> Result<Self::Handle, HookError>;

    /// Removes the hook.  No further callbacks may arrive once this returns.
    fn unregister(&self, handle: Self::Handle);
}
