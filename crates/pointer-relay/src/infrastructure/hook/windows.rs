//! Windows low-level mouse hook implementation.
//!
//! Installs a `WH_MOUSE_LL` hook on a dedicated Win32 message-loop thread.
//! The hook procedure has no user-data pointer, so the registered callback is
//! parked in a process-wide slot; only one registration may be active at a
//! time.
//!
//! Unregistering posts `WM_QUIT` to the loop thread and joins it.  The hook
//! procedure only ever runs on that thread, so once the join returns no
//! further callbacks can arrive.  If the post fails the thread is detached
//! rather than joined, and the cleared callback slot keeps the hook silent.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, MSG, MSLLHOOKSTRUCT, PM_NOREMOVE,
    WH_MOUSE_LL, WM_QUIT, WM_USER,
};

use super::{HookCallback, HookError, HookService};

/// Callback of the active registration, read by [`mouse_hook_proc`].
static ACTIVE_CALLBACK: Mutex<Option<HookCallback>> = Mutex::new(None);

fn active_callback() -> MutexGuard<'static, Option<HookCallback>> {
    ACTIVE_CALLBACK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for an installed hook: the loop thread's id and its join handle.
pub struct WindowsHookHandle {
    thread_id: u32,
    thread: JoinHandle<()>,
}

/// `WH_MOUSE_LL` hook service.
#[derive(Debug, Default)]
pub struct WindowsMouseHook;

impl WindowsMouseHook {
    /// Creates a new hook service.  Nothing is installed until `register`.
    pub fn new() -> Self {
        Self
    }
}

impl HookService for WindowsMouseHook {
    type Handle = WindowsHookHandle;

    fn register(&self, callback: HookCallback) -> Result<Self::Handle, HookError> {
        {
            let mut slot = active_callback();
            if slot.is_some() {
                return Err(HookError::RegistrationFailed(
                    "a mouse hook is already registered in this process".to_string(),
                ));
            }
            *slot = Some(callback);
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let spawned = thread::Builder::new()
            .name("pointer-relay-hook".to_string())
            .spawn(move || run_hook_message_loop(ready_tx));

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                *active_callback() = None;
                return Err(HookError::RegistrationFailed(e.to_string()));
            }
        };

        // Wait until the hook is installed (or failed) on the loop thread.
        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                debug!(thread_id, "WH_MOUSE_LL hook installed");
                Ok(WindowsHookHandle { thread_id, thread })
            }
            Ok(Err(reason)) => {
                let _ = thread.join();
                *active_callback() = None;
                Err(HookError::RegistrationFailed(reason))
            }
            Err(_) => {
                let _ = thread.join();
                *active_callback() = None;
                Err(HookError::RegistrationFailed(
                    "hook thread exited before reporting readiness".to_string(),
                ))
            }
        }
    }

    fn unregister(&self, handle: Self::Handle) {
        // SAFETY: PostThreadMessageW only enqueues a message; the target
        // thread created its queue before reporting readiness.
        let posted = unsafe {
            PostThreadMessageW(handle.thread_id, WM_QUIT, WPARAM(0), LPARAM(0))
        };
        match posted {
            Ok(()) => {
                if handle.thread.join().is_err() {
                    warn!("hook thread panicked during shutdown");
                }
            }
            Err(e) => {
                // Without WM_QUIT the loop never ends, so the thread is
                // detached instead of joined.  Clearing the slot below still
                // silences the hook procedure.
                warn!(
                    thread_id = handle.thread_id,
                    "failed to post WM_QUIT to hook thread, detaching it: {e}"
                );
            }
        }
        *active_callback() = None;
        debug!("WH_MOUSE_LL hook removed");
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: mpsc::Sender<Result<u32, String>>) {
    let mut msg = MSG::default();

    // SAFETY: PeekMessageW with PM_NOREMOVE forces creation of this thread's
    // message queue so PostThreadMessageW(WM_QUIT) cannot be lost.
    unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };

    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which this thread does below until WM_QUIT.
    let hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(thread_id));

    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    // GetMessageW returns 0 on WM_QUIT and -1 on error; both end the loop.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            DispatchMessageW(&msg);
        }
        if let Err(e) = UnhookWindowsHookEx(hook) {
            warn!("UnhookWindowsHookEx failed: {e}");
        }
    }
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
        let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        let callback = active_callback().clone();
        if let Some(callback) = callback {
            callback(w_param.0 as u32, mhs.pt.x, mhs.pt.y);
        }
    }

    // SAFETY: Observe-only hook; always forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
