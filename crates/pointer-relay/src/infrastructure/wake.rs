//! Tokio-backed wake primitive.
//!
//! [`TokioWake`] implements [`WakeSignal`] on top of [`tokio::sync::Notify`].
//! `Notify::notify_one` stores a single permit when nobody is waiting, so a
//! burst of signals from the hook thread collapses into one wake-up of the
//! consumer task, which then drains everything in one pass.
//!
//! # Keep-alive hints
//!
//! `add_ref`/`remove_ref` only flip a flag.  The host decides what "keep the
//! loop alive" means by reading [`TokioWake::is_referenced`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

use crate::application::relay::WakeSignal;

/// Wake primitive connecting the hook thread to a Tokio consumer task.
#[derive(Debug)]
pub struct TokioWake {
    notify: Notify,
    armed: AtomicBool,
    closed: AtomicBool,
    referenced: AtomicBool,
    signals: AtomicU64,
}

impl TokioWake {
    /// Creates an unarmed, referenced wake primitive.
    pub fn new() -> Self {
        Self {
            notify: Notify::new(),
            armed: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            referenced: AtomicBool::new(true),
            signals: AtomicU64::new(0),
        }
    }

    /// Waits for the next wake-up.
    ///
    /// Returns `false` once the primitive has been closed; the consumer loop
    /// should then exit.
    pub async fn wait(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.notify.notified().await;
        !self.is_closed()
    }

    /// Returns `true` after [`WakeSignal::arm`] and before close.
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Returns `true` once closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Keep-alive state as last set by `add_ref`/`remove_ref`.
    pub fn is_referenced(&self) -> bool {
        self.referenced.load(Ordering::Relaxed)
    }

    /// Number of signals delivered while armed.
    pub fn signal_count(&self) -> u64 {
        self.signals.load(Ordering::Relaxed)
    }
}

impl Default for TokioWake {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeSignal for TokioWake {
    fn arm(&self) {
        if !self.is_closed() {
            self.armed.store(true, Ordering::Release);
        }
    }

    fn signal(&self) {
        if self.is_armed() && !self.is_closed() {
            self.signals.fetch_add(1, Ordering::Relaxed);
            self.notify.notify_one();
        }
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.armed.store(false, Ordering::Release);
            // Release a consumer parked in `wait` so it can observe `closed`.
            self.notify.notify_one();
        }
    }

    fn add_ref(&self) {
        self.referenced.store(true, Ordering::Relaxed);
    }

    fn remove_ref(&self) {
        self.referenced.store(false, Ordering::Relaxed);
    }
}
