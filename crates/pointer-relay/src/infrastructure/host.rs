//! Host wiring: the consumer event loop and the object exposed to the host.
//!
//! [`PointerRelay::start`] builds the whole pipeline:
//!
//! ```text
//!   hook thread                          Tokio consumer task
//!   ───────────                          ───────────────────
//!   HookService ─► HookAdapter ─► Relay ─┐
//!                                   │    │ wake.wait()
//!                                   └─► TokioWake ─► Dispatcher ─► EventSink
//! ```
//!
//! The consumer task exits once the wake primitive is closed, which happens as
//! part of `destroy()` (or when the `PointerRelay` is dropped).

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::application::dispatch::{Dispatcher, EventSink};
use crate::application::lifecycle::{LifecycleController, LifecycleError, LifecycleState};
use crate::application::relay::{Relay, WakeSignal};
use crate::infrastructure::hook::HookService;
use crate::infrastructure::wake::TokioWake;

/// Runs the consumer loop until `wake` is closed.
///
/// Returns the total number of events delivered to the sink.
pub async fn run_consumer_loop(wake: Arc<TokioWake>, mut dispatcher: Dispatcher) -> u64 {
    let mut delivered: u64 = 0;
    while wake.wait().await {
        let count = dispatcher.dispatch();
        delivered += count as u64;
        trace!(count, "consumer woke");
    }
    debug!(delivered, "consumer loop finished");
    delivered
}

/// Spawns [`run_consumer_loop`] on the current Tokio runtime.
pub fn spawn_consumer(wake: Arc<TokioWake>, dispatcher: Dispatcher) -> JoinHandle<u64> {
    tokio::spawn(run_consumer_loop(wake, dispatcher))
}

/// A running relay as seen by the host: control surface plus consumer task.
pub struct PointerRelay<H: HookService> {
    controller: LifecycleController<H>,
    wake: Arc<TokioWake>,
    consumer: JoinHandle<u64>,
}

impl<H: HookService> PointerRelay<H> {
    /// Registers the hook and starts delivering events to `sink`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::Buffer`] if `capacity` is zero.
    /// - [`LifecycleError::Hook`] if the hook could not be registered.
    pub fn start(
        hook_service: H,
        sink: Arc<dyn EventSink>,
        capacity: usize,
    ) -> Result<Self, LifecycleError> {
        let wake = Arc::new(TokioWake::new());
        let signal: Arc<dyn WakeSignal> = Arc::clone(&wake) as Arc<dyn WakeSignal>;
        let relay = Arc::new(Relay::with_capacity(capacity, Arc::clone(&signal))?);

        let controller = LifecycleController::new(hook_service, Arc::clone(&relay), signal);
        controller.start()?;

        let consumer = spawn_consumer(Arc::clone(&wake), Dispatcher::new(relay, sink));
        Ok(Self {
            controller,
            wake,
            consumer,
        })
    }

    /// Stops the relay: unregisters the hook and ends the consumer loop.
    /// Idempotent.
    pub fn destroy(&self) {
        self.controller.destroy();
    }

    /// Keep-alive hint: ask the host to stay alive for this relay.
    pub fn add_ref(&self) {
        self.controller.add_ref();
    }

    /// Keep-alive hint: let the host exit even while this relay is running.
    pub fn remove_ref(&self) {
        self.controller.remove_ref();
    }

    /// Current keep-alive state.  Only a flag: the embedding host decides
    /// whether an unreferenced relay lets it exit.
    pub fn is_referenced(&self) -> bool {
        self.wake.is_referenced()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    /// The underlying relay, for diagnostics.
    pub fn relay(&self) -> &Arc<Relay> {
        self.controller.relay()
    }

    /// Stops the relay and waits for the consumer task to finish.
    ///
    /// Returns the number of events delivered over the relay's lifetime.
    pub async fn shutdown(self) -> u64 {
        self.controller.stop();
        let Self {
            controller,
            consumer,
            ..
        } = self;
        drop(controller);
        consumer.await.unwrap_or_else(|e| {
            warn!("consumer task ended abnormally: {e}");
            0
        })
    }
}
