//! Dispatcher: delivers drained events to the host on the consumer context.
//!
//! Each time the consumer is woken it calls [`Dispatcher::dispatch`], which
//! copies every unread record out of the relay and then invokes the host
//! sink once per record with the record's semantic name.
//!
//! The host sink is *not* called while the relay lock is held.  Records are
//! first copied into a batch (bounded by the relay capacity) and the sink is
//! invoked afterwards, re-checking `stopped` before every call.  A sink that
//! reacts to an event by stopping the relay therefore neither deadlocks nor
//! sees the rest of the batch.

use std::sync::Arc;

use pointer_relay_core::EventRecord;
use tracing::trace;

use super::relay::Relay;

/// The host's event callback, invoked only on the consumer context.
pub trait EventSink: Send + Sync {
    /// Called once per event with its semantic name and screen position.
    fn on_event(&self, name: &str, x: i32, y: i32);
}

impl<F> EventSink for F
where
    F: Fn(&str, i32, i32) + Send + Sync,
{
    fn on_event(&self, name: &str, x: i32, y: i32) {
        self(name, x, y)
    }
}

/// Drains a [`Relay`] and forwards each record to an [`EventSink`].
pub struct Dispatcher {
    relay: Arc<Relay>,
    sink: Option<Arc<dyn EventSink>>,
    batch: Vec<EventRecord>,
}

impl Dispatcher {
    /// Creates a dispatcher delivering to `sink`.
    pub fn new(relay: Arc<Relay>, sink: Arc<dyn EventSink>) -> Self {
        let capacity = relay.capacity();
        Self {
            relay,
            sink: Some(sink),
            batch: Vec::with_capacity(capacity),
        }
    }

    /// Removes the host sink.  Later dispatches still drain the relay but
    /// deliver nothing.
    pub fn detach_sink(&mut self) -> Option<Arc<dyn EventSink>> {
        self.sink.take()
    }

    /// Returns `true` while a host sink is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Drains the relay and delivers every record to the sink, oldest first.
    ///
    /// Returns the number of events delivered to the sink.
    pub fn dispatch(&mut self) -> usize {
        self.batch.clear();
        let batch = &mut self.batch;
        let drained = self.relay.drain(|record| batch.push(record));

        let Some(sink) = self.sink.as_ref() else {
            trace!(drained, "no sink attached, drained events discarded");
            return 0;
        };

        let mut delivered = 0;
        for record in self.batch.drain(..) {
            if self.relay.is_stopped() {
                break;
            }
            sink.on_event(record.name(), record.x, record.y);
            delivered += 1;
        }
        trace!(drained, delivered, "dispatch cycle complete");
        delivered
    }
}
