//! Translation from raw hook messages to [`EventRecord`]s.
//!
//! Raw codes use the Windows mouse message numbering, which is also what the
//! mock hook emits.  Only the five relayed kinds are translated; wheel,
//! middle-button, X-button and any unknown codes are dropped here so an
//! unrecognised kind can never reach the buffer or the dispatcher.

use std::sync::Arc;

use pointer_relay_core::{EventKind, EventRecord};

use crate::application::relay::Relay;

use super::HookCallback;

/// `WM_MOUSEMOVE`
pub const RAW_MOUSE_MOVE: u32 = 0x0200;
/// `WM_LBUTTONDOWN`
pub const RAW_LEFT_DOWN: u32 = 0x0201;
/// `WM_LBUTTONUP`
pub const RAW_LEFT_UP: u32 = 0x0202;
/// `WM_RBUTTONDOWN`
pub const RAW_RIGHT_DOWN: u32 = 0x0204;
/// `WM_RBUTTONUP`
pub const RAW_RIGHT_UP: u32 = 0x0205;

/// Maps a raw message code to an [`EventKind`], or `None` if it is not relayed.
pub fn translate(raw_type: u32) -> Option<EventKind> {
    match raw_type {
        RAW_LEFT_DOWN => Some(EventKind::LeftDown),
        RAW_LEFT_UP => Some(EventKind::LeftUp),
        RAW_RIGHT_DOWN => Some(EventKind::RightDown),
        RAW_RIGHT_UP => Some(EventKind::RightUp),
        RAW_MOUSE_MOVE => Some(EventKind::Move),
        _ => None,
    }
}

/// Receives raw hook callbacks and forwards recognised events to a [`Relay`].
#[derive(Clone)]
pub struct HookAdapter {
    relay: Arc<Relay>,
}

impl HookAdapter {
    /// Creates an adapter feeding `relay`.
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }

    /// Handles one raw hook invocation.
    ///
    /// Returns `true` if a record was accepted by the relay.
    pub fn handle_raw_event(&self, raw_type: u32, x: i32, y: i32) -> bool {
        match translate(raw_type) {
            Some(kind) => self.relay.push(EventRecord::new(x, y, kind)),
            None => false,
        }
    }

    /// Wraps the adapter in a [`HookCallback`] suitable for registration.
    pub fn into_callback(self) -> HookCallback {
        Arc::new(move |raw_type, x, y| {
            self.handle_raw_event(raw_type, x, y);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::relay::MockWakeSignal;

    fn make_adapter() -> (HookAdapter, Arc<Relay>) {
        let mut wake = MockWakeSignal::new();
        wake.expect_signal().return_const(());
        let relay = Arc::new(Relay::new(Arc::new(wake)));
        (HookAdapter::new(Arc::clone(&relay)), relay)
    }

    #[test]
    fn test_translate_recognises_the_five_relayed_codes() {
        assert_eq!(translate(0x0200), Some(EventKind::Move));
        assert_eq!(translate(0x0201), Some(EventKind::LeftDown));
        assert_eq!(translate(0x0202), Some(EventKind::LeftUp));
        assert_eq!(translate(0x0204), Some(EventKind::RightDown));
        assert_eq!(translate(0x0205), Some(EventKind::RightUp));
    }

    #[test]
    fn test_translate_rejects_other_mouse_messages() {
        // WM_LBUTTONDBLCLK, WM_RBUTTONDBLCLK, WM_MBUTTONDOWN, WM_MBUTTONUP,
        // WM_MOUSEWHEEL, WM_XBUTTONDOWN, WM_MOUSEHWHEEL
        for raw in [0x0203, 0x0206, 0x0207, 0x0208, 0x020A, 0x020B, 0x020E] {
            assert_eq!(translate(raw), None, "raw code {raw:#06x} must be filtered");
        }
        assert_eq!(translate(0), None);
        assert_eq!(translate(u32::MAX), None);
    }

    #[test]
    fn test_adapter_pushes_recognised_event() {
        // Arrange
        let (adapter, relay) = make_adapter();

        // Act
        let accepted = adapter.handle_raw_event(RAW_LEFT_DOWN, 10, 20);

        // Assert
        assert!(accepted);
        let mut drained = Vec::new();
        relay.drain(|r| drained.push(r));
        assert_eq!(drained, vec![EventRecord::new(10, 20, EventKind::LeftDown)]);
    }

    #[test]
    fn test_adapter_ignores_unrecognised_event_without_side_effects() {
        // Arrange – a wake that would fail the test if signalled
        let mut wake = MockWakeSignal::new();
        wake.expect_signal().never();
        let relay = Arc::new(Relay::new(Arc::new(wake)));
        let adapter = HookAdapter::new(Arc::clone(&relay));

        // Act
        let accepted = adapter.handle_raw_event(0x020A, 1, 1);

        // Assert
        assert!(!accepted);
        assert_eq!(relay.pending(), 0);
    }

    #[test]
    fn test_callback_forwards_to_relay() {
        // Arrange
        let (adapter, relay) = make_adapter();
        let callback = adapter.into_callback();

        // Act
        callback(RAW_MOUSE_MOVE, 3, 4);
        callback(0x0207, 5, 6);

        // Assert
        assert_eq!(relay.pending(), 1);
    }
}
