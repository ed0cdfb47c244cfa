//! Mock hook service for unit and integration testing.
//!
//! Allows tests to inject synthetic raw mouse messages without an OS hook.
//! The service is `Clone`; every clone observes the same registration, so a
//! test can keep one clone for injection and hand another to the lifecycle
//! controller.
//!
//! Injection holds a read lock on the callback slot for the duration of the
//! callback, and `unregister` takes the write lock.  `unregister` therefore
//! waits for in-flight callbacks, matching the real hook's guarantee that no
//! callback runs after it returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::{HookCallback, HookError, HookService};

/// Handle returned by [`MockHookService::register`].
#[derive(Debug, PartialEq, Eq)]
pub struct MockHookHandle(pub u32);

#[derive(Default)]
struct MockHookState {
    next_handle: u32,
    active_handle: Option<u32>,
    register_calls: u32,
    unregister_calls: u32,
    fail_registration: Option<String>,
}

/// A mock implementation of [`HookService`] that lets tests inject events.
#[derive(Clone, Default)]
pub struct MockHookService {
    state: Arc<Mutex<MockHookState>>,
    callback: Arc<RwLock<Option<HookCallback>>>,
}

impl MockHookService {
    /// Creates a new mock hook service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose next registration fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        let service = Self::new();
        service.lock().fail_registration = Some(reason.to_string());
        service
    }

    fn lock(&self) -> MutexGuard<'_, MockHookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers a raw message as if the OS hook had fired.
    ///
    /// Returns `false` (and does nothing) when no hook is registered.
    pub fn inject(&self, raw_type: u32, x: i32, y: i32) -> bool {
        let slot = self.callback.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(callback) => {
                callback(raw_type, x, y);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a hook is registered.
    pub fn is_registered(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of times [`HookService::register`] was called.
    pub fn register_calls(&self) -> u32 {
        self.lock().register_calls
    }

    /// Number of times [`HookService::unregister`] was called.
    pub fn unregister_calls(&self) -> u32 {
        self.lock().unregister_calls
    }
}

impl HookService for MockHookService {
    type Handle = MockHookHandle;

    fn register(&self, callback: HookCallback) -> Result<Self::Handle, HookError> {
        let mut state = self.lock();
        state.register_calls += 1;
        if let Some(reason) = state.fail_registration.take() {
            return Err(HookError::RegistrationFailed(reason));
        }
        if state.active_handle.is_some() {
            return Err(HookError::RegistrationFailed(
                "a mouse hook is already registered".to_string(),
            ));
        }
        state.next_handle += 1;
        let id = state.next_handle;
        state.active_handle = Some(id);
        *self.callback.write().unwrap_or_else(PoisonError::into_inner) = Some(callback);
        Ok(MockHookHandle(id))
    }

    fn unregister(&self, handle: Self::Handle) {
        let mut state = self.lock();
        state.unregister_calls += 1;
        if state.active_handle == Some(handle.0) {
            state.active_handle = None;
            // Blocks until every in-flight `inject` has returned.
            *self.callback.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_callback() -> (HookCallback, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let callback: HookCallback = Arc::new(move |_, _, _| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    #[test]
    fn test_mock_hook_delivers_injected_events_after_register() {
        // Arrange
        let service = MockHookService::new();
        let (callback, count) = counting_callback();
        service.register(callback).expect("register should succeed");

        // Act
        service.inject(0x0200, 1, 2);
        service.inject(0x0201, 3, 4);

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(service.is_registered());
    }

    #[test]
    fn test_mock_hook_inject_before_register_is_ignored() {
        let service = MockHookService::new();
        assert!(!service.inject(0x0200, 0, 0));
    }

    #[test]
    fn test_mock_hook_stops_delivering_after_unregister() {
        // Arrange
        let service = MockHookService::new();
        let (callback, count) = counting_callback();
        let handle = service.register(callback).unwrap();

        // Act
        service.unregister(handle);
        let delivered = service.inject(0x0200, 1, 1);

        // Assert
        assert!(!delivered);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(service.unregister_calls(), 1);
    }

    #[test]
    fn test_mock_hook_failing_registration_returns_error() {
        // Arrange
        let service = MockHookService::failing("access denied");
        let (callback, _) = counting_callback();

        // Act
        let result = service.register(callback);

        // Assert
        assert!(matches!(result, Err(HookError::RegistrationFailed(ref r)) if r == "access denied"));
        assert!(!service.is_registered());
    }

    #[test]
    fn test_mock_hook_rejects_second_registration() {
        let service = MockHookService::new();
        let (first, _) = counting_callback();
        let (second, _) = counting_callback();
        service.register(first).unwrap();

        assert!(service.register(second).is_err());
        assert_eq!(service.register_calls(), 2);
    }

    #[test]
    fn test_mock_hook_clones_share_state() {
        let service = MockHookService::new();
        let observer = service.clone();
        let (callback, count) = counting_callback();
        service.register(callback).unwrap();

        observer.inject(0x0200, 0, 0);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
