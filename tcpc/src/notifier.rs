// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The per-device event notifier chain.
//!
//! The chain is copy-on-write: registration and unregistration swap in a new
//! snapshot under the lock, and notification walks a snapshot taken with the
//! lock already released. A listener may therefore unregister itself, or any
//! other listener, from inside its own callback without deadlocking the walk
//! that delivered the event. Removal takes effect on the next walk.

use std::sync::{Arc, Mutex};

use crate::error::NotFoundError;
use crate::typec::{AttachState, VbusLevel};

#[cfg(feature = "power-delivery")]
use crate::pd::PdState;

/// Event published on a controller's notifier chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TcpcEvent {
    /// The Type-C connection state changed.
    TypecState {
        /// State before the transition.
        old: AttachState,
        /// State after the transition.
        new: AttachState,
    },
    /// VBUS level tracking changed.
    VbusLevel(VbusLevel),
    /// The PD contract state changed.
    #[cfg(feature = "power-delivery")]
    PdState(PdState),
}

/// A listener on the event chain.
pub trait TcpcNotifier: Send + Sync {
    /// Called once per published event, in registration order.
    fn on_event(&self, event: &TcpcEvent);
}

/// Outcome of a chain registration. Both variants are success; callers must
/// tolerate [`NotifierStatus::AlreadyRegistered`] rather than treat it as an
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifierStatus {
    /// The listener was added to the chain.
    Registered,
    /// The listener was already on the chain; the chain is unchanged.
    AlreadyRegistered,
}

type Snapshot = Arc<Vec<Arc<dyn TcpcNotifier>>>;

#[derive(Default)]
pub(crate) struct NotifierChain {
    entries: Mutex<Snapshot>,
}

impl NotifierChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` unless an identical listener is already registered.
    pub(crate) fn register(&self, listener: Arc<dyn TcpcNotifier>) -> NotifierStatus {
        let mut entries = self.entries.lock().expect("not poisoned");
        if entries.iter().any(|e| Arc::ptr_eq(e, &listener)) {
            return NotifierStatus::AlreadyRegistered;
        }
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(listener);
        *entries = Arc::new(next);
        NotifierStatus::Registered
    }

    /// Removes `listener`, matched by identity.
    pub(crate) fn unregister(
        &self,
        listener: &Arc<dyn TcpcNotifier>,
    ) -> Result<(), NotFoundError> {
        let mut entries = self.entries.lock().expect("not poisoned");
        let next: Vec<_> =
            entries.iter().filter(|e| !Arc::ptr_eq(e, listener)).cloned().collect();
        if next.len() == entries.len() {
            return Err(NotFoundError);
        }
        *entries = Arc::new(next);
        Ok(())
    }

    /// Delivers `event` to every listener on the current snapshot.
    pub(crate) fn notify(&self, event: &TcpcEvent) {
        let snapshot = Arc::clone(&self.entries.lock().expect("not poisoned"));
        for listener in snapshot.iter() {
            listener.on_event(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().expect("not poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<TcpcEvent>>,
    }

    impl TcpcNotifier for Recorder {
        fn on_event(&self, event: &TcpcEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn vbus_event() -> TcpcEvent {
        TcpcEvent::VbusLevel(VbusLevel::Valid)
    }

    #[test]
    fn duplicate_registration_is_tolerated() {
        let chain = NotifierChain::new();
        let listener: Arc<dyn TcpcNotifier> = Arc::new(Recorder::default());

        assert_eq!(chain.register(listener.clone()), NotifierStatus::Registered);
        assert_eq!(chain.register(listener.clone()), NotifierStatus::AlreadyRegistered);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn unregistering_an_absent_listener_reports_not_found() {
        let chain = NotifierChain::new();
        let listener: Arc<dyn TcpcNotifier> = Arc::new(Recorder::default());
        assert_matches!(chain.unregister(&listener), Err(NotFoundError));
    }

    #[test]
    fn events_arrive_in_registration_order() {
        let chain = NotifierChain::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let _ = chain.register(first.clone());
        let _ = chain.register(second.clone());

        chain.notify(&vbus_event());

        assert_eq!(first.events.lock().unwrap().len(), 1);
        assert_eq!(second.events.lock().unwrap().len(), 1);
    }

    /// A listener that unregisters itself from inside its own callback.
    struct SelfRemover {
        chain: Arc<NotifierChain>,
        handle: Mutex<Option<Arc<dyn TcpcNotifier>>>,
        removals: Mutex<Vec<Result<(), NotFoundError>>>,
    }

    impl TcpcNotifier for SelfRemover {
        fn on_event(&self, _event: &TcpcEvent) {
            let handle = self.handle.lock().unwrap().clone().expect("handle installed");
            self.removals.lock().unwrap().push(self.chain.unregister(&handle));
        }
    }

    #[test]
    fn self_unregistration_from_callback_does_not_deadlock() {
        let chain = Arc::new(NotifierChain::new());
        let remover = Arc::new(SelfRemover {
            chain: chain.clone(),
            handle: Mutex::new(None),
            removals: Mutex::new(Vec::new()),
        });
        let handle: Arc<dyn TcpcNotifier> = remover.clone();
        *remover.handle.lock().unwrap() = Some(handle.clone());

        assert_eq!(chain.register(handle), NotifierStatus::Registered);
        chain.notify(&vbus_event());

        // The first walk removed the listener without corrupting the chain.
        assert_matches!(remover.removals.lock().unwrap().as_slice(), [Ok(())]);
        assert_eq!(chain.len(), 0);

        // Removal is effective on the next walk.
        chain.notify(&vbus_event());
        assert_eq!(remover.removals.lock().unwrap().len(), 1);
    }

    #[test]
    fn register_from_callback_is_visible_on_the_next_walk() {
        struct Registrar {
            chain: Arc<NotifierChain>,
            late: Arc<Recorder>,
        }
        impl TcpcNotifier for Registrar {
            fn on_event(&self, _event: &TcpcEvent) {
                let _ = self.chain.register(self.late.clone());
            }
        }

        let chain = Arc::new(NotifierChain::new());
        let late = Arc::new(Recorder::default());
        let registrar: Arc<dyn TcpcNotifier> =
            Arc::new(Registrar { chain: chain.clone(), late: late.clone() });
        let _ = chain.register(registrar);

        chain.notify(&vbus_event());
        assert_eq!(late.events.lock().unwrap().len(), 0);

        chain.notify(&vbus_event());
        assert_eq!(late.events.lock().unwrap().len(), 1);
    }
}
