// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! FIFO event queue between the alert context and the notifier chain.
//!
//! The PD engine produces events from contexts that must not run listener
//! callbacks inline; they queue here and a later dispatch drains them in
//! order. Dispatch pops one event at a time so a listener that queues more
//! work never deadlocks against the queue lock.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::notifier::{NotifierChain, TcpcEvent};

#[derive(Debug, Default)]
pub(crate) struct EventCore {
    queue: Mutex<VecDeque<TcpcEvent>>,
}

impl EventCore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues `event` for the next dispatch.
    pub(crate) fn push(&self, event: TcpcEvent) {
        self.queue.lock().expect("not poisoned").push_back(event);
    }

    /// Drains the queue in FIFO order into `chain`; returns the number of
    /// events delivered, including any queued by listeners mid-dispatch.
    pub(crate) fn dispatch(&self, chain: &NotifierChain) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.queue.lock().expect("not poisoned").pop_front();
            match next {
                Some(event) => {
                    chain.notify(&event);
                    delivered += 1;
                }
                None => return delivered,
            }
        }
    }

    /// Drops everything still queued; returns the count for the caller to
    /// log. Runs during device release.
    pub(crate) fn deinit(&self) -> usize {
        let mut queue = self.queue.lock().expect("not poisoned");
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.lock().expect("not poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::TcpcNotifier;
    use crate::typec::VbusLevel;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<TcpcEvent>>,
    }

    impl TcpcNotifier for Recorder {
        fn on_event(&self, event: &TcpcEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn dispatch_preserves_fifo_order() {
        let core = EventCore::new();
        let chain = NotifierChain::new();
        let recorder = Arc::new(Recorder::default());
        let _ = chain.register(recorder.clone());

        core.push(TcpcEvent::VbusLevel(VbusLevel::Valid));
        core.push(TcpcEvent::VbusLevel(VbusLevel::Absent));
        assert_eq!(core.pending(), 2);

        assert_eq!(core.dispatch(&chain), 2);
        assert_eq!(core.pending(), 0);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                TcpcEvent::VbusLevel(VbusLevel::Valid),
                TcpcEvent::VbusLevel(VbusLevel::Absent)
            ]
        );
    }

    #[test]
    fn deinit_drops_pending_events() {
        let core = EventCore::new();
        core.push(TcpcEvent::VbusLevel(VbusLevel::Valid));
        assert_eq!(core.deinit(), 1);
        assert_eq!(core.pending(), 0);
    }
}
