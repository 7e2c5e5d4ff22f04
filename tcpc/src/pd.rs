// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Power Delivery core bookkeeping.
//!
//! The PD policy engine itself is out of scope for the registration layer;
//! this module owns the contract state the engine transitions and the
//! init/deinit hooks the device lifecycle calls.

use std::sync::Mutex;

/// Coarse PD contract state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdState {
    /// PD is not running.
    Disabled,
    /// PD brought up, no contract yet.
    Startup,
    /// An explicit contract is in place.
    Ready,
}

#[derive(Debug)]
pub(crate) struct PdCore {
    state: Mutex<PdState>,
}

impl PdCore {
    /// Brings the PD core up; runs at device registration.
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(PdState::Startup) }
    }

    pub(crate) fn state(&self) -> PdState {
        *self.state.lock().expect("not poisoned")
    }

    /// Moves the contract state; returns the previous state.
    pub(crate) fn set_state(&self, next: PdState) -> PdState {
        std::mem::replace(&mut self.state.lock().expect("not poisoned"), next)
    }

    /// Shuts the core down; runs during device release, before the timer
    /// core goes away.
    pub(crate) fn deinit(&self) {
        *self.state.lock().expect("not poisoned") = PdState::Disabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_up_and_shuts_down() {
        let pd = PdCore::new();
        assert_eq!(pd.state(), PdState::Startup);
        assert_eq!(pd.set_state(PdState::Ready), PdState::Startup);
        pd.deinit();
        assert_eq!(pd.state(), PdState::Disabled);
    }
}
