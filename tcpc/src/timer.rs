// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Software timers backing the Type-C state machines.
//!
//! Three locks with distinct jobs: the timer mutex serializes arming against
//! shutdown, the enable-mask gate covers mask reads and writes, and the tick
//! counter sits behind its own lock so the interrupt-context fast path never
//! contends with arming.

use std::sync::Mutex;

use crate::error::TimerStoppedError;

/// Timers a port controller drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TcpcTimer {
    /// CC debounce before reporting an attach.
    CcDebounce,
    /// PD-level debounce before reporting a detach.
    PdDebounce,
    /// DRP try-role window.
    DrpTry,
    /// DRP try-wait window.
    DrpTryWait,
    /// Error recovery interval.
    ErrorRecovery,
}

impl TcpcTimer {
    fn mask_bit(self) -> u64 {
        1 << (self as u64)
    }
}

#[derive(Debug)]
struct TimerState {
    stopped: bool,
}

/// Per-device timer bookkeeping.
#[derive(Debug)]
pub struct TimerCore {
    timer_lock: Mutex<TimerState>,
    enable_mask: Mutex<u64>,
    tick: Mutex<u64>,
}

impl TimerCore {
    pub(crate) fn new() -> Self {
        Self {
            timer_lock: Mutex::new(TimerState { stopped: false }),
            enable_mask: Mutex::new(0),
            tick: Mutex::new(0),
        }
    }

    /// Arms `timer`. Fails once the core is shut down.
    pub fn enable(&self, timer: TcpcTimer) -> Result<(), TimerStoppedError> {
        let state = self.timer_lock.lock().expect("not poisoned");
        if state.stopped {
            return Err(TimerStoppedError);
        }
        *self.enable_mask.lock().expect("not poisoned") |= timer.mask_bit();
        Ok(())
    }

    /// Disarms `timer`. Safe at any point in the device lifetime.
    pub fn disable(&self, timer: TcpcTimer) {
        let _state = self.timer_lock.lock().expect("not poisoned");
        *self.enable_mask.lock().expect("not poisoned") &= !timer.mask_bit();
    }

    /// Whether `timer` is currently armed.
    pub fn is_enabled(&self, timer: TcpcTimer) -> bool {
        *self.enable_mask.lock().expect("not poisoned") & timer.mask_bit() != 0
    }

    /// The raw enable mask.
    pub fn enabled_mask(&self) -> u64 {
        *self.enable_mask.lock().expect("not poisoned")
    }

    /// Advances the tick counter from the driver's interrupt context and
    /// returns the new count.
    pub fn tick(&self) -> u64 {
        let mut tick = self.tick.lock().expect("not poisoned");
        *tick += 1;
        *tick
    }

    /// Ticks observed so far.
    pub fn tick_count(&self) -> u64 {
        *self.tick.lock().expect("not poisoned")
    }

    /// Stops the core: clears the mask and rejects further arming.
    /// Idempotent; runs during device release.
    pub(crate) fn deinit(&self) {
        let mut state = self.timer_lock.lock().expect("not poisoned");
        state.stopped = true;
        *self.enable_mask.lock().expect("not poisoned") = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn arming_sets_and_clears_mask_bits() {
        let timers = TimerCore::new();
        timers.enable(TcpcTimer::CcDebounce).unwrap();
        timers.enable(TcpcTimer::ErrorRecovery).unwrap();
        assert!(timers.is_enabled(TcpcTimer::CcDebounce));
        assert!(!timers.is_enabled(TcpcTimer::PdDebounce));

        timers.disable(TcpcTimer::CcDebounce);
        assert!(!timers.is_enabled(TcpcTimer::CcDebounce));
        assert!(timers.is_enabled(TcpcTimer::ErrorRecovery));
    }

    #[test]
    fn shutdown_clears_the_mask_and_rejects_arming() {
        let timers = TimerCore::new();
        timers.enable(TcpcTimer::DrpTry).unwrap();

        timers.deinit();
        assert_eq!(timers.enabled_mask(), 0);
        assert_matches!(timers.enable(TcpcTimer::DrpTry), Err(TimerStoppedError));

        // Disarm stays a no-op rather than an error.
        timers.disable(TcpcTimer::DrpTry);
    }

    #[test]
    fn ticks_accumulate() {
        let timers = TimerCore::new();
        assert_eq!(timers.tick(), 1);
        assert_eq!(timers.tick(), 2);
        assert_eq!(timers.tick_count(), 2);
    }
}
