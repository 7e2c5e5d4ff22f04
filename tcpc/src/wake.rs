// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Suspend-blocking wake leases.
//!
//! The governor is a system-wide resource: suspend is allowed only while no
//! lease is outstanding anywhere in the process. Devices own named
//! [`WakeLock`] sources and take a [`WakeLease`] to bracket a window that
//! must not be interrupted by suspend; dropping the lease closes the window.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, LazyLock};

static GLOBAL_GOVERNOR: LazyLock<WakeGovernor> = LazyLock::new(WakeGovernor::new);

/// Counts outstanding wake leases and answers whether suspend is allowed.
#[derive(Clone, Debug, Default)]
pub struct WakeGovernor {
    inner: Arc<GovernorInner>,
}

#[derive(Debug, Default)]
struct GovernorInner {
    active: AtomicU32,
}

impl WakeGovernor {
    /// Creates an isolated governor. Production code shares [`global`];
    /// isolated governors exist for tests.
    ///
    /// [`global`]: WakeGovernor::global
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide governor.
    pub fn global() -> &'static WakeGovernor {
        &GLOBAL_GOVERNOR
    }

    /// True while no lease is outstanding.
    pub fn suspend_allowed(&self) -> bool {
        self.inner.active.load(Ordering::Acquire) == 0
    }

    /// Outstanding lease count.
    pub fn active_leases(&self) -> u32 {
        self.inner.active.load(Ordering::Acquire)
    }

    fn acquire(&self) {
        let _ = self.inner.active.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self) {
        let previous = self.inner.active.fetch_sub(1, Ordering::AcqRel);
        debug_assert_ne!(previous, 0, "wake lease released twice");
    }
}

/// A named source of wake leases, owned by one device.
#[derive(Debug)]
pub struct WakeLock {
    governor: WakeGovernor,
    name: String,
}

impl WakeLock {
    /// Creates a lock handing out leases against `governor`.
    pub fn new(governor: &WakeGovernor, name: impl Into<String>) -> Self {
        Self { governor: governor.clone(), name: name.into() }
    }

    /// Name the lock was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Takes a lease. The system stays out of suspend until the returned
    /// lease is dropped.
    pub fn take_lease(&self) -> WakeLease {
        self.governor.acquire();
        log::trace!("wake lease taken: {}", self.name);
        WakeLease { governor: self.governor.clone(), name: self.name.clone() }
    }
}

/// An outstanding suspend block. Dropping it releases the hold.
#[derive(Debug)]
pub struct WakeLease {
    governor: WakeGovernor,
    name: String,
}

impl Drop for WakeLease {
    fn drop(&mut self) {
        self.governor.release();
        log::trace!("wake lease released: {}", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_blocks_suspend_until_dropped() {
        let governor = WakeGovernor::new();
        let lock = WakeLock::new(&governor, "test_attach_wakelock");
        assert!(governor.suspend_allowed());

        let lease = lock.take_lease();
        assert!(!governor.suspend_allowed());

        drop(lease);
        assert!(governor.suspend_allowed());
    }

    #[test]
    fn leases_from_different_locks_stack() {
        let governor = WakeGovernor::new();
        let attach = WakeLock::new(&governor, "attach");
        let detach = WakeLock::new(&governor, "detach");

        let a = attach.take_lease();
        let b = detach.take_lease();
        assert_eq!(governor.active_leases(), 2);

        drop(a);
        assert!(!governor.suspend_allowed());
        drop(b);
        assert!(governor.suspend_allowed());
    }
}
