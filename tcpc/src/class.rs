// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The device class: a process-wide registry of port controllers.
//!
//! The class holds weak references. A device lives as long as someone holds
//! a strong handle to it; unregistration removes it from lookups, and the
//! release sequence runs when the last strong handle drops. All registry
//! state sits behind one mutex; lookups return a strong handle or nothing.

use log::{error, info};

use std::any::Any;
use std::sync::{Arc, LazyLock, Mutex, Weak};

use crate::desc::TcpcDesc;
use crate::device::TcpcDevice;
use crate::error::RegisterError;
use crate::ops::TcpcOps;
use crate::wake::WakeGovernor;

static GLOBAL_CLASS: LazyLock<TcpcClass> = LazyLock::new(TcpcClass::new);

/// Registry of port controller devices.
#[derive(Debug)]
pub struct TcpcClass {
    devices: Mutex<Vec<Weak<TcpcDevice>>>,
    wake_governor: WakeGovernor,
}

impl Default for TcpcClass {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpcClass {
    /// Creates a class whose devices lease against the process-wide wake
    /// governor.
    pub fn new() -> Self {
        Self::with_wake_governor(WakeGovernor::global().clone())
    }

    /// Creates a class leasing against `wake_governor`. Tests use this to
    /// observe suspend state in isolation.
    pub fn with_wake_governor(wake_governor: WakeGovernor) -> Self {
        Self { devices: Mutex::new(Vec::new()), wake_governor }
    }

    /// The process-wide class.
    pub fn global() -> &'static TcpcClass {
        &GLOBAL_CLASS
    }

    /// Registers a new port controller.
    ///
    /// The returned handle is fully wired: notifier chain, locks, timer
    /// core, and the optional subsystems are all up before the device
    /// becomes visible to [`device_by_name`]. A name collision fails the
    /// registration and leaves no state behind.
    ///
    /// [`device_by_name`]: TcpcClass::device_by_name
    pub fn register(
        &self,
        desc: TcpcDesc,
        ops: Arc<dyn TcpcOps>,
        drv_data: Option<Box<dyn Any + Send + Sync>>,
    ) -> Result<Arc<TcpcDevice>, RegisterError> {
        let device = TcpcDevice::new(desc, ops, drv_data, &self.wake_governor);

        let mut devices = self.devices.lock().expect("not poisoned");
        devices.retain(|weak| weak.strong_count() > 0);
        if devices.iter().filter_map(Weak::upgrade).any(|d| d.name() == device.name()) {
            error!("tcpc device {} is already registered", device.name());
            return Err(RegisterError::AlreadyExists(device.name().to_string()));
        }
        devices.push(Arc::downgrade(&device));
        info!("registered tcpc device {}", device.name());
        Ok(device)
    }

    /// Unregisters `device`: tears down Type-C state (releasing any wake
    /// lease it holds), removes the dual-role instance, and withdraws the
    /// device from lookups. A `None` device is a safe no-op.
    pub fn unregister(&self, device: Option<&Arc<TcpcDevice>>) {
        let Some(device) = device else { return };

        device.typec_deinit();
        #[cfg(feature = "dual-role")]
        device.dual_role_unregister();

        let mut devices = self.devices.lock().expect("not poisoned");
        devices.retain(|weak| match weak.upgrade() {
            Some(d) => !Arc::ptr_eq(&d, device),
            None => false,
        });
        info!("unregistered tcpc device {}", device.name());
    }

    /// Finds the first registered device whose descriptor name equals
    /// `name`.
    pub fn device_by_name(&self, name: &str) -> Option<Arc<TcpcDevice>> {
        self.devices
            .lock()
            .expect("not poisoned")
            .iter()
            .filter_map(Weak::upgrade)
            .find(|device| device.name() == name)
    }

    /// Number of live registered devices.
    pub fn registered_count(&self) -> usize {
        self.devices.lock().expect("not poisoned").iter().filter(|w| w.strong_count() > 0).count()
    }
}
