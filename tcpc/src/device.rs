// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The port controller device object and its lifecycle.
//!
//! A device is fully wired before it is published: notifier chain, locks,
//! timer core, and the optional PD and dual-role subsystems all come up in
//! [`TcpcDevice::new`]. Release is deterministic: when the last strong
//! reference drops, `Drop` tears down the PD/event core and then the timer
//! core, the same sequence the class's release path always ran.

use log::{debug, error, info, warn};

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::desc::{RpLevel, TcpcDesc};
use crate::error::{HardwareError, InitError, NotFoundError};
use crate::notifier::{NotifierChain, NotifierStatus, TcpcEvent, TcpcNotifier};
use crate::ops::{PowerStatus, TcpcOps};
use crate::timer::TimerCore;
use crate::typec::{AttachState, DataRole, PowerRole, TypecState, VbusLevel};
use crate::wake::{WakeGovernor, WakeLock};

#[cfg(feature = "power-delivery")]
use crate::event::EventCore;
#[cfg(feature = "power-delivery")]
use crate::pd::{PdCore, PdState};

#[cfg(feature = "dual-role")]
use crate::dual_role::DualRolePhy;

/// Registration lifecycle of a device. Transitions are forward-only; a
/// failed step leaves the device in its last successfully reached state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Allocated and published in the class.
    Registered,
    /// Locks, notifier chain, timer core, and optional subsystems are up.
    SubsystemsReady,
    /// The controller itself answered `init` and seeded VBUS tracking.
    ControllerReady,
    /// Type-C state machine initialized; the port is usable.
    Operational,
    /// Unregistration has begun.
    Unregistering,
}

/// One physical Type-C port controller.
pub struct TcpcDevice {
    desc: TcpcDesc,
    ops: Arc<dyn TcpcOps>,
    drv_data: Option<Box<dyn Any + Send + Sync>>,
    lifecycle: Mutex<Lifecycle>,
    /// Serializes register access to the controller through `ops`.
    access_lock: Mutex<()>,
    evt_chain: NotifierChain,
    typec: Mutex<TypecState>,
    timers: TimerCore,
    attach_wake_lock: WakeLock,
    detach_wake_lock: WakeLock,
    #[cfg(feature = "power-delivery")]
    events: EventCore,
    #[cfg(feature = "power-delivery")]
    pd: PdCore,
    #[cfg(feature = "dual-role")]
    dual_role: Mutex<Option<DualRolePhy>>,
}

impl TcpcDevice {
    pub(crate) fn new(
        desc: TcpcDesc,
        ops: Arc<dyn TcpcOps>,
        drv_data: Option<Box<dyn Any + Send + Sync>>,
        governor: &WakeGovernor,
    ) -> Arc<Self> {
        let typec = TypecState::new(&desc);
        let attach_wake_lock = WakeLock::new(governor, format!("{}_attach_wakelock", desc.name));
        let detach_wake_lock = WakeLock::new(governor, format!("{}_detach_wakelock", desc.name));
        let device = Arc::new(Self {
            desc,
            ops,
            drv_data,
            lifecycle: Mutex::new(Lifecycle::Registered),
            access_lock: Mutex::new(()),
            evt_chain: NotifierChain::new(),
            typec: Mutex::new(typec),
            timers: TimerCore::new(),
            attach_wake_lock,
            detach_wake_lock,
            #[cfg(feature = "power-delivery")]
            events: EventCore::new(),
            #[cfg(feature = "power-delivery")]
            pd: PdCore::new(),
            #[cfg(feature = "dual-role")]
            dual_role: Mutex::new(None),
        });

        #[cfg(feature = "dual-role")]
        match DualRolePhy::register(&device.desc) {
            Ok(phy) => *device.dual_role.lock().expect("not poisoned") = Some(phy),
            Err(e) => error!("{}: dual role usb init fail: {e}", device.desc.name),
        }

        device.advance_lifecycle(Lifecycle::SubsystemsReady);
        device
    }

    /// Descriptor the device was registered with.
    pub fn desc(&self) -> &TcpcDesc {
        &self.desc
    }

    /// Class-unique device name.
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    /// Driver-private data, downcast to the concrete type the board driver
    /// registered.
    pub fn drv_data<T: 'static>(&self) -> Option<&T> {
        self.drv_data.as_ref()?.downcast_ref::<T>()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().expect("not poisoned")
    }

    /// The device's timer core.
    pub fn timers(&self) -> &TimerCore {
        &self.timers
    }

    /// Tracked VBUS level.
    pub fn vbus_level(&self) -> VbusLevel {
        self.typec.lock().expect("not poisoned").vbus()
    }

    /// Current Type-C connection state.
    pub fn attach_state(&self) -> AttachState {
        self.typec.lock().expect("not poisoned").attach()
    }

    /// Local Rp advertisement level.
    pub fn rp_level(&self) -> RpLevel {
        self.typec.lock().expect("not poisoned").rp_level()
    }

    /// Power role while attached.
    pub fn power_role(&self) -> Option<PowerRole> {
        self.attach_state().power_role()
    }

    /// Data role while attached.
    pub fn data_role(&self) -> Option<DataRole> {
        self.attach_state().data_role()
    }

    /// Initializes the controller: runs the mandatory `init` op, then reads
    /// POWER_STATUS and seeds VBUS tracking from it.
    ///
    /// An ops table that leaves `init` unimplemented is a configuration
    /// error ([`InitError::MissingInitOp`]); VBUS tracking is not touched in
    /// that case. Hardware failures from either op propagate verbatim.
    pub fn tcpci_init(&self, sw_reset: bool) -> Result<(), InitError> {
        let _access = self.access_lock.lock().expect("not poisoned");
        match self.ops.init(sw_reset) {
            Ok(()) => {}
            Err(HardwareError::NotSupported) => {
                error!("{}: tcpc ops table does not implement init", self.desc.name);
                return Err(InitError::MissingInitOp);
            }
            Err(e) => return Err(e.into()),
        }

        let power_status = self.ops.get_power_status()?;
        debug!("{}: power status {power_status:?}", self.desc.name);
        self.typec.lock().expect("not poisoned").seed_vbus(power_status);
        self.advance_lifecycle(Lifecycle::ControllerReady);
        Ok(())
    }

    /// Runs controller init followed by Type-C state machine init under the
    /// typec lock. Any failure short-circuits, leaving the device registered
    /// but not operational.
    pub fn schedule_init_work(&self) -> Result<(), InitError> {
        self.tcpci_init(false)?;

        {
            let mut typec = self.typec.lock().expect("not poisoned");
            typec.init(self.desc.role_def);
        }
        self.advance_lifecycle(Lifecycle::Operational);
        info!("tcpc device {} operational", self.desc.name);
        Ok(())
    }

    /// Adds `listener` to the event chain. An already-registered listener
    /// reports [`NotifierStatus::AlreadyRegistered`], which callers tolerate
    /// as success.
    pub fn register_notifier(&self, listener: Arc<dyn TcpcNotifier>) -> NotifierStatus {
        let status = self.evt_chain.register(listener);
        if status != NotifierStatus::Registered {
            debug!("{}: notifier registration returned {status:?}", self.desc.name);
        }
        status
    }

    /// Removes `listener` from the event chain. Safe to call from inside a
    /// listener callback.
    pub fn unregister_notifier(
        &self,
        listener: &Arc<dyn TcpcNotifier>,
    ) -> Result<(), NotFoundError> {
        self.evt_chain.unregister(listener)
    }

    /// Reports a connection from the driver's alert path.
    ///
    /// Takes the attach wake lease before the state transition so the
    /// system cannot suspend mid-negotiation, then publishes the transition
    /// and any VBUS change. Idempotent for a repeated attach report.
    pub fn handle_attach(&self, new: AttachState) {
        if new == AttachState::Unattached {
            return self.handle_detach();
        }

        let events = {
            let mut typec = self.typec.lock().expect("not poisoned");
            if !typec.initialized() {
                warn!("{}: attach reported before init work, ignored", self.desc.name);
                return;
            }
            if typec.attach() == new {
                return;
            }
            if !typec.holds_attach_lease() {
                typec.set_attach_lease(self.attach_wake_lock.take_lease());
            }
            let old = typec.set_attach(new);
            let mut events = vec![TcpcEvent::TypecState { old, new }];
            if new.power_role().is_some() && typec.set_vbus(VbusLevel::Valid) {
                events.push(TcpcEvent::VbusLevel(VbusLevel::Valid));
            }
            events
        };

        for event in &events {
            self.evt_chain.notify(event);
        }
    }

    /// Reports a disconnection from the driver's alert path.
    ///
    /// The transient detach lease is taken before the attach lease drops so
    /// no suspend window opens mid-transition, and it is held for exactly
    /// the notification walk.
    pub fn handle_detach(&self) {
        let (events, _detach_window) = {
            let mut typec = self.typec.lock().expect("not poisoned");
            if typec.attach() == AttachState::Unattached {
                return;
            }
            let window = self.detach_wake_lock.take_lease();
            typec.clear_attach_lease();
            let old = typec.set_attach(AttachState::Unattached);
            let mut events = vec![TcpcEvent::TypecState { old, new: AttachState::Unattached }];
            if typec.set_vbus(VbusLevel::Absent) {
                events.push(TcpcEvent::VbusLevel(VbusLevel::Absent));
            }
            (events, window)
        };

        for event in &events {
            self.evt_chain.notify(event);
        }
        // `_detach_window` drops here, after the listeners have run.
    }

    /// Refreshes VBUS tracking from a POWER_STATUS alert and publishes the
    /// change, if any.
    pub fn handle_power_status_changed(&self, status: PowerStatus) {
        let level = VbusLevel::from_power_status(status);
        let changed = self.typec.lock().expect("not poisoned").set_vbus(level);
        if changed {
            self.evt_chain.notify(&TcpcEvent::VbusLevel(level));
        }
    }

    /// Moves the PD contract state and queues the change for dispatch.
    #[cfg(feature = "power-delivery")]
    pub fn pd_transition(&self, next: PdState) {
        let previous = self.pd.set_state(next);
        if previous != next {
            self.events.push(TcpcEvent::PdState(next));
        }
    }

    /// Current PD contract state.
    #[cfg(feature = "power-delivery")]
    pub fn pd_state(&self) -> PdState {
        self.pd.state()
    }

    /// Delivers queued PD events to the notifier chain in FIFO order;
    /// returns the number delivered.
    #[cfg(feature = "power-delivery")]
    pub fn dispatch_pd_events(&self) -> usize {
        self.events.dispatch(&self.evt_chain)
    }

    /// PD events queued and not yet dispatched.
    #[cfg(feature = "power-delivery")]
    pub fn pending_pd_events(&self) -> usize {
        self.events.pending()
    }

    /// The dual-role instance, if one registered.
    #[cfg(feature = "dual-role")]
    pub fn dual_role(&self) -> Option<DualRolePhy> {
        self.dual_role.lock().expect("not poisoned").clone()
    }

    #[cfg(feature = "dual-role")]
    pub(crate) fn dual_role_unregister(&self) {
        if self.dual_role.lock().expect("not poisoned").take().is_some() {
            debug!("{}: dual role instance unregistered", self.desc.name);
        }
    }

    /// Tears down Type-C state at the start of unregistration: releases any
    /// held wake lease and returns the port to unattached.
    pub(crate) fn typec_deinit(&self) {
        self.advance_lifecycle(Lifecycle::Unregistering);
        self.typec.lock().expect("not poisoned").deinit();
        debug!("{}: typec deinitialized", self.desc.name);
    }

    fn advance_lifecycle(&self, next: Lifecycle) {
        let mut lifecycle = self.lifecycle.lock().expect("not poisoned");
        if next > *lifecycle {
            debug!("{}: {:?} -> {next:?}", self.desc.name, *lifecycle);
            *lifecycle = next;
        }
    }
}

impl Drop for TcpcDevice {
    fn drop(&mut self) {
        #[cfg(feature = "power-delivery")]
        {
            let dropped = self.events.deinit();
            if dropped > 0 {
                warn!("{}: dropped {dropped} undelivered events at release", self.desc.name);
            }
            self.pd.deinit();
        }
        self.timers.deinit();
        debug!("tcpc device {} released", self.desc.name);
    }
}

impl std::fmt::Debug for TcpcDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpcDevice")
            .field("desc", &self.desc)
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}
