// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Type-C connection state tracked per port.
//!
//! The state machine proper runs in the board driver's alert path; what
//! lives here is the state it transitions, guarded by the device's typec
//! mutex, and the projections other subsystems read (VBUS level, power and
//! data role).

use crate::desc::{PortRole, RpLevel, TcpcDesc};
use crate::ops::PowerStatus;
use crate::wake::WakeLease;

/// Connection state of the port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachState {
    /// Nothing attached.
    Unattached,
    /// Attached as sink.
    AttachedSnk,
    /// Attached as source.
    AttachedSrc,
    /// Audio adapter accessory attached.
    AudioAccessory,
    /// Debug accessory attached.
    DebugAccessory,
}

impl AttachState {
    /// Power role implied by the attach state, if any.
    pub fn power_role(&self) -> Option<PowerRole> {
        match self {
            AttachState::AttachedSnk => Some(PowerRole::Sink),
            AttachState::AttachedSrc => Some(PowerRole::Source),
            _ => None,
        }
    }

    /// Data role implied by the attach state, if any.
    pub fn data_role(&self) -> Option<DataRole> {
        match self {
            AttachState::AttachedSnk => Some(DataRole::Ufp),
            AttachState::AttachedSrc => Some(DataRole::Dfp),
            _ => None,
        }
    }
}

/// Direction power flows while attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerRole {
    /// Consuming VBUS.
    Sink,
    /// Supplying VBUS.
    Source,
}

/// USB data role while attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataRole {
    /// Upstream-facing port.
    Ufp,
    /// Downstream-facing port.
    Dfp,
}

/// Tracked VBUS rail level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VbusLevel {
    /// Below the valid threshold.
    Absent,
    /// At a valid level.
    Valid,
}

impl VbusLevel {
    /// Level implied by a POWER_STATUS register image.
    pub fn from_power_status(status: PowerStatus) -> Self {
        if status.contains(PowerStatus::VBUS_PRESENT) {
            VbusLevel::Valid
        } else {
            VbusLevel::Absent
        }
    }
}

/// Mutable Type-C state, held behind the device's typec mutex.
#[derive(Debug)]
pub(crate) struct TypecState {
    role_def: PortRole,
    rp_level: RpLevel,
    attach: AttachState,
    vbus: VbusLevel,
    attach_lease: Option<WakeLease>,
    initialized: bool,
}

impl TypecState {
    pub(crate) fn new(desc: &TcpcDesc) -> Self {
        Self {
            role_def: desc.role_def,
            rp_level: desc.rp_level,
            attach: AttachState::Unattached,
            vbus: VbusLevel::Absent,
            attach_lease: None,
            initialized: false,
        }
    }

    /// Brings the state machine up in `role`.
    pub(crate) fn init(&mut self, role: PortRole) {
        self.role_def = role;
        self.attach = AttachState::Unattached;
        self.initialized = true;
    }

    /// Tears the state machine down, releasing any held wake lease.
    pub(crate) fn deinit(&mut self) {
        self.attach_lease = None;
        self.attach = AttachState::Unattached;
        self.vbus = VbusLevel::Absent;
        self.initialized = false;
    }

    /// Seeds VBUS tracking from a POWER_STATUS read.
    pub(crate) fn seed_vbus(&mut self, status: PowerStatus) {
        self.vbus = VbusLevel::from_power_status(status);
    }

    /// Updates the tracked VBUS level; true if it changed.
    pub(crate) fn set_vbus(&mut self, level: VbusLevel) -> bool {
        let changed = self.vbus != level;
        self.vbus = level;
        changed
    }

    pub(crate) fn set_attach(&mut self, new: AttachState) -> AttachState {
        std::mem::replace(&mut self.attach, new)
    }

    pub(crate) fn attach(&self) -> AttachState {
        self.attach
    }

    pub(crate) fn vbus(&self) -> VbusLevel {
        self.vbus
    }

    pub(crate) fn rp_level(&self) -> RpLevel {
        self.rp_level
    }

    #[cfg(test)]
    pub(crate) fn role_def(&self) -> PortRole {
        self.role_def
    }

    pub(crate) fn initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn holds_attach_lease(&self) -> bool {
        self.attach_lease.is_some()
    }

    pub(crate) fn set_attach_lease(&mut self, lease: WakeLease) {
        debug_assert!(self.attach_lease.is_none(), "attach lease double-acquired");
        self.attach_lease = Some(lease);
    }

    pub(crate) fn clear_attach_lease(&mut self) {
        self.attach_lease = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc() -> TcpcDesc {
        TcpcDesc::new("port0", PortRole::Drp, RpLevel::Default)
    }

    #[test]
    fn vbus_level_tracks_the_present_bit() {
        assert_eq!(VbusLevel::from_power_status(PowerStatus::empty()), VbusLevel::Absent);
        assert_eq!(VbusLevel::from_power_status(PowerStatus::VBUS_PRESENT), VbusLevel::Valid);
        assert_eq!(
            VbusLevel::from_power_status(PowerStatus::SINKING_VBUS | PowerStatus::VCONN_PRESENT),
            VbusLevel::Absent
        );
    }

    #[test]
    fn roles_follow_the_attach_state() {
        assert_eq!(AttachState::AttachedSnk.power_role(), Some(PowerRole::Sink));
        assert_eq!(AttachState::AttachedSrc.data_role(), Some(DataRole::Dfp));
        assert_eq!(AttachState::AudioAccessory.power_role(), None);
        assert_eq!(AttachState::Unattached.data_role(), None);
    }

    #[test]
    fn init_and_deinit_reset_attach_state() {
        let mut state = TypecState::new(&desc());
        state.init(PortRole::TrySink);
        assert!(state.initialized());
        assert_eq!(state.role_def(), PortRole::TrySink);

        state.set_attach(AttachState::AttachedSnk);
        state.set_vbus(VbusLevel::Valid);
        state.deinit();
        assert_eq!(state.attach(), AttachState::Unattached);
        assert_eq!(state.vbus(), VbusLevel::Absent);
        assert!(!state.initialized());
    }
}
