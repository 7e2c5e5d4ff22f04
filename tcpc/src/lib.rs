// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! USB Type-C port controller (TCPC) registration and lifecycle.
//!
//! Board drivers describe a physical controller with a [`TcpcDesc`], supply
//! its hardware operations through [`TcpcOps`], and register it with a
//! [`TcpcClass`]. The returned [`TcpcDevice`] handle carries the event
//! notifier chain, the Type-C and timer state, and the wake leases that keep
//! the system awake across attach and detach windows.
//!
//! The usual bring-up sequence:
//!
//! ```
//! use std::sync::Arc;
//! use tcpc::{PortRole, RpLevel, TcpcClass, TcpcDesc, TcpcOps};
//!
//! struct BoardOps;
//! impl TcpcOps for BoardOps {
//!     fn init(&self, _sw_reset: bool) -> Result<(), tcpc::HardwareError> {
//!         Ok(())
//!     }
//!     fn get_power_status(&self) -> Result<tcpc::PowerStatus, tcpc::HardwareError> {
//!         Ok(tcpc::PowerStatus::empty())
//!     }
//! }
//!
//! let class = TcpcClass::new();
//! let desc = TcpcDesc::new("port0", PortRole::Drp, RpLevel::Default);
//! let device = class.register(desc, Arc::new(BoardOps), None).unwrap();
//! device.schedule_init_work().unwrap();
//! ```
//!
//! Two subsystems are build-time capabilities: `power-delivery` carries the
//! PD contract state and its event queue, and `dual-role` the dual-role
//! property surface. Both are on by default.

#![warn(missing_docs)]

mod class;
mod desc;
mod device;
mod error;
mod notifier;
mod ops;
mod timer;
mod typec;
mod wake;

#[cfg(feature = "dual-role")]
mod dual_role;
#[cfg(feature = "power-delivery")]
mod event;
#[cfg(feature = "power-delivery")]
mod pd;

pub use class::TcpcClass;
pub use desc::{PortRole, RpLevel, TcpcDesc};
pub use device::{Lifecycle, TcpcDevice};
pub use error::{HardwareError, InitError, NotFoundError, RegisterError, TimerStoppedError};
pub use notifier::{NotifierStatus, TcpcEvent, TcpcNotifier};
pub use ops::{PowerStatus, TcpcOps};
pub use timer::{TcpcTimer, TimerCore};
pub use typec::{AttachState, DataRole, PowerRole, VbusLevel};
pub use wake::{WakeGovernor, WakeLease, WakeLock};

#[cfg(feature = "dual-role")]
pub use dual_role::{DualRolePhy, DualRoleSupportedModes};
#[cfg(feature = "dual-role")]
pub use error::DualRoleError;
#[cfg(feature = "power-delivery")]
pub use pd::PdState;
