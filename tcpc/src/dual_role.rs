// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Dual-role property surface.
//!
//! Registered alongside the device when the descriptor's default role can
//! swap; user-facing role queries read through it. A registration failure is
//! reported to the log and the device comes up without the surface.

use crate::desc::TcpcDesc;
use crate::error::DualRoleError;

/// Modes a dual-role instance supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DualRoleSupportedModes {
    /// Both upstream- and downstream-facing operation.
    UfpAndDfp,
}

/// The per-port dual-role instance.
#[derive(Clone, Debug)]
pub struct DualRolePhy {
    name: String,
    supported_modes: DualRoleSupportedModes,
}

impl DualRolePhy {
    /// Registers an instance for `desc`.
    pub(crate) fn register(desc: &TcpcDesc) -> Result<Self, DualRoleError> {
        if !desc.role_def.supports_role_swap() {
            return Err(DualRoleError::UnsupportedRole(desc.role_def));
        }
        Ok(Self {
            name: format!("dual-role-{}", desc.name),
            supported_modes: DualRoleSupportedModes::UfpAndDfp,
        })
    }

    /// Instance name, derived from the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modes the instance supports.
    pub fn supported_modes(&self) -> DualRoleSupportedModes {
        self.supported_modes
    }
}
