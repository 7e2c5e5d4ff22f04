// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Static description of a port controller, supplied by the board driver at
//! registration time.

/// Default role a port starts negotiating from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortRole {
    /// Sink only.
    Sink,
    /// Source only.
    Source,
    /// Dual role, preferring to land as sink.
    TrySink,
    /// Dual role.
    Drp,
}

impl PortRole {
    /// Whether a port with this default role can take part in role swaps.
    pub fn supports_role_swap(&self) -> bool {
        matches!(self, PortRole::TrySink | PortRole::Drp)
    }
}

/// Rp current advertisement the port presents while sourcing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpLevel {
    /// Default USB current.
    Default,
    /// 1.5 A.
    Rp1500mA,
    /// 3.0 A.
    Rp3000mA,
}

/// Descriptor for one physical port controller.
#[derive(Clone, Debug)]
pub struct TcpcDesc {
    /// Class-unique device name; lookups match on string equality.
    pub name: String,
    /// Default port role.
    pub role_def: PortRole,
    /// Local Rp advertisement level.
    pub rp_level: RpLevel,
}

impl TcpcDesc {
    /// Builds a descriptor.
    pub fn new(name: impl Into<String>, role_def: PortRole, rp_level: RpLevel) -> Self {
        Self { name: name.into(), role_def, rp_level }
    }
}
