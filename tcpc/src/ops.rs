// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The operations seam between this layer and the board driver.

use bitflags::bitflags;

use crate::error::HardwareError;

bitflags! {
    /// POWER_STATUS register image, as defined by the TCPCI interface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct PowerStatus: u16 {
        /// The port is sinking VBUS.
        const SINKING_VBUS = 1 << 0;
        /// VConn is being supplied.
        const VCONN_PRESENT = 1 << 1;
        /// VBUS is at a valid level.
        const VBUS_PRESENT = 1 << 2;
        /// VBUS presence detection is enabled.
        const VBUS_DETECTION_ENABLED = 1 << 3;
        /// The port is sourcing VBUS.
        const SOURCING_VBUS = 1 << 4;
        /// The port is sourcing high voltage.
        const SOURCING_HIGH_VOLTAGE = 1 << 5;
        /// The controller is still initializing; register contents are not
        /// yet valid.
        const TCPC_INITIALIZING = 1 << 6;
        /// A debug accessory is connected.
        const DEBUG_ACCESSORY_CONNECTED = 1 << 7;
    }
}

/// Operations the board driver supplies for one physical controller.
///
/// The default bodies report [`HardwareError::NotSupported`], reproducing an
/// absent entry in the vtable. `init` is mandatory: a device whose ops table
/// leaves it at the default fails controller initialization with a
/// configuration error rather than a hardware error.
pub trait TcpcOps: Send + Sync {
    /// Brings the controller to its post-reset operating state. When
    /// `sw_reset` is set, issues a software reset first.
    fn init(&self, sw_reset: bool) -> Result<(), HardwareError> {
        let _ = sw_reset;
        Err(HardwareError::NotSupported)
    }

    /// Reads the POWER_STATUS register.
    fn get_power_status(&self) -> Result<PowerStatus, HardwareError> {
        Err(HardwareError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct NoOps;
    impl TcpcOps for NoOps {}

    #[test]
    fn default_ops_report_not_supported() {
        assert_matches!(NoOps.init(false), Err(HardwareError::NotSupported));
        assert_matches!(NoOps.get_power_status(), Err(HardwareError::NotSupported));
    }

    #[test]
    fn power_status_bits_match_the_register_layout() {
        let status = PowerStatus::from_bits_truncate(0x04);
        assert_eq!(status, PowerStatus::VBUS_PRESENT);
        assert!(PowerStatus::from_bits_truncate(0x00).is_empty());
    }
}
