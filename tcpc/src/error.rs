// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Error types for the registration layer.
//!
//! Every failure is a local return value to the immediate caller; nothing is
//! retried internally and nothing is swallowed, with one documented
//! exception: an already-registered notifier reports a tolerated status, not
//! an error (see [`crate::NotifierStatus`]).

use thiserror::Error;

use std::io;

#[cfg(feature = "dual-role")]
use crate::desc::PortRole;

/// Error publishing a device in the class.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// A device with the same descriptor name is already registered. The
    /// failed registration leaves no state behind.
    #[error("tcpc device {0:?} is already registered")]
    AlreadyExists(String),
}

/// Error reported by the driver-supplied operations table.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The port driver does not implement the operation.
    #[error("operation not implemented by the port driver")]
    NotSupported,
    /// The register transfer to the controller failed.
    #[error("bus transfer failed")]
    Bus(#[source] io::Error),
    /// The controller did not respond in time.
    #[error("controller timed out")]
    Timeout,
}

/// Error from controller initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// The ops table lacks the mandatory `init` operation. This is a
    /// configuration error, distinct from a hardware failure, and leaves
    /// VBUS tracking untouched.
    #[error("tcpc ops table does not implement init")]
    MissingInitOp,
    /// The controller reported a failure; propagated verbatim.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Error when something unexpectedly doesn't exist, such as unregistering a
/// listener that is not on the chain.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not found")]
pub struct NotFoundError;

/// Error arming a timer after the timer core was shut down.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("timer core is stopped")]
pub struct TimerStoppedError;

/// Error registering the dual role instance. Log-worthy, never fatal to
/// device registration.
#[cfg(feature = "dual-role")]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DualRoleError {
    /// The descriptor's default role cannot take part in role swaps.
    #[error("default port role {0:?} cannot role swap")]
    UnsupportedRole(PortRole),
}
