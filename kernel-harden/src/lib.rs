// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Hardening instrumentation seams with capability-toggle semantics.
//!
//! Both halves of this crate follow the same design: the call sites are
//! always present, and whether they do anything is decided at build time by
//! a Cargo feature. With the feature disabled every operation compiles to an
//! inline no-op and no state is tracked.
//!
//! - [`kaslr`]: stack offset and module load offset randomization, gated by
//!   the `stack-randomize` and `stack-randomize-strong` features.
//! - [`page_tracker`]: page allocation tracking classes and hooks. The hooks
//!   are unconditionally no-ops; only the classification types carry meaning.

#![warn(missing_docs)]

pub mod kaslr;
pub mod page_tracker;
