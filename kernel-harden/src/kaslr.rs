// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Stack and module load offset randomization.
//!
//! The `stack-randomize` feature enables per-boot randomization of the
//! kernel stack offset; `stack-randomize-strong` additionally randomizes the
//! thread-info offset and the module load base. Randomness is supplied by
//! the caller at init time so this crate stays free of an entropy source.
//!
//! With the features disabled, every function here is an inline no-op that
//! reports a zero offset.

#[cfg(feature = "stack-randomize")]
use std::sync::atomic::{AtomicU32, Ordering};
#[cfg(feature = "stack-randomize-strong")]
use std::sync::atomic::AtomicUsize;

/// Page size assumed for offset granularity.
pub const PAGE_SIZE: usize = 4096;

/// Entropy bits kept for the stack offset; the offset itself is 16-byte
/// aligned, so ten bits of entropy span a 16 KiB window.
pub const KSTACK_OFFSET_MASK: u32 = 0x3ff;

#[cfg(feature = "stack-randomize")]
static KSTACK_OFFSET: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "stack-randomize-strong")]
static KTI_OFFSET: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "stack-randomize-strong")]
static MODULE_LOAD_OFFSET: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "stack-randomize-strong")]
static INIT_THREAD_INFO: AtomicUsize = AtomicUsize::new(0);

/// Seeds the stack offset from `entropy`.
///
/// Only the low [`KSTACK_OFFSET_MASK`] bits are kept; the published offset is
/// 16-byte aligned.
#[cfg(feature = "stack-randomize")]
pub fn kstack_randomize_init(entropy: u64) {
    let offset = (entropy as u32 & KSTACK_OFFSET_MASK) << 4;
    KSTACK_OFFSET.store(offset, Ordering::Relaxed);
    log::debug!("kstack offset randomized");
}

/// No-op: built without `stack-randomize`.
#[cfg(not(feature = "stack-randomize"))]
#[inline]
pub fn kstack_randomize_init(_entropy: u64) {}

/// Current stack offset, zero unless randomization is enabled and seeded.
#[cfg(feature = "stack-randomize")]
pub fn kstack_offset() -> u32 {
    KSTACK_OFFSET.load(Ordering::Relaxed)
}

/// Always zero: built without `stack-randomize`.
#[cfg(not(feature = "stack-randomize"))]
#[inline]
pub fn kstack_offset() -> u32 {
    0
}

/// Seeds the thread-info offset and the module load base from `entropy`.
///
/// The thread-info offset is page aligned within a 32-page window. The
/// module load base is between one and 1024 pages.
#[cfg(feature = "stack-randomize-strong")]
pub fn kti_randomize_init(entropy: u64) {
    let kti = (entropy as usize & 0x1f) * PAGE_SIZE;
    KTI_OFFSET.store(kti, Ordering::Relaxed);
    let module = (((entropy >> 16) as usize % 1024) + 1) * PAGE_SIZE;
    MODULE_LOAD_OFFSET.store(module, Ordering::Relaxed);
    log::debug!("kti and module load offsets randomized");
}

/// No-op: built without `stack-randomize-strong`.
#[cfg(not(feature = "stack-randomize-strong"))]
#[inline]
pub fn kti_randomize_init(_entropy: u64) {}

/// Current thread-info offset, zero unless strong randomization is enabled
/// and seeded.
#[cfg(feature = "stack-randomize-strong")]
pub fn kti_offset() -> usize {
    KTI_OFFSET.load(Ordering::Relaxed)
}

/// Always zero: built without `stack-randomize-strong`.
#[cfg(not(feature = "stack-randomize-strong"))]
#[inline]
pub fn kti_offset() -> usize {
    0
}

/// Records the address of the initial thread info after relocation.
#[cfg(feature = "stack-randomize-strong")]
pub fn set_init_thread_info(addr: usize) {
    INIT_THREAD_INFO.store(addr, Ordering::Relaxed);
}

/// No-op: built without `stack-randomize-strong`.
#[cfg(not(feature = "stack-randomize-strong"))]
#[inline]
pub fn set_init_thread_info(_addr: usize) {}

/// Address recorded by [`set_init_thread_info`], zero if never set.
#[cfg(feature = "stack-randomize-strong")]
pub fn init_thread_info() -> usize {
    INIT_THREAD_INFO.load(Ordering::Relaxed)
}

/// Always zero: built without `stack-randomize-strong`.
#[cfg(not(feature = "stack-randomize-strong"))]
#[inline]
pub fn init_thread_info() -> usize {
    0
}

/// Load offset applied to relocatable modules.
#[cfg(feature = "stack-randomize-strong")]
pub fn module_load_offset() -> usize {
    MODULE_LOAD_OFFSET.load(Ordering::Relaxed)
}

/// Always zero: built without `stack-randomize-strong`.
#[cfg(not(feature = "stack-randomize-strong"))]
#[inline]
pub fn module_load_offset() -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "stack-randomize"))]
    #[test]
    fn disabled_build_reports_zero_offsets() {
        kstack_randomize_init(0xdead_beef);
        kti_randomize_init(0xdead_beef);
        set_init_thread_info(0x1000);
        assert_eq!(kstack_offset(), 0);
        assert_eq!(kti_offset(), 0);
        assert_eq!(init_thread_info(), 0);
        assert_eq!(module_load_offset(), 0);
    }

    #[cfg(feature = "stack-randomize")]
    #[test]
    fn kstack_offset_is_masked_and_aligned() {
        kstack_randomize_init(u64::MAX);
        assert_eq!(kstack_offset(), KSTACK_OFFSET_MASK << 4);
        assert_eq!(kstack_offset() % 16, 0);
    }

    // Single test body: the offsets live in process-wide statics.
    #[cfg(feature = "stack-randomize-strong")]
    #[test]
    fn strong_offsets_are_page_aligned_and_nonzero() {
        kti_randomize_init(0x0003_0007);
        assert_eq!(kti_offset(), 7 * PAGE_SIZE);
        assert_eq!(module_load_offset(), 4 * PAGE_SIZE);

        // Zero entropy still leaves modules off their default base.
        kti_randomize_init(0);
        assert_eq!(kti_offset(), 0);
        assert_eq!(module_load_offset(), PAGE_SIZE);
    }
}
