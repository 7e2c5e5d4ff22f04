// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Page allocation tracking hooks.
//!
//! The classification types are real; the hooks are no-ops. Allocator call
//! sites record what kind of consumer a page belongs to through these
//! functions, and a tracking build observes them. This build does not track,
//! so every hook accepts its arguments and returns.

/// Marker stored in an untracked slot.
pub const TRACK_INV: u8 = 0xff;

/// Marker for a page returned to the buddy allocator.
pub const TRACK_BUDDY: u16 = 0x5a5a;

/// Consumer class a tracked page is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageTrackerType {
    /// Slab allocator backing pages.
    Slab,
    /// Large-slab backing pages.
    LSlab,
    /// Vmalloc area pages.
    Vmalloc,
    /// File cache pages.
    File,
    /// Anonymous memory.
    Anon,
    /// ION buffer pages.
    Ion,
    /// Per-process accounted pages.
    Proc,
    /// Interrupt-context allocations.
    Irq,
}

impl PageTrackerType {
    /// All classes, in attribution-priority order.
    pub const ALL: [PageTrackerType; 8] = [
        PageTrackerType::Slab,
        PageTrackerType::LSlab,
        PageTrackerType::Vmalloc,
        PageTrackerType::File,
        PageTrackerType::Anon,
        PageTrackerType::Ion,
        PageTrackerType::Proc,
        PageTrackerType::Irq,
    ];
}

/// Opaque handle to one page frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRef(usize);

impl PageRef {
    /// Wraps a page frame address.
    pub fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// The wrapped address.
    pub fn addr(&self) -> usize {
        self.0
    }
}

/// Dumps tracking state for `page`. No-op in this build.
#[inline]
pub fn show(page: PageRef, order: u32) {
    let _ = (page, order);
}

/// Records the allocating function for an order-`order` block. No-op in this
/// build.
#[inline]
pub fn set_trace(page: PageRef, func: usize, order: u32) {
    let _ = (page, func, order);
}

/// Attributes an order-`order` block to a consumer class. No-op in this
/// build.
#[inline]
pub fn set_type(page: PageRef, ty: PageTrackerType, order: u32) {
    let _ = (page, ty, order);
}

/// Marks an order-`order` block as tracked. No-op in this build.
#[inline]
pub fn set_tracker(page: PageRef, order: u32) {
    let _ = (page, order);
}

/// Clears tracking for an order-`order` block. No-op in this build.
#[inline]
pub fn reset_tracker(page: PageRef, order: u32) {
    let _ = (page, order);
}

/// Moves tracking state from `old_page` to `new_page` on migration. No-op in
/// this build.
#[inline]
pub fn change_tracker(new_page: PageRef, old_page: PageRef) {
    let _ = (new_page, old_page);
}

/// Kicks the tracker flush thread. No-op in this build.
#[inline]
pub fn wake_up() {}

/// Allocates the per-node tracker map. No-op in this build.
#[inline]
pub fn alloc_node_tracker_map(node: usize) {
    let _ = node;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_distinct() {
        let classes: std::collections::HashSet<_> = PageTrackerType::ALL.iter().collect();
        assert_eq!(classes.len(), PageTrackerType::ALL.len());
    }

    #[test]
    fn hooks_accept_any_page() {
        let page = PageRef::new(0xffff_0000);
        show(page, 0);
        set_trace(page, 0x1234, 3);
        set_type(page, PageTrackerType::Ion, 3);
        set_tracker(page, 3);
        reset_tracker(page, 3);
        change_tracker(PageRef::new(0xffff_1000), page);
        wake_up();
        alloc_node_tracker_map(0);
        assert_eq!(page.addr(), 0xffff_0000);
    }
}
