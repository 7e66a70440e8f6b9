#![forbid(unsafe_code)]

//! Per-session scroll cache and the host scroll capability.
//!
//! [`ScrollCache`] is a process-scoped map from panel identifier to the last
//! known vertical scroll offset. It survives panel unmount: the offset is
//! written when a panel stops being the interactive top panel and read back
//! when the panel becomes interactive again (or when a cancelled swipe-back
//! must restore the exact pre-gesture offset). Entries are deleted only once
//! a back navigation is confirmed and the panel is gone from history.
//!
//! The cache is a shared handle: clones observe the same map. Single-writer
//! discipline is upheld by the controllers (only the controller that owns a
//! panel as non-top writes its entry), not by a lock.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::id::PanelId;

/// Live scroll read/write capability supplied by the host.
///
/// The controllers never touch scroll containers directly; they ask the host
/// for the current offset of a named panel and tell it where to scroll.
pub trait ScrollHost {
    /// Current vertical scroll offset of the panel's container.
    fn get_scroll(&self, id: &PanelId) -> f64;
    /// Scroll the panel's container to `offset`.
    fn set_scroll(&mut self, id: &PanelId, offset: f64);
}

/// No-op scroll host for contexts without scrollable containers.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScrollHost;

impl ScrollHost for NoopScrollHost {
    fn get_scroll(&self, _id: &PanelId) -> f64 {
        0.0
    }

    fn set_scroll(&mut self, _id: &PanelId, _offset: f64) {}
}

/// Shared map of panel id → last-known vertical scroll offset.
#[derive(Debug, Clone, Default)]
pub struct ScrollCache {
    inner: Rc<RefCell<AHashMap<PanelId, f64>>>,
}

impl ScrollCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the offset for a panel that is leaving the interactive top.
    pub fn write(&self, id: &PanelId, offset: f64) {
        let _ = self.inner.borrow_mut().insert(id.clone(), offset);
    }

    /// Last cached offset for `id`, if any.
    #[must_use]
    pub fn read(&self, id: &PanelId) -> Option<f64> {
        self.inner.borrow().get(id).copied()
    }

    /// Drop the entry for a panel confirmed gone from history.
    pub fn remove(&self, id: &PanelId) {
        let _ = self.inner.borrow_mut().remove(id);
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
