#![forbid(unsafe_code)]

//! Host-visible side effects produced by the navigation reducers.
//!
//! The controllers never call back into the host directly for navigation
//! lifecycle events; each entry point returns the effects the host should
//! react to, in the order they occurred.

use slipstack_core::PanelId;

/// Parameters of a panel transition, as reported to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionInfo {
    /// Panel being left.
    pub from: PanelId,
    /// Panel being shown.
    pub to: PanelId,
    /// Whether this is a back navigation.
    pub is_back: bool,
}

/// A side effect the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    /// A panel transition (animated or swipe-driven) started.
    TransitionStart(TransitionInfo),
    /// A panel transition finished and the stack is settled.
    TransitionEnd(TransitionInfo),
    /// An edge-swipe-back gesture began tracking.
    SwipeBackStart,
    /// A swipe-back committed; the back navigation is final.
    SwipeBackSuccess,
    /// A swipe-back was cancelled; the pre-gesture panel is restored.
    SwipeBackCancel,
}
