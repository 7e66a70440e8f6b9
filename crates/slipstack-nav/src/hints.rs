#![forbid(unsafe_code)]

//! Render hints: per-surface classification and inline swipe styles.
//!
//! The controllers do not render. They classify each declared surface into a
//! role (the host maps roles to classes) and, while a swipe is live, expose
//! a continuously recomputed transform/shadow pair that the host applies
//! inline.

/// Classification of one panel within the stack at this instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRole {
    /// The settled, interactive top panel.
    Active,
    /// The panel being left by an animated transition.
    Prev,
    /// The panel being entered by an animated transition.
    Next,
    /// The panel sliding away under the finger during swipe-back.
    SwipeBackPrev,
    /// The panel being revealed during swipe-back.
    SwipeBackNext,
}

/// Qualifier applied to swipe-back roles once an outcome is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeQualifier {
    /// The settle animation is committing the back navigation.
    Success,
    /// The settle animation is returning the stack to its pre-gesture state.
    Fail,
}

/// A horizontal translation hint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Translate {
    /// Absolute offset in distance units.
    Px(f64),
    /// Offset as a percentage of the panel's own width.
    Percent(f64),
}

/// Inline style pair for one panel while a swipe is live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeStyle {
    /// Horizontal translation to apply.
    pub translate: Translate,
    /// Shadow intensity in `[0, 0.3]`; `0` means no shadow.
    pub shadow: f64,
}

/// Classification of one modal within the stack at this instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalRole {
    /// The current top-of-stack modal.
    Active,
    /// The modal animating out.
    Prev,
    /// The modal animating in (only reported once its enter gate is open).
    Next,
}
