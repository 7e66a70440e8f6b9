#![forbid(unsafe_code)]

//! Navigation controllers: the panel stack and the modal stack.
//!
//! # Role in slipstack
//! `slipstack-nav` holds the two state machines built on the primitives in
//! `slipstack-core`. [`PanelView`] drives animated panel transitions and the
//! edge-swipe-back gesture; [`ModalStack`] serializes modal enter/exit
//! animations and focus suspension.
//!
//! # Primary responsibilities
//! - **Panel transitions**: external activation requests reconciled with
//!   in-flight animations (mid-transition retarget), swipe-back tracking
//!   with commit/cancel settle, scroll capture/restore around every change.
//! - **Modal transitions**: one active, at most one entering and one exiting
//!   modal; card/page gating; close-handler dispatch.
//! - **Render hints**: per-surface role classification and live swipe
//!   styles; the host maps these to whatever its render layer uses.
//! - **Effects**: each entry point returns the lifecycle effects the host
//!   should react to, in order.
//!
//! # How it fits in the system
//! The host owns rendering, pointer normalization, and the scroll/focus
//! capabilities; the controllers own every transition decision. All mutation
//! is serialized through the reducer entry points, single-threaded and
//! non-blocking: waits for animation completion return to the host
//! immediately and re-enter through completion signals or `poll`.

pub mod effect;
pub mod hints;
pub mod modal;
pub mod panel;

pub use effect::{NavEffect, TransitionInfo};
pub use hints::{ModalRole, PanelRole, SwipeQualifier, SwipeStyle, Translate};
pub use modal::{ModalConfig, ModalKind, ModalPhase, ModalSpec, ModalStack, ModalTransitionState};
pub use panel::{PanelConfig, PanelEvent, PanelTransitionState, PanelView, SwipeOutcome};
