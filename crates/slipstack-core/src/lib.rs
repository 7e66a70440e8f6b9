#![forbid(unsafe_code)]

//! Core: identifiers, back-stack history, gesture math, and completion waits.
//!
//! # Role in slipstack
//! `slipstack-core` is the primitive layer. It owns the types that the
//! navigation controllers in `slipstack-nav` consume: opaque surface
//! identifiers, the truncate-or-append back-stack, the edge-swipe decision
//! math, the per-session scroll cache, the completion-signal waiter with its
//! timer fallback, and reference-counted focus suspension.
//!
//! # Primary responsibilities
//! - **Identity**: [`PanelId`] / [`ModalId`] opaque string newtypes.
//! - **History**: ordered back-stack with the truncate/append rule.
//! - **Gesture**: pure commit/cancel decision functions for edge-swipe-back.
//! - **ScrollCache**: process-scoped panel-id → scroll-offset map.
//! - **CompletionWaiter**: native-signal wait with platform-tiered timer
//!   fallback, idempotent re-arm, stale-signal discard.
//! - **FocusSuspension**: reference-counted suspend/restore of host focus.
//!
//! # How it fits in the system
//! Nothing in this crate knows about panels-vs-modals semantics. The
//! controllers serialize every mutation through their reducers and treat the
//! types here as capabilities handed in at construction time.

pub mod capabilities;
pub mod completion;
pub mod focus;
pub mod gesture;
pub mod history;
pub mod id;
pub mod scroll;

pub use capabilities::{Capabilities, MotionProfile};
pub use completion::{CompletionProperty, CompletionWaiter};
pub use focus::{FocusHost, FocusSuspension, FocusToken, NoopFocusHost};
pub use gesture::{GestureConfig, GestureEvent, GesturePhase, SwipeDecision, TargetKind};
pub use history::{History, NavDirection};
pub use id::{ModalId, PanelId};
pub use scroll::{NoopScrollHost, ScrollCache, ScrollHost};
