#![forbid(unsafe_code)]

//! Edge-swipe-back decision math.
//!
//! The pointer layer delivers a normalized drag stream
//! ([`GestureEvent`]: start position, live shift, elapsed time, slide
//! classification, target kind). This module holds the pure functions that
//! turn that stream into an eligibility check, a clamped shift, and a
//! terminal [`SwipeDecision`]. All state lives in the panel controller; the
//! functions here are `(inputs) -> output` and unit-testable in isolation.
//!
//! # Invariants
//!
//! 1. `clamp_shift` output is always within `[0, viewport_width]`.
//! 2. `decide` is a pure function of `(shift, viewport_width, elapsed,
//!    start_x)`: the same inputs always yield the same decision.
//! 3. A zero shift always cancels; a full-viewport shift always commits.

use web_time::Duration;

/// Thresholds for edge-swipe-back recognition.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Margin from either screen edge within which a drag may start a
    /// swipe-back (distance units, default: 70).
    pub edge_threshold: f64,
    /// Velocity (units/sec) above which a released drag commits regardless
    /// of distance (default: 250).
    pub commit_speed: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 70.0,
            commit_speed: 250.0,
        }
    }
}

/// Phase of a raw drag gesture as produced by the pointer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Pointer went down.
    Start,
    /// Pointer moved while down.
    Move,
    /// Pointer was released.
    End,
}

/// Kind of element under the pointer, as classified by the host.
///
/// Text-entry targets are excluded from swipe-back so the gesture never
/// hijacks caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetKind {
    /// Any ordinary target.
    #[default]
    Content,
    /// An input / text-area style target.
    TextEntry,
}

/// One event of the normalized drag stream consumed by the controllers.
#[derive(Debug, Clone)]
pub struct GestureEvent {
    /// Phase of the gesture.
    pub phase: GesturePhase,
    /// Horizontal pointer position at gesture start, in distance units.
    pub x: f64,
    /// Horizontal shift since gesture start (unclamped, may be negative).
    pub shift_x: f64,
    /// Whether the pointer layer classified this drag as a horizontal slide.
    pub is_slide: bool,
    /// Kind of the element the gesture started on.
    pub target: TargetKind,
}

impl GestureEvent {
    /// A start event at `x`.
    #[must_use]
    pub fn start(x: f64) -> Self {
        Self {
            phase: GesturePhase::Start,
            x,
            shift_x: 0.0,
            is_slide: false,
            target: TargetKind::Content,
        }
    }

    /// A slide move event with the given shift.
    #[must_use]
    pub fn slide(x: f64, shift_x: f64) -> Self {
        Self {
            phase: GesturePhase::Move,
            x,
            shift_x,
            is_slide: true,
            target: TargetKind::Content,
        }
    }

    /// An end event.
    #[must_use]
    pub fn end(x: f64, shift_x: f64) -> Self {
        Self {
            phase: GesturePhase::End,
            x,
            shift_x,
            is_slide: true,
            target: TargetKind::Content,
        }
    }

    /// Set the target kind.
    #[must_use]
    pub fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }
}

/// Terminal outcome of a released swipe-back drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    /// Finish the back navigation.
    Commit,
    /// Abandon the gesture and settle back.
    Cancel,
}

/// Whether a drag starting at `start_x` is an eligible edge start.
#[must_use]
pub fn is_edge_start(start_x: f64, viewport_width: f64, config: &GestureConfig) -> bool {
    start_x <= config.edge_threshold || start_x >= viewport_width - config.edge_threshold
}

/// Clamp a raw drag shift to the visible swipe range.
///
/// Negative shifts pin to zero; shifts that would carry the panel past the
/// far edge pin to the full viewport width.
#[must_use]
pub fn clamp_shift(raw_shift: f64, start_x: f64, viewport_width: f64) -> f64 {
    if raw_shift < 0.0 {
        0.0
    } else if raw_shift > viewport_width - start_x {
        viewport_width
    } else {
        raw_shift
    }
}

/// Released-drag velocity in units per second.
#[must_use]
pub fn swipe_speed(shift: f64, elapsed: Duration) -> f64 {
    let ms = elapsed.as_secs_f64() * 1000.0;
    shift / ms.max(f64::EPSILON) * 1000.0
}

/// Decide whether a released drag commits or cancels the back navigation.
///
/// Rules, in order: zero shift cancels; a full-viewport shift commits; a
/// fast flick (`speed > commit_speed`) or a drag carried past the viewport
/// midpoint commits; anything else cancels.
#[must_use]
pub fn decide(
    shift: f64,
    viewport_width: f64,
    elapsed: Duration,
    start_x: f64,
    config: &GestureConfig,
) -> SwipeDecision {
    if shift == 0.0 {
        return SwipeDecision::Cancel;
    }
    if shift >= viewport_width {
        return SwipeDecision::Commit;
    }
    if swipe_speed(shift, elapsed) > config.commit_speed || start_x + shift > viewport_width / 2.0 {
        return SwipeDecision::Commit;
    }
    SwipeDecision::Cancel
}
