#![forbid(unsafe_code)]

//! Panel stack transitions: animated navigation and edge-swipe-back.
//!
//! [`PanelView`] is the state machine for one stack of panels. It owns the
//! active/previous panel cursors, the back-stack history, the animation
//! phase, and the swipe-back sub-state, and orchestrates the scroll cache
//! and the completion waiter around them.
//!
//! # State Machine
//!
//! Three event classes drive all mutation:
//!
//! - **External requests**: [`PanelView::set_active`] changes the active
//!   panel, classifying the move as forward or back against history.
//! - **Gesture events**: the normalized drag stream feeds
//!   [`PanelView::handle_gesture`], which previews and then commits or
//!   cancels a back navigation.
//! - **Completion signals**: [`PanelView::completion`] (native) and
//!   [`PanelView::poll`] (timer fallback) finalize whatever phase is
//!   waiting.
//!
//! # Invariants
//!
//! 1. `prev` is set iff `animated || swiping`.
//! 2. At most one of the entering animation and the swipe gesture is active.
//! 3. A `set_active` arriving mid-animation retargets in place: the mid-exit
//!    panel stays the `prev` anchor, the superseded wait is disarmed, and
//!    exactly one transition-end is reported, carrying the newest target.
//! 4. Completion signals for superseded phases are discarded by identity.
//!
//! # Failure Modes
//!
//! - Requests for unregistered panels are logged and ignored.
//! - Gestures are ignored mid-animation and on text-entry targets.

use slipstack_core::completion::{CompletionProperty, CompletionWaiter};
use slipstack_core::gesture::{
    self, GestureEvent, GesturePhase, SwipeDecision, TargetKind,
};
use slipstack_core::{
    Capabilities, FocusSuspension, FocusToken, GestureConfig, History, PanelId, ScrollCache,
    ScrollHost,
};
use tracing::{debug, warn};
use web_time::Instant;

use crate::effect::{NavEffect, TransitionInfo};
use crate::hints::{PanelRole, SwipeQualifier, SwipeStyle, Translate};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for one panel stack.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Width of the viewport the stack fills, in distance units.
    pub viewport_width: f64,
    /// Swipe-back thresholds.
    pub gesture: GestureConfig,
    /// Platform capability set.
    pub capabilities: Capabilities,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            gesture: GestureConfig::default(),
            capabilities: Capabilities::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Requested terminal outcome of a live swipe-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// The settle animation commits the back navigation.
    Success,
    /// The settle animation returns to the pre-gesture state.
    Fail,
}

/// The complete transition state of one panel stack.
#[derive(Debug, Clone)]
pub struct PanelTransitionState {
    active: PanelId,
    prev: Option<PanelId>,
    is_back: Option<bool>,
    animated: bool,
    swiping: bool,
    browser_swipe: bool,
    swipe_shift: f64,
    swipe_start_x: f64,
    swipe_start: Option<Instant>,
    swipe_outcome: Option<SwipeOutcome>,
    history: History<PanelId>,
}

impl PanelTransitionState {
    fn new(initial: PanelId) -> Self {
        Self {
            history: History::with_initial(initial.clone()),
            active: initial,
            prev: None,
            is_back: None,
            animated: false,
            swiping: false,
            browser_swipe: false,
            swipe_shift: 0.0,
            swipe_start_x: 0.0,
            swipe_start: None,
            swipe_outcome: None,
        }
    }

    /// The currently active panel.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &PanelId {
        &self.active
    }

    /// The panel being left, while a transition or swipe is in flight.
    #[inline]
    #[must_use]
    pub fn prev(&self) -> Option<&PanelId> {
        self.prev.as_ref()
    }

    /// Direction of the in-flight animated transition, if any.
    #[inline]
    #[must_use]
    pub fn is_back(&self) -> Option<bool> {
        self.is_back
    }

    /// Whether an animated transition is in flight.
    #[inline]
    #[must_use]
    pub fn animated(&self) -> bool {
        self.animated
    }

    /// Whether a swipe-back gesture is being tracked.
    #[inline]
    #[must_use]
    pub fn swiping(&self) -> bool {
        self.swiping
    }

    /// Current clamped swipe shift.
    #[inline]
    #[must_use]
    pub fn swipe_shift(&self) -> f64 {
        self.swipe_shift
    }

    /// Requested swipe outcome, once the drag has been released.
    #[inline]
    #[must_use]
    pub fn swipe_outcome(&self) -> Option<SwipeOutcome> {
        self.swipe_outcome
    }

    /// The back-stack, oldest first.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &History<PanelId> {
        &self.history
    }
}

// ---------------------------------------------------------------------------
// Events and side-effect descriptors
// ---------------------------------------------------------------------------

/// An event consumed by the panel reducer.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// External request to change the active panel.
    RequestActive(PanelId),
    /// An eligible drag may begin.
    GestureStart {
        /// Horizontal start position.
        x: f64,
        /// Timestamp of the start.
        at: Instant,
        /// Kind of element the drag started on.
        target: TargetKind,
    },
    /// The drag moved.
    GestureMove {
        /// Raw shift since the start, unclamped.
        shift_x: f64,
    },
    /// The drag was released.
    GestureEnd {
        /// Timestamp of the release.
        at: Instant,
    },
    /// The wait guarding the current phase resolved (signal or timer).
    CompletionFired,
}

/// Side effect requested by the reducer, executed by the owner.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    CaptureScroll(PanelId),
    RestoreScroll(PanelId),
    DropScroll(PanelId),
    ArmWait {
        panel: PanelId,
        property: CompletionProperty,
    },
    DisarmWaits,
    Blur,
    Emit(NavEffect),
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Pure transition function for the panel state machine.
///
/// Mutates `state` and returns the side effects the owner must execute, in
/// order. No host capability is touched here, which keeps every transition
/// unit-testable.
pub(crate) fn reduce(
    state: &mut PanelTransitionState,
    event: PanelEvent,
    config: &PanelConfig,
    panels: &[PanelId],
) -> Vec<Step> {
    match event {
        PanelEvent::RequestActive(id) => request_active(state, id, config, panels),
        PanelEvent::GestureStart { x, at, target } => gesture_start(state, x, at, target, config),
        PanelEvent::GestureMove { shift_x } => {
            if state.swiping && state.swipe_outcome.is_none() {
                state.swipe_shift =
                    gesture::clamp_shift(shift_x, state.swipe_start_x, config.viewport_width);
            }
            Vec::new()
        }
        PanelEvent::GestureEnd { at } => gesture_end(state, at, config),
        PanelEvent::CompletionFired => completion_fired(state),
    }
}

fn request_active(
    state: &mut PanelTransitionState,
    id: PanelId,
    config: &PanelConfig,
    panels: &[PanelId],
) -> Vec<Step> {
    if !panels.contains(&id) {
        warn!(panel = %id, "ignoring request for unregistered panel");
        return Vec::new();
    }
    if id == state.active && !state.swiping {
        return Vec::new();
    }

    let mut steps = Vec::new();

    if state.swiping {
        // An explicit navigation supersedes the gesture: abandon it without
        // a settle animation and restore the pre-gesture panel.
        steps.push(Step::DisarmWaits);
        if let Some(prev) = state.prev.take() {
            state.active = prev;
        }
        clear_swipe(state);
        steps.push(Step::RestoreScroll(state.active.clone()));
        if id == state.active {
            return steps;
        }
    }

    let from = state.active.clone();

    if state.browser_swipe {
        // The platform already animated this change; apply it cold.
        let _ = state.history.navigate(id.clone());
        state.active = id;
        state.prev = None;
        state.animated = false;
        state.is_back = None;
        state.browser_swipe = false;
        steps.push(Step::DisarmWaits);
        debug!(from = %from, to = %state.active, "browser swipe applied without animation");
        return steps;
    }

    let is_back = state.history.contains(&id);
    let retarget = state.animated;

    steps.push(Step::CaptureScroll(from.clone()));
    steps.push(Step::Blur);

    if retarget {
        // Keep the mid-exit panel as the prev anchor; only the target moves.
        steps.push(Step::DisarmWaits);
        if state.prev.as_ref() == Some(&id) {
            // Returning to the anchor itself: the superseded target is the
            // panel on its way out now, not the anchor.
            state.prev = Some(from.clone());
        }
    } else {
        state.prev = Some(from.clone());
    }
    state.active = id.clone();
    state.animated = true;
    state.is_back = Some(is_back);
    let _ = state.history.navigate(id.clone());

    if !retarget {
        steps.push(Step::Emit(NavEffect::TransitionStart(TransitionInfo {
            from: from.clone(),
            to: id.clone(),
            is_back,
        })));
    }

    if config.capabilities.transition_motion_enabled {
        let watch = if is_back {
            state.prev.clone().unwrap_or_else(|| id.clone())
        } else {
            id
        };
        steps.push(Step::ArmWait {
            panel: watch,
            property: CompletionProperty::Animation,
        });
    } else {
        steps.extend(finalize_transition(state));
    }

    steps
}

fn gesture_start(
    state: &mut PanelTransitionState,
    x: f64,
    at: Instant,
    target: TargetKind,
    config: &PanelConfig,
) -> Vec<Step> {
    let caps = &config.capabilities;
    if target == TargetKind::TextEntry {
        return Vec::new();
    }
    if state.swiping || state.animated {
        return Vec::new();
    }
    if !gesture::is_edge_start(x, config.viewport_width, &config.gesture) {
        return Vec::new();
    }
    if !caps.edge_swipe_back {
        if caps.platform_owns_edge_gestures && !state.browser_swipe {
            state.browser_swipe = true;
            debug!("edge drag ceded to platform navigation");
        }
        return Vec::new();
    }
    let Some(target_panel) = state.history.penultimate().cloned() else {
        return Vec::new();
    };

    let from = state.active.clone();
    state.swiping = true;
    state.swipe_start_x = x;
    state.swipe_start = Some(at);
    state.swipe_shift = 0.0;
    state.swipe_outcome = None;
    state.prev = Some(from.clone());
    state.active = target_panel.clone();

    vec![
        Step::CaptureScroll(from.clone()),
        Step::Emit(NavEffect::TransitionStart(TransitionInfo {
            from,
            to: target_panel,
            is_back: true,
        })),
        Step::Emit(NavEffect::SwipeBackStart),
    ]
}

fn gesture_end(state: &mut PanelTransitionState, at: Instant, config: &PanelConfig) -> Vec<Step> {
    if !state.swiping || state.swipe_outcome.is_some() {
        return Vec::new();
    }
    let elapsed = state
        .swipe_start
        .map(|start| at.duration_since(start))
        .unwrap_or_default();
    let shift = state.swipe_shift;
    let vw = config.viewport_width;

    // Degenerate releases finalize without a settle animation.
    if shift == 0.0 {
        return cancel_swipe(state);
    }
    if shift >= vw {
        return commit_swipe(state);
    }

    let decision = gesture::decide(shift, vw, elapsed, state.swipe_start_x, &config.gesture);
    state.swipe_outcome = Some(match decision {
        SwipeDecision::Commit => SwipeOutcome::Success,
        SwipeDecision::Cancel => SwipeOutcome::Fail,
    });

    if config.capabilities.transition_motion_enabled {
        vec![Step::ArmWait {
            panel: state.active.clone(),
            property: CompletionProperty::Transform,
        }]
    } else {
        match state.swipe_outcome {
            Some(SwipeOutcome::Success) => commit_swipe(state),
            _ => cancel_swipe(state),
        }
    }
}

fn completion_fired(state: &mut PanelTransitionState) -> Vec<Step> {
    match state.swipe_outcome {
        Some(SwipeOutcome::Success) => commit_swipe(state),
        Some(SwipeOutcome::Fail) => cancel_swipe(state),
        None if state.animated => finalize_transition(state),
        None => Vec::new(),
    }
}

/// Finalize an ordinary (non-gesture) transition.
fn finalize_transition(state: &mut PanelTransitionState) -> Vec<Step> {
    let mut steps = Vec::new();
    state.animated = false;
    let from = state.prev.take();
    let is_back = state.is_back.take().unwrap_or(false);
    // The drop rule applies only to a panel actually discarded; the
    // now-active panel's entry must survive for the restore below.
    if is_back
        && let Some(departed) = &from
        && *departed != state.active
    {
        steps.push(Step::DropScroll(departed.clone()));
    }
    steps.push(Step::RestoreScroll(state.active.clone()));
    if let Some(from) = from {
        steps.push(Step::Emit(NavEffect::TransitionEnd(TransitionInfo {
            from,
            to: state.active.clone(),
            is_back,
        })));
    }
    steps
}

/// Finalize a committed swipe-back.
fn commit_swipe(state: &mut PanelTransitionState) -> Vec<Step> {
    let mut steps = Vec::new();
    let departed = state.prev.take();
    let to = state.active.clone();
    let _ = state.history.navigate(to.clone());
    clear_swipe(state);
    if let Some(departed) = departed {
        steps.push(Step::DropScroll(departed.clone()));
        steps.push(Step::RestoreScroll(to.clone()));
        steps.push(Step::Emit(NavEffect::SwipeBackSuccess));
        steps.push(Step::Emit(NavEffect::TransitionEnd(TransitionInfo {
            from: departed,
            to,
            is_back: true,
        })));
    }
    steps
}

/// Finalize a cancelled swipe-back, reverting to the pre-gesture panel.
fn cancel_swipe(state: &mut PanelTransitionState) -> Vec<Step> {
    if let Some(prev) = state.prev.take() {
        state.active = prev;
    }
    clear_swipe(state);
    vec![
        Step::Emit(NavEffect::SwipeBackCancel),
        Step::RestoreScroll(state.active.clone()),
    ]
}

fn clear_swipe(state: &mut PanelTransitionState) {
    state.swiping = false;
    state.swipe_shift = 0.0;
    state.swipe_start_x = 0.0;
    state.swipe_start = None;
    state.swipe_outcome = None;
}

// ---------------------------------------------------------------------------
// Owner
// ---------------------------------------------------------------------------

/// The panel stack controller: applies the reducer and executes its side
/// effects against the host capabilities.
pub struct PanelView {
    state: PanelTransitionState,
    panels: Vec<PanelId>,
    config: PanelConfig,
    cache: ScrollCache,
    scroll: Box<dyn ScrollHost>,
    focus: FocusSuspension,
    focus_token: Option<FocusToken>,
    waiter: CompletionWaiter<PanelId>,
}

impl std::fmt::Debug for PanelView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelView")
            .field("active", &self.state.active)
            .field("animated", &self.state.animated)
            .field("swiping", &self.state.swiping)
            .finish()
    }
}

impl PanelView {
    /// Create a controller for the declared set of panels.
    ///
    /// `initial` is the externally supplied starting panel; if it is not in
    /// `panels` it is registered with a warning.
    pub fn new(
        initial: impl Into<PanelId>,
        panels: Vec<PanelId>,
        config: PanelConfig,
        cache: ScrollCache,
        scroll: Box<dyn ScrollHost>,
        focus: FocusSuspension,
    ) -> Self {
        let initial = initial.into();
        let mut panels = panels;
        if !panels.contains(&initial) {
            warn!(panel = %initial, "initial panel missing from declared set");
            panels.push(initial.clone());
        }
        let waiter = CompletionWaiter::new(
            config.capabilities.native_completion_signals,
            config.capabilities.settle_duration(),
        );
        Self {
            state: PanelTransitionState::new(initial),
            panels,
            config,
            cache,
            scroll,
            focus,
            focus_token: None,
            waiter,
        }
    }

    /// External request to change the active panel.
    pub fn set_active(&mut self, id: impl Into<PanelId>, now: Instant) -> Vec<NavEffect> {
        let steps = reduce(
            &mut self.state,
            PanelEvent::RequestActive(id.into()),
            &self.config,
            &self.panels,
        );
        self.apply(steps, now)
    }

    /// Feed one event of the normalized drag stream.
    pub fn handle_gesture(&mut self, event: &GestureEvent, now: Instant) -> Vec<NavEffect> {
        let panel_event = match event.phase {
            GesturePhase::Start => PanelEvent::GestureStart {
                x: event.x,
                at: now,
                target: event.target,
            },
            GesturePhase::Move => {
                if !event.is_slide {
                    return Vec::new();
                }
                PanelEvent::GestureMove {
                    shift_x: event.shift_x,
                }
            }
            GesturePhase::End => PanelEvent::GestureEnd { at: now },
        };
        let steps = reduce(&mut self.state, panel_event, &self.config, &self.panels);
        self.apply(steps, now)
    }

    /// Deliver a native completion signal for `panel`.
    ///
    /// Signals that do not match the armed wait are stale and discarded.
    pub fn completion(
        &mut self,
        panel: &PanelId,
        property: CompletionProperty,
        now: Instant,
    ) -> Vec<NavEffect> {
        if !self.waiter.on_signal(panel, property) {
            return Vec::new();
        }
        let steps = reduce(
            &mut self.state,
            PanelEvent::CompletionFired,
            &self.config,
            &self.panels,
        );
        self.apply(steps, now)
    }

    /// Advance the settle-timer fallback. Call periodically when the
    /// platform has no native completion signals.
    pub fn poll(&mut self, now: Instant) -> Vec<NavEffect> {
        let mut effects = Vec::new();
        for _panel in self.waiter.poll(now) {
            let steps = reduce(
                &mut self.state,
                PanelEvent::CompletionFired,
                &self.config,
                &self.panels,
            );
            effects.extend(self.apply(steps, now));
        }
        effects
    }

    fn apply(&mut self, steps: Vec<Step>, now: Instant) -> Vec<NavEffect> {
        let mut effects = Vec::new();
        for step in steps {
            match step {
                Step::CaptureScroll(id) => {
                    let offset = self.scroll.get_scroll(&id);
                    self.cache.write(&id, offset);
                }
                Step::RestoreScroll(id) => {
                    if let Some(offset) = self.cache.read(&id) {
                        self.scroll.set_scroll(&id, offset);
                    }
                }
                Step::DropScroll(id) => self.cache.remove(&id),
                Step::ArmWait { panel, property } => {
                    // One in-flight transition per stack: replace, never stack.
                    self.waiter.clear();
                    self.waiter.arm(panel, property, now);
                }
                Step::DisarmWaits => self.waiter.clear(),
                Step::Blur => self.focus.blur(),
                Step::Emit(effect) => effects.push(effect),
            }
        }
        self.sync_focus();
        effects
    }

    fn sync_focus(&mut self) {
        let in_transition = self.state.animated || self.state.swiping;
        if in_transition && self.focus_token.is_none() {
            self.focus_token = Some(self.focus.suspend());
        } else if !in_transition
            && let Some(token) = self.focus_token.take()
        {
            self.focus.restore(token);
        }
    }

    // --- Accessors and render hints ---

    /// The transition state, for render decisions.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PanelTransitionState {
        &self.state
    }

    /// The declared panel set.
    #[inline]
    #[must_use]
    pub fn panels(&self) -> &[PanelId] {
        &self.panels
    }

    /// Mutable configuration access (e.g. viewport resize).
    pub fn set_viewport_width(&mut self, width: f64) {
        self.config.viewport_width = width;
    }

    /// Whether any transition or gesture is in flight.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.state.animated || self.state.swiping
    }

    /// Panels that should currently be mounted: the active panel, plus the
    /// previous one while a transition or swipe is in flight.
    #[must_use]
    pub fn visible_panels(&self) -> Vec<&PanelId> {
        let mut visible = vec![&self.state.active];
        if (self.state.animated || self.state.swiping)
            && let Some(prev) = self.state.prev.as_ref()
        {
            visible.push(prev);
        }
        visible
    }

    /// Role of `panel` at this instant, if it participates in rendering.
    #[must_use]
    pub fn panel_role(&self, panel: &PanelId) -> Option<PanelRole> {
        let state = &self.state;
        if state.swiping {
            if state.prev.as_ref() == Some(panel) {
                return Some(PanelRole::SwipeBackPrev);
            }
            if *panel == state.active {
                return Some(PanelRole::SwipeBackNext);
            }
        } else if state.animated {
            if state.prev.as_ref() == Some(panel) {
                return Some(PanelRole::Prev);
            }
            if *panel == state.active {
                return Some(PanelRole::Next);
            }
        } else if *panel == state.active {
            return Some(PanelRole::Active);
        }
        None
    }

    /// Qualifier for the swipe-back roles once an outcome is requested.
    #[must_use]
    pub fn swipe_qualifier(&self) -> Option<SwipeQualifier> {
        match self.state.swipe_outcome {
            Some(SwipeOutcome::Success) => Some(SwipeQualifier::Success),
            Some(SwipeOutcome::Fail) => Some(SwipeQualifier::Fail),
            None => None,
        }
    }

    /// Inline transform/shadow pair for `panel` while a drag is live.
    ///
    /// `None` outside a drag and once an outcome is requested (the settle
    /// animation is class-driven, not inline).
    #[must_use]
    pub fn swipe_style(&self, panel: &PanelId) -> Option<SwipeStyle> {
        let state = &self.state;
        if !state.swiping || state.swipe_outcome.is_some() {
            return None;
        }
        let vw = self.config.viewport_width;
        let shift = state.swipe_shift;
        if state.prev.as_ref() == Some(panel) {
            return Some(SwipeStyle {
                translate: Translate::Px(shift),
                shadow: 0.3 * (vw - shift) / vw,
            });
        }
        if *panel == state.active {
            return Some(SwipeStyle {
                translate: Translate::Percent(-50.0 + shift * 100.0 / vw / 2.0),
                shadow: 0.0,
            });
        }
        None
    }

    /// Whether transition motion is enabled for this context.
    #[must_use]
    pub fn motion_enabled(&self) -> bool {
        self.config.capabilities.transition_motion_enabled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use slipstack_core::NoopScrollHost;
    use web_time::Duration;

    fn ids(names: &[&str]) -> Vec<PanelId> {
        names.iter().map(|n| PanelId::from(*n)).collect()
    }

    fn view(caps: Capabilities) -> PanelView {
        let config = PanelConfig {
            viewport_width: 1000.0,
            gesture: GestureConfig::default(),
            capabilities: caps,
        };
        PanelView::new(
            "home",
            ids(&["home", "profile", "settings"]),
            config,
            ScrollCache::new(),
            Box::new(NoopScrollHost),
            FocusSuspension::noop(),
        )
    }

    fn swipe_caps() -> Capabilities {
        Capabilities::default().with_edge_swipe_back()
    }

    fn finish(view: &mut PanelView, panel: &str, property: CompletionProperty) -> Vec<NavEffect> {
        view.completion(&PanelId::from(panel), property, Instant::now())
    }

    #[test]
    fn forward_transition_scenario() {
        let mut view = view(Capabilities::default());
        let now = Instant::now();

        let effects = view.set_active("profile", now);
        assert_eq!(
            effects,
            vec![NavEffect::TransitionStart(TransitionInfo {
                from: PanelId::from("home"),
                to: PanelId::from("profile"),
                is_back: false,
            })]
        );
        assert!(view.state().animated());
        assert_eq!(
            view.state().history().entries(),
            &[PanelId::from("home"), PanelId::from("profile")]
        );

        let effects = finish(&mut view, "profile", CompletionProperty::Animation);
        assert_eq!(
            effects,
            vec![NavEffect::TransitionEnd(TransitionInfo {
                from: PanelId::from("home"),
                to: PanelId::from("profile"),
                is_back: false,
            })]
        );
        assert!(!view.state().animated());
        assert_eq!(view.state().prev(), None);

        // Going home again is a back navigation that truncates history.
        let effects = view.set_active("home", Instant::now());
        assert!(matches!(
            effects.first(),
            Some(NavEffect::TransitionStart(TransitionInfo { is_back: true, .. }))
        ));
        // Back transitions watch the exiting panel.
        let effects = finish(&mut view, "profile", CompletionProperty::Animation);
        assert!(matches!(
            effects.first(),
            Some(NavEffect::TransitionEnd(TransitionInfo { is_back: true, .. }))
        ));
        assert_eq!(view.state().history().entries(), &[PanelId::from("home")]);
    }

    #[test]
    fn request_for_active_panel_is_noop() {
        let mut view = view(Capabilities::default());
        assert!(view.set_active("home", Instant::now()).is_empty());
        assert!(!view.state().animated());
    }

    #[test]
    fn unregistered_panel_is_ignored() {
        let mut view = view(Capabilities::default());
        assert!(view.set_active("nope", Instant::now()).is_empty());
        assert_eq!(view.state().active(), &PanelId::from("home"));
        assert_eq!(view.state().history().len(), 1);
    }

    #[test]
    fn retarget_reports_single_end_with_newest_target() {
        let mut view = view(Capabilities::default());
        let now = Instant::now();

        let first = view.set_active("profile", now);
        assert_eq!(first.len(), 1); // only the start
        let second = view.set_active("settings", now);
        // No second TransitionStart, no end yet.
        assert!(second.is_empty());
        assert!(view.state().animated());
        assert_eq!(view.state().prev(), Some(&PanelId::from("home")));

        // The superseded wait is dead: the old target's signal is stale.
        let stale = finish(&mut view, "profile", CompletionProperty::Animation);
        assert!(stale.is_empty());
        assert!(view.state().animated());

        let effects = finish(&mut view, "settings", CompletionProperty::Animation);
        assert_eq!(
            effects,
            vec![NavEffect::TransitionEnd(TransitionInfo {
                from: PanelId::from("home"),
                to: PanelId::from("settings"),
                is_back: false,
            })]
        );
        assert!(!view.state().animated());
    }

    #[test]
    fn retarget_back_to_anchor_completes_the_return() {
        let mut view = view(Capabilities::default());
        let now = Instant::now();

        let _ = view.set_active("profile", now);
        // Second request returns to the first transition's source: the
        // superseded target is the panel exiting now.
        let second = view.set_active("home", now);
        assert!(second.is_empty());
        assert_eq!(view.state().active(), &PanelId::from("home"));
        assert_eq!(view.state().prev(), Some(&PanelId::from("profile")));
        assert_eq!(view.state().is_back(), Some(true));

        let effects = finish(&mut view, "profile", CompletionProperty::Animation);
        assert_eq!(
            effects,
            vec![NavEffect::TransitionEnd(TransitionInfo {
                from: PanelId::from("profile"),
                to: PanelId::from("home"),
                is_back: true,
            })]
        );
        assert!(!view.state().animated());
        assert_eq!(view.state().history().entries(), &[PanelId::from("home")]);
    }

    #[test]
    fn stale_completion_is_discarded_when_idle() {
        let mut view = view(Capabilities::default());
        assert!(finish(&mut view, "home", CompletionProperty::Animation).is_empty());
    }

    #[test]
    fn motion_disabled_finalizes_immediately() {
        let mut view = view(Capabilities::default().without_motion());
        let effects = view.set_active("profile", Instant::now());
        assert_eq!(effects.len(), 2);
        assert!(matches!(effects[0], NavEffect::TransitionStart(_)));
        assert!(matches!(effects[1], NavEffect::TransitionEnd(_)));
        assert!(!view.state().animated());
    }

    #[test]
    fn gesture_requires_capability() {
        let mut view = view(Capabilities::default());
        let _ = view.set_active("profile", Instant::now());
        let _ = finish(&mut view, "profile", CompletionProperty::Animation);
        let effects = view.handle_gesture(&GestureEvent::start(10.0), Instant::now());
        assert!(effects.is_empty());
        assert!(!view.state().swiping());
    }

    #[test]
    fn gesture_requires_history_depth() {
        let mut view = view(swipe_caps());
        let effects = view.handle_gesture(&GestureEvent::start(10.0), Instant::now());
        assert!(effects.is_empty());
        assert!(!view.state().swiping());
    }

    #[test]
    fn gesture_ignored_mid_animation() {
        let mut view = view(swipe_caps());
        let _ = view.set_active("profile", Instant::now());
        assert!(view.state().animated());
        let effects = view.handle_gesture(&GestureEvent::start(10.0), Instant::now());
        assert!(effects.is_empty());
        assert!(!view.state().swiping());
    }

    #[test]
    fn gesture_ignored_on_text_entry_target() {
        let mut view = view(swipe_caps());
        let _ = view.set_active("profile", Instant::now());
        let _ = finish(&mut view, "profile", CompletionProperty::Animation);
        let event = GestureEvent::start(10.0).with_target(TargetKind::TextEntry);
        assert!(view.handle_gesture(&event, Instant::now()).is_empty());
        assert!(!view.state().swiping());
    }

    #[test]
    fn gesture_ignored_away_from_edge() {
        let mut view = view(swipe_caps());
        let _ = view.set_active("profile", Instant::now());
        let _ = finish(&mut view, "profile", CompletionProperty::Animation);
        assert!(
            view.handle_gesture(&GestureEvent::start(400.0), Instant::now())
                .is_empty()
        );
        assert!(!view.state().swiping());
    }

    fn start_swipe(view: &mut PanelView, now: Instant) {
        let _ = view.set_active("profile", now);
        let _ = finish(view, "profile", CompletionProperty::Animation);
        let effects = view.handle_gesture(&GestureEvent::start(10.0), now);
        assert!(effects.contains(&NavEffect::SwipeBackStart));
        assert!(view.state().swiping());
    }

    #[test]
    fn swipe_start_swaps_cursors() {
        let mut view = view(swipe_caps());
        start_swipe(&mut view, Instant::now());
        assert_eq!(view.state().active(), &PanelId::from("home"));
        assert_eq!(view.state().prev(), Some(&PanelId::from("profile")));
    }

    #[test]
    fn swipe_move_clamps_shift() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, -50.0), now);
        assert_eq!(view.state().swipe_shift(), 0.0);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, 2000.0), now);
        assert_eq!(view.state().swipe_shift(), 1000.0);
    }

    #[test]
    fn swipe_commit_waits_for_settle_then_truncates() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, 600.0), now);
        let effects = view.handle_gesture(
            &GestureEvent::end(10.0, 600.0),
            now + Duration::from_millis(120),
        );
        // Outcome requested; finalization waits for the settle signal.
        assert!(effects.is_empty());
        assert_eq!(view.state().swipe_outcome(), Some(SwipeOutcome::Success));

        let effects = finish(&mut view, "home", CompletionProperty::Transform);
        assert!(effects.contains(&NavEffect::SwipeBackSuccess));
        assert!(effects.contains(&NavEffect::TransitionEnd(TransitionInfo {
            from: PanelId::from("profile"),
            to: PanelId::from("home"),
            is_back: true,
        })));
        assert!(!view.state().swiping());
        assert_eq!(view.state().history().entries(), &[PanelId::from("home")]);
    }

    #[test]
    fn swipe_cancel_reverts_active() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, 100.0), now);
        let _ = view.handle_gesture(
            &GestureEvent::end(10.0, 100.0),
            now + Duration::from_secs(2),
        );
        assert_eq!(view.state().swipe_outcome(), Some(SwipeOutcome::Fail));

        let effects = finish(&mut view, "home", CompletionProperty::Transform);
        assert_eq!(
            effects,
            vec![NavEffect::SwipeBackCancel]
        );
        assert!(!view.state().swiping());
        assert_eq!(view.state().active(), &PanelId::from("profile"));
        assert_eq!(
            view.state().history().entries(),
            &[PanelId::from("home"), PanelId::from("profile")]
        );
    }

    #[test]
    fn zero_shift_release_cancels_immediately() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let effects = view.handle_gesture(&GestureEvent::end(10.0, 0.0), now);
        assert_eq!(effects, vec![NavEffect::SwipeBackCancel]);
        assert!(!view.state().swiping());
        assert_eq!(view.state().active(), &PanelId::from("profile"));
    }

    #[test]
    fn full_shift_release_commits_immediately() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, 2000.0), now);
        let effects = view.handle_gesture(&GestureEvent::end(10.0, 2000.0), now);
        assert!(effects.contains(&NavEffect::SwipeBackSuccess));
        assert_eq!(view.state().history().entries(), &[PanelId::from("home")]);
    }

    #[test]
    fn roles_during_forward_transition() {
        let mut view = view(Capabilities::default());
        let _ = view.set_active("profile", Instant::now());
        assert_eq!(
            view.panel_role(&PanelId::from("home")),
            Some(PanelRole::Prev)
        );
        assert_eq!(
            view.panel_role(&PanelId::from("profile")),
            Some(PanelRole::Next)
        );
        assert_eq!(view.panel_role(&PanelId::from("settings")), None);
        let _ = finish(&mut view, "profile", CompletionProperty::Animation);
        assert_eq!(
            view.panel_role(&PanelId::from("profile")),
            Some(PanelRole::Active)
        );
        assert_eq!(view.panel_role(&PanelId::from("home")), None);
    }

    #[test]
    fn roles_and_styles_during_swipe() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let _ = view.handle_gesture(&GestureEvent::slide(10.0, 250.0), now);

        assert_eq!(
            view.panel_role(&PanelId::from("profile")),
            Some(PanelRole::SwipeBackPrev)
        );
        assert_eq!(
            view.panel_role(&PanelId::from("home")),
            Some(PanelRole::SwipeBackNext)
        );

        let prev_style = view.swipe_style(&PanelId::from("profile")).unwrap();
        assert_eq!(prev_style.translate, Translate::Px(250.0));
        assert!((prev_style.shadow - 0.3 * 750.0 / 1000.0).abs() < 1e-9);

        let next_style = view.swipe_style(&PanelId::from("home")).unwrap();
        assert_eq!(
            next_style.translate,
            Translate::Percent(-50.0 + 250.0 * 100.0 / 1000.0 / 2.0)
        );
        assert_eq!(next_style.shadow, 0.0);

        // Once an outcome is requested the inline style drops.
        let _ = view.handle_gesture(
            &GestureEvent::end(10.0, 250.0),
            now + Duration::from_millis(50),
        );
        assert_eq!(view.swipe_style(&PanelId::from("profile")), None);
        assert_eq!(view.swipe_qualifier(), Some(SwipeQualifier::Success));
    }

    #[test]
    fn visible_panels_tracks_transition() {
        let mut view = view(Capabilities::default());
        assert_eq!(view.visible_panels(), vec![&PanelId::from("home")]);
        let _ = view.set_active("profile", Instant::now());
        assert_eq!(
            view.visible_panels(),
            vec![&PanelId::from("profile"), &PanelId::from("home")]
        );
    }

    #[test]
    fn timer_fallback_finalizes_via_poll() {
        let caps = Capabilities::default().without_native_signals();
        let mut view = view(caps);
        let now = Instant::now();
        let _ = view.set_active("profile", now);
        assert!(view.poll(now + Duration::from_millis(200)).is_empty());
        let effects = view.poll(now + Duration::from_millis(300));
        assert!(matches!(
            effects.first(),
            Some(NavEffect::TransitionEnd(_))
        ));
        assert!(!view.state().animated());
    }

    #[test]
    fn browser_swipe_latch_applies_change_cold() {
        let caps = Capabilities::default().with_platform_edge_gestures();
        let mut view = view(caps);
        let now = Instant::now();
        let _ = view.set_active("profile", now);
        let _ = finish(&mut view, "profile", CompletionProperty::Animation);

        // Edge drag latches the browser-swipe state instead of tracking.
        let _ = view.handle_gesture(&GestureEvent::start(5.0), now);
        assert!(!view.state().swiping());

        let effects = view.set_active("home", now);
        assert!(effects.is_empty());
        assert!(!view.state().animated());
        assert_eq!(view.state().active(), &PanelId::from("home"));
        assert_eq!(view.state().history().entries(), &[PanelId::from("home")]);
    }

    #[test]
    fn request_during_swipe_supersedes_gesture() {
        let mut view = view(swipe_caps());
        let now = Instant::now();
        start_swipe(&mut view, now);
        let effects = view.set_active("settings", now);
        assert!(!view.state().swiping());
        assert_eq!(view.state().active(), &PanelId::from("settings"));
        assert!(effects.iter().any(|e| matches!(
            e,
            NavEffect::TransitionStart(TransitionInfo { is_back: false, .. })
        )));
    }
}
