#![forbid(unsafe_code)]

//! Modal stack transitions: enter/exit serialization and focus suspension.
//!
//! [`ModalStack`] tracks one stack of registered modals. At any instant at
//! most one modal is active, at most one is entering, and at most one is
//! exiting. Card modals are exclusive; page modals may begin entering while
//! a card is still on its way out.
//!
//! # Invariants
//!
//! 1. The entering modal may animate only once the exiting slot is clear, or
//!    when its registered kind is [`ModalKind::Page`].
//! 2. A second activation arriving before the first exit completes preserves
//!    the already-exiting modal; only the active cursor moves.
//! 3. Host focus is suspended exactly while a modal is active or exiting.
//! 4. Modals are registered once from the declared set and never removed;
//!    only the transition cursor moves.

use ahash::AHashMap;
use slipstack_core::completion::{CompletionProperty, CompletionWaiter};
use slipstack_core::{Capabilities, FocusSuspension, FocusToken, History, ModalId};
use tracing::{debug, warn};
use web_time::Instant;

use crate::hints::ModalRole;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Stacking behavior of a registered modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Exclusive overlay; serializes against any in-flight exit.
    Card,
    /// Full-surface overlay; may begin entering over a still-exiting card.
    Page,
}

/// Declared attributes of one modal, registered at construction.
pub struct ModalSpec {
    id: ModalId,
    kind: ModalKind,
    dynamic_content_height: bool,
    settling_height: Option<f64>,
    on_close: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for ModalSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalSpec")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("dynamic_content_height", &self.dynamic_content_height)
            .field("settling_height", &self.settling_height)
            .field("has_on_close", &self.on_close.is_some())
            .finish()
    }
}

impl ModalSpec {
    /// Declare a card modal.
    #[must_use]
    pub fn card(id: impl Into<ModalId>) -> Self {
        Self {
            id: id.into(),
            kind: ModalKind::Card,
            dynamic_content_height: false,
            settling_height: None,
            on_close: None,
        }
    }

    /// Declare a page modal.
    #[must_use]
    pub fn page(id: impl Into<ModalId>) -> Self {
        Self {
            id: id.into(),
            kind: ModalKind::Page,
            dynamic_content_height: false,
            settling_height: None,
            on_close: None,
        }
    }

    /// Mark the modal's content height as dynamic (remeasured per update).
    #[must_use]
    pub fn with_dynamic_content_height(mut self) -> Self {
        self.dynamic_content_height = true;
        self
    }

    /// Pin the height the modal settles at, in distance units.
    #[must_use]
    pub fn with_settling_height(mut self, height: f64) -> Self {
        self.settling_height = Some(height);
        self
    }

    /// Attach a per-modal close handler.
    #[must_use]
    pub fn with_on_close(mut self, on_close: impl FnMut() + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// The modal's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ModalId {
        &self.id
    }

    /// The modal's stacking kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ModalKind {
        self.kind
    }

    /// Whether the content height is remeasured per update.
    #[inline]
    #[must_use]
    pub fn dynamic_content_height(&self) -> bool {
        self.dynamic_content_height
    }

    /// The declared settling height, if any.
    #[inline]
    #[must_use]
    pub fn settling_height(&self) -> Option<f64> {
        self.settling_height
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Which half of a modal's lifecycle a completion wait guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// The enter animation.
    Enter,
    /// The exit animation.
    Exit,
}

type WaitKey = (ModalId, ModalPhase);

/// The transition state of one modal stack.
#[derive(Debug, Clone, Default)]
pub struct ModalTransitionState {
    active: Option<ModalId>,
    entering: Option<ModalId>,
    exiting: Option<ModalId>,
    is_back: bool,
    history: History<ModalId>,
}

impl ModalTransitionState {
    /// The current top-of-stack modal, if any.
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&ModalId> {
        self.active.as_ref()
    }

    /// The modal whose enter animation is pending or running (ungated).
    #[inline]
    #[must_use]
    pub fn entering(&self) -> Option<&ModalId> {
        self.entering.as_ref()
    }

    /// The modal animating out, if any.
    #[inline]
    #[must_use]
    pub fn exiting(&self) -> Option<&ModalId> {
        self.exiting.as_ref()
    }

    /// Whether the last activation was a back navigation.
    #[inline]
    #[must_use]
    pub fn is_back(&self) -> bool {
        self.is_back
    }

    /// The modal back-stack, oldest first.
    #[inline]
    #[must_use]
    pub fn history(&self) -> &History<ModalId> {
        &self.history
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Configuration for one modal stack.
#[derive(Debug, Clone)]
pub struct ModalConfig {
    /// Drag distance at which the backdrop fully fades during
    /// drag-to-dismiss, used when the active modal declares no settling
    /// height.
    pub dismiss_extent: f64,
    /// Platform capability set.
    pub capabilities: Capabilities,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            dismiss_extent: 320.0,
            capabilities: Capabilities::default(),
        }
    }
}

/// The modal stack controller.
pub struct ModalStack {
    registry: AHashMap<ModalId, ModalSpec>,
    state: ModalTransitionState,
    config: ModalConfig,
    waiter: CompletionWaiter<WaitKey>,
    focus: FocusSuspension,
    focus_token: Option<FocusToken>,
    on_close: Option<Box<dyn FnMut(&ModalId)>>,
}

impl std::fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalStack")
            .field("active", &self.state.active)
            .field("entering", &self.state.entering)
            .field("exiting", &self.state.exiting)
            .finish()
    }
}

impl ModalStack {
    /// Create a controller over the declared modal set.
    ///
    /// Duplicate ids replace the earlier declaration with a warning.
    pub fn new(specs: Vec<ModalSpec>, config: ModalConfig, focus: FocusSuspension) -> Self {
        let mut registry = AHashMap::with_capacity(specs.len());
        for spec in specs {
            if registry.insert(spec.id.clone(), spec).is_some() {
                warn!("duplicate modal declaration replaces the earlier one");
            }
        }
        let waiter = CompletionWaiter::new(
            config.capabilities.native_completion_signals,
            config.capabilities.settle_duration(),
        );
        Self {
            registry,
            state: ModalTransitionState::default(),
            config,
            waiter,
            focus,
            focus_token: None,
            on_close: None,
        }
    }

    /// Install a fallback close handler, consulted when the active modal
    /// declares none of its own.
    #[must_use]
    pub fn with_close_fallback(mut self, on_close: impl FnMut(&ModalId) + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }

    /// Change the top-of-stack modal. `None` dismisses the whole stack and
    /// clears history.
    pub fn set_active(&mut self, id: Option<ModalId>, now: Instant) {
        if let Some(id) = &id
            && !self.registry.contains_key(id)
        {
            warn!(modal = %id, "ignoring request for unregistered modal");
            return;
        }
        if id == self.state.active {
            return;
        }

        // A modal already mid-exit is preserved; the departing active exits
        // only when the slot is free.
        if let Some(prev) = self.state.active.take()
            && self.state.exiting.is_none()
        {
            if self.motion_enabled() {
                self.waiter
                    .arm((prev.clone(), ModalPhase::Exit), CompletionProperty::Opacity, now);
                self.state.exiting = Some(prev);
            }
        }
        // A superseded entering modal never animated in; its wait is dead.
        if let Some(superseded) = self.state.entering.take() {
            self.waiter.disarm(&(superseded, ModalPhase::Enter));
        }

        match id {
            Some(id) => {
                self.state.is_back = self.state.history.contains(&id);
                let _ = self.state.history.navigate(id.clone());
                self.state.active = Some(id);
            }
            None => {
                self.state.is_back = true;
                self.state.history.clear();
            }
        }
        debug!(
            active = ?self.state.active,
            exiting = ?self.state.exiting,
            is_back = self.state.is_back,
            "modal cursor moved"
        );
        self.sync_focus();
    }

    /// The host has mounted and measured the newly active modal; its enter
    /// animation may be scheduled.
    pub fn inited(&mut self, id: &ModalId, now: Instant) {
        if self.state.active.as_ref() != Some(id) {
            return;
        }
        if self.state.entering.as_ref() == Some(id) || !self.motion_enabled() {
            return;
        }
        self.state.entering = Some(id.clone());
        self.waiter
            .arm((id.clone(), ModalPhase::Enter), CompletionProperty::Opacity, now);
    }

    /// Native completion signal for an enter animation. Stale signals are
    /// discarded.
    pub fn entered(&mut self, id: &ModalId) {
        if !self
            .waiter
            .on_signal(&(id.clone(), ModalPhase::Enter), CompletionProperty::Opacity)
        {
            return;
        }
        if self.state.entering.as_ref() == Some(id) {
            self.state.entering = None;
        }
    }

    /// Native completion signal for an exit animation. Stale signals are
    /// discarded.
    pub fn exited(&mut self, id: &ModalId) {
        if !self
            .waiter
            .on_signal(&(id.clone(), ModalPhase::Exit), CompletionProperty::Opacity)
        {
            return;
        }
        if self.state.exiting.as_ref() == Some(id) {
            self.state.exiting = None;
        }
        self.sync_focus();
    }

    /// Advance the settle-timer fallback. Call periodically when the
    /// platform has no native completion signals.
    pub fn poll(&mut self, now: Instant) {
        for (id, phase) in self.waiter.poll(now) {
            match phase {
                ModalPhase::Enter => {
                    if self.state.entering.as_ref() == Some(&id) {
                        self.state.entering = None;
                    }
                }
                ModalPhase::Exit => {
                    if self.state.exiting.as_ref() == Some(&id) {
                        self.state.exiting = None;
                    }
                }
            }
        }
        self.sync_focus();
    }

    /// Close the active modal through its registered handler.
    ///
    /// Precedence: the modal's own handler, then the stack fallback; with
    /// neither, the request is logged and dropped.
    pub fn close_active(&mut self) {
        let Some(active) = self.state.active.clone() else {
            return;
        };
        if let Some(spec) = self.registry.get_mut(&active)
            && let Some(on_close) = spec.on_close.as_mut()
        {
            on_close();
            return;
        }
        if let Some(on_close) = self.on_close.as_mut() {
            on_close(&active);
            return;
        }
        warn!(modal = %active, "no close handler registered");
    }

    fn sync_focus(&mut self) {
        let occupied = self.state.active.is_some() || self.state.exiting.is_some();
        if occupied && self.focus_token.is_none() {
            self.focus_token = Some(self.focus.suspend());
        } else if !occupied
            && let Some(token) = self.focus_token.take()
        {
            self.focus.restore(token);
        }
    }

    fn motion_enabled(&self) -> bool {
        self.config.capabilities.transition_motion_enabled
    }

    fn enter_gate_open(&self, id: &ModalId) -> bool {
        self.state.exiting.is_none()
            || self
                .registry
                .get(id)
                .is_some_and(|spec| spec.kind == ModalKind::Page)
    }

    // --- Accessors and render hints ---

    /// The transition state, for render decisions.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ModalTransitionState {
        &self.state
    }

    /// Declared attributes of `id`, if registered.
    #[must_use]
    pub fn spec(&self, id: &ModalId) -> Option<&ModalSpec> {
        self.registry.get(id)
    }

    /// The modal whose enter animation may run right now.
    ///
    /// `None` while the enter gate is closed (a card waiting on another
    /// modal's exit), even though the entering cursor is set.
    #[must_use]
    pub fn entering_modal(&self) -> Option<&ModalId> {
        self.state
            .entering
            .as_ref()
            .filter(|id| self.enter_gate_open(id))
    }

    /// Role of `id` at this instant, if it participates in rendering.
    #[must_use]
    pub fn modal_role(&self, id: &ModalId) -> Option<ModalRole> {
        if self.state.exiting.as_ref() == Some(id) {
            return Some(ModalRole::Prev);
        }
        if self.state.entering.as_ref() == Some(id) {
            return self.enter_gate_open(id).then_some(ModalRole::Next);
        }
        if self.state.active.as_ref() == Some(id) {
            return Some(ModalRole::Active);
        }
        None
    }

    /// Backdrop opacity while the active modal is dragged toward dismissal.
    ///
    /// Fades linearly over the modal's settling height (or the configured
    /// dismiss extent), clamped to `[0, 1]`.
    #[must_use]
    pub fn backdrop_opacity(&self, shift: f64) -> f64 {
        let extent = self
            .state
            .active
            .as_ref()
            .and_then(|id| self.registry.get(id))
            .and_then(|spec| spec.settling_height)
            .unwrap_or(self.config.dismiss_extent);
        1.0 - (shift / extent).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use web_time::Duration;

    fn id(name: &str) -> ModalId {
        ModalId::from(name)
    }

    fn stack(specs: Vec<ModalSpec>) -> ModalStack {
        ModalStack::new(specs, ModalConfig::default(), FocusSuspension::noop())
    }

    fn cards(names: &[&str]) -> Vec<ModalSpec> {
        names.iter().map(|n| ModalSpec::card(*n)).collect()
    }

    #[test]
    fn open_enter_entered_lifecycle() {
        let mut stack = stack(cards(&["filters"]));
        let now = Instant::now();

        stack.set_active(Some(id("filters")), now);
        assert_eq!(stack.state().active(), Some(&id("filters")));
        assert_eq!(stack.state().entering(), None);
        assert!(!stack.state().is_back());
        assert_eq!(stack.state().history().entries(), &[id("filters")]);

        stack.inited(&id("filters"), now);
        assert_eq!(stack.state().entering(), Some(&id("filters")));
        assert_eq!(stack.entering_modal(), Some(&id("filters")));

        stack.entered(&id("filters"));
        assert_eq!(stack.state().entering(), None);
        assert_eq!(stack.modal_role(&id("filters")), Some(ModalRole::Active));
    }

    #[test]
    fn unregistered_modal_is_ignored() {
        let mut stack = stack(cards(&["filters"]));
        stack.set_active(Some(id("nope")), Instant::now());
        assert_eq!(stack.state().active(), None);
        assert!(stack.state().history().is_empty());
    }

    #[test]
    fn inited_for_non_active_is_ignored() {
        let mut stack = stack(cards(&["a", "b"]));
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.inited(&id("b"), now);
        assert_eq!(stack.state().entering(), None);
    }

    #[test]
    fn exiting_preserved_across_retarget() {
        let mut stack = stack(cards(&["a", "b", "c"]));
        let now = Instant::now();

        stack.set_active(Some(id("a")), now);
        stack.inited(&id("a"), now);
        stack.entered(&id("a"));

        // B supersedes A before A finishes exiting; C supersedes B.
        stack.set_active(Some(id("b")), now);
        assert_eq!(stack.state().exiting(), Some(&id("a")));
        stack.set_active(Some(id("c")), now);
        assert_eq!(stack.state().exiting(), Some(&id("a")));
        assert_eq!(stack.state().active(), Some(&id("c")));

        // Only A's own signal clears the exit slot.
        stack.exited(&id("b"));
        assert_eq!(stack.state().exiting(), Some(&id("a")));
        stack.exited(&id("a"));
        assert_eq!(stack.state().exiting(), None);
    }

    #[test]
    fn dismiss_all_clears_history() {
        let mut stack = stack(cards(&["a", "b"]));
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.set_active(Some(id("b")), now);
        stack.set_active(None, now);
        assert_eq!(stack.state().active(), None);
        assert!(stack.state().is_back());
        assert!(stack.state().history().is_empty());
    }

    #[test]
    fn reopening_is_back_and_truncates() {
        let mut stack = stack(cards(&["a", "b"]));
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.set_active(Some(id("b")), now);
        stack.set_active(Some(id("a")), now);
        assert!(stack.state().is_back());
        assert_eq!(stack.state().history().entries(), &[id("a")]);
    }

    #[test]
    fn card_enter_gated_by_exit() {
        let mut stack = stack(cards(&["a", "b"]));
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.inited(&id("a"), now);
        stack.entered(&id("a"));

        stack.set_active(Some(id("b")), now);
        stack.inited(&id("b"), now);
        // A still exiting: the card may not animate in yet.
        assert_eq!(stack.state().entering(), Some(&id("b")));
        assert_eq!(stack.entering_modal(), None);
        assert_eq!(stack.modal_role(&id("b")), None);

        stack.exited(&id("a"));
        assert_eq!(stack.entering_modal(), Some(&id("b")));
        assert_eq!(stack.modal_role(&id("b")), Some(ModalRole::Next));
    }

    #[test]
    fn page_enters_over_exiting_card() {
        let mut stack = stack(vec![ModalSpec::card("card"), ModalSpec::page("page")]);
        let now = Instant::now();
        stack.set_active(Some(id("card")), now);
        stack.inited(&id("card"), now);
        stack.entered(&id("card"));

        stack.set_active(Some(id("page")), now);
        stack.inited(&id("page"), now);
        assert_eq!(stack.state().exiting(), Some(&id("card")));
        assert_eq!(stack.entering_modal(), Some(&id("page")));
        assert_eq!(stack.modal_role(&id("page")), Some(ModalRole::Next));
        assert_eq!(stack.modal_role(&id("card")), Some(ModalRole::Prev));
    }

    #[test]
    fn superseded_enter_signal_is_stale() {
        let mut stack = stack(cards(&["a", "b"]));
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.inited(&id("a"), now);
        // B supersedes A before A finished entering.
        stack.set_active(Some(id("b")), now);
        assert_eq!(stack.state().entering(), None);
        stack.entered(&id("a"));
        assert_eq!(stack.state().entering(), None);
        assert_eq!(stack.state().active(), Some(&id("b")));
    }

    #[test]
    fn motion_disabled_skips_animation_slots() {
        let config = ModalConfig {
            capabilities: Capabilities::default().without_motion(),
            ..ModalConfig::default()
        };
        let mut stack = ModalStack::new(cards(&["a", "b"]), config, FocusSuspension::noop());
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.inited(&id("a"), now);
        assert_eq!(stack.state().entering(), None);
        stack.set_active(Some(id("b")), now);
        assert_eq!(stack.state().exiting(), None);
        assert_eq!(stack.state().active(), Some(&id("b")));
    }

    #[test]
    fn timer_fallback_clears_exit_slot() {
        let config = ModalConfig {
            capabilities: Capabilities::default().without_native_signals(),
            ..ModalConfig::default()
        };
        let mut stack = ModalStack::new(cards(&["a", "b"]), config, FocusSuspension::noop());
        let now = Instant::now();
        stack.set_active(Some(id("a")), now);
        stack.set_active(Some(id("b")), now);
        assert_eq!(stack.state().exiting(), Some(&id("a")));
        stack.poll(now + Duration::from_millis(299));
        assert_eq!(stack.state().exiting(), Some(&id("a")));
        stack.poll(now + Duration::from_millis(300));
        assert_eq!(stack.state().exiting(), None);
    }

    #[test]
    fn close_prefers_modal_handler() {
        let modal_hits = Rc::new(Cell::new(0));
        let fallback_hits = Rc::new(Cell::new(0));
        let m = Rc::clone(&modal_hits);
        let f = Rc::clone(&fallback_hits);

        let spec = ModalSpec::card("a").with_on_close(move || m.set(m.get() + 1));
        let mut stack = ModalStack::new(vec![spec], ModalConfig::default(), FocusSuspension::noop())
            .with_close_fallback(move |_| f.set(f.get() + 1));

        stack.set_active(Some(id("a")), Instant::now());
        stack.close_active();
        assert_eq!(modal_hits.get(), 1);
        assert_eq!(fallback_hits.get(), 0);
    }

    #[test]
    fn close_falls_back_to_stack_handler() {
        let fallback_hits = Rc::new(Cell::new(0));
        let f = Rc::clone(&fallback_hits);
        let mut stack = ModalStack::new(
            cards(&["a"]),
            ModalConfig::default(),
            FocusSuspension::noop(),
        )
        .with_close_fallback(move |_| f.set(f.get() + 1));

        stack.set_active(Some(id("a")), Instant::now());
        stack.close_active();
        assert_eq!(fallback_hits.get(), 1);
    }

    #[test]
    fn close_without_handler_is_noop() {
        let mut stack = stack(cards(&["a"]));
        stack.set_active(Some(id("a")), Instant::now());
        stack.close_active();
        assert_eq!(stack.state().active(), Some(&id("a")));
    }

    #[test]
    fn focus_suspended_while_occupied() {
        let mut stack = stack(cards(&["a"]));
        let now = Instant::now();
        assert!(stack.focus_token.is_none());
        stack.set_active(Some(id("a")), now);
        assert!(stack.focus_token.is_some());
        stack.set_active(None, now);
        // A is still exiting: focus stays suspended.
        assert!(stack.focus_token.is_some());
        stack.exited(&id("a"));
        assert!(stack.focus_token.is_none());
    }

    #[test]
    fn backdrop_opacity_clamps() {
        let mut stack = stack(vec![ModalSpec::card("a").with_settling_height(400.0)]);
        stack.set_active(Some(id("a")), Instant::now());
        assert_eq!(stack.backdrop_opacity(0.0), 1.0);
        assert_eq!(stack.backdrop_opacity(200.0), 0.5);
        assert_eq!(stack.backdrop_opacity(400.0), 0.0);
        assert_eq!(stack.backdrop_opacity(900.0), 0.0);
        assert_eq!(stack.backdrop_opacity(-50.0), 1.0);
    }

    #[test]
    fn dismiss_extent_used_without_settling_height() {
        let mut stack = stack(cards(&["a"]));
        stack.set_active(Some(id("a")), Instant::now());
        assert_eq!(stack.backdrop_opacity(160.0), 0.5);
    }
}
