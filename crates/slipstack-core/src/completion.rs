#![forbid(unsafe_code)]

//! Waits for animation/transition completion signals, with timer fallback.
//!
//! Some platforms deliver a native "transition finished" signal per surface;
//! others never do. [`CompletionWaiter`] hides the difference behind one
//! contract: arm a wait for a keyed target, and the wait resolves exactly
//! once — either when the host forwards the native signal, or when the
//! settle timer expires on a `poll`.
//!
//! # Invariants
//!
//! 1. Re-arming a pending key replaces the pending wait; a key never fires
//!    twice for one arm.
//! 2. A signal for a key that is not armed is stale and is discarded.
//! 3. Timer deadlines exist only when native signals are unsupported.
//!
//! # Failure Modes
//!
//! - Native signals that never arrive on a native-capable platform leave the
//!   wait pending forever; the mid-transition retarget rule in the
//!   controllers disarms such waits rather than queueing behind them.

use std::fmt;

use web_time::{Duration, Instant};

/// The animated property a wait is bound to.
///
/// Signals carry the property they completed for; a signal only resolves a
/// wait armed for the same property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionProperty {
    /// A keyframe animation (panel enter/exit).
    Animation,
    /// A transform transition (swipe-back settle).
    Transform,
    /// An opacity transition (modal fade, backdrop).
    Opacity,
}

#[derive(Debug, Clone)]
struct PendingWait<K> {
    key: K,
    property: CompletionProperty,
    deadline: Option<Instant>,
}

/// Tracks in-flight completion waits keyed by surface identity.
///
/// `K` is the (surface id, phase) identity the owner uses for the
/// stale-signal check; keys must be cheap to clone and compare.
pub struct CompletionWaiter<K> {
    native: bool,
    settle: Duration,
    pending: Vec<PendingWait<K>>,
}

impl<K: fmt::Debug> fmt::Debug for CompletionWaiter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionWaiter")
            .field("native", &self.native)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<K: PartialEq + Clone + fmt::Debug> CompletionWaiter<K> {
    /// Create a waiter.
    ///
    /// `native` says whether the platform delivers completion signals;
    /// `settle` is the timer-fallback duration used when it does not.
    #[must_use]
    pub fn new(native: bool, settle: Duration) -> Self {
        Self {
            native,
            settle,
            pending: Vec::with_capacity(2),
        }
    }

    /// Arm (or re-arm) a wait for `key` bound to `property`.
    ///
    /// A pending wait for the same key is replaced, never doubled.
    pub fn arm(&mut self, key: K, property: CompletionProperty, now: Instant) {
        self.pending.retain(|w| w.key != key);
        let deadline = (!self.native).then(|| now + self.settle);
        tracing::debug!(?key, ?property, fallback = !self.native, "arm completion wait");
        self.pending.push(PendingWait {
            key,
            property,
            deadline,
        });
    }

    /// Stop waiting for `key`. No-op if not armed.
    pub fn disarm(&mut self, key: &K) {
        self.pending.retain(|w| w.key != *key);
    }

    /// Drop every pending wait.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether a wait is armed for `key`.
    #[must_use]
    pub fn is_armed(&self, key: &K) -> bool {
        self.pending.iter().any(|w| w.key == *key)
    }

    /// Whether any wait is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve a native signal for `key` on `property`.
    ///
    /// Returns `true` exactly when a matching wait was pending; a stale or
    /// mismatched signal returns `false` and changes nothing.
    pub fn on_signal(&mut self, key: &K, property: CompletionProperty) -> bool {
        if let Some(idx) = self
            .pending
            .iter()
            .position(|w| w.key == *key && w.property == property)
        {
            let _ = self.pending.remove(idx);
            true
        } else {
            tracing::trace!(?key, ?property, "stale completion signal discarded");
            false
        }
    }

    /// Resolve waits whose settle timer has expired.
    ///
    /// Only meaningful on platforms without native signals; returns the keys
    /// that fired, in arm order.
    pub fn poll(&mut self, now: Instant) -> Vec<K> {
        let mut fired = Vec::new();
        self.pending.retain(|w| {
            if w.deadline.is_some_and(|d| d <= now) {
                fired.push(w.key.clone());
                false
            } else {
                true
            }
        });
        fired
    }
}
