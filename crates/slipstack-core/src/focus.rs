#![forbid(unsafe_code)]

//! Reference-counted focus suspension.
//!
//! Focus is a single global resource. A panel transition and a modal may
//! both need focus suspended at once; the inner one finishing must not
//! restore focus while the outer is still active. [`FocusSuspension`] counts
//! holders: the host's `suspend` runs on the 0→1 edge and its `restore` on
//! the 1→0 edge. Each holder gets a [`FocusToken`] and gives it back to
//! release its share.
//!
//! # Invariants
//!
//! 1. `host.suspend()` and `host.restore()` are called in strict
//!    alternation, starting with `suspend`.
//! 2. Tokens are not cloneable or forgeable; one `suspend` yields exactly
//!    one token.

use std::cell::RefCell;
use std::rc::Rc;

/// Focus capability supplied by the host.
pub trait FocusHost {
    /// Record the currently focused element and suspend focus management.
    fn suspend(&mut self);
    /// Restore focus to the element recorded by the matching `suspend`.
    fn restore(&mut self);
    /// Drop focus from the active element without suspending.
    ///
    /// Used by panel transitions, which blur rather than trap.
    fn blur(&mut self) {}
}

/// No-op focus host for headless or test contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFocusHost;

impl FocusHost for NoopFocusHost {
    fn suspend(&mut self) {}
    fn restore(&mut self) {}
}

/// Proof that one suspension share is held. Returned by
/// [`FocusSuspension::suspend`] and consumed by
/// [`FocusSuspension::restore`].
#[derive(Debug)]
#[must_use = "dropping a focus token leaks a suspension share"]
pub struct FocusToken {
    _priv: (),
}

struct Inner {
    depth: u32,
    host: Box<dyn FocusHost>,
}

/// Shared, reference-counted focus suspension over one [`FocusHost`].
#[derive(Clone)]
pub struct FocusSuspension {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for FocusSuspension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSuspension")
            .field("depth", &self.depth())
            .finish()
    }
}

impl FocusSuspension {
    /// Wrap a host focus capability.
    #[must_use]
    pub fn new(host: Box<dyn FocusHost>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner { depth: 0, host })),
        }
    }

    /// A suspension over a no-op host.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(NoopFocusHost))
    }

    /// Take one suspension share. Suspends the host on the first share.
    pub fn suspend(&self) -> FocusToken {
        let mut inner = self.inner.borrow_mut();
        inner.depth += 1;
        if inner.depth == 1 {
            inner.host.suspend();
        }
        FocusToken { _priv: () }
    }

    /// Give back one share. Restores the host focus when the last share is
    /// released.
    pub fn restore(&self, token: FocusToken) {
        drop(token);
        let mut inner = self.inner.borrow_mut();
        if inner.depth == 0 {
            tracing::warn!("focus restore without matching suspend");
            return;
        }
        inner.depth -= 1;
        if inner.depth == 0 {
            inner.host.restore();
        }
    }

    /// Blur the active element without taking a share.
    pub fn blur(&self) {
        self.inner.borrow_mut().host.blur();
    }

    /// Number of outstanding shares.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.inner.borrow().depth
    }

    /// Whether any holder currently suspends focus.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.depth() > 0
    }
}
