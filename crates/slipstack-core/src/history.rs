#![forbid(unsafe_code)]

//! Ordered back-stack of surface identifiers.
//!
//! [`History`] implements the single navigation rule shared by panels and
//! modals: navigating to an identifier already present truncates the stack to
//! end exactly at that identifier (a back navigation); navigating to a new
//! identifier appends it (a forward navigation).
//!
//! # Invariants
//!
//! 1. No two adjacent entries are ever equal.
//! 2. After `navigate(id)`, the last entry is `id`.
//! 3. `navigate` to a present identifier never reorders surviving entries.

/// Direction of a navigation as classified by the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    /// The target was not in the stack; it was appended.
    Forward,
    /// The target was already in the stack; the stack was truncated to it.
    Back,
}

impl NavDirection {
    /// Whether this navigation goes back toward an ancestor.
    #[inline]
    #[must_use]
    pub fn is_back(self) -> bool {
        matches!(self, Self::Back)
    }
}

/// An ordered back-stack of identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    entries: Vec<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: Clone + PartialEq> History<T> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Create a history seeded with a single entry.
    #[must_use]
    pub fn with_initial(initial: T) -> Self {
        Self { entries: vec![initial] }
    }

    /// Number of entries in the stack.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries, oldest first.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Whether the stack contains `id`.
    #[must_use]
    pub fn contains(&self, id: &T) -> bool {
        self.entries.contains(id)
    }

    /// The top of the stack, if any.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.last()
    }

    /// The entry directly beneath the top, if any.
    ///
    /// This is the target of a swipe-back gesture.
    #[must_use]
    pub fn penultimate(&self) -> Option<&T> {
        self.entries.len().checked_sub(2).and_then(|i| self.entries.get(i))
    }

    /// Apply the truncate-or-append rule for a navigation to `to`.
    ///
    /// Returns the classified direction. Navigating to the current top is a
    /// `Back` that leaves the stack unchanged.
    pub fn navigate(&mut self, to: T) -> NavDirection {
        if let Some(idx) = self.entries.iter().position(|e| *e == to) {
            self.entries.truncate(idx + 1);
            NavDirection::Back
        } else {
            self.entries.push(to);
            NavDirection::Forward
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
