#![forbid(unsafe_code)]

//! Platform capability set injected into the controllers at construction.
//!
//! Dynamic capability checks (native completion-signal support, edge-swipe
//! context flags, motion family) are modeled as plain data decided once by
//! the host, never probed at runtime by the controllers.

use web_time::Duration;

/// Motion family of the platform's animation curves.
///
/// Determines the timer-fallback settle duration when native completion
/// signals are unavailable: flat/linear curves settle quickly, spring curves
/// take roughly twice as long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionProfile {
    /// Linear / flat-motion platforms (short settle).
    #[default]
    Flat,
    /// Spring / curved-motion platforms (long settle).
    Spring,
}

impl MotionProfile {
    /// Timer-fallback duration for a transition on this platform family.
    #[must_use]
    pub fn settle_duration(self) -> Duration {
        match self {
            Self::Flat => Duration::from_millis(300),
            Self::Spring => Duration::from_millis(600),
        }
    }
}

/// Host-decided capability flags for one navigation context.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Whether edge-swipe-back is enabled for this context.
    pub edge_swipe_back: bool,
    /// Whether the platform delivers native animation/transition completion
    /// signals. When `false`, every wait falls back to a settle timer.
    pub native_completion_signals: bool,
    /// Animation curve family, used to pick the settle-timer tier.
    pub motion: MotionProfile,
    /// Whether transition motion is enabled at all. When `false`, every
    /// transition finalizes immediately without animating.
    pub transition_motion_enabled: bool,
    /// Whether the platform itself consumes edge drags (e.g. a browser's own
    /// history swipe). When set and `edge_swipe_back` is off, edge drags
    /// latch a passive browser-swipe state instead of being tracked.
    pub platform_owns_edge_gestures: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            edge_swipe_back: false,
            native_completion_signals: true,
            motion: MotionProfile::Flat,
            transition_motion_enabled: true,
            platform_owns_edge_gestures: false,
        }
    }
}

impl Capabilities {
    /// Enable edge-swipe-back for this context.
    #[must_use]
    pub fn with_edge_swipe_back(mut self) -> Self {
        self.edge_swipe_back = true;
        self
    }

    /// Mark native completion signals as unsupported.
    #[must_use]
    pub fn without_native_signals(mut self) -> Self {
        self.native_completion_signals = false;
        self
    }

    /// Set the motion family.
    #[must_use]
    pub fn with_motion(mut self, motion: MotionProfile) -> Self {
        self.motion = motion;
        self
    }

    /// Disable transition motion entirely.
    #[must_use]
    pub fn without_motion(mut self) -> Self {
        self.transition_motion_enabled = false;
        self
    }

    /// Mark the platform as owning edge gestures.
    #[must_use]
    pub fn with_platform_edge_gestures(mut self) -> Self {
        self.platform_owns_edge_gestures = true;
        self
    }

    /// Settle duration for the configured motion family.
    #[must_use]
    pub fn settle_duration(&self) -> Duration {
        self.motion.settle_duration()
    }
}
