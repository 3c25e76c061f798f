//! Transport follow mode
//!
//! While follow mode is on and audio is playing, the viewport is recentred
//! on the playhead every tick and user repositioning is refused. In every
//! other combination the user owns the viewport and the tick only moves
//! the cursor overlay.

use super::viewport::TimelineViewport;
use crate::types::PlaybackSnapshot;

/// What a follower tick did to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// Visible range was recentred on the playhead
    Recentered,
    /// Viewport untouched; only the cursor overlay needs updating
    CursorOnly,
}

#[derive(Debug, Clone, Default)]
pub struct TransportFollower {
    follow_enabled: bool,
}

impl TransportFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_follow_enabled(&mut self, enabled: bool) {
        self.follow_enabled = enabled;
    }

    pub fn follow_enabled(&self) -> bool {
        self.follow_enabled
    }

    /// False only while following a playing transport
    ///
    /// Gates scroll, scrollbar, drag and pointer-seek gestures.
    pub fn can_user_reposition(&self, snapshot: &PlaybackSnapshot) -> bool {
        !(self.follow_enabled && snapshot.is_playing)
    }

    /// Recenter `viewport` on the playhead when following a playing transport
    pub fn tick(
        &self,
        viewport: &mut TimelineViewport,
        snapshot: &PlaybackSnapshot,
    ) -> FollowOutcome {
        if self.can_user_reposition(snapshot) {
            return FollowOutcome::CursorOnly;
        }
        viewport.recenter_on(snapshot.position);
        FollowOutcome::Recentered
    }
}
