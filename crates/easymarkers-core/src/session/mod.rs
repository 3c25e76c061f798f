//! Preview session: the single owner of timeline and marker state
//!
//! The presentation layer drives the session with three kinds of calls:
//!
//! - [`PreviewSession::select_resource`] when a new audio resource is loaded
//! - [`PreviewSession::tick`] at the configured rate (~40 Hz) with a fresh
//!   [`PlaybackSnapshot`]
//! - [`PreviewSession::handle_gesture`] for every user gesture
//!
//! Requests for the audio transport are queued as [`TransportCommand`]s and
//! collected with [`PreviewSession::drain_commands`]. Sidecar reads and
//! writes go through the [`SidecarStorage`] given at construction.
//!
//! All methods are synchronous and must be called from one thread; a
//! multi-threaded host dispatches onto the owning thread.

mod command;

use std::fmt;

use crate::config::EngineConfig;
use crate::error::{PersistError, SessionResult};
use crate::markers::{visible_markers, MarkerPlacement, MarkerStore, SidecarStorage};
use crate::timeline::{FollowOutcome, TimelineViewport, TransportFollower};
use crate::types::{format_clock, AudioResource, PlaybackSnapshot, TimeRange};

pub use command::{Gesture, GestureOutcome, TransportCommand};

/// Geometry for one rendered frame of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    pub visible_range: TimeRange,
    /// Playhead offset in pixels (may fall outside the display)
    pub cursor_x: f64,
    /// Markers inside the visible range, in store order
    pub markers: Vec<MarkerPlacement>,
    /// Whether follow mode moved the visible range this tick
    pub recentered: bool,
    /// Playhead position as `M:SS.mmm`
    pub clock: String,
}

pub struct PreviewSession {
    config: EngineConfig,
    viewport: TimelineViewport,
    follower: TransportFollower,
    markers: MarkerStore,
    resource: Option<AudioResource>,
    /// Current zoom fraction (the value behind the zoom control)
    zoom: f64,
    /// Display width in pixels
    width_pixels: f64,
    pending: Vec<TransportCommand>,
}

impl PreviewSession {
    /// Create a session; `config` is clamped to valid ranges first
    pub fn new(mut config: EngineConfig, storage: impl SidecarStorage + 'static) -> Self {
        config.validate();
        Self {
            viewport: TimelineViewport::with_config(&config.timeline),
            follower: TransportFollower::new(),
            markers: MarkerStore::new(storage),
            resource: None,
            zoom: 0.0,
            width_pixels: 0.0,
            pending: Vec::new(),
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Resource lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    /// Switch to a new audio resource of `duration` seconds
    ///
    /// Resets the visible range and zoom, binds the marker store to the
    /// resource's sidecar (if it has one) and loads it. An invalid duration
    /// is rejected and leaves the session on its previous resource. A sidecar
    /// that fails to read or parse is reported, but the resource stays
    /// selected with an empty marker list.
    pub fn select_resource(&mut self, resource: AudioResource, duration: f64) -> SessionResult<()> {
        self.viewport.set_duration(duration)?;
        self.zoom = 0.0;

        let sidecar = resource.sidecar_path();
        log::info!(
            "select_resource: {:?} ({:.3}s), sidecar={:?}",
            resource,
            duration,
            sidecar
        );
        self.resource = Some(resource);

        if let Err(e) = self.markers.attach(sidecar) {
            log::warn!("select_resource: Markers not loaded: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn resource(&self) -> Option<&AudioResource> {
        self.resource.as_ref()
    }

    /// Set the display width used for coordinate conversions
    pub fn set_width(&mut self, width_pixels: f64) {
        self.width_pixels = if width_pixels.is_finite() {
            width_pixels.max(0.0)
        } else {
            0.0
        };
    }

    pub fn width(&self) -> f64 {
        self.width_pixels
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Periodic update
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance one tick with a freshly read transport snapshot
    pub fn tick(&mut self, snapshot: PlaybackSnapshot) -> TimelineFrame {
        let outcome = self.follower.tick(&mut self.viewport, &snapshot);
        self.frame(&snapshot, outcome == FollowOutcome::Recentered)
    }

    fn frame(&self, snapshot: &PlaybackSnapshot, recentered: bool) -> TimelineFrame {
        TimelineFrame {
            visible_range: self.viewport.visible_range(),
            cursor_x: self
                .viewport
                .time_to_coordinate(snapshot.position, self.width_pixels),
            markers: visible_markers(
                &self.markers,
                &self.viewport,
                self.width_pixels,
                self.config.markers.display_width,
            ),
            recentered,
            clock: format_clock(snapshot.position),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Gestures
    // ═══════════════════════════════════════════════════════════════════════

    /// Apply a user gesture against the current transport snapshot
    pub fn handle_gesture(
        &mut self,
        gesture: Gesture,
        snapshot: &PlaybackSnapshot,
    ) -> SessionResult<GestureOutcome> {
        let can_reposition = self.follower.can_user_reposition(snapshot);

        let outcome = match gesture {
            Gesture::Scroll { delta } => self.reposition(can_reposition, |vp| vp.scroll_by(delta)),
            Gesture::ScrollbarMoved { start } => {
                self.reposition(can_reposition, |vp| vp.move_to_start(start))
            }
            Gesture::Wheel { delta_x, delta_y } => self.wheel(delta_x, delta_y, can_reposition),
            Gesture::Zoom { fraction } => self.set_zoom(fraction),

            Gesture::DragSeek { time } => self.seek(time, can_reposition),
            Gesture::PointerSeek { x } => {
                let time = self.viewport.coordinate_to_time(x, self.width_pixels);
                self.seek(time, can_reposition)
            }
            Gesture::TogglePlayback => {
                self.pending.push(if snapshot.is_playing {
                    TransportCommand::Pause
                } else {
                    TransportCommand::Play
                });
                GestureOutcome::Applied
            }
            Gesture::Stop => {
                if snapshot.is_playing {
                    self.pending.push(TransportCommand::Pause);
                }
                self.pending.push(TransportCommand::Seek { position: 0.0 });
                GestureOutcome::Applied
            }
            Gesture::ToggleFollow(enabled) => {
                self.follower.set_follow_enabled(enabled);
                GestureOutcome::Applied
            }

            Gesture::AddMarker => {
                let id = self.markers.add(
                    snapshot.position,
                    self.config.markers.default_title.clone(),
                    self.config.markers.default_description.clone(),
                );
                GestureOutcome::MarkerAdded(id)
            }
            Gesture::RenameMarker { id, title } => {
                self.markers.rename(id, title)?;
                GestureOutcome::Applied
            }
            Gesture::DeleteMarker { id } => {
                self.markers.remove(id)?;
                GestureOutcome::Applied
            }
        };

        Ok(outcome)
    }

    fn reposition(
        &mut self,
        can_reposition: bool,
        apply: impl FnOnce(&mut TimelineViewport),
    ) -> GestureOutcome {
        if !self.viewport.has_content() {
            return GestureOutcome::Ignored;
        }
        if !can_reposition {
            return GestureOutcome::Refused;
        }
        apply(&mut self.viewport);
        GestureOutcome::Applied
    }

    fn wheel(&mut self, delta_x: f64, delta_y: f64, can_reposition: bool) -> GestureOutcome {
        if !self.viewport.has_content() {
            return GestureOutcome::Ignored;
        }

        let mut outcome = GestureOutcome::Ignored;
        if delta_x != 0.0 {
            if can_reposition {
                let length = self.viewport.visible_range().length();
                let divisor = self.config.timeline.wheel_scroll_divisor;
                self.viewport.scroll_by(-delta_x * length / divisor);
                outcome = GestureOutcome::Applied;
            } else {
                outcome = GestureOutcome::Refused;
            }
        }
        if delta_y != 0.0 && self.set_zoom(self.zoom - delta_y) == GestureOutcome::Applied {
            outcome = GestureOutcome::Applied;
        }
        outcome
    }

    fn set_zoom(&mut self, fraction: f64) -> GestureOutcome {
        if !fraction.is_finite() {
            return GestureOutcome::Ignored;
        }
        self.zoom = fraction.clamp(0.0, 1.0);
        if !self.viewport.has_content() {
            return GestureOutcome::Ignored;
        }
        self.viewport.set_zoom(self.zoom);
        GestureOutcome::Applied
    }

    fn seek(&mut self, time: f64, can_reposition: bool) -> GestureOutcome {
        if !self.viewport.has_content() || !time.is_finite() {
            return GestureOutcome::Ignored;
        }
        if !can_reposition {
            return GestureOutcome::Refused;
        }
        let position = time.clamp(0.0, self.viewport.total_duration());
        self.pending.push(TransportCommand::Seek { position });
        GestureOutcome::Applied
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Outbound
    // ═══════════════════════════════════════════════════════════════════════

    /// Take all transport commands queued since the last drain
    pub fn drain_commands(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.pending)
    }

    /// Take the last sidecar write failure, if any
    pub fn take_persist_warning(&mut self) -> Option<PersistError> {
        self.markers.take_persist_warning()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn viewport(&self) -> &TimelineViewport {
        &self.viewport
    }

    pub fn follower(&self) -> &TransportFollower {
        &self.follower
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current zoom fraction in `[0, 1]`
    pub fn zoom(&self) -> f64 {
        self.zoom
    }
}

impl fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewSession")
            .field("resource", &self.resource)
            .field("visible_range", &self.viewport.visible_range())
            .field("follow", &self.follower.follow_enabled())
            .field("markers", &self.markers.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
