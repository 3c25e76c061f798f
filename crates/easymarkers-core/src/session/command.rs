//! Messages crossing the session boundary
//!
//! Inbound: [`Gesture`]s from the presentation layer.
//! Outbound: [`TransportCommand`]s for the audio transport, queued by the
//! session and drained by the host after each call.

use crate::markers::MarkerId;

/// Requests sent from the session to the audio transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    /// Move the playhead to `position` seconds
    Seek { position: f64 },
    /// Start playback
    Play,
    /// Pause playback
    Pause,
}

/// User input forwarded by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    // ─────────────────────────────────────────────────────────────
    // Viewport (gated by follow mode)
    // ─────────────────────────────────────────────────────────────
    /// Shift the visible range by `delta` seconds
    Scroll { delta: f64 },
    /// Scrollbar thumb dragged so the range starts at `start`
    ScrollbarMoved { start: f64 },
    /// Mouse wheel: horizontal travel scrolls, vertical travel zooms
    Wheel { delta_x: f64, delta_y: f64 },

    // ─────────────────────────────────────────────────────────────
    // Zoom
    // ─────────────────────────────────────────────────────────────
    /// Zoom control moved to a linear fraction in `[0, 1)`
    Zoom { fraction: f64 },

    // ─────────────────────────────────────────────────────────────
    // Transport (seeks gated by follow mode)
    // ─────────────────────────────────────────────────────────────
    /// Seek to an explicit time
    DragSeek { time: f64 },
    /// Seek to the time under pixel offset `x`
    PointerSeek { x: f64 },
    /// Play if paused, pause if playing
    TogglePlayback,
    /// Pause and return to the start
    Stop,
    /// Enable or disable follow mode
    ToggleFollow(bool),

    // ─────────────────────────────────────────────────────────────
    // Markers
    // ─────────────────────────────────────────────────────────────
    /// Add a marker at the playhead with the configured default text
    AddMarker,
    RenameMarker { id: MarkerId, title: String },
    DeleteMarker { id: MarkerId },
}

/// What the session did with a gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// State changed and/or commands were queued
    Applied,
    /// Refused because follow mode owns the viewport while playing
    Refused,
    /// Nothing to act on (no content loaded)
    Ignored,
    /// A marker was created
    MarkerAdded(MarkerId),
}
