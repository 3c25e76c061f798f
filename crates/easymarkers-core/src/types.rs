//! Common types for easymarkers
//!
//! Value types shared by the viewport, follower, marker store and session:
//! time ranges, playback snapshots and audio resource locations.

use std::path::{Path, PathBuf};

/// File extension appended to a local audio path to locate its marker sidecar
pub const SIDECAR_EXTENSION: &str = ".easymarkers";

/// Smallest visible window length in seconds the viewport will produce
pub const MIN_VISIBLE_SECONDS: f64 = 0.001;

/// Largest zoom fraction accepted by the viewport (window = 1% of duration)
pub const MAX_ZOOM_FRACTION: f64 = 0.99;

/// A closed interval of time in seconds
///
/// Ranges are immutable values: every viewport change produces a new range
/// that replaces the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Create a range, swapping the bounds if they are given out of order
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Range covering `[0, duration]`
    pub fn full(duration: f64) -> Self {
        Self::new(0.0, duration.max(0.0))
    }

    /// Length of the range in seconds (never negative)
    #[inline]
    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Midpoint of the range
    #[inline]
    pub fn center(&self) -> f64 {
        self.start + self.length() * 0.5
    }

    /// End-exclusive membership test: `start <= time < end`
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Same length, translated so it begins at `start`
    pub fn moved_to_start_at(&self, start: f64) -> Self {
        Self {
            start,
            end: start + self.length(),
        }
    }

    /// Same length, translated by `delta` seconds
    pub fn shifted_by(&self, delta: f64) -> Self {
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// Same length, centred on `time`
    pub fn centered_on(&self, time: f64) -> Self {
        let half = self.length() * 0.5;
        Self {
            start: time - half,
            end: time + half,
        }
    }

    /// Both bounds are finite numbers
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// Read-only view of the transport, fetched fresh on every tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackSnapshot {
    /// Playback position in seconds
    pub position: f64,
    /// Whether audio is currently playing
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    pub fn playing(position: f64) -> Self {
        Self {
            position,
            is_playing: true,
        }
    }

    pub fn paused(position: f64) -> Self {
        Self {
            position,
            is_playing: false,
        }
    }
}

/// Location of the audio resource being previewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioResource {
    /// File on the local filesystem
    Local(PathBuf),
    /// Anything not locally addressable (stream URL, remote share, ...)
    Remote(String),
}

impl AudioResource {
    /// Path of the marker sidecar for this resource
    ///
    /// Local resources get `<path>.easymarkers` (the extension is appended,
    /// not substituted). Remote resources have no sidecar.
    pub fn sidecar_path(&self) -> Option<PathBuf> {
        match self {
            AudioResource::Local(path) => Some(sidecar_path_for(path)),
            AudioResource::Remote(_) => None,
        }
    }
}

/// Append the sidecar extension to a local audio path
pub fn sidecar_path_for(audio_path: &Path) -> PathBuf {
    let mut raw = audio_path.as_os_str().to_owned();
    raw.push(SIDECAR_EXTENSION);
    PathBuf::from(raw)
}

/// Format a playback position as `M:SS.mmm` for the clock readout
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return String::from("0:00.000");
    }
    let total_ms = (seconds * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{}:{:02}.{:03}", minutes, secs, millis)
}
