//! Visible time window over an audio resource
//!
//! The viewport owns the total duration and the currently visible range,
//! converts between time and horizontal pixel coordinates, and applies
//! zoom and scroll. Every mutation funnels through [`TimelineViewport::set_range`],
//! which keeps the range inside `[0, total_duration]` by translation so a
//! drag against either edge never shrinks the window.

use crate::config::TimelineConfig;
use crate::error::{TimelineError, TimelineResult};
use crate::types::{TimeRange, MAX_ZOOM_FRACTION, MIN_VISIBLE_SECONDS};

/// Total duration plus the sub-range currently mapped onto the display width
#[derive(Debug, Clone)]
pub struct TimelineViewport {
    total_duration: f64,
    visible_range: TimeRange,
    /// Shortest window zoom may produce (seconds)
    min_visible_seconds: f64,
    /// Upper bound for zoom fractions
    max_zoom: f64,
}

impl TimelineViewport {
    /// Create an empty viewport (no content loaded)
    pub fn new() -> Self {
        Self {
            total_duration: 0.0,
            visible_range: TimeRange::default(),
            min_visible_seconds: MIN_VISIBLE_SECONDS,
            max_zoom: MAX_ZOOM_FRACTION,
        }
    }

    /// Create an empty viewport using configured zoom limits
    ///
    /// Limits that could yield an empty window (a non-positive minimum
    /// length, or a zoom fraction of 1 or more) fall back to the defaults.
    pub fn with_config(config: &TimelineConfig) -> Self {
        let min_visible_seconds =
            if config.min_visible_seconds.is_finite() && config.min_visible_seconds > 0.0 {
                config.min_visible_seconds
            } else {
                log::warn!(
                    "with_config: Invalid min_visible_seconds {}, using {}",
                    config.min_visible_seconds,
                    MIN_VISIBLE_SECONDS
                );
                MIN_VISIBLE_SECONDS
            };
        let max_zoom = if (0.0..1.0).contains(&config.max_zoom) {
            config.max_zoom
        } else {
            log::warn!(
                "with_config: Invalid max_zoom {}, using {}",
                config.max_zoom,
                MAX_ZOOM_FRACTION
            );
            MAX_ZOOM_FRACTION
        };

        Self {
            min_visible_seconds,
            max_zoom,
            ..Self::new()
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn visible_range(&self) -> TimeRange {
        self.visible_range
    }

    /// Whether any content is loaded (`total_duration > 0`)
    pub fn has_content(&self) -> bool {
        self.total_duration > 0.0
    }

    /// Set the total duration and reset the visible range to `[0, total]`
    ///
    /// Negative or non-finite durations are rejected and leave the viewport
    /// unchanged. A zero duration means "no content".
    pub fn set_duration(&mut self, total: f64) -> TimelineResult<()> {
        if !total.is_finite() || total < 0.0 {
            log::warn!("set_duration: Ignoring invalid duration {}", total);
            return Err(TimelineError::InvalidDuration(total));
        }

        self.total_duration = total;
        self.visible_range = TimeRange::full(total);
        log::debug!("set_duration: total={:.3}s", total);
        Ok(())
    }

    /// Store `range` after clamping it into `[0, total_duration]`
    ///
    /// Out-of-bounds ranges are translated back inside, preserving their
    /// length whenever the duration allows. Ranges longer than the duration
    /// collapse to the full duration. Degenerate lengths are widened to the
    /// minimum window; non-finite ranges are ignored.
    pub fn set_range(&mut self, range: TimeRange) {
        if !range.is_finite() {
            log::warn!(
                "set_range: Ignoring non-finite range {}..{}",
                range.start,
                range.end
            );
            return;
        }
        self.visible_range = self.clamp_range(range);
    }

    fn clamp_range(&self, range: TimeRange) -> TimeRange {
        let total = self.total_duration;
        if total <= 0.0 {
            return TimeRange::default();
        }

        let mut length = range.end - range.start;
        if length <= 0.0 {
            length = self.min_visible_seconds;
        }
        if length >= total {
            return TimeRange::full(total);
        }

        let start = range.start.clamp(0.0, total - length);
        TimeRange {
            start,
            end: start + length,
        }
    }

    /// Zoom to `amount` of the way between full view and maximum zoom
    ///
    /// `amount` is a linear fraction in `[0, 1)`; any skew applied by the
    /// zoom control must already be folded in. The new window is centred on
    /// the time under the horizontal midpoint of the display.
    pub fn set_zoom(&mut self, amount: f64) {
        if !self.has_content() {
            return;
        }

        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fraction = amount.clamp(0.0, self.max_zoom);
        let length = (self.total_duration * (1.0 - fraction)).max(self.min_visible_seconds);
        let centre = self.visible_range.center();

        self.set_range(TimeRange {
            start: centre - length * 0.5,
            end: centre + length * 0.5,
        });
    }

    /// Shift the visible range by `delta` seconds, staying inside the duration
    pub fn scroll_by(&mut self, delta: f64) {
        if !self.has_content() {
            return;
        }
        self.set_range(self.visible_range.shifted_by(delta));
    }

    /// Move the visible range so it starts at `start` (scrollbar drag)
    pub fn move_to_start(&mut self, start: f64) {
        if !self.has_content() {
            return;
        }
        self.set_range(self.visible_range.moved_to_start_at(start));
    }

    /// Centre the visible range on `time`, keeping its length
    pub fn recenter_on(&mut self, time: f64) {
        if !self.has_content() {
            return;
        }
        self.set_range(self.visible_range.centered_on(time));
    }

    /// Horizontal pixel offset of `time` for a display `width_pixels` wide
    ///
    /// Returns 0 when the visible range is empty.
    pub fn time_to_coordinate(&self, time: f64, width_pixels: f64) -> f64 {
        let length = self.visible_range.length();
        if length <= 0.0 {
            return 0.0;
        }
        width_pixels * (time - self.visible_range.start) / length
    }

    /// Time under pixel offset `x` for a display `width_pixels` wide
    ///
    /// Returns the start of the visible range when the width is zero.
    pub fn coordinate_to_time(&self, x: f64, width_pixels: f64) -> f64 {
        if width_pixels == 0.0 {
            return self.visible_range.start;
        }
        (x / width_pixels) * self.visible_range.length() + self.visible_range.start
    }
}

impl Default for TimelineViewport {
    fn default() -> Self {
        Self::new()
    }
}
