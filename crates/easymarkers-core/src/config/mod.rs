//! Engine configuration
//!
//! Tunables for the viewport, transport polling and marker defaults,
//! stored as YAML. Every section uses `#[serde(default)]` so partial files
//! only override what they mention.
//!
//! Default location: `<config dir>/easymarkers/config.yaml`

mod io;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::{MAX_ZOOM_FRACTION, MIN_VISIBLE_SECONDS};

pub use io::{load_config, read_config, save_config};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeline: TimelineConfig,
    pub markers: MarkerConfig,
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults, then clamp to valid ranges
    pub fn load(path: &Path) -> Self {
        let mut config: EngineConfig = load_config(path);
        config.validate();
        log::info!(
            "EngineConfig::load: tick={}Hz, max_zoom={}, marker_width={}px",
            config.timeline.tick_rate_hz,
            config.timeline.max_zoom,
            config.markers.display_width
        );
        config
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_config(self, path)
    }

    pub fn validate(&mut self) {
        self.timeline.validate();
        self.markers.validate();
    }
}

/// Viewport and transport polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// How often the host should call `tick` (1-240 Hz)
    pub tick_rate_hz: u32,
    /// Shortest visible window zoom may produce, in seconds
    pub min_visible_seconds: f64,
    /// Largest zoom fraction (0 = full view, must stay below 1)
    pub max_zoom: f64,
    /// Horizontal wheel travel of 1.0 scrolls `length / wheel_scroll_divisor`
    pub wheel_scroll_divisor: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 40,
            min_visible_seconds: MIN_VISIBLE_SECONDS,
            max_zoom: MAX_ZOOM_FRACTION,
            wheel_scroll_divisor: 10.0,
        }
    }
}

impl TimelineConfig {
    pub fn validate(&mut self) {
        self.tick_rate_hz = self.tick_rate_hz.clamp(1, 240);

        if !self.min_visible_seconds.is_finite() || self.min_visible_seconds <= 0.0 {
            self.min_visible_seconds = MIN_VISIBLE_SECONDS;
        }

        // A zoom of exactly 1 would request an empty window
        self.max_zoom = if self.max_zoom.is_finite() {
            self.max_zoom.clamp(0.0, 0.999)
        } else {
            MAX_ZOOM_FRACTION
        };

        if !self.wheel_scroll_divisor.is_finite() || self.wheel_scroll_divisor < 1.0 {
            self.wheel_scroll_divisor = 1.0;
        }
    }

    /// Interval between ticks at the configured rate
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

/// Marker creation and display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Title given to markers added from the transport position
    pub default_title: String,
    /// Description given to markers added from the transport position
    pub default_description: String,
    /// Fixed on-screen width of a marker label, in pixels
    pub display_width: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            default_title: String::from("NEW MARKER"),
            default_description: String::from("*No Comment*"),
            display_width: 200.0,
        }
    }
}

impl MarkerConfig {
    pub fn validate(&mut self) {
        if !self.display_width.is_finite() || self.display_width < 1.0 {
            self.display_width = 1.0;
        }
    }
}

/// Get the default config file path
///
/// Returns: `<config dir>/easymarkers/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("easymarkers")
        .join("config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.timeline.tick_rate_hz, 40);
        assert_eq!(config.timeline.max_zoom, 0.99);
        assert_eq!(config.markers.default_title, "NEW MARKER");
        assert_eq!(config.markers.default_description, "*No Comment*");
    }

    #[test]
    fn test_validation_clamps_values() {
        let mut config = EngineConfig {
            timeline: TimelineConfig {
                tick_rate_hz: 0,
                min_visible_seconds: -1.0,
                max_zoom: 1.5,
                wheel_scroll_divisor: 0.0,
            },
            markers: MarkerConfig {
                display_width: f64::NAN,
                ..MarkerConfig::default()
            },
        };
        config.validate();

        assert_eq!(config.timeline.tick_rate_hz, 1);
        assert_eq!(config.timeline.min_visible_seconds, MIN_VISIBLE_SECONDS);
        assert_eq!(config.timeline.max_zoom, 0.999);
        assert_eq!(config.timeline.wheel_scroll_divisor, 1.0);
        assert_eq!(config.markers.display_width, 1.0);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let parsed: EngineConfig = serde_yaml::from_str("timeline:\n  tick_rate_hz: 60\n").unwrap();
        assert_eq!(parsed.timeline.tick_rate_hz, 60);
        assert_eq!(parsed.timeline.wheel_scroll_divisor, 10.0);
        assert_eq!(parsed.markers, MarkerConfig::default());
    }

    #[test]
    fn test_tick_interval() {
        let config = TimelineConfig::default();
        assert_eq!(config.tick_interval().as_millis(), 25);
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "timeline:\n  tick_rate_hz: 1000\n").unwrap();

        let config = EngineConfig::load(&path);

        assert_eq!(config.timeline.tick_rate_hz, 240);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("easymarkers").join("config.yaml");
        let mut config = EngineConfig::default();
        config.markers.default_title = String::from("CUE");
        config.timeline.tick_rate_hz = 30;

        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path), config);
    }

    #[test]
    fn test_default_path_file_name() {
        assert!(default_config_path().ends_with("easymarkers/config.yaml"));
    }
}
