//! Screen placement of markers inside the visible range

use super::store::{MarkerId, MarkerStore};
use crate::timeline::TimelineViewport;

/// Where to draw one marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub id: MarkerId,
    /// Horizontal offset in pixels from the left edge of the display
    pub x: f64,
    /// On-screen footprint in pixels (constant regardless of zoom)
    pub width: f64,
}

/// Place every marker whose time lies in `[start, end)` of the visible range
///
/// Output keeps store order. Markers outside the range are omitted, so an id
/// missing from one frame to the next means "scrolled off", not "deleted".
pub fn visible_markers(
    store: &MarkerStore,
    viewport: &TimelineViewport,
    width_pixels: f64,
    fixed_width_pixels: f64,
) -> Vec<MarkerPlacement> {
    if !viewport.has_content() {
        return Vec::new();
    }

    let range = viewport.visible_range();
    store
        .iter()
        .filter(|(_, marker)| range.contains(marker.time))
        .map(|(id, marker)| MarkerPlacement {
            id,
            x: viewport.time_to_coordinate(marker.time, width_pixels),
            width: fixed_width_pixels,
        })
        .collect()
}
