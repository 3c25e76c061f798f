//! Time-stamped markers and their sidecar persistence
//!
//! - [`MarkerStore`]: ordered markers addressed by stable [`MarkerId`] handles
//! - [`sidecar`]: the `.easymarkers` XML document format
//! - [`SidecarStorage`]: byte-level backend ([`FileStorage`], [`MemoryStorage`])
//! - [`visible_markers`]: projection of markers onto the visible range

mod projector;
pub mod sidecar;
mod storage;
mod store;

pub use projector::{visible_markers, MarkerPlacement};
pub use storage::{FileStorage, MemoryStorage, SidecarStorage};
pub use store::{Marker, MarkerId, MarkerStore};
