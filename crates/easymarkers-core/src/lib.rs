//! EasyMarkers Core - Timeline viewport, transport follow and sidecar markers for audio preview

pub mod config;
pub mod error;
pub mod markers;
pub mod session;
pub mod timeline;
pub mod types;

pub use config::{default_config_path, EngineConfig};
pub use error::{MarkerError, ParseError, PersistError, SessionError, TimelineError};
pub use markers::{Marker, MarkerId, MarkerPlacement, MarkerStore};
pub use session::{Gesture, GestureOutcome, PreviewSession, TimelineFrame, TransportCommand};
pub use timeline::{TimelineViewport, TransportFollower};
pub use types::*;
