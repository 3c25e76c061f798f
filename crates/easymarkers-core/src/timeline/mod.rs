//! Timeline viewport and transport follow
//!
//! - [`TimelineViewport`]: duration, visible range, time/pixel mapping, zoom and scroll
//! - [`TransportFollower`]: per-tick recentering and the user-reposition gate

mod follower;
mod viewport;

pub use follower::{FollowOutcome, TransportFollower};
pub use viewport::TimelineViewport;
