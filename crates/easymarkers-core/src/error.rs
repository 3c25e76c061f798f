//! Error types for the timeline and marker engine
//!
//! Every condition here is recoverable: callers log or surface them, the
//! engine keeps its previous state and carries on.

use std::path::PathBuf;

use thiserror::Error;

use crate::markers::MarkerId;

/// Errors raised by viewport mutators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Negative or non-finite duration supplied; prior state retained
    #[error("Invalid duration: {0}")]
    InvalidDuration(f64),
}

/// Result type for viewport operations
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Sidecar content could not be parsed
///
/// A failed parse never touches the markers already in memory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Content is not valid UTF-8
    #[error("Sidecar is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Malformed XML
    #[error("Malformed sidecar XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Document has no root element
    #[error("Sidecar has no root element")]
    MissingRoot,

    /// Root element is not `Markers`
    #[error("Unexpected root element: {0}")]
    UnexpectedRoot(String),

    /// A `Marker` element lacks a required attribute
    #[error("Marker #{index} is missing required attribute {attribute}")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    /// A `Marker` element has a `Time` that is not a finite, non-negative number
    #[error("Marker #{index} has invalid time {value:?}")]
    InvalidTime { index: usize, value: String },
}

/// Sidecar read/write failures
///
/// Reported upward as warnings: the in-memory markers remain authoritative.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to read sidecar {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write sidecar {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by marker store operations
#[derive(Error, Debug)]
pub enum MarkerError {
    /// Referenced marker no longer exists
    #[error("Marker not found: {0}")]
    NotFound(MarkerId),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Result type for marker operations
pub type MarkerResult<T> = Result<T, MarkerError>;

/// Errors surfaced by the preview session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Marker(#[from] MarkerError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
