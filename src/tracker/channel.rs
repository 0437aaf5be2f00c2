//! Tracker trait
//!
//! Defines the lifecycle shared by the scroll, section and pointer trackers.

use crate::capture::Host;
use std::rc::Rc;
use thiserror::Error;

/// Errors that can occur while wiring trackers to a host
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Already attached")]
    AlreadyAttached,

    #[error("Host unavailable: {0}")]
    HostUnavailable(String),

    #[error("Host error: {0}")]
    HostError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Trait for page trackers
///
/// A tracker acquires listeners, observers or frame callbacks from a host on
/// `attach` and releases every one of them on `detach`. Implementations also
/// detach on drop.
pub trait Tracker {
    /// Get the tracker identifier (e.g., "scroll", "sections", "pointer")
    fn id(&self) -> &str;

    /// Get the tracker kind
    fn kind(&self) -> TrackerKind;

    /// Start tracking on the given host
    fn attach(&mut self, host: Rc<dyn Host>) -> TrackerResult<()>;

    /// Release everything acquired from the host. Idempotent.
    fn detach(&mut self);

    /// Check if the tracker currently holds host resources
    fn is_attached(&self) -> bool;
}

/// Types of trackers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerKind {
    /// Scroll progress, velocity and direction
    Scroll,
    /// Active section from landmark visibility
    Sections,
    /// Smoothed pointer follower
    Pointer,
}

impl std::fmt::Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackerKind::Scroll => write!(f, "scroll"),
            TrackerKind::Sections => write!(f, "sections"),
            TrackerKind::Pointer => write!(f, "pointer"),
        }
    }
}
