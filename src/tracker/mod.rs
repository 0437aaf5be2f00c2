//! Page trackers
//!
//! Each tracker acquires its listeners, observer or frame loop on attach and
//! releases them on detach or drop.

pub mod channel;
pub mod pointer;
pub mod scroll;
pub mod sections;

pub use channel::{Tracker, TrackerError, TrackerKind, TrackerResult};
pub use pointer::{PointerFollower, PointerState};
pub use scroll::ScrollProgressTracker;
pub use sections::SectionVisibilityTracker;
