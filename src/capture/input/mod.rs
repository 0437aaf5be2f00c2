//! Input events and DOM descriptors
//!
//! Plain data types exchanged between a host and the trackers: pointer
//! coordinates, hovered-element ancestry and intersection entries.

pub mod types;

pub use types::{
    ElementInfo, EventKind, HostEvent, IntersectionEntry, Point, CURSOR_MARKER_ATTRIBUTE,
};
