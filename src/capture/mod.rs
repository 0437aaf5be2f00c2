//! Host implementations
//!
//! This module provides the host interface the trackers run against, a
//! headless in-memory host and, with the `web` feature, the browser host.

pub mod headless;
pub mod input;
pub mod traits;

#[cfg(feature = "web")]
pub mod web;

// Re-export traits
pub use traits::{
    frame, intersections, listener, FrameCallback, FrameId, Host, IntersectionCallback,
    ListenOptions, Listener, ListenerId, ListenerSet, Observation, ObserverId, ObserverOptions,
    ScrollBehavior, ViewportMetrics,
};

pub use headless::HeadlessHost;

#[cfg(feature = "web")]
pub use web::WebHost;
