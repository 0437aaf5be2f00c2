//! Host interface
//!
//! Everything a tracker needs from its environment: viewport geometry, a
//! clock, event listeners, animation frames and intersection observation.
//! Callbacks receive the host as `&dyn Host` so they never need to own it.

use crate::capture::input::{EventKind, HostEvent, IntersectionEntry};
use crate::processing::geometry::RootMargin;
use crate::tracker::channel::TrackerResult;
use serde::{Deserialize, Serialize};

/// Handle returned by [`Host::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

pub type Listener = Box<dyn FnMut(&HostEvent, &dyn Host)>;

/// Called once with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64, &dyn Host)>;

pub type IntersectionCallback = Box<dyn FnMut(&[IntersectionEntry], &dyn Host)>;

pub fn listener<F>(f: F) -> Listener
where
    F: FnMut(&HostEvent, &dyn Host) + 'static,
{
    Box::new(f)
}

pub fn frame<F>(f: F) -> FrameCallback
where
    F: FnOnce(f64, &dyn Host) + 'static,
{
    Box::new(f)
}

pub fn intersections<F>(f: F) -> IntersectionCallback
where
    F: FnMut(&[IntersectionEntry], &dyn Host) + 'static,
{
    Box::new(f)
}

/// Viewport and document geometry at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMetrics {
    pub scroll_y: f64,
    pub scroll_height: f64,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl ViewportMetrics {
    /// Largest reachable scroll offset; may be zero or negative for short pages
    pub fn max_scroll(&self) -> f64 {
        self.scroll_height - self.inner_height
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenOptions {
    pub passive: bool,
}

impl ListenOptions {
    pub const PASSIVE: ListenOptions = ListenOptions { passive: true };
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverOptions {
    pub root_margin: RootMargin,
    pub thresholds: Vec<f64>,
}

/// Result of starting an intersection observer
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub id: ObserverId,
    /// Requested ids that had a matching landmark
    pub observed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Environment the trackers run against (a browser window, or the headless
/// host in tests)
pub trait Host {
    /// Current scroll offset, document height and viewport size
    fn viewport(&self) -> ViewportMetrics;

    /// Monotonic time in milliseconds
    fn now_ms(&self) -> f64;

    /// Register a listener for one event kind. Window events (scroll,
    /// resize) and document events (pointer) are routed by the host.
    fn add_listener(
        &self,
        kind: EventKind,
        options: ListenOptions,
        listener: Listener,
    ) -> TrackerResult<ListenerId>;

    /// Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Run `callback` once on the next animation frame
    fn request_frame(&self, callback: FrameCallback) -> TrackerResult<FrameId>;

    /// Cancelling a frame that already ran is a no-op.
    fn cancel_frame(&self, id: FrameId);

    /// Observe every landmark among `ids`. Ids without a landmark are skipped.
    fn observe(
        &self,
        ids: &[String],
        options: &ObserverOptions,
        callback: IntersectionCallback,
    ) -> TrackerResult<Observation>;

    /// Stop an observer; its callback is never called again
    fn disconnect(&self, id: ObserverId);

    /// Whether an element with this id exists in the document
    fn has_landmark(&self, id: &str) -> bool;

    /// Returns `false` when no landmark has that id.
    fn scroll_into_view(&self, id: &str, behavior: ScrollBehavior) -> bool;
}

/// Listeners acquired by one tracker, released together.
#[derive(Debug, Default)]
pub struct ListenerSet {
    ids: Vec<ListenerId>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and remember its id
    pub fn add(
        &mut self,
        host: &dyn Host,
        kind: EventKind,
        options: ListenOptions,
        listener: Listener,
    ) -> TrackerResult<()> {
        let id = host.add_listener(kind, options, listener)?;
        self.ids.push(id);
        Ok(())
    }

    /// Remove every listener from the host
    pub fn release(&mut self, host: &dyn Host) {
        for id in self.ids.drain(..) {
            host.remove_listener(id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
