//! Scroll progress tracker
//!
//! One passive scroll listener; bursts of scroll events are coalesced into at
//! most one sample per animation frame.

use crate::capture::input::EventKind;
use crate::capture::traits::{frame, listener, FrameId, Host, ListenOptions, ListenerSet};
use crate::config::ScrollConfig;
use crate::processing::sampling::{ScrollSampler, ScrollState};
use crate::tracker::channel::{Tracker, TrackerError, TrackerKind, TrackerResult};
use parking_lot::Mutex as ParkingMutex;
use std::rc::Rc;
use std::sync::Arc;

struct ScrollShared {
    sampler: ScrollSampler,
    pending_frame: Option<FrameId>,
}

/// Tracks how far the page is scrolled, how fast and in which direction
///
/// Attach registers a single scroll listener (passive by default). Each burst
/// of scroll events produces one sample on the next animation frame.
pub struct ScrollProgressTracker {
    id: String,
    config: ScrollConfig,
    shared: Arc<ParkingMutex<ScrollShared>>,
    host: Option<Rc<dyn Host>>,
    listeners: ListenerSet,
}

impl ScrollProgressTracker {
    /// Create a detached tracker. State stays idle at zero until attached.
    pub fn new(config: ScrollConfig) -> Self {
        let sampler = ScrollSampler::new(0.0, 0.0, config.velocity_scale);
        Self {
            id: "scroll".to_string(),
            config,
            shared: Arc::new(ParkingMutex::new(ScrollShared {
                sampler,
                pending_frame: None,
            })),
            host: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Latest computed state
    pub fn state(&self) -> ScrollState {
        self.shared.lock().sampler.state()
    }

    /// Whether a sampling frame is queued but has not run yet
    pub fn has_pending_frame(&self) -> bool {
        self.shared.lock().pending_frame.is_some()
    }
}

impl Default for ScrollProgressTracker {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

/// Request a sampling frame unless one is already pending.
fn schedule_sample(shared: &Arc<ParkingMutex<ScrollShared>>, host: &dyn Host) {
    let mut inner = shared.lock();
    if inner.pending_frame.is_some() {
        return;
    }

    let frame_shared = shared.clone();
    let request = host.request_frame(frame(move |_, host| {
        let mut inner = frame_shared.lock();
        inner.pending_frame = None;
        let state = inner.sampler.sample(host.viewport(), host.now_ms());
        tracing::trace!(
            "Scroll sample: progress={:.3}, velocity={:.3}, direction={:?}",
            state.progress,
            state.velocity,
            state.direction
        );
    }));

    match request {
        Ok(id) => inner.pending_frame = Some(id),
        Err(e) => tracing::warn!("Failed to schedule scroll sample: {}", e),
    }
}

impl Tracker for ScrollProgressTracker {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackerKind {
        TrackerKind::Scroll
    }

    fn attach(&mut self, host: Rc<dyn Host>) -> TrackerResult<()> {
        if self.host.is_some() {
            return Err(TrackerError::AlreadyAttached);
        }

        let metrics = host.viewport();
        self.shared.lock().sampler =
            ScrollSampler::new(metrics.scroll_y, host.now_ms(), self.config.velocity_scale);

        let shared = self.shared.clone();
        self.listeners.add(
            &*host,
            EventKind::Scroll,
            ListenOptions {
                passive: self.config.passive,
            },
            listener(move |_, host| schedule_sample(&shared, host)),
        )?;
        self.host = Some(host);

        tracing::info!("Scroll tracker attached (scroll_y={})", metrics.scroll_y);
        Ok(())
    }

    fn detach(&mut self) {
        let Some(host) = self.host.take() else {
            return;
        };

        self.listeners.release(&*host);
        if let Some(id) = self.shared.lock().pending_frame.take() {
            host.cancel_frame(id);
        }

        tracing::info!("Scroll tracker detached");
    }

    fn is_attached(&self) -> bool {
        self.host.is_some()
    }
}

impl Drop for ScrollProgressTracker {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::HeadlessHost;
    use crate::processing::sampling::ScrollDirection;

    fn setup(document_height: f64) -> (Rc<HeadlessHost>, ScrollProgressTracker) {
        let host = Rc::new(HeadlessHost::new(1280.0, 1000.0));
        host.set_document_height(document_height);
        let mut tracker = ScrollProgressTracker::default();
        tracker.attach(host.clone()).unwrap();
        (host, tracker)
    }

    #[test]
    fn test_registers_single_passive_listener() {
        let (host, _tracker) = setup(3000.0);
        assert_eq!(host.listener_count(EventKind::Scroll), 1);
        assert!(host.listeners_passive(EventKind::Scroll));
    }

    #[test]
    fn test_scroll_updates_after_frame() {
        let (host, tracker) = setup(3000.0);

        host.advance(100.0);
        host.scroll_to(1000.0);
        assert_eq!(tracker.state().progress, 0.0, "no sample before the frame");

        host.run_frame();
        let state = tracker.state();
        assert!((state.progress - 0.5).abs() < 1e-12);
        assert_eq!(state.velocity, 1.0);
        assert_eq!(state.direction, ScrollDirection::Down);
    }

    #[test]
    fn test_burst_is_coalesced_into_one_frame() {
        let (host, tracker) = setup(3000.0);

        for offset in [100.0, 200.0, 300.0, 400.0] {
            host.scroll_to(offset);
        }
        assert_eq!(host.pending_frame_count(), 1);
        assert!(tracker.has_pending_frame());

        host.advance(16.0);
        host.run_frame();
        assert!(!tracker.has_pending_frame());
        assert!((tracker.state().progress - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_scrolling_back_up() {
        let (host, tracker) = setup(3000.0);
        host.advance(16.0);
        host.scroll_to(1500.0);
        host.run_frame();

        host.advance(1000.0);
        host.scroll_to(1490.0);
        host.run_frame();

        let state = tracker.state();
        assert_eq!(state.direction, ScrollDirection::Up);
        assert!((state.velocity - 0.1).abs() < 1e-12, "velocity {}", state.velocity);
    }

    #[test]
    fn test_unscrollable_page() {
        let (host, tracker) = setup(1000.0);
        host.advance(16.0);
        host.scroll_to(0.0);
        host.run_frame();
        let state = tracker.state();
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.velocity, 0.0);
        assert_eq!(state.direction, ScrollDirection::Idle);
    }

    #[test]
    fn test_detach_releases_listener_and_frame() {
        let (host, mut tracker) = setup(3000.0);
        host.scroll_to(10.0);
        assert_eq!(host.pending_frame_count(), 1);

        tracker.detach();
        assert_eq!(host.listener_count(EventKind::Scroll), 0);
        assert_eq!(host.pending_frame_count(), 0);
        assert!(!tracker.is_attached());

        tracker.detach();
    }

    #[test]
    fn test_drop_releases_listener() {
        let (host, tracker) = setup(3000.0);
        drop(tracker);
        assert_eq!(host.total_listener_count(), 0);
    }

    #[test]
    fn test_attach_twice_fails() {
        let (host, mut tracker) = setup(3000.0);
        let err = tracker.attach(host.clone()).unwrap_err();
        assert!(matches!(err, TrackerError::AlreadyAttached));
        assert_eq!(host.listener_count(EventKind::Scroll), 1);
    }
}
