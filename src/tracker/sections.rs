//! Section visibility tracker
//!
//! Observes the page landmarks through one shared intersection observer and
//! keeps the [`SectionRegistry`] current. Also performs smooth scrolling to a
//! section on request.

use crate::capture::traits::{intersections, Host, ObserverId, ObserverOptions, ScrollBehavior};
use crate::config::SectionConfig;
use crate::processing::registry::SectionRegistry;
use crate::tracker::channel::{Tracker, TrackerError, TrackerKind, TrackerResult};
use parking_lot::Mutex as ParkingMutex;
use std::rc::Rc;
use std::sync::Arc;

/// Tracks which page section is currently active
///
/// The first section is active until an intersection batch reports a
/// candidate above the active threshold.
pub struct SectionVisibilityTracker {
    id: String,
    config: SectionConfig,
    registry: Arc<ParkingMutex<SectionRegistry>>,
    host: Option<Rc<dyn Host>>,
    observer: Option<ObserverId>,
    observed: Vec<String>,
}

impl SectionVisibilityTracker {
    /// Create a detached tracker for the sections, in document order
    pub fn new(section_ids: Vec<String>, config: SectionConfig) -> Self {
        let registry = SectionRegistry::new(section_ids, config.active_threshold);
        Self {
            id: "sections".to_string(),
            config,
            registry: Arc::new(ParkingMutex::new(registry)),
            host: None,
            observer: None,
            observed: Vec::new(),
        }
    }

    pub fn section_ids(&self) -> Vec<String> {
        self.registry.lock().ids().to_vec()
    }

    /// `None` only when the tracker has no sections
    pub fn active_section(&self) -> Option<String> {
        self.registry.lock().active().map(str::to_string)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.registry.lock().active_index()
    }

    pub fn visibility(&self, id: &str) -> f64 {
        self.registry.lock().visibility(id)
    }

    /// Ratio per section, in section order
    pub fn visibilities(&self) -> Vec<(String, f64)> {
        self.registry
            .lock()
            .visibilities()
            .map(|(id, ratio)| (id.to_string(), ratio))
            .collect()
    }

    /// Sections that had a landmark when observation started
    pub fn observed_sections(&self) -> &[String] {
        &self.observed
    }

    /// Smooth-scroll to the section's landmark. Fire-and-forget; returns
    /// `false` when detached or when no landmark carries that id.
    pub fn scroll_to_section(&self, id: &str) -> bool {
        let Some(host) = &self.host else {
            tracing::debug!("Ignoring scroll to {}: section tracker is detached", id);
            return false;
        };

        if !host.has_landmark(id) {
            tracing::debug!("No landmark for section {}", id);
            return false;
        }
        host.scroll_into_view(id, ScrollBehavior::Smooth)
    }

    fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin: self.config.root_margin,
            thresholds: self.config.thresholds(),
        }
    }
}

impl Tracker for SectionVisibilityTracker {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackerKind {
        TrackerKind::Sections
    }

    fn attach(&mut self, host: Rc<dyn Host>) -> TrackerResult<()> {
        if self.host.is_some() {
            return Err(TrackerError::AlreadyAttached);
        }

        let ids = self.section_ids();
        *self.registry.lock() = SectionRegistry::new(ids.clone(), self.config.active_threshold);

        let registry = self.registry.clone();
        let observation = host.observe(
            &ids,
            &self.observer_options(),
            intersections(move |entries, _| {
                if let Some(active) = registry.lock().apply_batch(entries) {
                    tracing::debug!("Active section changed to {}", active);
                }
            }),
        )?;

        for id in ids.iter().filter(|id| !observation.observed.contains(id)) {
            tracing::debug!("Section {} has no landmark; not observed", id);
        }

        self.observer = Some(observation.id);
        self.observed = observation.observed;
        self.host = Some(host);

        tracing::info!(
            "Section tracker attached (observing {} of {} sections)",
            self.observed.len(),
            ids.len()
        );
        Ok(())
    }

    fn detach(&mut self) {
        let Some(host) = self.host.take() else {
            return;
        };

        if let Some(observer) = self.observer.take() {
            host.disconnect(observer);
        }
        self.observed.clear();

        tracing::info!("Section tracker detached");
    }

    fn is_attached(&self) -> bool {
        self.host.is_some()
    }
}

impl Drop for SectionVisibilityTracker {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::IntersectionEntry;
    use crate::capture::HeadlessHost;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn entry(id: &str, ratio: f64) -> IntersectionEntry {
        IntersectionEntry {
            id: id.to_string(),
            ratio,
            is_intersecting: true,
        }
    }

    /// Three 1000px sections in a 1000px viewport; the observation band is
    /// [200, 400) of the viewport.
    fn setup() -> (Rc<HeadlessHost>, SectionVisibilityTracker) {
        let host = Rc::new(HeadlessHost::new(1280.0, 1000.0));
        host.set_document_height(3000.0);
        host.add_landmark("a", 0.0, 1000.0);
        host.add_landmark("b", 1000.0, 1000.0);
        host.add_landmark("c", 2000.0, 1000.0);

        let mut tracker = SectionVisibilityTracker::new(ids(&["a", "b", "c"]), SectionConfig::default());
        tracker.attach(host.clone()).unwrap();
        (host, tracker)
    }

    #[test]
    fn test_initial_active_is_first_section() {
        let (_host, tracker) = setup();
        assert_eq!(tracker.active_section().as_deref(), Some("a"));
    }

    #[test]
    fn test_section_entering_with_ratio_becomes_active() {
        let (host, tracker) = setup();
        host.deliver_intersections(&[entry("b", 0.35)]);
        assert_eq!(tracker.active_section().as_deref(), Some("b"));
        assert_eq!(tracker.visibility("b"), 0.35);
    }

    #[test]
    fn test_simultaneous_crossings_pick_highest_ratio() {
        let (host, tracker) = setup();
        host.deliver_intersections(&[entry("b", 0.25), entry("c", 0.5)]);
        assert_eq!(tracker.active_section().as_deref(), Some("c"));
    }

    #[test]
    fn test_geometry_driven_activation() {
        let (host, tracker) = setup();
        host.flush_intersections();
        // "a" fills 200 of its 1000px in the band: exactly 0.2, not enough
        assert_eq!(tracker.active_section().as_deref(), Some("a"));

        host.scroll_to(1000.0);
        host.run_frame();
        // Band now covers [1200, 1400): 0.2 of "b"
        assert!((tracker.visibility("b") - 0.2).abs() < 1e-9);
        assert_eq!(tracker.visibility("a"), 0.0);
    }

    #[test]
    fn test_short_sections_activate_from_geometry() {
        let host = Rc::new(HeadlessHost::new(1280.0, 1000.0));
        host.set_document_height(4000.0);
        host.add_landmark("hero", 0.0, 300.0);
        host.add_landmark("origin", 300.0, 400.0);
        let mut tracker =
            SectionVisibilityTracker::new(ids(&["hero", "origin"]), SectionConfig::default());
        tracker.attach(host.clone()).unwrap();

        host.flush_intersections();
        // hero covers [200, 300) of the band: 100 / 300
        assert_eq!(tracker.active_section().as_deref(), Some("hero"));

        host.scroll_to(250.0);
        host.run_frame();
        // band is [450, 650): origin covers 200 / 400
        assert_eq!(tracker.active_section().as_deref(), Some("origin"));
        assert!((tracker.visibility("origin") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_landmark_is_not_observed() {
        let host = Rc::new(HeadlessHost::new(1280.0, 1000.0));
        host.add_landmark("a", 0.0, 1000.0);
        let mut tracker = SectionVisibilityTracker::new(ids(&["a", "ghost"]), SectionConfig::default());
        tracker.attach(host.clone()).unwrap();

        assert_eq!(tracker.observed_sections(), &["a".to_string()]);
        assert_eq!(host.observed_targets(), vec!["a".to_string()]);
        assert!(!tracker.scroll_to_section("ghost"));
        assert!(host.scroll_requests().is_empty(), "no scroll without a landmark");
    }

    #[test]
    fn test_scroll_to_section_smooth_scrolls_landmark() {
        let (host, tracker) = setup();
        assert!(tracker.scroll_to_section("c"));
        assert_eq!(
            host.scroll_requests(),
            vec![("c".to_string(), ScrollBehavior::Smooth)]
        );

        // A second request restarts toward the new target
        assert!(tracker.scroll_to_section("b"));
        assert_eq!(host.viewport().scroll_y, 1000.0);
    }

    #[test]
    fn test_scroll_to_section_while_detached() {
        let tracker = SectionVisibilityTracker::new(ids(&["a"]), SectionConfig::default());
        assert!(!tracker.scroll_to_section("a"));
    }

    #[test]
    fn test_detach_disconnects_observer() {
        let (host, mut tracker) = setup();
        assert_eq!(host.observer_count(), 1);
        tracker.detach();
        assert_eq!(host.observer_count(), 0);

        host.deliver_intersections(&[entry("c", 0.9)]);
        assert_eq!(tracker.active_section().as_deref(), Some("a"));
    }

    #[test]
    fn test_reattach_starts_from_first_section() {
        let (host, mut tracker) = setup();
        host.deliver_intersections(&[entry("c", 0.7)]);
        assert_eq!(tracker.active_section().as_deref(), Some("c"));

        tracker.detach();
        tracker.attach(host.clone()).unwrap();
        assert_eq!(tracker.active_section().as_deref(), Some("a"));
        assert_eq!(tracker.visibility("c"), 0.0, "ratios must not survive re-attach");
    }

    #[test]
    fn test_drop_disconnects_observer() {
        let (host, tracker) = setup();
        drop(tracker);
        assert_eq!(host.observer_count(), 0);
    }
}
