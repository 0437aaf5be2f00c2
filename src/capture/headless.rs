//! In-memory host
//!
//! A deterministic stand-in for the browser: a manual clock, a scrollable
//! document with positioned landmarks, explicit event dispatch and explicit
//! frame stepping. Intersection entries are computed from landmark geometry
//! and delivered the way an `IntersectionObserver` would: once on observe,
//! then whenever a target's threshold bucket or intersecting flag changes.

use crate::capture::input::{EventKind, HostEvent, IntersectionEntry};
use crate::capture::traits::{
    FrameCallback, FrameId, Host, IntersectionCallback, ListenOptions, Listener, ListenerId,
    Observation, ObserverId, ObserverOptions, ScrollBehavior, ViewportMetrics,
};
use crate::processing::geometry::{intersection_ratio, threshold_index, Rect};
use crate::tracker::channel::TrackerResult;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Nominal frame length used by [`HeadlessHost::run_frames`]
pub const FRAME_MS: f64 = 1000.0 / 60.0;

struct RegisteredListener {
    kind: EventKind,
    options: ListenOptions,
    callback: Rc<RefCell<Listener>>,
}

struct HeadlessObserver {
    targets: Vec<String>,
    options: ObserverOptions,
    callback: Rc<RefCell<IntersectionCallback>>,
    /// Last reported (threshold index, intersecting) per target
    last: HashMap<String, (usize, bool)>,
}

#[derive(Debug, Clone)]
struct Landmark {
    id: String,
    top: f64,
    height: f64,
}

#[derive(Default)]
struct HeadlessState {
    next_id: u64,
    metrics: ViewportMetrics,
    listeners: BTreeMap<ListenerId, RegisteredListener>,
    frames: BTreeMap<FrameId, FrameCallback>,
    observers: BTreeMap<ObserverId, HeadlessObserver>,
    landmarks: Vec<Landmark>,
    pending_events: Vec<HostEvent>,
    scroll_requests: Vec<(String, ScrollBehavior)>,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn clamp_scroll(&mut self) {
        let max = self.metrics.max_scroll().max(0.0);
        self.metrics.scroll_y = self.metrics.scroll_y.clamp(0.0, max);
    }

    fn landmark(&self, id: &str) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.id == id)
    }
}

pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
    clock_ms: Cell<f64>,
}

impl HeadlessHost {
    /// Create a host with the given viewport size and a document exactly as
    /// tall as the viewport.
    pub fn new(inner_width: f64, inner_height: f64) -> Self {
        let state = HeadlessState {
            metrics: ViewportMetrics {
                scroll_y: 0.0,
                scroll_height: inner_height,
                inner_width,
                inner_height,
            },
            ..Default::default()
        };
        Self {
            state: RefCell::new(state),
            clock_ms: Cell::new(0.0),
        }
    }

    pub fn set_document_height(&self, scroll_height: f64) {
        let mut state = self.state.borrow_mut();
        state.metrics.scroll_height = scroll_height;
        state.clamp_scroll();
    }

    /// Resize the viewport and dispatch a resize event.
    pub fn resize(&self, inner_width: f64, inner_height: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.metrics.inner_width = inner_width;
            state.metrics.inner_height = inner_height;
            state.clamp_scroll();
        }
        self.dispatch(HostEvent::Resize);
    }

    /// Move the scroll position (clamped like a browser) and dispatch a
    /// scroll event.
    pub fn scroll_to(&self, scroll_y: f64) {
        {
            let mut state = self.state.borrow_mut();
            state.metrics.scroll_y = scroll_y;
            state.clamp_scroll();
        }
        self.dispatch(HostEvent::Scroll);
    }

    /// Add a full-width landmark at a document offset. Landmarks keep
    /// insertion order, like document order.
    pub fn add_landmark(&self, id: impl Into<String>, top: f64, height: f64) {
        self.state.borrow_mut().landmarks.push(Landmark {
            id: id.into(),
            top,
            height,
        });
    }

    pub fn advance(&self, ms: f64) {
        self.clock_ms.set(self.clock_ms.get() + ms);
    }

    /// Deliver an event synchronously to every listener registered for its
    /// kind. Listeners removed during dispatch are not called.
    pub fn dispatch(&self, event: HostEvent) {
        let kind = event.kind();
        let ids: Vec<ListenerId> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(_, l)| l.kind == kind)
            .map(|(id, _)| *id)
            .collect();

        for id in ids {
            let callback = match self.state.borrow().listeners.get(&id) {
                Some(listener) => listener.callback.clone(),
                None => continue,
            };
            let mut callback = callback.borrow_mut();
            (*callback)(&event, self);
        }
    }

    /// Run one animation frame: queued events, then the frame callbacks that
    /// were pending when the frame started, then intersection updates.
    pub fn run_frame(&self) {
        let events = std::mem::take(&mut self.state.borrow_mut().pending_events);
        for event in events {
            self.dispatch(event);
        }

        let timestamp = self.clock_ms.get();
        let ids: Vec<FrameId> = self.state.borrow().frames.keys().copied().collect();
        for id in ids {
            let callback = self.state.borrow_mut().frames.remove(&id);
            if let Some(callback) = callback {
                callback(timestamp, self);
            }
        }

        self.flush_intersections();
    }

    /// Advance the clock by one nominal frame and run it, `count` times.
    pub fn run_frames(&self, count: usize) {
        for _ in 0..count {
            self.advance(FRAME_MS);
            self.run_frame();
        }
    }

    /// Compute intersection entries from landmark geometry and deliver the
    /// changed ones to each observer as a single batch.
    pub fn flush_intersections(&self) {
        let mut batches = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            let metrics = state.metrics;
            let landmarks = state.landmarks.clone();

            for observer in state.observers.values_mut() {
                let root = observer
                    .options
                    .root_margin
                    .apply(metrics.inner_width, metrics.inner_height);
                let mut entries = Vec::new();

                for target in &observer.targets {
                    let Some(landmark) = landmarks.iter().find(|l| &l.id == target) else {
                        continue;
                    };
                    let rect = Rect::new(0.0, landmark.top, metrics.inner_width, landmark.height)
                        .translated(0.0, -metrics.scroll_y);
                    let (ratio, is_intersecting) = intersection_ratio(&rect, &root);
                    let bucket = (threshold_index(ratio, &observer.options.thresholds), is_intersecting);

                    if observer.last.get(target) != Some(&bucket) {
                        observer.last.insert(target.clone(), bucket);
                        entries.push(IntersectionEntry {
                            id: target.clone(),
                            ratio,
                            is_intersecting,
                        });
                    }
                }

                if !entries.is_empty() {
                    batches.push((observer.callback.clone(), entries));
                }
            }
        }

        for (callback, entries) in batches {
            let mut callback = callback.borrow_mut();
            (*callback)(&entries, self);
        }
    }

    /// Deliver a hand-built batch to every observer, keeping only entries for
    /// targets that observer watches.
    pub fn deliver_intersections(&self, entries: &[IntersectionEntry]) {
        let batches: Vec<_> = self
            .state
            .borrow()
            .observers
            .values()
            .map(|observer| {
                let relevant: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter(|e| observer.targets.contains(&e.id))
                    .cloned()
                    .collect();
                (observer.callback.clone(), relevant)
            })
            .filter(|(_, relevant)| !relevant.is_empty())
            .collect();

        for (callback, entries) in batches {
            let mut callback = callback.borrow_mut();
            (*callback)(&entries, self);
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|l| l.kind == kind)
            .count()
    }

    pub fn total_listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Whether every listener of this kind was registered as passive
    pub fn listeners_passive(&self, kind: EventKind) -> bool {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|l| l.kind == kind)
            .all(|l| l.options.passive)
    }

    pub fn pending_frame_count(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Targets watched by live observers
    pub fn observed_targets(&self) -> Vec<String> {
        self.state
            .borrow()
            .observers
            .values()
            .flat_map(|o| o.targets.iter().cloned())
            .collect()
    }

    pub fn scroll_requests(&self) -> Vec<(String, ScrollBehavior)> {
        self.state.borrow().scroll_requests.clone()
    }
}

impl Host for HeadlessHost {
    fn viewport(&self) -> ViewportMetrics {
        self.state.borrow().metrics
    }

    fn now_ms(&self) -> f64 {
        self.clock_ms.get()
    }

    fn add_listener(
        &self,
        kind: EventKind,
        options: ListenOptions,
        listener: Listener,
    ) -> TrackerResult<ListenerId> {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id());
        state.listeners.insert(
            id,
            RegisteredListener {
                kind,
                options,
                callback: Rc::new(RefCell::new(listener)),
            },
        );
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.state.borrow_mut().listeners.remove(&id);
    }

    fn request_frame(&self, callback: FrameCallback) -> TrackerResult<FrameId> {
        let mut state = self.state.borrow_mut();
        let id = FrameId(state.next_id());
        state.frames.insert(id, callback);
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameId) {
        self.state.borrow_mut().frames.remove(&id);
    }

    fn observe(
        &self,
        ids: &[String],
        options: &ObserverOptions,
        callback: IntersectionCallback,
    ) -> TrackerResult<Observation> {
        let mut state = self.state.borrow_mut();
        let observed: Vec<String> = ids
            .iter()
            .filter(|id| state.landmark(id).is_some())
            .cloned()
            .collect();
        let id = ObserverId(state.next_id());
        state.observers.insert(
            id,
            HeadlessObserver {
                targets: observed.clone(),
                options: options.clone(),
                callback: Rc::new(RefCell::new(callback)),
                last: HashMap::new(),
            },
        );
        Ok(Observation { id, observed })
    }

    fn disconnect(&self, id: ObserverId) {
        self.state.borrow_mut().observers.remove(&id);
    }

    fn has_landmark(&self, id: &str) -> bool {
        self.state.borrow().landmark(id).is_some()
    }

    /// Jumps straight to the landmark; the scroll event is queued for the next
    /// frame so callers inside a listener never re-enter dispatch.
    fn scroll_into_view(&self, id: &str, behavior: ScrollBehavior) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(top) = state.landmark(id).map(|l| l.top) else {
            return false;
        };
        state.scroll_requests.push((id.to_string(), behavior));
        state.metrics.scroll_y = top;
        state.clamp_scroll();
        state.pending_events.push(HostEvent::Scroll);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::traits::{frame, intersections, listener};
    use crate::processing::geometry::RootMargin;

    fn options() -> ObserverOptions {
        ObserverOptions {
            root_margin: RootMargin::default(),
            thresholds: crate::processing::geometry::threshold_steps(10),
        }
    }

    #[test]
    fn test_dispatch_reaches_matching_listeners_only() {
        let host = HeadlessHost::new(1024.0, 800.0);
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        host.add_listener(
            EventKind::Scroll,
            ListenOptions::PASSIVE,
            listener(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();

        host.dispatch(HostEvent::Scroll);
        host.dispatch(HostEvent::Resize);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_frames_requested_during_frame_run_next_frame() {
        let host = HeadlessHost::new(1024.0, 800.0);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        host.request_frame(frame(move |_, host| {
            counter.set(counter.get() + 1);
            let counter = counter.clone();
            host.request_frame(frame(move |_, _| counter.set(counter.get() + 1)))
                .unwrap();
        }))
        .unwrap();

        host.run_frame();
        assert_eq!(runs.get(), 1);
        assert_eq!(host.pending_frame_count(), 1);
        host.run_frame();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_cancelled_frame_does_not_run() {
        let host = HeadlessHost::new(1024.0, 800.0);
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let id = host
            .request_frame(frame(move |_, _| flag.set(true)))
            .unwrap();
        host.cancel_frame(id);
        host.run_frame();
        assert!(!ran.get());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let host = HeadlessHost::new(1024.0, 800.0);
        host.set_document_height(2000.0);
        host.scroll_to(5000.0);
        assert_eq!(host.viewport().scroll_y, 1200.0);
        host.scroll_to(-10.0);
        assert_eq!(host.viewport().scroll_y, 0.0);
    }

    #[test]
    fn test_observer_skips_missing_landmarks_and_reports_initial_entries() {
        let host = HeadlessHost::new(1000.0, 1000.0);
        host.set_document_height(3000.0);
        host.add_landmark("a", 0.0, 1000.0);
        host.add_landmark("b", 1000.0, 1000.0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let ids = vec!["a".to_string(), "ghost".to_string(), "b".to_string()];
        let observation = host
            .observe(
                &ids,
                &options(),
                intersections(move |entries, _| sink.borrow_mut().push(entries.to_vec())),
            )
            .unwrap();
        assert_eq!(observation.observed, vec!["a".to_string(), "b".to_string()]);

        host.flush_intersections();
        let batches = seen.borrow();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        // Root band is [200, 400): "a" covers 200px of its 1000px
        assert!((batches[0][0].ratio - 0.2).abs() < 1e-9);
        assert!(batches[0][0].is_intersecting);
        assert!(!batches[0][1].is_intersecting);
    }

    #[test]
    fn test_unchanged_buckets_are_not_redelivered() {
        let host = HeadlessHost::new(1000.0, 1000.0);
        host.add_landmark("a", 0.0, 1000.0);
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        host.observe(
            &["a".to_string()],
            &options(),
            intersections(move |_, _| counter.set(counter.get() + 1)),
        )
        .unwrap();

        host.flush_intersections();
        host.flush_intersections();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_scroll_into_view_unknown_landmark() {
        let host = HeadlessHost::new(1000.0, 1000.0);
        assert!(!host.scroll_into_view("nowhere", ScrollBehavior::Smooth));
        assert!(host.scroll_requests().is_empty());
    }
}
