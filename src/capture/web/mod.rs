//! Browser host
//!
//! Implements [`Host`] on top of `web-sys`. JS closures hold only a weak
//! reference back to the host, so dropping the last `WebHost` lets every
//! registered closure go with it.

pub mod bindings;
pub mod storage;

pub use bindings::PortfolioChrome;
pub use storage::LocalThemeStore;

use crate::capture::input::{
    ElementInfo, EventKind, HostEvent, IntersectionEntry, Point, CURSOR_MARKER_ATTRIBUTE,
};
use crate::capture::traits::{
    FrameCallback, FrameId, Host, IntersectionCallback, ListenOptions, Listener, ListenerId,
    Observation, ObserverId, ObserverOptions, ScrollBehavior, ViewportMetrics,
};
use crate::tracker::channel::{TrackerError, TrackerResult};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, ScrollIntoViewOptions,
    Window,
};

type EventClosure = Closure<dyn FnMut(Event)>;
type FrameClosure = Closure<dyn FnMut(f64)>;
type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

struct WebListener {
    target: EventTarget,
    name: &'static str,
    closure: EventClosure,
}

/// Pending animation frames: the rAF handle plus whatever keeps the frame's
/// callback alive. Removing an entry drops its owner, so a cancelled frame
/// leaves nothing behind.
struct PendingFrames<C> {
    entries: HashMap<FrameId, (i32, C)>,
}

impl<C> PendingFrames<C> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, id: FrameId, handle: i32, owner: C) {
        self.entries.insert(id, (handle, owner));
    }

    fn remove(&mut self, id: FrameId) -> Option<(i32, C)> {
        self.entries.remove(&id)
    }

    fn drain(&mut self) -> impl Iterator<Item = (i32, C)> + '_ {
        self.entries.drain().map(|(_, entry)| entry)
    }
}

struct WebObserver {
    observer: IntersectionObserver,
    _closure: ObserverClosure,
}

struct WebInner {
    window: Window,
    document: Document,
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<ListenerId, WebListener>>,
    frames: RefCell<PendingFrames<FrameClosure>>,
    observers: RefCell<HashMap<ObserverId, WebObserver>>,
}

impl Drop for WebInner {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        for (handle, _closure) in self.frames.get_mut().drain() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        for (_, observer) in self.observers.get_mut().drain() {
            observer.observer.disconnect();
        }
    }
}

/// [`Host`] backed by the page's `window` and `document`
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<WebInner>,
}

fn js_error(err: JsValue) -> TrackerError {
    TrackerError::HostError(format!("{:?}", err))
}

/// Hovered element followed by its ancestors
fn element_ancestry(target: Option<EventTarget>) -> Vec<ElementInfo> {
    let mut ancestry = Vec::new();
    let mut current = target.and_then(|t| t.dyn_into::<Element>().ok());

    while let Some(element) = current {
        ancestry.push(ElementInfo {
            tag: element.tag_name().to_ascii_lowercase(),
            cursor_marker: element.get_attribute(CURSOR_MARKER_ATTRIBUTE),
        });
        current = element.parent_element();
    }
    ancestry
}

fn translate(kind: EventKind, event: &Event) -> HostEvent {
    match kind {
        EventKind::Scroll => HostEvent::Scroll,
        EventKind::Resize => HostEvent::Resize,
        EventKind::PointerMove => {
            let position = event
                .dyn_ref::<MouseEvent>()
                .map(|m| Point::new(m.client_x() as f64, m.client_y() as f64))
                .unwrap_or_default();
            HostEvent::PointerMove(position)
        }
        EventKind::PointerEnter => HostEvent::PointerEnter,
        EventKind::PointerLeave => HostEvent::PointerLeave,
        EventKind::PointerDown => HostEvent::PointerDown,
        EventKind::PointerUp => HostEvent::PointerUp,
        EventKind::PointerOver => HostEvent::PointerOver(element_ancestry(event.target())),
    }
}

impl WebHost {
    /// Fails with [`TrackerError::HostUnavailable`] outside a browser
    /// document.
    pub fn new() -> TrackerResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| TrackerError::HostUnavailable("no global window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| TrackerError::HostUnavailable("window has no document".to_string()))?;

        Ok(Self {
            inner: Rc::new(WebInner {
                window,
                document,
                next_id: Cell::new(0),
                listeners: RefCell::new(HashMap::new()),
                frames: RefCell::new(PendingFrames::new()),
                observers: RefCell::new(HashMap::new()),
            }),
        })
    }

    pub fn window(&self) -> &Window {
        &self.inner.window
    }

    fn next_id(&self) -> u64 {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        id
    }

    fn weak(&self) -> Weak<WebInner> {
        Rc::downgrade(&self.inner)
    }

    fn target_for(&self, kind: EventKind) -> EventTarget {
        if kind.is_window_event() {
            self.inner.window.clone().into()
        } else {
            self.inner.document.clone().into()
        }
    }
}

impl Host for WebHost {
    fn viewport(&self) -> ViewportMetrics {
        let window = &self.inner.window;
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };

        ViewportMetrics {
            scroll_y: window.scroll_y().unwrap_or(0.0),
            scroll_height: self
                .inner
                .document
                .document_element()
                .map(|root| root.scroll_height() as f64)
                .unwrap_or(0.0),
            inner_width: dimension(window.inner_width()),
            inner_height: dimension(window.inner_height()),
        }
    }

    fn now_ms(&self) -> f64 {
        self.inner
            .window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn add_listener(
        &self,
        kind: EventKind,
        options: ListenOptions,
        mut listener: Listener,
    ) -> TrackerResult<ListenerId> {
        let id = ListenerId(self.next_id());
        let weak = self.weak();
        let closure = EventClosure::new(move |event: Event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let host_event = translate(kind, &event);
            listener(&host_event, &WebHost { inner });
        });

        let dom_options = AddEventListenerOptions::new();
        dom_options.set_passive(options.passive);

        let target = self.target_for(kind);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.dom_name(),
                closure.as_ref().unchecked_ref(),
                &dom_options,
            )
            .map_err(js_error)?;

        self.inner.listeners.borrow_mut().insert(
            id,
            WebListener {
                target,
                name: kind.dom_name(),
                closure,
            },
        );
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        let removed = self.inner.listeners.borrow_mut().remove(&id);
        if let Some(listener) = removed {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.name,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }

    fn request_frame(&self, callback: FrameCallback) -> TrackerResult<FrameId> {
        let id = FrameId(self.next_id());
        let weak = self.weak();
        let mut callback = Some(callback);
        let closure = FrameClosure::new(move |timestamp: f64| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // wasm-bindgen defers freeing a closure dropped mid-call until it returns
            let spent = inner.frames.borrow_mut().remove(id);
            if let Some(callback) = callback.take() {
                callback(timestamp, &WebHost { inner });
            }
            drop(spent);
        });

        let handle = self
            .inner
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.inner.frames.borrow_mut().insert(id, handle, closure);
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameId) {
        let frame = self.inner.frames.borrow_mut().remove(id);
        if let Some((handle, _closure)) = frame {
            let _ = self.inner.window.cancel_animation_frame(handle);
        }
    }

    fn observe(
        &self,
        ids: &[String],
        options: &ObserverOptions,
        mut callback: IntersectionCallback,
    ) -> TrackerResult<Observation> {
        let weak = self.weak();
        let closure = ObserverClosure::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let entries: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        id: entry.target().id(),
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                callback(&entries, &WebHost { inner });
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin.to_css());
        let thresholds: js_sys::Array = options
            .thresholds
            .iter()
            .map(|t| JsValue::from_f64(*t))
            .collect();
        init.set_threshold(&thresholds);

        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(js_error)?;

        let mut observed = Vec::new();
        for id in ids {
            if let Some(element) = self.inner.document.get_element_by_id(id) {
                observer.observe(&element);
                observed.push(id.clone());
            }
        }

        let id = ObserverId(self.next_id());
        self.inner.observers.borrow_mut().insert(
            id,
            WebObserver {
                observer,
                _closure: closure,
            },
        );
        Ok(Observation { id, observed })
    }

    fn disconnect(&self, id: ObserverId) {
        let removed = self.inner.observers.borrow_mut().remove(&id);
        if let Some(observer) = removed {
            observer.observer.disconnect();
        }
    }

    fn has_landmark(&self, id: &str) -> bool {
        self.inner.document.get_element_by_id(id).is_some()
    }

    fn scroll_into_view(&self, id: &str, behavior: ScrollBehavior) -> bool {
        let Some(element) = self.inner.document.get_element_by_id(id) else {
            return false;
        };

        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        element.scroll_into_view_with_scroll_into_view_options(&options);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_frame_releases_its_callback() {
        let owner = Rc::new(());
        let mut frames = PendingFrames::new();
        frames.insert(FrameId(1), 10, owner.clone());
        frames.insert(FrameId(2), 11, owner.clone());
        assert_eq!(Rc::strong_count(&owner), 3);

        let (handle, cancelled) = frames.remove(FrameId(1)).unwrap();
        assert_eq!(handle, 10);
        drop(cancelled);
        assert_eq!(Rc::strong_count(&owner), 2, "cancelled frame must not keep its callback");
        assert!(frames.remove(FrameId(1)).is_none());
        assert_eq!(frames.entries.len(), 1);
    }

    #[test]
    fn test_drain_releases_every_pending_frame() {
        let owner = Rc::new(());
        let mut frames = PendingFrames::new();
        for id in 1..=3 {
            frames.insert(FrameId(id), id as i32, owner.clone());
        }

        let handles: Vec<i32> = {
            let mut handles: Vec<i32> = frames.drain().map(|(handle, _)| handle).collect();
            handles.sort();
            handles
        };
        assert_eq!(handles, vec![1, 2, 3]);
        assert_eq!(frames.entries.len(), 0);
        assert_eq!(Rc::strong_count(&owner), 1);
    }
}
