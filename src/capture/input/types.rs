use serde::{Deserialize, Serialize};

/// Marker attribute consulted when resolving the cursor interaction kind.
pub const CURSOR_MARKER_ATTRIBUTE: &str = "data-cursor";

/// A point in viewport (client) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The parts of a DOM element the pointer tracker cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    /// Lowercase tag name (`a`, `button`, `p`, ...)
    pub tag: String,
    /// Value of the `data-cursor` attribute, if present
    pub cursor_marker: Option<String>,
}

impl ElementInfo {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            cursor_marker: None,
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.cursor_marker = Some(marker.into());
        self
    }
}

/// One intersection observer entry, reduced to what the section tracker needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionEntry {
    pub id: String,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Event categories a tracker can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Scroll,
    Resize,
    PointerMove,
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    PointerOver,
}

impl EventKind {
    /// DOM event type name used when registering the listener.
    pub fn dom_name(self) -> &'static str {
        match self {
            EventKind::Scroll => "scroll",
            EventKind::Resize => "resize",
            EventKind::PointerMove => "mousemove",
            EventKind::PointerEnter => "mouseenter",
            EventKind::PointerLeave => "mouseleave",
            EventKind::PointerDown => "mousedown",
            EventKind::PointerUp => "mouseup",
            EventKind::PointerOver => "mouseover",
        }
    }

    /// Scroll and resize fire on the window, pointer events on the document.
    pub fn is_window_event(self) -> bool {
        matches!(self, EventKind::Scroll | EventKind::Resize)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dom_name())
    }
}

/// An event delivered by the host to a registered listener.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Scroll,
    Resize,
    PointerMove(Point),
    PointerEnter,
    PointerLeave,
    PointerDown,
    PointerUp,
    /// Hovered element followed by its ancestors, innermost first.
    PointerOver(Vec<ElementInfo>),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Scroll => EventKind::Scroll,
            HostEvent::Resize => EventKind::Resize,
            HostEvent::PointerMove(_) => EventKind::PointerMove,
            HostEvent::PointerEnter => EventKind::PointerEnter,
            HostEvent::PointerLeave => EventKind::PointerLeave,
            HostEvent::PointerDown => EventKind::PointerDown,
            HostEvent::PointerUp => EventKind::PointerUp,
            HostEvent::PointerOver(_) => EventKind::PointerOver,
        }
    }
}
