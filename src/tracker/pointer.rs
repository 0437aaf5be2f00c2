//! Pointer follower
//!
//! Tracks the raw pointer position and a trailing smoothed position for the
//! custom cursor overlay, plus visibility, pressed state and the interaction
//! kind of the hovered element. Below the width breakpoint the follower turns
//! itself off entirely: no pointer listeners, no frame loop.

use crate::capture::input::{EventKind, HostEvent, Point};
use crate::capture::traits::{frame, listener, FrameId, Host, ListenOptions, ListenerSet};
use crate::config::PointerConfig;
use crate::processing::interaction::{InteractionKind, InteractionRules};
use crate::processing::smoothing::Follower2D;
use crate::tracker::channel::{Tracker, TrackerError, TrackerKind, TrackerResult};
use parking_lot::Mutex as ParkingMutex;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

const POINTER_EVENTS: [EventKind; 6] = [
    EventKind::PointerMove,
    EventKind::PointerEnter,
    EventKind::PointerLeave,
    EventKind::PointerDown,
    EventKind::PointerUp,
    EventKind::PointerOver,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerState {
    /// Last pointer position reported by the host
    pub raw: Point,
    /// Eased position trailing `raw`
    pub smoothed: Point,
    pub visible: bool,
    pub pressed: bool,
    pub interaction: InteractionKind,
    /// Viewport is narrower than the breakpoint; the follower is suppressed
    pub is_touch_device: bool,
}

struct PointerShared {
    state: PointerState,
    follower: Follower2D,
    rules: InteractionRules,
    config: PointerConfig,
    tracking: bool,
    pointer_listeners: ListenerSet,
    frame: Option<FrameId>,
}

impl PointerShared {
    fn handle(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PointerMove(position) => {
                self.state.raw = *position;
                self.state.visible = true;
            }
            HostEvent::PointerEnter => self.state.visible = true,
            HostEvent::PointerLeave => self.state.visible = false,
            HostEvent::PointerDown => self.state.pressed = true,
            HostEvent::PointerUp => self.state.pressed = false,
            HostEvent::PointerOver(ancestry) => {
                let kind = self.rules.resolve(ancestry);
                if kind != self.state.interaction {
                    tracing::trace!("Cursor interaction {} -> {}", self.state.interaction, kind);
                }
                self.state.interaction = kind;
            }
            HostEvent::Scroll | HostEvent::Resize => {}
        }
    }

    /// Back to the state of a freshly created follower
    fn reset(&mut self) {
        self.state = PointerState::default();
        self.follower.reset(Point::default());
    }

    fn step(&mut self) {
        self.follower.step(self.state.raw, self.config.blend);
        self.state.smoothed = self.follower.position();
    }

    /// Pointer listeners plus the frame loop
    fn enable(&mut self, shared: &Arc<ParkingMutex<PointerShared>>, host: &dyn Host) {
        if self.tracking {
            return;
        }
        self.tracking = true;

        for kind in POINTER_EVENTS {
            let shared = shared.clone();
            let added = self.pointer_listeners.add(
                host,
                kind,
                ListenOptions::default(),
                listener(move |event, _| shared.lock().handle(event)),
            );
            if let Err(e) = added {
                tracing::warn!("Failed to listen for {}: {}", kind, e);
            }
        }
        if self.pointer_listeners.is_empty() {
            tracing::warn!("No pointer listeners registered; cursor will not move");
        }
        schedule_follow(self, shared, host);

        tracing::debug!(
            "Pointer tracking enabled ({} listeners)",
            self.pointer_listeners.len()
        );
    }

    fn disable(&mut self, host: &dyn Host) {
        if !self.tracking {
            return;
        }
        self.tracking = false;

        self.pointer_listeners.release(host);
        if let Some(id) = self.frame.take() {
            host.cancel_frame(id);
        }
        self.state.visible = false;
        self.state.pressed = false;

        tracing::debug!("Pointer tracking disabled");
    }
}

/// Queue the next smoothing frame. The callback reschedules itself, so the
/// loop runs until the frame is cancelled.
fn schedule_follow(
    inner: &mut PointerShared,
    shared: &Arc<ParkingMutex<PointerShared>>,
    host: &dyn Host,
) {
    let next = shared.clone();
    let request = host.request_frame(frame(move |_, host| {
        let mut inner = next.lock();
        inner.frame = None;
        inner.step();
        schedule_follow(&mut inner, &next, host);
    }));

    match request {
        Ok(id) => inner.frame = Some(id),
        Err(e) => tracing::warn!("Failed to schedule pointer frame: {}", e),
    }
}

/// Turn tracking on or off for the current viewport width.
fn evaluate_viewport(shared: &Arc<ParkingMutex<PointerShared>>, host: &dyn Host) {
    let width = host.viewport().inner_width;
    let mut inner = shared.lock();
    let compact = width < inner.config.breakpoint_px;
    inner.state.is_touch_device = compact;

    if compact {
        inner.disable(host);
    } else {
        inner.enable(shared, host);
    }
}

/// Smoothed pointer follower for the custom cursor overlay
///
/// Tracking is only active on viewports at least as wide as the configured
/// breakpoint; a resize listener switches it on and off.
pub struct PointerFollower {
    id: String,
    shared: Arc<ParkingMutex<PointerShared>>,
    host: Option<Rc<dyn Host>>,
    listeners: ListenerSet,
}

impl PointerFollower {
    /// Create a detached follower with the stock interaction rules
    pub fn new(config: PointerConfig) -> Self {
        Self::with_rules(config, InteractionRules::default())
    }

    /// Create a detached follower resolving interaction kinds with `rules`
    pub fn with_rules(config: PointerConfig, rules: InteractionRules) -> Self {
        Self {
            id: "pointer".to_string(),
            shared: Arc::new(ParkingMutex::new(PointerShared {
                state: PointerState::default(),
                follower: Follower2D::new(0.0, 0.0),
                rules,
                config,
                tracking: false,
                pointer_listeners: ListenerSet::new(),
                frame: None,
            })),
            host: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Copy of the current pointer state
    pub fn state(&self) -> PointerState {
        self.shared.lock().state
    }

    /// Whether the overlay should render at all
    pub fn is_active(&self) -> bool {
        self.shared.lock().tracking
    }
}

impl Default for PointerFollower {
    fn default() -> Self {
        Self::new(PointerConfig::default())
    }
}

impl Tracker for PointerFollower {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackerKind {
        TrackerKind::Pointer
    }

    fn attach(&mut self, host: Rc<dyn Host>) -> TrackerResult<()> {
        if self.host.is_some() {
            return Err(TrackerError::AlreadyAttached);
        }

        self.shared.lock().reset();

        let shared = self.shared.clone();
        self.listeners.add(
            &*host,
            EventKind::Resize,
            ListenOptions::PASSIVE,
            listener(move |_, host| evaluate_viewport(&shared, host)),
        )?;
        evaluate_viewport(&self.shared, &*host);
        self.host = Some(host);

        tracing::info!(
            "Pointer follower attached (active={})",
            self.shared.lock().tracking
        );
        Ok(())
    }

    fn detach(&mut self) {
        let Some(host) = self.host.take() else {
            return;
        };

        self.listeners.release(&*host);
        self.shared.lock().disable(&*host);

        tracing::info!("Pointer follower detached");
    }

    fn is_attached(&self) -> bool {
        self.host.is_some()
    }
}

impl Drop for PointerFollower {
    fn drop(&mut self) {
        self.detach();
    }
}
