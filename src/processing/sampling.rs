//! Scroll sampling
//!
//! Turns successive (offset, time) samples into normalized progress, a
//! heuristic velocity and a direction.

use crate::capture::traits::ViewportMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    Idle,
}

impl ScrollDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            ScrollDirection::Down
        } else if delta < 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    /// Fraction of the scrollable height above the viewport, in [0, 1]
    pub progress: f64,
    /// Normalized speed in [0, 1]
    pub velocity: f64,
    pub direction: ScrollDirection,
}

/// `scroll_y / max_scroll`, clamped; zero when the page cannot scroll.
pub fn scroll_progress(scroll_y: f64, max_scroll: f64) -> f64 {
    if max_scroll > 0.0 {
        (scroll_y / max_scroll).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `min(1, |delta| / elapsed × scale)`, or `None` when no time has passed.
pub fn scroll_velocity(delta: f64, elapsed_ms: f64, scale: f64) -> Option<f64> {
    if elapsed_ms > 0.0 {
        Some(((delta / elapsed_ms).abs() * scale).min(1.0))
    } else {
        None
    }
}

/// Keeps the previous sample and derives a [`ScrollState`] from each new one.
#[derive(Debug, Clone)]
pub struct ScrollSampler {
    last_offset: f64,
    last_time_ms: f64,
    velocity_scale: f64,
    state: ScrollState,
}

impl ScrollSampler {
    /// Start from an initial offset and time; the state starts idle at zero.
    pub fn new(initial_offset: f64, now_ms: f64, velocity_scale: f64) -> Self {
        Self {
            last_offset: initial_offset,
            last_time_ms: now_ms,
            velocity_scale,
            state: ScrollState::default(),
        }
    }

    pub fn sample(&mut self, metrics: ViewportMetrics, now_ms: f64) -> ScrollState {
        let offset = metrics.scroll_y;
        let delta = offset - self.last_offset;
        let elapsed = now_ms - self.last_time_ms;

        if let Some(velocity) = scroll_velocity(delta, elapsed, self.velocity_scale) {
            self.state.velocity = velocity;
        }
        self.state.direction = ScrollDirection::from_delta(delta);
        self.state.progress = scroll_progress(offset, metrics.max_scroll());

        self.last_offset = offset;
        self.last_time_ms = now_ms;
        self.state
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }
}
