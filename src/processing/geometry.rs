//! Viewport geometry used to emulate intersection observation
//!
//! Browsers compute intersection ratios natively; the headless host needs the
//! same arithmetic to produce realistic entries from landmark positions.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rectangles, or `None` when they are disjoint.
    /// Edge-adjacent rectangles produce a zero-area overlap, as in the DOM.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A single root margin component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarginValue {
    Px(f64),
    Percent(f64),
}

impl MarginValue {
    /// Resolve against the viewport dimension along the margin's axis.
    pub fn resolve(&self, extent: f64) -> f64 {
        match self {
            MarginValue::Px(px) => *px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }

    fn to_css(self) -> String {
        match self {
            MarginValue::Px(px) => format!("{}px", px),
            MarginValue::Percent(pct) => format!("{}%", pct),
        }
    }
}

/// Margins applied to the viewport before intersecting. Negative values shrink
/// the observation zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl Default for RootMargin {
    /// Excludes the top 20% and the bottom 60% of the viewport.
    fn default() -> Self {
        Self {
            top: MarginValue::Percent(-20.0),
            right: MarginValue::Px(0.0),
            bottom: MarginValue::Percent(-60.0),
            left: MarginValue::Px(0.0),
        }
    }
}

impl RootMargin {
    /// CSS shorthand accepted by `IntersectionObserverInit.rootMargin`.
    pub fn to_css(&self) -> String {
        format!(
            "{} {} {} {}",
            self.top.to_css(),
            self.right.to_css(),
            self.bottom.to_css(),
            self.left.to_css()
        )
    }

    /// The observation root for a viewport of the given size.
    pub fn apply(&self, viewport_width: f64, viewport_height: f64) -> Rect {
        let top = -self.top.resolve(viewport_height);
        let left = -self.left.resolve(viewport_width);
        let bottom = viewport_height + self.bottom.resolve(viewport_height);
        let right = viewport_width + self.right.resolve(viewport_width);
        Rect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0))
    }
}

/// Visible fraction of `target` within `root`, plus whether they intersect.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> (f64, bool) {
    match target.intersection(root) {
        None => (0.0, false),
        Some(overlap) => {
            let target_area = target.area();
            if target_area <= 0.0 {
                return (1.0, true);
            }
            ((overlap.area() / target_area).clamp(0.0, 1.0), true)
        }
    }
}

/// `count` equal steps from 0 to 1 inclusive (`count = 10` gives 11 thresholds).
pub fn threshold_steps(count: usize) -> Vec<f64> {
    let count = count.max(1);
    (0..=count).map(|i| i as f64 / count as f64).collect()
}

/// Number of thresholds the ratio has reached. Observers report an entry
/// whenever this index changes.
pub fn threshold_index(ratio: f64, thresholds: &[f64]) -> usize {
    thresholds.iter().filter(|t| ratio >= **t).count()
}
