//! Cursor overlay appearance
//!
//! Maps the follower state onto the sizes, opacities and scale the overlay
//! renders with. The dot sits on the raw pointer position, the ring and any
//! badge on the smoothed one.

use crate::capture::input::Point;
use crate::processing::interaction::InteractionKind;
use serde::{Deserialize, Serialize};

/// Scale applied while a button is held
pub const PRESSED_SCALE: f64 = 0.8;

/// Fraction of the scale removed at full scroll velocity
pub const VELOCITY_SHRINK: f64 = 0.3;

/// Extra element drawn at the ring position for some interaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CursorBadge {
    /// "VIEW" label over project cards
    View,
    /// Pulsing dot over the assistant trigger
    Pulse,
}

impl CursorBadge {
    pub fn label(self) -> Option<&'static str> {
        match self {
            CursorBadge::View => Some("VIEW"),
            CursorBadge::Pulse => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorAppearance {
    pub dot_position: Point,
    pub ring_position: Point,
    pub dot_size: f64,
    pub ring_size: f64,
    pub dot_opacity: f64,
    pub ring_opacity: f64,
    pub scale: f64,
    pub badge: Option<CursorBadge>,
}

struct KindStyle {
    dot_size: f64,
    ring_size: f64,
    dot_opacity: f64,
    ring_opacity: f64,
    scale_factor: f64,
}

fn kind_style(kind: InteractionKind) -> KindStyle {
    match kind {
        InteractionKind::Link => KindStyle {
            dot_size: 6.0,
            ring_size: 50.0,
            dot_opacity: 1.0,
            ring_opacity: 0.5,
            scale_factor: 1.2,
        },
        InteractionKind::Project => KindStyle {
            dot_size: 0.0,
            ring_size: 80.0,
            dot_opacity: 0.0,
            ring_opacity: 0.3,
            scale_factor: 1.0,
        },
        InteractionKind::Assistant => KindStyle {
            dot_size: 8.0,
            ring_size: 60.0,
            dot_opacity: 1.0,
            ring_opacity: 0.6,
            scale_factor: 1.1,
        },
        InteractionKind::Text => KindStyle {
            dot_size: 4.0,
            ring_size: 0.0,
            dot_opacity: 0.8,
            ring_opacity: 0.0,
            scale_factor: 1.0,
        },
        InteractionKind::Default | InteractionKind::Hover => KindStyle {
            dot_size: 8.0,
            ring_size: 40.0,
            dot_opacity: 1.0,
            ring_opacity: 0.3,
            scale_factor: 1.0,
        },
    }
}

/// Input to [`CursorAppearance::compute`]
#[derive(Debug, Clone, Copy)]
pub struct CursorInputs {
    pub raw: Point,
    pub smoothed: Point,
    pub kind: InteractionKind,
    pub visible: bool,
    pub pressed: bool,
    /// Current scroll velocity in [0, 1]
    pub scroll_velocity: f64,
}

impl CursorAppearance {
    pub fn compute(inputs: CursorInputs) -> Self {
        let style = kind_style(inputs.kind);
        let base_scale = if inputs.pressed { PRESSED_SCALE } else { 1.0 };
        let velocity_scale = 1.0 - inputs.scroll_velocity.clamp(0.0, 1.0) * VELOCITY_SHRINK;
        let visibility = if inputs.visible { 1.0 } else { 0.0 };

        let badge = match inputs.kind {
            InteractionKind::Project => Some(CursorBadge::View),
            InteractionKind::Assistant => Some(CursorBadge::Pulse),
            _ => None,
        };

        Self {
            dot_position: inputs.raw,
            ring_position: inputs.smoothed,
            dot_size: style.dot_size,
            ring_size: style.ring_size,
            dot_opacity: style.dot_opacity * visibility,
            ring_opacity: style.ring_opacity * visibility,
            scale: base_scale * velocity_scale * style.scale_factor,
            badge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(kind: InteractionKind) -> CursorInputs {
        CursorInputs {
            raw: Point::new(10.0, 20.0),
            smoothed: Point::new(5.0, 8.0),
            kind,
            visible: true,
            pressed: false,
            scroll_velocity: 0.0,
        }
    }

    #[test]
    fn test_link_enlarges_ring() {
        let look = CursorAppearance::compute(inputs(InteractionKind::Link));
        assert_eq!(look.ring_size, 50.0);
        assert_eq!(look.dot_size, 6.0);
        assert!((look.scale - 1.2).abs() < 1e-12);
        assert_eq!(look.badge, None);
    }

    #[test]
    fn test_project_hides_dot_and_shows_view_badge() {
        let look = CursorAppearance::compute(inputs(InteractionKind::Project));
        assert_eq!(look.dot_opacity, 0.0);
        assert_eq!(look.ring_size, 80.0);
        assert_eq!(look.badge, Some(CursorBadge::View));
        assert_eq!(look.badge.and_then(CursorBadge::label), Some("VIEW"));
    }

    #[test]
    fn test_pressed_and_fast_scroll_shrink() {
        let mut input = inputs(InteractionKind::Default);
        input.pressed = true;
        input.scroll_velocity = 1.0;
        let look = CursorAppearance::compute(input);
        assert!((look.scale - 0.8 * 0.7).abs() < 1e-12, "scale {}", look.scale);
    }

    #[test]
    fn test_hidden_cursor_is_transparent() {
        let mut input = inputs(InteractionKind::Assistant);
        input.visible = false;
        let look = CursorAppearance::compute(input);
        assert_eq!(look.dot_opacity, 0.0);
        assert_eq!(look.ring_opacity, 0.0);
    }

    #[test]
    fn test_positions_follow_raw_and_smoothed() {
        let look = CursorAppearance::compute(inputs(InteractionKind::Text));
        assert_eq!(look.dot_position, Point::new(10.0, 20.0));
        assert_eq!(look.ring_position, Point::new(5.0, 8.0));
        assert_eq!(look.ring_size, 0.0);
    }
}
