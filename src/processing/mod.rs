//! Pure tracker logic
//!
//! Scroll sampling, section selection, pointer smoothing, interaction kind
//! resolution and cursor appearance. Nothing here touches a host, so these
//! pieces can be driven directly from tests or offline tooling.

pub mod appearance;
pub mod geometry;
pub mod interaction;
pub mod registry;
pub mod sampling;
pub mod smoothing;

pub use appearance::{CursorAppearance, CursorBadge, CursorInputs};
pub use geometry::{Rect, RootMargin};
pub use interaction::{InteractionKind, InteractionRules};
pub use registry::SectionRegistry;
pub use sampling::{ScrollDirection, ScrollSampler, ScrollState};
pub use smoothing::Follower2D;
