//! Interaction kind resolution
//!
//! The hovered element and its ancestors are tested against an ordered list
//! of rules. Rules are tried in precedence order; a rule matches when any
//! element of the ancestry satisfies it, so a `data-cursor="project"` card
//! wins over an anchor nested inside it.

use crate::capture::input::ElementInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    #[default]
    Default,
    Hover,
    Link,
    Project,
    Assistant,
    Text,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Default => "default",
            InteractionKind::Hover => "hover",
            InteractionKind::Link => "link",
            InteractionKind::Project => "project",
            InteractionKind::Assistant => "assistant",
            InteractionKind::Text => "text",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicate over a single element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMatcher {
    /// `data-cursor` attribute equals the value
    Marker(&'static str),
    /// Tag name equals one of the values
    Tags(&'static [&'static str]),
}

impl ElementMatcher {
    pub fn matches(&self, element: &ElementInfo) -> bool {
        match self {
            ElementMatcher::Marker(value) => element.cursor_marker.as_deref() == Some(*value),
            ElementMatcher::Tags(tags) => tags.iter().any(|t| element.tag.eq_ignore_ascii_case(t)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRule {
    pub matchers: Vec<ElementMatcher>,
    pub kind: InteractionKind,
}

impl InteractionRule {
    pub fn new(kind: InteractionKind, matchers: Vec<ElementMatcher>) -> Self {
        Self { matchers, kind }
    }

    /// Whether any element of the ancestry satisfies any matcher
    pub fn matches(&self, ancestry: &[ElementInfo]) -> bool {
        ancestry
            .iter()
            .any(|element| self.matchers.iter().any(|m| m.matches(element)))
    }
}

const TEXT_TAGS: &[&str] = &["p", "span", "h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRules {
    rules: Vec<InteractionRule>,
}

impl Default for InteractionRules {
    fn default() -> Self {
        Self {
            rules: vec![
                InteractionRule::new(
                    InteractionKind::Project,
                    vec![ElementMatcher::Marker("project")],
                ),
                InteractionRule::new(
                    InteractionKind::Assistant,
                    vec![ElementMatcher::Marker("assistant")],
                ),
                InteractionRule::new(
                    InteractionKind::Link,
                    vec![
                        ElementMatcher::Marker("link"),
                        ElementMatcher::Tags(&["a"]),
                        ElementMatcher::Tags(&["button"]),
                    ],
                ),
                InteractionRule::new(InteractionKind::Text, vec![ElementMatcher::Tags(TEXT_TAGS)]),
            ],
        }
    }
}

impl InteractionRules {
    pub fn new(rules: Vec<InteractionRule>) -> Self {
        Self { rules }
    }

    /// Resolve the kind for a hovered element. `ancestry` lists the element
    /// itself first, then its ancestors outward.
    pub fn resolve(&self, ancestry: &[ElementInfo]) -> InteractionKind {
        self.rules
            .iter()
            .find(|rule| rule.matches(ancestry))
            .map(|rule| rule.kind)
            .unwrap_or_default()
    }
}
