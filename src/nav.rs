//! Section navigation
//!
//! The section catalogue and the state behind the desktop dot rail and the
//! mobile menu.

use crate::tracker::sections::SectionVisibilityTracker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavSection {
    pub id: String,
    pub label: String,
}

impl NavSection {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// In-page anchor for the section
    pub fn href(&self) -> String {
        format!("#{}", urlencoding::encode(&self.id))
    }
}

/// Sections of the portfolio page, in document order
pub fn default_sections() -> Vec<NavSection> {
    [
        ("hero", "Home"),
        ("origin", "Origin"),
        ("learning", "Learning"),
        ("projects", "Projects"),
        ("work", "Work"),
        ("now", "Now"),
    ]
    .into_iter()
    .map(|(id, label)| NavSection::new(id, label))
    .collect()
}

pub fn section_ids(sections: &[NavSection]) -> Vec<String> {
    sections.iter().map(|s| s.id.clone()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DotStatus {
    Active,
    /// Before the active section
    Past,
    Upcoming,
}

pub fn dot_status(index: usize, active_index: Option<usize>) -> DotStatus {
    match active_index {
        Some(active) if index == active => DotStatus::Active,
        Some(active) if index < active => DotStatus::Past,
        _ => DotStatus::Upcoming,
    }
}

/// Height of the progress rail fill, in percent
pub fn progress_fill_percent(progress: f64) -> f64 {
    progress.clamp(0.0, 1.0) * 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub href: String,
    pub status: DotStatus,
}

pub fn nav_items(sections: &[NavSection], active_index: Option<usize>) -> Vec<NavItem> {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| NavItem {
            id: section.id.clone(),
            label: section.label.clone(),
            href: section.href(),
            status: dot_status(index, active_index),
        })
        .collect()
}

/// Collapsible menu shown on narrow viewports
#[derive(Debug, Clone, Default)]
pub struct MobileNav {
    expanded: bool,
}

impl MobileNav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    /// Scroll to the section and collapse the menu.
    pub fn navigate(&mut self, sections: &SectionVisibilityTracker, id: &str) -> bool {
        self.expanded = false;
        sections.scroll_to_section(id)
    }
}
