//! Page chrome
//!
//! Owns one of each tracker plus the theme toggle and mobile menu, and
//! flattens their state into a [`ChromeSnapshot`] for rendering.

use crate::capture::traits::Host;
use crate::config::ChromeConfig;
use crate::nav::{self, MobileNav, NavItem, NavSection};
use crate::processing::appearance::{CursorAppearance, CursorInputs};
use crate::processing::sampling::ScrollState;
use crate::theme::{Theme, ThemeStore, ThemeToggle};
use crate::tracker::channel::{Tracker, TrackerError, TrackerResult};
use crate::tracker::pointer::{PointerFollower, PointerState};
use crate::tracker::scroll::ScrollProgressTracker;
use crate::tracker::sections::SectionVisibilityTracker;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionVisibility {
    pub id: String,
    pub ratio: f64,
}

/// Everything the chrome components need for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeSnapshot {
    pub scroll: ScrollState,
    pub progress_fill_percent: f64,
    pub active_section: Option<String>,
    pub section_visibility: Vec<SectionVisibility>,
    pub nav: Vec<NavItem>,
    pub mobile_nav_expanded: bool,
    pub pointer: PointerState,
    /// `None` while the follower is suppressed
    pub cursor: Option<CursorAppearance>,
    pub theme: Theme,
    pub is_dark: bool,
    pub taken_at: DateTime<Utc>,
}

/// The three trackers plus theme and menu state behind one mount point
pub struct PageChrome {
    sections: Vec<NavSection>,
    scroll: ScrollProgressTracker,
    section_tracker: SectionVisibilityTracker,
    pointer: PointerFollower,
    theme: ThemeToggle,
    mobile_nav: MobileNav,
}

impl PageChrome {
    pub fn new(config: ChromeConfig, sections: Vec<NavSection>, theme_store: Box<dyn ThemeStore>) -> Self {
        let section_tracker =
            SectionVisibilityTracker::new(nav::section_ids(&sections), config.sections.clone());
        Self {
            sections,
            scroll: ScrollProgressTracker::new(config.scroll.clone()),
            section_tracker,
            pointer: PointerFollower::new(config.pointer.clone()),
            theme: ThemeToggle::new(theme_store, config.theme.default_preference),
            mobile_nav: MobileNav::new(),
        }
    }

    /// Default configuration and the stock section catalogue
    pub fn with_defaults(theme_store: Box<dyn ThemeStore>) -> Self {
        Self::new(ChromeConfig::default(), nav::default_sections(), theme_store)
    }

    fn trackers(&mut self) -> [&mut dyn Tracker; 3] {
        [
            &mut self.scroll,
            &mut self.section_tracker,
            &mut self.pointer,
        ]
    }

    /// Attach every tracker.
    ///
    /// Fails with [`TrackerError::AlreadyAttached`] without touching anything
    /// when any tracker is still attached. If a tracker fails to attach, only
    /// the trackers attached by this call are detached again.
    pub fn mount(&mut self, host: Rc<dyn Host>) -> TrackerResult<()> {
        if self.trackers().iter().any(|t| t.is_attached()) {
            return Err(TrackerError::AlreadyAttached);
        }

        let mut trackers = self.trackers();
        for index in 0..trackers.len() {
            if let Err(e) = trackers[index].attach(host.clone()) {
                tracing::warn!("Failed to attach {} tracker: {}", trackers[index].kind(), e);
                for attached in &mut trackers[..index] {
                    attached.detach();
                }
                return Err(e);
            }
        }

        tracing::info!("Page chrome mounted ({} sections)", self.sections.len());
        Ok(())
    }

    pub fn unmount(&mut self) {
        for tracker in self.trackers() {
            tracker.detach();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scroll.is_attached() && self.section_tracker.is_attached() && self.pointer.is_attached()
    }

    pub fn scroll(&self) -> &ScrollProgressTracker {
        &self.scroll
    }

    pub fn sections(&self) -> &SectionVisibilityTracker {
        &self.section_tracker
    }

    pub fn pointer(&self) -> &PointerFollower {
        &self.pointer
    }

    pub fn theme(&self) -> &ThemeToggle {
        &self.theme
    }

    /// Dot rail click: scroll to the section
    pub fn navigate(&self, id: &str) -> bool {
        self.section_tracker.scroll_to_section(id)
    }

    /// Mobile menu click: scroll to the section and collapse the menu
    pub fn navigate_mobile(&mut self, id: &str) -> bool {
        self.mobile_nav.navigate(&self.section_tracker, id)
    }

    pub fn toggle_mobile_nav(&mut self) -> bool {
        self.mobile_nav.toggle()
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle()
    }

    /// Current state of every chrome component, stamped with the time taken
    pub fn snapshot(&self) -> ChromeSnapshot {
        let scroll = self.scroll.state();
        let pointer = self.pointer.state();
        let active_index = self.section_tracker.active_index();

        let cursor = self.pointer.is_active().then(|| {
            CursorAppearance::compute(CursorInputs {
                raw: pointer.raw,
                smoothed: pointer.smoothed,
                kind: pointer.interaction,
                visible: pointer.visible,
                pressed: pointer.pressed,
                scroll_velocity: scroll.velocity,
            })
        });

        let theme = self.theme.theme();
        ChromeSnapshot {
            scroll,
            progress_fill_percent: nav::progress_fill_percent(scroll.progress),
            active_section: self.section_tracker.active_section(),
            section_visibility: self
                .section_tracker
                .visibilities()
                .into_iter()
                .map(|(id, ratio)| SectionVisibility { id, ratio })
                .collect(),
            nav: nav::nav_items(&self.sections, active_index),
            mobile_nav_expanded: self.mobile_nav.is_expanded(),
            pointer,
            cursor,
            theme,
            is_dark: theme == Theme::Dark,
            taken_at: Utc::now(),
        }
    }

    pub fn snapshot_json(&self) -> TrackerResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }
}
