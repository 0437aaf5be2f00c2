//! Light/dark theme toggle
//!
//! Persistence lives behind [`ThemeStore`]; the browser host keeps the
//! preference in `localStorage`, tests use [`MemoryThemeStore`].

use serde::{Deserialize, Serialize};
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Stored preference; `System` follows the platform color scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            "system" => Some(ThemePreference::System),
            _ => None,
        }
    }

    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::System if prefers_dark => Theme::Dark,
            ThemePreference::System => Theme::Light,
        }
    }
}

impl From<Theme> for ThemePreference {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => ThemePreference::Light,
            Theme::Dark => ThemePreference::Dark,
        }
    }
}

pub trait ThemeStore {
    fn load(&self) -> Option<ThemePreference>;

    fn save(&self, preference: ThemePreference);

    /// Whether the platform color scheme is dark
    fn prefers_dark(&self) -> bool;
}

/// In-memory store with a fixed platform color scheme
#[derive(Debug, Default)]
pub struct MemoryThemeStore {
    stored: Cell<Option<ThemePreference>>,
    prefers_dark: bool,
}

impl MemoryThemeStore {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            stored: Cell::new(None),
            prefers_dark,
        }
    }
}

impl ThemeStore for MemoryThemeStore {
    fn load(&self) -> Option<ThemePreference> {
        self.stored.get()
    }

    fn save(&self, preference: ThemePreference) {
        self.stored.set(Some(preference));
    }

    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }
}

pub struct ThemeToggle {
    store: Box<dyn ThemeStore>,
    default_preference: ThemePreference,
}

impl ThemeToggle {
    pub fn new(store: Box<dyn ThemeStore>, default_preference: ThemePreference) -> Self {
        Self {
            store,
            default_preference,
        }
    }

    pub fn preference(&self) -> ThemePreference {
        self.store.load().unwrap_or(self.default_preference)
    }

    pub fn theme(&self) -> Theme {
        self.preference().resolve(self.store.prefers_dark())
    }

    pub fn is_dark(&self) -> bool {
        self.theme() == Theme::Dark
    }

    /// Store the opposite of the current theme as an explicit preference.
    pub fn toggle(&self) -> Theme {
        let next = self.theme().toggled();
        self.store.save(next.into());
        tracing::debug!("Theme switched to {}", next.as_str());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_preference_follows_platform() {
        let toggle = ThemeToggle::new(Box::new(MemoryThemeStore::new(true)), ThemePreference::System);
        assert!(toggle.is_dark());

        let toggle = ThemeToggle::new(Box::new(MemoryThemeStore::new(false)), ThemePreference::System);
        assert!(!toggle.is_dark());
    }

    #[test]
    fn test_toggle_stores_explicit_opposite() {
        let toggle = ThemeToggle::new(Box::new(MemoryThemeStore::new(true)), ThemePreference::System);
        assert_eq!(toggle.toggle(), Theme::Light);
        assert_eq!(toggle.preference(), ThemePreference::Light);
        assert!(!toggle.is_dark());

        assert_eq!(toggle.toggle(), Theme::Dark);
        assert!(toggle.is_dark());
    }

    #[test]
    fn test_parse_preference_names() {
        for pref in [ThemePreference::Light, ThemePreference::Dark, ThemePreference::System] {
            assert_eq!(ThemePreference::parse(pref.as_str()), Some(pref));
        }
        assert_eq!(ThemePreference::parse("sepia"), None);
    }
}
