//! `localStorage` backed theme store

use crate::theme::{Theme, ThemePreference, ThemeStore};
use web_sys::{Storage, Window};

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";
const DARK_CLASS: &str = "dark";

pub struct LocalThemeStore {
    window: Window,
    key: String,
}

impl LocalThemeStore {
    pub fn new(window: Window, key: impl Into<String>) -> Self {
        Self {
            window,
            key: key.into(),
        }
    }

    fn storage(&self) -> Option<Storage> {
        self.window.local_storage().ok().flatten()
    }

    /// Mirror the resolved theme onto the root element's class list
    pub fn apply(&self, dark: bool) {
        let root = self
            .window
            .document()
            .and_then(|document| document.document_element());
        if let Some(root) = root {
            if let Err(e) = root.class_list().toggle_with_force(DARK_CLASS, dark) {
                tracing::warn!("Failed to apply theme class: {:?}", e);
            }
        }
    }
}

impl ThemeStore for LocalThemeStore {
    fn load(&self) -> Option<ThemePreference> {
        let value = self.storage()?.get_item(&self.key).ok().flatten()?;
        ThemePreference::parse(&value)
    }

    fn save(&self, preference: ThemePreference) {
        match self.storage() {
            Some(storage) => {
                if let Err(e) = storage.set_item(&self.key, preference.as_str()) {
                    tracing::warn!("Failed to persist theme preference: {:?}", e);
                }
            }
            None => tracing::debug!("localStorage unavailable, theme not persisted"),
        }

        self.apply(preference.resolve(self.prefers_dark()) == Theme::Dark);
    }

    fn prefers_dark(&self) -> bool {
        self.window
            .match_media(DARK_SCHEME_QUERY)
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or(false)
    }
}
