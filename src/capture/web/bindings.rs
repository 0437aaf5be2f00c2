//! JS-facing entry point

use super::{LocalThemeStore, WebHost};
use crate::chrome::PageChrome;
use crate::config::ChromeConfig;
use crate::nav;
use crate::theme::{Theme, ThemeStore};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Page chrome mounted on the current document
#[wasm_bindgen]
pub struct PortfolioChrome {
    chrome: PageChrome,
}

#[wasm_bindgen]
impl PortfolioChrome {
    /// Mount with an optional JSON configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PortfolioChrome, JsValue> {
        let config = match config_json {
            Some(json) => ChromeConfig::from_json_str(&json).map_err(to_js)?,
            None => ChromeConfig::default(),
        };

        let host = WebHost::new().map_err(to_js)?;
        let store = LocalThemeStore::new(host.window().clone(), config.theme.storage_key.clone());
        let preference = store.load().unwrap_or(config.theme.default_preference);
        store.apply(preference.resolve(store.prefers_dark()) == Theme::Dark);

        let mut chrome = PageChrome::new(config, nav::default_sections(), Box::new(store));
        chrome.mount(Rc::new(host)).map_err(to_js)?;
        Ok(Self { chrome })
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.chrome.snapshot_json().map_err(to_js)
    }

    pub fn navigate(&self, id: &str) -> bool {
        self.chrome.navigate(id)
    }

    #[wasm_bindgen(js_name = navigateMobile)]
    pub fn navigate_mobile(&mut self, id: &str) -> bool {
        self.chrome.navigate_mobile(id)
    }

    #[wasm_bindgen(js_name = toggleMobileNav)]
    pub fn toggle_mobile_nav(&mut self) -> bool {
        self.chrome.toggle_mobile_nav()
    }

    /// Returns `true` when the page is now dark
    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> bool {
        self.chrome.toggle_theme() == Theme::Dark
    }

    pub fn unmount(&mut self) {
        self.chrome.unmount();
    }
}
