//! Platform [`api::Environment`] for the UI.
//!
//! - **Web** (WASM + `web` feature): [`BrowserEnvironment`] over `window.location`,
//!   `history`, and `localStorage`
//! - **Desktop / Mobile / tests** (native): [`api::MemoryEnvironment`]

use std::sync::Arc;

use api::Environment;
use store::ClientConfig;

/// Environment backed by the browser window.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[derive(Clone, Debug, Default)]
pub struct BrowserEnvironment {
    storage: store::LocalStorageStore,
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl BrowserEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// `window.location.origin`, e.g. `"https://harriswildlands.com"`.
    pub fn origin() -> Option<String> {
        web_sys::window()?.location().origin().ok()
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl Environment for BrowserEnvironment {
    fn query_param(&self, name: &str) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        web_sys::UrlSearchParams::new_with_str(&search).ok()?.get(name)
    }

    fn stored_flag(&self, key: &str) -> Option<String> {
        use store::KeyValueStore;
        self.storage.get(key)
    }

    fn set_stored_flag(&self, key: &str, value: &str) {
        use store::KeyValueStore;
        self.storage.set(key, value);
    }

    fn remove_stored_flag(&self, key: &str) {
        use store::KeyValueStore;
        self.storage.remove(key);
    }

    fn navigate_to(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        // Rewrite the current entry first so the old query string (e.g. `?demo=true`)
        // is gone before the page unloads.
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
        }
        if let Err(e) = window.location().set_href(url) {
            tracing::error!("Failed to navigate to {}: {:?}", url, e);
        }
    }
}

/// Create the platform-appropriate environment.
pub fn make_environment() -> Arc<dyn Environment> {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        Arc::new(BrowserEnvironment::new())
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        Arc::new(api::MemoryEnvironment::new())
    }
}

/// Fill in what the platform needs before the config is used. Browsers need an
/// absolute base URL for `fetch`, so an empty one becomes the page origin.
pub fn prepare_config(mut config: ClientConfig) -> ClientConfig {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        if config.api.base_url.is_empty() {
            if let Some(origin) = BrowserEnvironment::origin() {
                config.api.base_url = origin;
            }
        }
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();
    }
    config
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_native_environment_starts_clean() {
        let env = make_environment();
        assert_eq!(env.query_param("demo"), None);
        assert_eq!(env.stored_flag("bruceops-demo-mode"), None);
    }

    #[test]
    fn test_prepare_config_trims_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "http://localhost:5000/".to_string();

        let config = prepare_config(config);

        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert_eq!(config.api.url("/api/me"), "http://localhost:5000/api/me");
    }
}
