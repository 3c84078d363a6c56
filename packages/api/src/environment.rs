//! # Environment: the client's view of the page it runs in
//!
//! Session logic never touches `window`, `location`, or `localStorage` directly. It
//! goes through [`Environment`], which exposes the four capabilities it needs: reading
//! a query parameter, reading/writing a persisted flag, and navigating.
//!
//! | Implementation | Where |
//! |----------------|-------|
//! | [`MemoryEnvironment`] | Tests and native builds. Backed by [`store::MemoryStore`]; records every navigation. |
//! | `BrowserEnvironment` | The `ui` crate. Maps onto `window.location` and `localStorage`. |

use std::sync::Arc;

use parking_lot::Mutex;
use store::{KeyValueStore, MemoryStore};

/// Capabilities the session layer needs from its host.
pub trait Environment {
    /// Value of query parameter `name` in the current URL. A bare `?name` yields `""`.
    fn query_param(&self, name: &str) -> Option<String>;

    fn stored_flag(&self, key: &str) -> Option<String>;

    fn set_stored_flag(&self, key: &str, value: &str);

    fn remove_stored_flag(&self, key: &str);

    /// Leave the current page for `url`.
    fn navigate_to(&self, url: &str);
}

/// Extract query parameter `name` from a URL or path.
pub fn query_param_from_url(url: &str, name: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let (_, query) = without_fragment.split_once('?')?;
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).ok()?;
            if key != name {
                return None;
            }
            let value = value.replace('+', " ");
            Some(
                urlencoding::decode(&value)
                    .map(|v| v.into_owned())
                    .unwrap_or(value),
            )
        })
}

/// In-memory Environment for testing and native hosts.
///
/// Clones share the location, the flag store, and the navigation log.
#[derive(Clone, Debug)]
pub struct MemoryEnvironment {
    location: Arc<Mutex<String>>,
    navigations: Arc<Mutex<Vec<String>>>,
    store: MemoryStore,
}

impl Default for MemoryEnvironment {
    fn default() -> Self {
        Self::at("/")
    }
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at the given URL, e.g. `"/dashboard?demo=true"`.
    pub fn at(url: &str) -> Self {
        Self {
            location: Arc::new(Mutex::new(url.to_string())),
            navigations: Arc::default(),
            store: MemoryStore::new(),
        }
    }

    /// Current location.
    pub fn location(&self) -> String {
        self.location.lock().clone()
    }

    /// Change the URL without recording a navigation, like `history.replaceState`.
    pub fn set_location(&self, url: &str) {
        *self.location.lock() = url.to_string();
    }

    /// Every URL passed to [`Environment::navigate_to`], oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    /// The flag store backing this environment.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl Environment for MemoryEnvironment {
    fn query_param(&self, name: &str) -> Option<String> {
        query_param_from_url(&self.location.lock(), name)
    }

    fn stored_flag(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    fn set_stored_flag(&self, key: &str, value: &str) {
        self.store.set(key, value);
    }

    fn remove_stored_flag(&self, key: &str) {
        self.store.remove(key);
    }

    fn navigate_to(&self, url: &str) {
        self.navigations.lock().push(url.to_string());
        *self.location.lock() = url.to_string();
    }
}
