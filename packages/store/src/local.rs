//! # Browser `localStorage` store
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] implementation used on the **web
//! platform**. It maps directly onto `window.localStorage` via `web-sys`, which is where
//! the demo-mode flag lives between navigations.
//!
//! ## Namespacing
//!
//! An optional prefix is prepended to every key (`"<prefix>:<key>"`), so several
//! deployments served from the same origin do not read each other's flags.
//!
//! ## Error handling
//!
//! All trait methods silently swallow errors (returning `None` for reads, doing nothing
//! for writes). Storage can be disabled (private browsing, quota exceeded, sandboxed
//! iframes); in that case the store behaves as empty and demo mode simply does not
//! stick across navigations.

use crate::kv::KeyValueStore;

/// `window.localStorage`-backed KeyValueStore for the web platform.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore {
    prefix: Option<String>,
}

impl LocalStorageStore {
    /// Create a store over unprefixed keys.
    pub fn new() -> Self {
        Self::with_prefix(None)
    }

    /// Create a store whose keys are scoped by `prefix`.
    ///
    /// - `Some("bruceops")` → key `"demo"` is stored as `"bruceops:demo"`
    /// - `None` → keys are stored as-is
    pub fn with_prefix(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
        }
    }

    fn scoped(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(&self.scoped(key)).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(&self.scoped(key), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.scoped(key));
        }
    }
}
