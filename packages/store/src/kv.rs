//! # Key-value storage: the client's persisted flags
//!
//! [`KeyValueStore`] is the narrow storage interface the session layer needs: string
//! values under string keys, read and written synchronously. It mirrors the browser's
//! `localStorage` shape so the web implementation ([`crate::LocalStorageStore`]) is a
//! direct mapping, while tests and native builds use [`crate::MemoryStore`].
//!
//! Implementations never fail loudly. A backend that cannot be reached behaves like an
//! empty store: reads return `None` and writes are dropped.

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}
