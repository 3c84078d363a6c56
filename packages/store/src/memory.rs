use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::kv::KeyValueStore;

/// In-memory KeyValueStore for testing and native builds.
///
/// Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();

        // Initially empty
        assert!(store.is_empty());
        assert!(store.get("bruceops-demo-mode").is_none());

        store.set("bruceops-demo-mode", "true");

        assert_eq!(store.get("bruceops-demo-mode").as_deref(), Some("true"));
        assert!(store.contains("bruceops-demo-mode"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();

        store.set("theme", "light");
        store.set("theme", "dark");

        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();

        store.set("first", "1");
        store.set("second", "2");
        store.remove("first");

        assert!(!store.contains("first"));
        assert_eq!(store.get("second").as_deref(), Some("2"));

        // Removing a missing key is fine
        store.remove("missing");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        other.set("shared", "yes");

        assert_eq!(store.get("shared").as_deref(), Some("yes"));
    }

    #[test]
    fn test_arc_store() {
        let store = Arc::new(MemoryStore::new());

        KeyValueStore::set(&store, "flag", "on");

        assert_eq!(KeyValueStore::get(&store, "flag").as_deref(), Some("on"));
    }
}
