//! Thread-safe state bag with typed accessors.

use parking_lot::RwLock;
use std::collections::HashMap;

/// A thread-safe bag for sharing state between agents.
///
/// Keys are not namespaced and writes overwrite: last writer wins. The
/// typed accessors return `None` for a missing key or a value of the
/// wrong type — they never panic, so agents can probe for upstream state
/// without preconditions.
#[derive(Debug, Default)]
pub struct StateBag {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl StateBag {
    /// Creates a new empty state bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a value from the bag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.read().get(key).cloned()
    }

    /// Gets a string value, or `None` if missing or not a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    /// Gets a boolean value, or `None` if missing or not a boolean.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.read().get(key).and_then(serde_json::Value::as_bool)
    }

    /// Gets an integer value, or `None` if missing or not an integer.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.read().get(key).and_then(serde_json::Value::as_i64)
    }

    /// Gets a float value, or `None` if missing or not a number.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.data.read().get(key).and_then(serde_json::Value::as_f64)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Sets a value in the bag, overwriting any previous value.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) {
        self.data.write().insert(key.into(), value);
    }

    /// Applies a batch of updates in one pass under the write lock.
    ///
    /// This is the single serialization point for concurrent writers:
    /// composites funnel every child's state updates through here.
    pub fn apply(&self, updates: &HashMap<String, serde_json::Value>) {
        let mut data = self.data.write();
        for (key, value) in updates {
            data.insert(key.clone(), value.clone());
        }
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        self.data.read().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}

impl Clone for StateBag {
    fn clone(&self) -> Self {
        Self {
            data: RwLock::new(self.data.read().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let bag = StateBag::new();
        bag.set("key", serde_json::json!("value"));

        assert_eq!(bag.get("key"), Some(serde_json::json!("value")));
        assert!(bag.contains_key("key"));
        assert!(!bag.contains_key("other"));
    }

    #[test]
    fn test_overwrite_last_writer_wins() {
        let bag = StateBag::new();
        bag.set("key", serde_json::json!(1));
        bag.set("key", serde_json::json!(2));

        assert_eq!(bag.get_i64("key"), Some(2));
    }

    #[test]
    fn test_typed_get_absent_key() {
        let bag = StateBag::new();
        assert_eq!(bag.get_str("missing"), None);
        assert_eq!(bag.get_bool("missing"), None);
        assert_eq!(bag.get_i64("missing"), None);
    }

    #[test]
    fn test_typed_get_wrong_type() {
        let bag = StateBag::new();
        bag.set("count", serde_json::json!(42));

        // Wrong requested type is absent, not an error.
        assert_eq!(bag.get_str("count"), None);
        assert_eq!(bag.get_bool("count"), None);
        assert_eq!(bag.get_i64("count"), Some(42));
    }

    #[test]
    fn test_apply_batch() {
        let bag = StateBag::new();
        bag.set("a", serde_json::json!("old"));

        let mut updates = HashMap::new();
        updates.insert("a".to_string(), serde_json::json!("new"));
        updates.insert("b".to_string(), serde_json::json!(true));
        bag.apply(&updates);

        assert_eq!(bag.get_str("a"), Some("new".to_string()));
        assert_eq!(bag.get_bool("b"), Some(true));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_to_dict() {
        let bag = StateBag::new();
        bag.set("a", serde_json::json!(1));
        bag.set("b", serde_json::json!(2));

        let dict = bag.to_dict();
        assert_eq!(dict.len(), 2);
    }
}
