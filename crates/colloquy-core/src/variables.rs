//! Immutable variable store threaded through a dialogue session.
//!
//! Every mutation produces a new store; the previous one is left untouched.
//! This keeps a session's transitions deterministic and lets a failed update
//! be discarded without any cleanup.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::value::Value;

/// A transformation from one store to the next.
///
/// Implementations must be total, deterministic, and free of side effects.
/// Failure is reported as a [`ContentError`]; the caller keeps the old store.
pub trait StoreUpdate {
    /// Produces the successor of `store`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` if the update cannot be applied to `store`.
    fn apply(&self, store: &VariableStore) -> Result<VariableStore, ContentError>;
}

/// Mapping from variable names to scalar values.
///
/// Cloning is cheap: the map is shared until a new store is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableStore {
    vars: Arc<BTreeMap<String, Value>>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a variable. Missing keys resolve to `None`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Returns `true` if `key` has a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of variables held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterates variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new store with `key` set to `value`.
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_patch([(key.into(), value.into())])
    }

    /// Returns a new store with every entry of `patch` applied in order.
    #[must_use]
    pub fn with_patch<I, K>(&self, patch: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut vars = (*self.vars).clone();
        for (key, value) in patch {
            vars.insert(key.into(), value);
        }
        Self {
            vars: Arc::new(vars),
        }
    }

    /// Returns a new store without `key`.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        if !self.contains(key) {
            return self.clone();
        }
        let mut vars = (*self.vars).clone();
        vars.remove(key);
        Self {
            vars: Arc::new(vars),
        }
    }

    /// Derives a new store through `update`.
    ///
    /// # Errors
    ///
    /// Propagates the `ContentError` raised by `update`; `self` is unchanged.
    pub fn with_update<U>(&self, update: &U) -> Result<Self, ContentError>
    where
        U: StoreUpdate + ?Sized,
    {
        update.apply(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for VariableStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: Arc::new(
                iter.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reject;

    impl StoreUpdate for Reject {
        fn apply(&self, _store: &VariableStore) -> Result<VariableStore, ContentError> {
            Err(ContentError::Rejected("not today".to_owned()))
        }
    }

    #[test]
    fn test_with_leaves_original_store_untouched() {
        // Arrange
        let before = VariableStore::from_iter([("gold", 10)]);

        // Act
        let after = before.with("gold", 25);

        // Assert
        assert_eq!(before.get("gold"), Some(&Value::Int(10)));
        assert_eq!(after.get("gold"), Some(&Value::Int(25)));
    }

    #[test]
    fn test_missing_key_resolves_to_none() {
        let store = VariableStore::new();
        assert_eq!(store.get("anything"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_without_removes_only_the_named_key() {
        // Arrange
        let store = VariableStore::from_iter([("a", 1), ("b", 2)]);

        // Act
        let trimmed = store.without("a");

        // Assert
        assert!(!trimmed.contains("a"));
        assert_eq!(trimmed.get("b"), Some(&Value::Int(2)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_update_keeps_previous_store() {
        // Arrange
        let store = VariableStore::from_iter([("met_mira", true)]);

        // Act
        let result = store.with_update(&Reject);

        // Assert
        assert!(matches!(result, Err(ContentError::Rejected(_))));
        assert_eq!(store.get("met_mira"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        // Arrange
        let store = VariableStore::new().with("name", "Ayla").with("gold", 3);

        // Act
        let json = serde_json::to_value(&store).unwrap();

        // Assert
        assert_eq!(json, serde_json::json!({ "gold": 3, "name": "Ayla" }));
    }
}
