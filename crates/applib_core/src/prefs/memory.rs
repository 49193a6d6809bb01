//! In-memory preference store.

use super::{validate_name, Preferences, PrefsResult};
use std::collections::BTreeMap;

/// Non-persistent store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    node: String,
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            values: BTreeMap::new(),
        }
    }
}

impl Preferences for MemoryPreferences {
    fn node(&self) -> &str {
        self.node.as_str()
    }

    fn get_text(&self, name: &str) -> PrefsResult<Option<String>> {
        validate_name(name)?;
        Ok(self.values.get(name).cloned())
    }

    fn put_text(&mut self, name: &str, value: &str) -> PrefsResult<()> {
        validate_name(name)?;
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> PrefsResult<bool> {
        validate_name(name)?;
        Ok(self.values.remove(name).is_some())
    }

    fn names(&self) -> PrefsResult<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}
