//! Plain keyed storage with collision policy.

use super::{is_valid_key, RegistryError, RegistryKind, RegistryResult};
use std::collections::BTreeMap;

/// Result of checking whether a key may take a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Key is unused.
    Vacant,
    /// Key is used and `auto_unregister` allows evicting the current value.
    Evict,
}

/// String-keyed object store.
///
/// Holds no listeners; [`super::ManagedRegistry`] layers events on top.
#[derive(Debug, Clone)]
pub struct KeyedRegistry<T> {
    kind: RegistryKind,
    entries: BTreeMap<String, T>,
    auto_unregister: bool,
}

impl<T> KeyedRegistry<T> {
    /// Creates an empty registry with `auto_unregister` disabled.
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
            auto_unregister: false,
        }
    }

    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    pub fn is_auto_unregister(&self) -> bool {
        self.auto_unregister
    }

    pub fn set_auto_unregister(&mut self, enabled: bool) {
        self.auto_unregister = enabled;
    }

    /// Checks whether `key` may be registered, without mutating anything.
    ///
    /// # Errors
    /// - `InvalidKey` when `key` is blank.
    /// - `KeyInUse` when `key` is taken and `auto_unregister` is disabled.
    pub fn admit(&self, key: &str) -> RegistryResult<Admission> {
        if !is_valid_key(key) {
            return Err(RegistryError::InvalidKey(self.kind));
        }
        if !self.entries.contains_key(key) {
            return Ok(Admission::Vacant);
        }
        if self.auto_unregister {
            Ok(Admission::Evict)
        } else {
            Err(RegistryError::KeyInUse {
                kind: self.kind,
                key: key.to_string(),
            })
        }
    }

    /// Registers `value` under `key`, applying the collision policy.
    ///
    /// Returns the evicted value when `auto_unregister` replaced an entry.
    pub fn register(&mut self, key: &str, value: T) -> RegistryResult<Option<T>> {
        let evicted = match self.admit(key)? {
            Admission::Vacant => None,
            Admission::Evict => self.entries.remove(key),
        };
        self.entries.insert(key.to_string(), value);
        Ok(evicted)
    }

    /// Removes `key`; `None` when it was not registered.
    pub fn unregister(&mut self, key: &str) -> Option<T> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns registered keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
