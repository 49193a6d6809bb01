//! Model/view coordinator.
//!
//! # Responsibility
//! - Own the model registry, the view registry and the model⇄view key map.
//! - Validate cross references before touching the key map.
//!
//! # Invariants
//! - `map(m, v)` only succeeds when both keys are registered, and a failed call
//!   leaves the key map untouched.
//! - The key map is one-to-one: re-mapping a key drops the stale reverse entry.
//! - Unregistering through the coordinator drops every mapping that names the
//!   removed key.
//! - Mapping publishes no event; only registry mutations do.

use crate::dispatch::{EventDispatcher, FaultPolicy};
use crate::registry::{
    ManagedRegistry, ManagementEvent, RegistryError, RegistryKind, RegistryResult,
};
use log::debug;
use std::collections::BTreeMap;

/// Controller owning both registries and the key map between them.
#[derive(Debug)]
pub struct Coordinator<M: Clone, V: Clone> {
    models: ManagedRegistry<M>,
    views: ManagedRegistry<V>,
    /// view key -> model key
    model_of: BTreeMap<String, String>,
    /// model key -> view key
    view_of: BTreeMap<String, String>,
}

impl<M: Clone, V: Clone> Default for Coordinator<M, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone, V: Clone> Coordinator<M, V> {
    pub fn new() -> Self {
        Self::with_registries(ManagedRegistry::models(), ManagedRegistry::views())
    }

    /// Builds a coordinator whose registries use `policy` for listener faults.
    pub fn with_policy(policy: FaultPolicy) -> Self {
        Self::with_registries(
            ManagedRegistry::with_policy(RegistryKind::Models, policy),
            ManagedRegistry::with_policy(RegistryKind::Views, policy),
        )
    }

    pub fn with_registries(models: ManagedRegistry<M>, views: ManagedRegistry<V>) -> Self {
        Self {
            models,
            views,
            model_of: BTreeMap::new(),
            view_of: BTreeMap::new(),
        }
    }

    pub fn register_model(&mut self, key: &str, model: M) -> RegistryResult<()> {
        self.models.register(key, model)
    }

    pub fn register_view(&mut self, key: &str, view: V) -> RegistryResult<()> {
        self.views.register(key, view)
    }

    /// Unregisters a model and drops its mapping, if any.
    pub fn unregister_model(&mut self, key: &str) -> RegistryResult<Option<M>> {
        if let Some(view_key) = self.view_of.remove(key) {
            self.model_of.remove(&view_key);
        }
        self.models.unregister(key)
    }

    /// Unregisters a view and drops its mapping, if any.
    pub fn unregister_view(&mut self, key: &str) -> RegistryResult<Option<V>> {
        if let Some(model_key) = self.model_of.remove(key) {
            self.view_of.remove(&model_key);
        }
        self.views.unregister(key)
    }

    pub fn get_model(&self, key: &str) -> Option<&M> {
        self.models.get(key)
    }

    pub fn get_view(&self, key: &str) -> Option<&V> {
        self.views.get(key)
    }

    /// Maps `model_key` and `view_key` to each other.
    ///
    /// # Errors
    /// - `NotRegistered` when either key is absent from its registry. The view
    ///   key is checked first.
    pub fn map(&mut self, model_key: &str, view_key: &str) -> RegistryResult<()> {
        if !self.views.is_registered(view_key) {
            return Err(RegistryError::NotRegistered {
                kind: RegistryKind::Views,
                key: view_key.to_string(),
            });
        }
        if !self.models.is_registered(model_key) {
            return Err(RegistryError::NotRegistered {
                kind: RegistryKind::Models,
                key: model_key.to_string(),
            });
        }

        if let Some(previous_view) = self
            .view_of
            .insert(model_key.to_string(), view_key.to_string())
        {
            if previous_view != view_key {
                self.model_of.remove(&previous_view);
            }
        }
        if let Some(previous_model) = self
            .model_of
            .insert(view_key.to_string(), model_key.to_string())
        {
            if previous_model != model_key {
                self.view_of.remove(&previous_model);
            }
        }

        debug!(
            "event=coordinator_map module=coordinator model={} view={} status=ok",
            model_key, view_key
        );
        Ok(())
    }

    /// Returns the model mapped to `view_key`.
    ///
    /// # Errors
    /// - `NotRegistered` when `view_key` is not a registered view. A registered
    ///   but unmapped view yields `Ok(None)`.
    pub fn model_for(&self, view_key: &str) -> RegistryResult<Option<&M>> {
        if !self.views.is_registered(view_key) {
            return Err(RegistryError::NotRegistered {
                kind: RegistryKind::Views,
                key: view_key.to_string(),
            });
        }
        Ok(self
            .model_of
            .get(view_key)
            .and_then(|model_key| self.models.get(model_key)))
    }

    /// Returns the view mapped to `model_key`.
    ///
    /// # Errors
    /// - `NotRegistered` when `model_key` is not a registered model. A
    ///   registered but unmapped model yields `Ok(None)`.
    pub fn view_for(&self, model_key: &str) -> RegistryResult<Option<&V>> {
        if !self.models.is_registered(model_key) {
            return Err(RegistryError::NotRegistered {
                kind: RegistryKind::Models,
                key: model_key.to_string(),
            });
        }
        Ok(self
            .view_of
            .get(model_key)
            .and_then(|view_key| self.views.get(view_key)))
    }

    pub fn mapped_model_key(&self, view_key: &str) -> Option<&str> {
        self.model_of.get(view_key).map(String::as_str)
    }

    pub fn mapped_view_key(&self, model_key: &str) -> Option<&str> {
        self.view_of.get(model_key).map(String::as_str)
    }

    /// Focuses a registered view. See [`ManagedRegistry::set_focus`].
    pub fn focus_view(&mut self, key: &str) -> RegistryResult<bool> {
        self.views.set_focus(key)
    }

    pub fn focused_view(&self) -> Option<&str> {
        self.views.focused()
    }

    pub fn set_auto_unregister(&mut self, models: bool, views: bool) {
        self.models.set_auto_unregister(models);
        self.views.set_auto_unregister(views);
    }

    /// Read access to the model registry. Mutations go through the coordinator
    /// so the key map stays consistent.
    pub fn models(&self) -> &ManagedRegistry<M> {
        &self.models
    }

    pub fn views(&self) -> &ManagedRegistry<V> {
        &self.views
    }

    pub fn model_events_mut(&mut self) -> &mut EventDispatcher<ManagementEvent<M>> {
        self.models.events_mut()
    }

    pub fn view_events_mut(&mut self) -> &mut EventDispatcher<ManagementEvent<V>> {
        self.views.events_mut()
    }
}
