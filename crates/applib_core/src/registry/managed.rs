//! Keyed registry that publishes management events.
//!
//! # Invariants
//! - `register` either commits and publishes `Registered`, or changes nothing.
//! - An auto-unregister swap is committed before anything is published;
//!   `Unregistered(old)` then goes out before `Registered(new)`.
//! - Focus always names a registered key or nothing.

use super::event::{Action, ManagementEvent};
use super::keyed::KeyedRegistry;
use super::{RegistryError, RegistryKind, RegistryResult};
use crate::dispatch::{EventDispatcher, FaultPolicy};
use log::debug;

/// Registry + dispatcher pair. Instantiated once for models, once for views.
#[derive(Debug)]
pub struct ManagedRegistry<T: Clone> {
    store: KeyedRegistry<T>,
    events: EventDispatcher<ManagementEvent<T>>,
    focus: Option<String>,
}

impl<T: Clone> ManagedRegistry<T> {
    pub fn new(kind: RegistryKind) -> Self {
        Self::with_policy(kind, FaultPolicy::default())
    }

    pub fn with_policy(kind: RegistryKind, policy: FaultPolicy) -> Self {
        Self {
            store: KeyedRegistry::new(kind),
            events: EventDispatcher::with_policy(kind.as_str(), policy),
            focus: None,
        }
    }

    /// Model registry; focus tracking disabled.
    pub fn models() -> Self {
        Self::new(RegistryKind::Models)
    }

    /// View registry; focus tracking enabled.
    pub fn views() -> Self {
        Self::new(RegistryKind::Views)
    }

    pub fn kind(&self) -> RegistryKind {
        self.store.kind()
    }

    pub fn is_auto_unregister(&self) -> bool {
        self.store.is_auto_unregister()
    }

    pub fn set_auto_unregister(&mut self, enabled: bool) {
        self.store.set_auto_unregister(enabled);
    }

    /// Registers `value` under `key` and publishes `Registered`.
    ///
    /// With auto-unregister on, a taken key is swapped in one step and then
    /// `Unregistered(old)` and `Registered(new)` are published in that order.
    ///
    /// # Errors
    /// - `KeyInUse` when the key is taken and auto-unregister is off; nothing
    ///   changes and nothing is published.
    /// - `InvalidKey` for blank keys.
    /// - `Dispatch` when a listener fails; the registration stays committed
    ///   and the first fault is returned.
    pub fn register(&mut self, key: &str, value: T) -> RegistryResult<()> {
        let evicted = match self.store.register(key, value.clone()) {
            Ok(evicted) => evicted,
            Err(err) => {
                debug!(
                    "event=registry_register module=registry kind={} key={} status=skip reason={}",
                    self.kind(),
                    key,
                    err
                );
                return Err(err);
            }
        };
        debug!(
            "event=registry_register module=registry kind={} key={} status=ok swapped={}",
            self.kind(),
            key,
            evicted.is_some()
        );

        let Some(old) = evicted else {
            return self.publish(key, value, Action::Registered);
        };
        if self.focus.as_deref() == Some(key) {
            self.focus = None;
        }
        let unregistered = self.publish(key, old, Action::Unregistered);
        let registered = self.publish(key, value, Action::Registered);
        unregistered.and(registered)
    }

    /// Removes `key` and publishes `Unregistered`. No-op for unknown keys.
    pub fn unregister(&mut self, key: &str) -> RegistryResult<Option<T>> {
        let Some(value) = self.store.unregister(key) else {
            return Ok(None);
        };
        if self.focus.as_deref() == Some(key) {
            self.focus = None;
        }
        debug!(
            "event=registry_unregister module=registry kind={} key={} status=ok",
            self.kind(),
            key
        );
        self.publish(key, value.clone(), Action::Unregistered)?;
        Ok(Some(value))
    }

    /// Moves focus to `key` and publishes `Focused`.
    ///
    /// Returns `Ok(false)` without publishing when `key` is blank or not
    /// registered. Focus is bookkeeping only; nothing else depends on it.
    pub fn set_focus(&mut self, key: &str) -> RegistryResult<bool> {
        if self.kind() != RegistryKind::Views {
            return Err(RegistryError::FocusUnsupported(self.kind()));
        }
        let Some(value) = self.store.get(key).cloned() else {
            debug!(
                "event=registry_focus module=registry kind={} key={} status=skip",
                self.kind(),
                key
            );
            return Ok(false);
        };

        self.focus = Some(key.to_string());
        self.publish(key, value, Action::Focused)?;
        Ok(true)
    }

    /// Clears the focus slot without publishing.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn focused_value(&self) -> Option<&T> {
        self.focus.as_deref().and_then(|key| self.store.get(key))
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.store.get(key)
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.store.is_registered(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn events(&self) -> &EventDispatcher<ManagementEvent<T>> {
        &self.events
    }

    /// Dispatcher used to subscribe to this registry's events.
    pub fn events_mut(&mut self) -> &mut EventDispatcher<ManagementEvent<T>> {
        &mut self.events
    }

    fn publish(&self, key: &str, value: T, action: Action) -> RegistryResult<()> {
        let event = ManagementEvent::new(self.kind(), key, value, action);
        self.events.publish(&event)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ManagedRegistry;
    use crate::dispatch::ListenerError;
    use crate::registry::{Action, RegistryError, RegistryKind};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<(Action, String, i32)>>>;

    fn record_all(registry: &mut ManagedRegistry<i32>) -> Seen {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        registry.events_mut().subscribe_all(move |event| {
            log.lock()
                .expect("recorder lock")
                .push((event.action, event.key.clone(), event.value));
            Ok(())
        });
        seen
    }

    #[test]
    fn unregister_clears_focus_without_extra_event() {
        let mut views = ManagedRegistry::views();
        views.register("a", 1).expect("register");
        assert!(views.set_focus("a").expect("focus"));
        let seen = record_all(&mut views);

        views.unregister("a").expect("unregister");
        assert_eq!(views.focused(), None);
        assert_eq!(
            *seen.lock().expect("recorder lock"),
            vec![(Action::Unregistered, "a".to_string(), 1)]
        );
    }

    #[test]
    fn set_focus_on_unknown_or_blank_key_is_noop() {
        let mut views = ManagedRegistry::<i32>::views();
        let seen = record_all(&mut views);
        assert!(!views.set_focus("missing").expect("focus"));
        assert!(!views.set_focus("").expect("focus"));
        assert!(seen.lock().expect("recorder lock").is_empty());
    }

    #[test]
    fn model_registry_rejects_focus() {
        let mut models = ManagedRegistry::models();
        models.register("a", 1).expect("register");
        let err = models.set_focus("a").expect_err("models have no focus");
        assert_eq!(err, RegistryError::FocusUnsupported(RegistryKind::Models));
    }

    #[test]
    fn listener_fault_keeps_registration_committed() {
        let mut models = ManagedRegistry::models();
        models
            .events_mut()
            .subscribe(Action::Registered, |_| Err(ListenerError::new("refresh failed")));

        let err = models.register("a", 1).expect_err("fault should surface");
        assert!(matches!(err, RegistryError::Dispatch(_)));
        assert_eq!(models.get("a"), Some(&1));
    }

    #[test]
    fn swap_commits_before_a_failing_unregistered_listener() {
        let mut views = ManagedRegistry::<i32>::views();
        views.set_auto_unregister(true);
        views.register("a", 1).expect("register");
        views.set_focus("a").expect("focus");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        views.events_mut().subscribe(Action::Unregistered, move |event| {
            log.lock().expect("recorder lock").push(event.value);
            Err(ListenerError::new("refresh failed"))
        });

        let err = views.register("a", 2).expect_err("fault should surface");
        assert!(matches!(err, RegistryError::Dispatch(_)));
        assert_eq!(views.get("a"), Some(&2));
        assert_eq!(views.focused(), None);
        assert_eq!(*seen.lock().expect("recorder lock"), vec![1]);
    }

    #[test]
    fn focused_value_follows_focus_slot() {
        let mut views = ManagedRegistry::views();
        views.register("a", 1).expect("register a");
        views.register("b", 2).expect("register b");
        views.set_focus("b").expect("focus b");
        assert_eq!(views.focused_value(), Some(&2));
        views.clear_focus();
        assert_eq!(views.focused_value(), None);
    }
}
