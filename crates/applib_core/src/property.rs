//! Named attribute change notification.
//!
//! Listeners subscribe to one property name or to every property. A change
//! whose old and new values are both present and equal is not delivered.

use crate::application::ApplicationId;
use crate::dispatch::{
    DispatchError, EventDispatcher, FaultPolicy, ListenerResult, SubscriptionId, TopicEvent,
};
use log::debug;

/// Property name for the application title.
pub const PROPERTY_APPLICATION_TITLE: &str = "application.title";
/// Property name for the application icon resource.
pub const PROPERTY_APPLICATION_ICON: &str = "application.icon";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChangeEvent {
    pub source: ApplicationId,
    pub property: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl TopicEvent for PropertyChangeEvent {
    type Topic = String;

    fn topic(&self) -> &String {
        &self.property
    }
}

/// Broadcaster for [`PropertyChangeEvent`]s of one application.
#[derive(Debug)]
pub struct PropertyNotifier {
    source: ApplicationId,
    dispatcher: EventDispatcher<PropertyChangeEvent>,
}

impl PropertyNotifier {
    pub fn new(source: ApplicationId) -> Self {
        Self::with_policy(source, FaultPolicy::default())
    }

    pub fn with_policy(source: ApplicationId, policy: FaultPolicy) -> Self {
        Self {
            source,
            dispatcher: EventDispatcher::with_policy("properties", policy),
        }
    }

    pub fn subscribe_all<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&PropertyChangeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.dispatcher.subscribe_all(listener)
    }

    pub fn subscribe<F>(&mut self, property: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&PropertyChangeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(property.into(), listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Publishes a change of `property`.
    ///
    /// Returns `Ok(false)` when nothing was published because the value did
    /// not change.
    pub fn fire(
        &self,
        property: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Result<bool, DispatchError> {
        if old_value.is_some() && old_value == new_value {
            debug!(
                "event=property_change module=property name={} status=skip reason=unchanged",
                property
            );
            return Ok(false);
        }

        self.dispatcher.publish(&PropertyChangeEvent {
            source: self.source,
            property: property.to_string(),
            old_value: old_value.map(str::to_string),
            new_value: new_value.map(str::to_string),
        })?;
        Ok(true)
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.listener_count()
    }
}
