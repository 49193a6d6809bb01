//! Generic event dispatcher with topic-scoped and all-topic listeners.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Event shape accepted by [`EventDispatcher`].
///
/// The topic is the discriminator used for scoped subscriptions (a registry
/// action, a lifecycle phase, a property name).
pub trait TopicEvent {
    type Topic: Ord + Clone + Debug;

    fn topic(&self) -> &Self::Topic;
}

/// Result returned by every listener callback.
pub type ListenerResult = Result<(), ListenerError>;

type Listener<E> = Arc<dyn Fn(&E) -> ListenerResult + Send + Sync>;

/// Failure reported by a listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl Display for ListenerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ListenerError {}

/// Opaque handle returned by `subscribe*`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// How a dispatcher reacts when a listener returns an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Stop delivery at the first failing listener and return the fault.
    #[default]
    Propagate,
    /// Log the fault, keep delivering, and report success.
    Isolate,
}

/// Publish-time errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    ListenerFault {
        dispatcher: &'static str,
        subscription: SubscriptionId,
        error: ListenerError,
    },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListenerFault {
                dispatcher,
                subscription,
                error,
            } => write!(
                f,
                "listener {subscription} on `{dispatcher}` failed: {error}"
            ),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ListenerFault { error, .. } => Some(error),
        }
    }
}

struct Subscriber<E> {
    id: SubscriptionId,
    listener: Listener<E>,
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
        }
    }
}

/// Two-tier listener store for one event type.
pub struct EventDispatcher<E: TopicEvent> {
    name: &'static str,
    policy: FaultPolicy,
    next_id: u64,
    all: Vec<Subscriber<E>>,
    scoped: BTreeMap<E::Topic, Vec<Subscriber<E>>>,
}

impl<E: TopicEvent> EventDispatcher<E> {
    /// Creates an empty dispatcher. `name` labels log records and faults.
    pub fn new(name: &'static str) -> Self {
        Self::with_policy(name, FaultPolicy::default())
    }

    pub fn with_policy(name: &'static str, policy: FaultPolicy) -> Self {
        Self {
            name,
            policy,
            next_id: 0,
            all: Vec::new(),
            scoped: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.policy
    }

    pub fn set_fault_policy(&mut self, policy: FaultPolicy) {
        self.policy = policy;
    }

    /// Subscribes `listener` to every published event.
    pub fn subscribe_all<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) -> ListenerResult + Send + Sync + 'static,
    {
        let subscriber = self.make_subscriber(listener);
        let id = subscriber.id;
        self.all.push(subscriber);
        debug!(
            "event=listener_subscribe module=dispatch dispatcher={} scope=all subscription={}",
            self.name, id
        );
        id
    }

    /// Subscribes `listener` to events whose topic equals `topic`.
    pub fn subscribe<F>(&mut self, topic: E::Topic, listener: F) -> SubscriptionId
    where
        F: Fn(&E) -> ListenerResult + Send + Sync + 'static,
    {
        let subscriber = self.make_subscriber(listener);
        let id = subscriber.id;
        debug!(
            "event=listener_subscribe module=dispatch dispatcher={} scope={:?} subscription={}",
            self.name, topic, id
        );
        self.scoped.entry(topic).or_default().push(subscriber);
        id
    }

    /// Removes one subscription from whichever tier holds it.
    ///
    /// Returns `false` when the subscription is unknown (already removed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        if let Some(index) = self.all.iter().position(|s| s.id == id) {
            self.all.remove(index);
            debug!(
                "event=listener_unsubscribe module=dispatch dispatcher={} scope=all subscription={}",
                self.name, id
            );
            return true;
        }

        let mut emptied = None;
        let mut removed = false;
        for (topic, subscribers) in self.scoped.iter_mut() {
            if let Some(index) = subscribers.iter().position(|s| s.id == id) {
                subscribers.remove(index);
                removed = true;
                if subscribers.is_empty() {
                    emptied = Some(topic.clone());
                }
                break;
            }
        }
        if let Some(topic) = emptied {
            self.scoped.remove(&topic);
        }

        if removed {
            debug!(
                "event=listener_unsubscribe module=dispatch dispatcher={} scope=topic subscription={}",
                self.name, id
            );
        }
        removed
    }

    /// Delivers `event` to topic listeners, then to all-topic listeners.
    ///
    /// Returns the number of listeners that completed without error. Under
    /// [`FaultPolicy::Propagate`] the first listener error stops delivery and
    /// is returned; under [`FaultPolicy::Isolate`] it is logged and skipped.
    pub fn publish(&self, event: &E) -> Result<usize, DispatchError> {
        let targets = self.snapshot(event.topic());
        let mut delivered = 0;

        for subscriber in targets {
            match (subscriber.listener)(event) {
                Ok(()) => delivered += 1,
                Err(error) => match self.policy {
                    FaultPolicy::Propagate => {
                        warn!(
                            "event=listener_fault module=dispatch dispatcher={} topic={:?} subscription={} policy=propagate error={}",
                            self.name,
                            event.topic(),
                            subscriber.id,
                            error
                        );
                        return Err(DispatchError::ListenerFault {
                            dispatcher: self.name,
                            subscription: subscriber.id,
                            error,
                        });
                    }
                    FaultPolicy::Isolate => {
                        warn!(
                            "event=listener_fault module=dispatch dispatcher={} topic={:?} subscription={} policy=isolate error={}",
                            self.name,
                            event.topic(),
                            subscriber.id,
                            error
                        );
                    }
                },
            }
        }

        Ok(delivered)
    }

    /// Total number of live subscriptions across both tiers.
    pub fn listener_count(&self) -> usize {
        self.all.len() + self.scoped.values().map(Vec::len).sum::<usize>()
    }

    pub fn topic_listener_count(&self, topic: &E::Topic) -> usize {
        self.scoped.get(topic).map_or(0, Vec::len)
    }

    pub fn all_listener_count(&self) -> usize {
        self.all.len()
    }

    /// Drops every subscription. Subscription ids are never reused.
    pub fn clear(&mut self) {
        self.all.clear();
        self.scoped.clear();
    }

    fn make_subscriber<F>(&mut self, listener: F) -> Subscriber<E>
    where
        F: Fn(&E) -> ListenerResult + Send + Sync + 'static,
    {
        self.next_id += 1;
        Subscriber {
            id: SubscriptionId(self.next_id),
            listener: Arc::new(listener),
        }
    }

    // Delivery runs over a copy so the listener lists are never borrowed while
    // callbacks execute.
    fn snapshot(&self, topic: &E::Topic) -> Vec<Subscriber<E>> {
        let scoped = self.scoped.get(topic).map_or(&[][..], Vec::as_slice);
        scoped.iter().chain(self.all.iter()).cloned().collect()
    }
}

impl<E: TopicEvent> Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("all", &self.all.len())
            .field("scoped_topics", &self.scoped.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DispatchError, EventDispatcher, FaultPolicy, ListenerError, SubscriptionId, TopicEvent,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Ping {
        topic: String,
    }

    impl Ping {
        fn new(topic: &str) -> Self {
            Self {
                topic: topic.to_string(),
            }
        }
    }

    impl TopicEvent for Ping {
        type Topic = String;

        fn topic(&self) -> &String {
            &self.topic
        }
    }

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn delivers_topic_listeners_before_all_listeners() {
        let seen = recorder();
        let mut dispatcher = EventDispatcher::<Ping>::new("test");

        let log = Arc::clone(&seen);
        dispatcher.subscribe_all(move |_| {
            log.lock().expect("recorder lock").push("all-1".to_string());
            Ok(())
        });
        let log = Arc::clone(&seen);
        dispatcher.subscribe("x".to_string(), move |_| {
            log.lock().expect("recorder lock").push("x-1".to_string());
            Ok(())
        });
        let log = Arc::clone(&seen);
        dispatcher.subscribe_all(move |_| {
            log.lock().expect("recorder lock").push("all-2".to_string());
            Ok(())
        });
        let log = Arc::clone(&seen);
        dispatcher.subscribe("x".to_string(), move |_| {
            log.lock().expect("recorder lock").push("x-2".to_string());
            Ok(())
        });

        let delivered = dispatcher.publish(&Ping::new("x")).expect("publish");
        assert_eq!(delivered, 4);
        assert_eq!(
            *seen.lock().expect("recorder lock"),
            vec!["x-1", "x-2", "all-1", "all-2"]
        );
    }

    #[test]
    fn other_topics_reach_only_all_listeners() {
        let seen = recorder();
        let mut dispatcher = EventDispatcher::<Ping>::new("test");
        let log = Arc::clone(&seen);
        dispatcher.subscribe("x".to_string(), move |_| {
            log.lock().expect("recorder lock").push("x".to_string());
            Ok(())
        });
        let log = Arc::clone(&seen);
        dispatcher.subscribe_all(move |event| {
            log.lock().expect("recorder lock").push(event.topic.clone());
            Ok(())
        });

        dispatcher.publish(&Ping::new("y")).expect("publish");
        assert_eq!(*seen.lock().expect("recorder lock"), vec!["y"]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_prunes_empty_topics() {
        let mut dispatcher = EventDispatcher::<Ping>::new("test");
        let id = dispatcher.subscribe("x".to_string(), |_| Ok(()));
        assert_eq!(dispatcher.topic_listener_count(&"x".to_string()), 1);

        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        assert_eq!(dispatcher.listener_count(), 0);
        assert!(dispatcher.scoped.is_empty());
    }

    #[test]
    fn subscription_ids_are_not_reused_after_clear() {
        let mut dispatcher = EventDispatcher::<Ping>::new("test");
        let first = dispatcher.subscribe_all(|_| Ok(()));
        dispatcher.clear();
        let second = dispatcher.subscribe_all(|_| Ok(()));
        assert_ne!(first, second);
        assert!(second.get() > first.get());
        assert!(!dispatcher.unsubscribe(SubscriptionId(first.get())));
    }

    #[test]
    fn propagate_policy_stops_at_first_fault() {
        let seen = recorder();
        let mut dispatcher = EventDispatcher::<Ping>::new("test");
        let failing = dispatcher.subscribe("x".to_string(), |_| Err(ListenerError::new("boom")));
        let log = Arc::clone(&seen);
        dispatcher.subscribe_all(move |_| {
            log.lock().expect("recorder lock").push("all".to_string());
            Ok(())
        });

        let err = dispatcher
            .publish(&Ping::new("x"))
            .expect_err("fault should propagate");
        match err {
            DispatchError::ListenerFault {
                dispatcher,
                subscription,
                error,
            } => {
                assert_eq!(dispatcher, "test");
                assert_eq!(subscription, failing);
                assert_eq!(error.message(), "boom");
            }
        }
        assert!(seen.lock().expect("recorder lock").is_empty());
    }

    #[test]
    fn isolate_policy_keeps_delivering() {
        let seen = recorder();
        let mut dispatcher = EventDispatcher::<Ping>::with_policy("test", FaultPolicy::Isolate);
        dispatcher.subscribe("x".to_string(), |_| Err(ListenerError::new("boom")));
        let log = Arc::clone(&seen);
        dispatcher.subscribe_all(move |_| {
            log.lock().expect("recorder lock").push("all".to_string());
            Ok(())
        });

        let delivered = dispatcher
            .publish(&Ping::new("x"))
            .expect("isolated fault should not fail publish");
        assert_eq!(delivered, 1);
        assert_eq!(*seen.lock().expect("recorder lock"), vec!["all"]);
    }

    #[test]
    fn fault_policy_deserializes_from_snake_case() {
        let policy: FaultPolicy = serde_json::from_str("\"isolate\"").expect("policy parse");
        assert_eq!(policy, FaultPolicy::Isolate);
        assert_eq!(FaultPolicy::default(), FaultPolicy::Propagate);
    }
}
