//! Two-tier listener dispatch shared by registry, lifecycle and property
//! notifications.
//!
//! # Responsibility
//! - Keep listeners subscribed to one topic and listeners subscribed to all
//!   topics for a single event type.
//! - Deliver one published event synchronously to both tiers.
//!
//! # Invariants
//! - Topic-scoped listeners are delivered before all-topic listeners; each tier
//!   is delivered in subscription order.
//! - Removing an unknown subscription is a no-op.
//! - Dispatchers are owned by the object that publishes through them; there is
//!   no process-wide listener state.

mod dispatcher;

pub use dispatcher::{
    DispatchError, EventDispatcher, FaultPolicy, ListenerError, ListenerResult, SubscriptionId,
    TopicEvent,
};
