//! Application lifecycle phases and their notifier.
//!
//! # Responsibility
//! - Broadcast lifecycle phase changes to phase-scoped and global listeners.
//! - Describe the legal phase sequence for callers that drive it.
//!
//! # Invariants
//! - The notifier never checks ordering; [`LifecycleState::can_enter`] is the
//!   contract callers (the application object) enforce.
//! - `Stopped` is terminal.

use crate::application::ApplicationId;
use crate::dispatch::{
    DispatchError, EventDispatcher, FaultPolicy, ListenerResult, SubscriptionId, TopicEvent,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle phase announced by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    Starting,
    Started,
    Stopping,
    Stopped,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "STARTING",
            Self::Started => "STARTED",
            Self::Stopping => "STOPPING",
            Self::Stopped => "STOPPED",
        }
    }
}

impl Display for Lifecycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an application currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unstarted,
    In(Lifecycle),
}

impl LifecycleState {
    /// Returns whether `next` directly follows this state.
    pub fn can_enter(self, next: Lifecycle) -> bool {
        matches!(
            (self, next),
            (Self::Unstarted, Lifecycle::Starting)
                | (Self::In(Lifecycle::Starting), Lifecycle::Started)
                | (Self::In(Lifecycle::Started), Lifecycle::Stopping)
                | (Self::In(Lifecycle::Stopping), Lifecycle::Stopped)
        )
    }

    pub fn phase(self) -> Option<Lifecycle> {
        match self {
            Self::Unstarted => None,
            Self::In(phase) => Some(phase),
        }
    }
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unstarted => write!(f, "UNSTARTED"),
            Self::In(phase) => write!(f, "{phase}"),
        }
    }
}

/// Illegal lifecycle transition requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    InvalidTransition {
        from: LifecycleState,
        to: Lifecycle,
    },
}

impl Display for LifecycleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "cannot move lifecycle from {from} to {to}")
            }
        }
    }
}

impl Error for LifecycleError {}

/// One lifecycle phase change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub source: ApplicationId,
    pub phase: Lifecycle,
}

impl TopicEvent for LifecycleEvent {
    type Topic = Lifecycle;

    fn topic(&self) -> &Lifecycle {
        &self.phase
    }
}

/// Broadcaster for [`LifecycleEvent`]s of one application.
#[derive(Debug)]
pub struct LifecycleNotifier {
    source: ApplicationId,
    dispatcher: EventDispatcher<LifecycleEvent>,
}

impl LifecycleNotifier {
    pub fn new(source: ApplicationId) -> Self {
        Self::with_policy(source, FaultPolicy::default())
    }

    pub fn with_policy(source: ApplicationId, policy: FaultPolicy) -> Self {
        Self {
            source,
            dispatcher: EventDispatcher::with_policy("lifecycle", policy),
        }
    }

    /// Listens to every phase.
    pub fn subscribe_all<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&LifecycleEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.dispatcher.subscribe_all(listener)
    }

    /// Listens to one phase.
    pub fn subscribe<F>(&mut self, phase: Lifecycle, listener: F) -> SubscriptionId
    where
        F: Fn(&LifecycleEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.dispatcher.subscribe(phase, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Publishes `phase`. Any phase may be fired in any order.
    pub fn fire(&self, phase: Lifecycle) -> Result<usize, DispatchError> {
        info!(
            "event=lifecycle_change module=lifecycle app={} phase={}",
            self.source, phase
        );
        self.dispatcher.publish(&LifecycleEvent {
            source: self.source,
            phase,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.listener_count()
    }
}

#[cfg(test)]
mod tests {
    use super::{Lifecycle, LifecycleNotifier, LifecycleState};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[test]
    fn legal_sequence_is_linear_and_terminal() {
        let mut state = LifecycleState::Unstarted;
        for phase in [
            Lifecycle::Starting,
            Lifecycle::Started,
            Lifecycle::Stopping,
            Lifecycle::Stopped,
        ] {
            assert!(state.can_enter(phase), "{state} -> {phase} should be legal");
            state = LifecycleState::In(phase);
        }
        for phase in [
            Lifecycle::Starting,
            Lifecycle::Started,
            Lifecycle::Stopping,
            Lifecycle::Stopped,
        ] {
            assert!(!state.can_enter(phase));
        }
        assert!(!LifecycleState::Unstarted.can_enter(Lifecycle::Stopping));
    }

    #[test]
    fn notifier_does_not_enforce_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = LifecycleNotifier::new(Uuid::new_v4());
        let log = Arc::clone(&seen);
        notifier.subscribe_all(move |event| {
            log.lock().expect("recorder lock").push(event.phase);
            Ok(())
        });

        notifier.fire(Lifecycle::Stopped).expect("fire stopped");
        notifier.fire(Lifecycle::Starting).expect("fire starting");
        assert_eq!(
            *seen.lock().expect("recorder lock"),
            vec![Lifecycle::Stopped, Lifecycle::Starting]
        );
    }

    #[test]
    fn phase_listener_only_sees_its_phase() {
        let seen = Arc::new(Mutex::new(0_u32));
        let mut notifier = LifecycleNotifier::new(Uuid::new_v4());
        let count = Arc::clone(&seen);
        notifier.subscribe(Lifecycle::Started, move |_| {
            *count.lock().expect("counter lock") += 1;
            Ok(())
        });

        notifier.fire(Lifecycle::Starting).expect("fire starting");
        notifier.fire(Lifecycle::Started).expect("fire started");
        assert_eq!(*seen.lock().expect("counter lock"), 1);
    }

    #[test]
    fn lifecycle_renders_uppercase_names() {
        assert_eq!(Lifecycle::Stopping.to_string(), "STOPPING");
        assert_eq!(LifecycleState::Unstarted.to_string(), "UNSTARTED");
    }
}
