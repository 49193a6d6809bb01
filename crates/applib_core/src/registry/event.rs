//! Management events published by registries.

use super::RegistryKind;
use crate::dispatch::TopicEvent;
use std::fmt::{Display, Formatter};

/// Registry mutation kind. Also the subscription topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Registered,
    Unregistered,
    /// View registry only.
    Focused,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Unregistered => "unregistered",
            Self::Focused => "focused",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable record of one committed registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementEvent<T> {
    pub source: RegistryKind,
    pub key: String,
    pub value: T,
    pub action: Action,
}

impl<T> ManagementEvent<T> {
    pub fn new(source: RegistryKind, key: impl Into<String>, value: T, action: Action) -> Self {
        Self {
            source,
            key: key.into(),
            value,
            action,
        }
    }
}

impl<T> TopicEvent for ManagementEvent<T> {
    type Topic = Action;

    fn topic(&self) -> &Action {
        &self.action
    }
}
