//! Keyed model/view registries and their management events.
//!
//! # Responsibility
//! - Store application objects under unique string keys.
//! - Apply the key collision policy (`auto_unregister`).
//! - Publish management events after each committed mutation.
//!
//! # Invariants
//! - A registered key resolves to exactly one value.
//! - With `auto_unregister` off, a colliding `register` changes nothing and
//!   publishes nothing.
//! - Events are published only after the registry state they describe is
//!   committed.

use crate::dispatch::DispatchError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod keyed;
pub mod managed;

pub use event::{Action, ManagementEvent};
pub use keyed::{Admission, KeyedRegistry};
pub use managed::ManagedRegistry;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Which registry an entry, event or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistryKind {
    Models,
    Views,
}

impl RegistryKind {
    /// Stable label used in log records and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Views => "views",
        }
    }

    fn singular(self) -> &'static str {
        match self {
            Self::Models => "model",
            Self::Views => "view",
        }
    }
}

impl Display for RegistryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registry, mapping and focus errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Key is empty or whitespace-only.
    InvalidKey(RegistryKind),
    /// Key already registered while `auto_unregister` is disabled.
    KeyInUse { kind: RegistryKind, key: String },
    /// Key is not registered in the named registry.
    NotRegistered { kind: RegistryKind, key: String },
    /// Focus tracking is only available on the view registry.
    FocusUnsupported(RegistryKind),
    /// A listener failed while the mutation event was being delivered.
    Dispatch(DispatchError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(kind) => write!(f, "{} key must not be blank", kind.singular()),
            Self::KeyInUse { kind, key } => {
                write!(f, "{} key already registered: {key}", kind.singular())
            }
            Self::NotRegistered { kind, key } => {
                write!(f, "\"{key}\" is not registered as a {}", kind.singular())
            }
            Self::FocusUnsupported(kind) => {
                write!(f, "focus tracking is not supported on {kind}")
            }
            Self::Dispatch(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DispatchError> for RegistryError {
    fn from(value: DispatchError) -> Self {
        Self::Dispatch(value)
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
